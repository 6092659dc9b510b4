//! Error taxonomy for loading result files.
//!
//! Every variant aborts the whole upload: no partial result set is ever
//! produced from a batch that contains a failing input.

use thiserror::Error;

/// Columns every merged result table must carry, spelled exactly as the
/// exam export writes them.
pub const REQUIRED_COLUMNS: [&str; 2] = ["Student name", "Email"];

#[derive(Debug, Error)]
pub enum IngestError {
    /// An input file could not be decoded into rows.
    #[error("Failed to parse '{source_name}': {reason}")]
    SourceParse { source_name: String, reason: String },

    /// The merged table lacks one or both identity columns.
    #[error("Results must contain {}; missing: {}", quoted(&REQUIRED_COLUMNS), quoted(.missing))]
    MissingRequiredColumns { missing: Vec<String> },

    /// The file extension is outside the recognized set.
    #[error("Unsupported file type '{extension}' for '{source_name}' (expected csv, tsv, txt, xlsx, xlsm, xlsb, xls or ods)")]
    UnsupportedFileType {
        source_name: String,
        extension: String,
    },
}

impl IngestError {
    pub(crate) fn parse(source_name: &str, reason: impl ToString) -> Self {
        IngestError::SourceParse {
            source_name: source_name.to_string(),
            reason: reason.to_string(),
        }
    }
}

fn quoted<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|n| format!("'{}'", n.as_ref()))
        .collect::<Vec<_>>()
        .join(" and ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message_names_columns() {
        let err = IngestError::MissingRequiredColumns {
            missing: vec!["Email".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'Student name' and 'Email'"));
        assert!(msg.ends_with("missing: 'Email'"));
    }

    #[test]
    fn test_parse_error_names_source() {
        let err = IngestError::parse("batch-a.csv", "unexpected end of file");
        assert_eq!(
            err.to_string(),
            "Failed to parse 'batch-a.csv': unexpected end of file"
        );
    }
}
