//! Reading result exports from disk.
//!
//! Delimited text goes through the `csv` crate; spreadsheets go through
//! `calamine` and only the first worksheet is read. Either way the first row
//! is the header.

use crate::error::IngestError;
use crate::table::{merge_tables, Cell, MergedTable, RawTable};
use calamine::{open_workbook_auto, Data, Reader, Sheets};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::{Path, PathBuf};

/// How an input file is decoded, chosen from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Delimited text with the given delimiter byte
    Delimited(u8),
    Spreadsheet,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self, IngestError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match extension.as_str() {
            "csv" => Ok(SourceFormat::Delimited(b',')),
            "tsv" | "tab" | "txt" => Ok(SourceFormat::Delimited(b'\t')),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SourceFormat::Spreadsheet),
            _ => Err(IngestError::UnsupportedFileType {
                source_name: source_name(path),
                extension,
            }),
        }
    }
}

/// File name used to identify an input in messages.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read every input and merge them into one table.
///
/// All extensions are checked before any file is opened, so an unsupported
/// file aborts the upload without touching the others. The first file that
/// fails to parse aborts the rest.
pub fn load_sources(paths: &[PathBuf]) -> Result<MergedTable, IngestError> {
    let formats = paths
        .iter()
        .map(|p| SourceFormat::from_path(p))
        .collect::<Result<Vec<_>, _>>()?;

    let mut tables = Vec::with_capacity(paths.len());
    for (path, format) in paths.iter().zip(formats) {
        let table = read_source(path, format)?;
        log::debug!(
            "Read '{}': {} rows, {} columns",
            table.source,
            table.rows.len(),
            table.headers.len()
        );
        tables.push(table);
    }

    merge_tables(tables)
}

/// Decode one input file.
pub fn read_source(path: &Path, format: SourceFormat) -> Result<RawTable, IngestError> {
    let name = source_name(path);
    match format {
        SourceFormat::Delimited(delimiter) => {
            let file = std::fs::File::open(path).map_err(|e| IngestError::parse(&name, e))?;
            read_delimited(&name, file, delimiter)
        }
        SourceFormat::Spreadsheet => read_spreadsheet(path, &name),
    }
}

/// Decode delimited text from any reader.
pub fn read_delimited<R: Read>(
    name: &str,
    input: R,
    delimiter: u8,
) -> Result<RawTable, IngestError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(input);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IngestError::parse(name, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(IngestError::parse(name, "no header row"));
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| IngestError::parse(name, e))?;
        if record.len() > headers.len() {
            return Err(IngestError::parse(
                name,
                format!(
                    "row {} has {} fields but the header has {}",
                    idx + 1,
                    record.len(),
                    headers.len()
                ),
            ));
        }
        let row: Vec<Cell> = record.iter().map(Cell::from_text).collect();
        if row.iter().all(Cell::is_empty) {
            continue;
        }
        rows.push(row);
    }

    Ok(RawTable::new(name, headers, rows))
}

fn read_spreadsheet(path: &Path, name: &str) -> Result<RawTable, IngestError> {
    let mut workbook: Sheets<_> =
        open_workbook_auto(path).map_err(|e| IngestError::parse(name, e))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IngestError::parse(name, "workbook contains no sheets"))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| IngestError::parse(name, format!("sheet '{}': {}", sheet_name, e)))?;

    let mut row_iter = range.rows();
    let headers: Vec<String> = match row_iter.next() {
        Some(header_row) => header_row.iter().map(|c| data_to_cell(c).to_string()).collect(),
        None => return Err(IngestError::parse(name, "no header row")),
    };

    let rows = row_iter
        .map(|row| row.iter().map(data_to_cell).collect::<Vec<_>>())
        .filter(|row| !row.iter().all(Cell::is_empty))
        .collect();

    Ok(RawTable::new(name, headers, rows))
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from_text(s),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::from_text(s),
        Data::Error(e) => Cell::Text(format!("#{:?}", e)),
    }
}
