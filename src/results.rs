//! Student records and the per-session result set.

use crate::error::IngestError;
use crate::ingest::load_sources;
use crate::scoring::{compute_scores, question_index, Answers, Category, Scores};
use crate::table::{format_number, Cell, MergedTable};
use std::path::PathBuf;

pub const NAME_COLUMN: &str = "Student name";
pub const EMAIL_COLUMN: &str = "Email";

/// An answer cell whose text was not a number and was counted as 0.
#[derive(Debug, Clone, PartialEq)]
pub struct CoercedCell {
    pub source: String,
    /// 1-based data row within the source
    pub line: usize,
    pub column: String,
    pub raw: String,
}

/// One student: identity, original cells, sparse answers and derived scores.
#[derive(Debug, Clone)]
pub struct StudentRecord {
    name: String,
    email: String,
    answers: Answers,
    scores: Scores,
    /// Original cells, aligned with `ResultSet::headers`
    cells: Vec<Cell>,
    source: String,
    line: usize,
}

impl StudentRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn scores(&self) -> &Scores {
        &self.scores
    }

    pub fn score(&self, category: Category) -> f64 {
        self.scores.get(category)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Name of the input this record came from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn line(&self) -> usize {
        self.line
    }
}

/// Value of an answer cell. `Ok(None)` means "no answer"; `Err` carries the
/// text that could not be read as a number.
fn answer_value(cell: &Cell) -> Result<Option<f64>, String> {
    match cell {
        Cell::Empty => Ok(None),
        Cell::Number(n) if n.is_finite() => Ok(Some(*n)),
        Cell::Number(n) => Err(format_number(*n)),
        Cell::Bool(b) => Ok(Some(if *b { 1.0 } else { 0.0 })),
        Cell::Text(s) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Some(n)),
            _ => Err(s.clone()),
        },
    }
}

fn without_derived<T>(values: Vec<T>, derived: &[bool]) -> Vec<T> {
    values
        .into_iter()
        .zip(derived)
        .filter(|(_, d)| !**d)
        .map(|(v, _)| v)
        .collect()
}

/// All records of one upload, in merged order.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    headers: Vec<String>,
    sources: Vec<String>,
    records: Vec<StudentRecord>,
    coerced: Vec<CoercedCell>,
}

impl ResultSet {
    /// Read, merge and score the given files.
    pub fn load(paths: &[PathBuf]) -> Result<Self, IngestError> {
        let table = load_sources(paths)?;
        Ok(Self::from_table(table))
    }

    /// Score every row of a merged table.
    ///
    /// Answer cells that are not numbers count as 0; each one is recorded
    /// in `coerced()` and logged. Input columns named like a derived score
    /// (e.g. a re-uploaded export) are dropped, since the scores are always
    /// recomputed.
    pub fn from_table(table: MergedTable) -> Self {
        let derived: Vec<bool> = table
            .headers
            .iter()
            .map(|h| Category::ALL.iter().any(|c| c.label() == h.as_str()))
            .collect();
        if derived.iter().any(|d| *d) {
            log::info!(
                "Replacing {} derived score column(s) found in the input",
                derived.iter().filter(|d| **d).count()
            );
        }

        let name_col = table.column(NAME_COLUMN);
        let email_col = table.column(EMAIL_COLUMN);
        let question_cols: Vec<(usize, u8)> = table
            .headers
            .iter()
            .enumerate()
            .filter_map(|(idx, h)| question_index(h).map(|q| (idx, q)))
            .collect();

        let mut records = Vec::with_capacity(table.rows.len());
        let mut coerced = Vec::new();

        for row in table.rows {
            let source = table.sources[row.source].clone();
            let mut answers = Answers::new();

            for &(col, question) in &question_cols {
                match answer_value(&row.cells[col]) {
                    Ok(Some(value)) => answers.insert(question, value),
                    Ok(None) => {}
                    Err(raw) => {
                        log::warn!(
                            "'{}' row {}: non-numeric {} value '{}' counted as 0",
                            source,
                            row.line,
                            table.headers[col],
                            raw
                        );
                        coerced.push(CoercedCell {
                            source: source.clone(),
                            line: row.line,
                            column: table.headers[col].clone(),
                            raw,
                        });
                    }
                }
            }

            let text_at = |col: Option<usize>| {
                col.map(|c| row.cells[c].to_string().trim().to_string())
                    .unwrap_or_default()
            };

            records.push(StudentRecord {
                name: text_at(name_col),
                email: text_at(email_col),
                scores: compute_scores(&answers),
                answers,
                cells: without_derived(row.cells, &derived),
                source,
                line: row.line,
            });
        }

        log::info!(
            "Scored {} records from {} source(s); {} question columns, {} non-numeric answers",
            records.len(),
            table.sources.len(),
            question_cols.len(),
            coerced.len()
        );

        ResultSet {
            headers: without_derived(table.headers, &derived),
            sources: table.sources,
            records,
            coerced,
        }
    }

    /// Merged column headers, in first-appearance order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn coerced(&self) -> &[CoercedCell] {
        &self.coerced
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Original cell of a record under the given header.
    pub fn cell<'a>(&self, record: &'a StudentRecord, header: &str) -> Option<&'a Cell> {
        self.headers
            .iter()
            .position(|h| h == header)
            .and_then(|idx| record.cells.get(idx))
    }
}
