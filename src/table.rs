//! Raw tabular data as read from an input file, and the row-wise merge of
//! several inputs into one table.

use crate::error::{IngestError, REQUIRED_COLUMNS};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A single cell value carried through from an input file.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Bool(bool),
    Text(String),
}

impl Cell {
    /// Build a cell from delimited-text input. Surrounding whitespace-only
    /// values become `Empty`; everything else is kept verbatim.
    pub fn from_text(raw: &str) -> Self {
        if raw.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(raw.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(n) => f.write_str(&format_number(*n)),
            Cell::Bool(b) => f.write_str(if *b { "True" } else { "False" }),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

/// Render a number the way a spreadsheet shows it: integral values without
/// a decimal point, everything else in shortest round-trip form.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// One input file decoded into a header and rows.
#[derive(Debug, Clone)]
pub struct RawTable {
    /// Display name of the input (file name)
    pub source: String,
    pub headers: Vec<String>,
    /// Rows in file order; each row is at most `headers.len()` wide
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Create a table, normalizing header names. Names are kept verbatim
    /// apart from a leading byte-order mark: blank names become
    /// `Unnamed: <col>`, and repeated names get the first free `.1`, `.2`...
    /// suffix so every column stays addressable.
    pub fn new(source: impl Into<String>, raw_headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let mut used: HashSet<String> = HashSet::new();
        let mut next_suffix: HashMap<String, usize> = HashMap::new();
        let headers = raw_headers
            .into_iter()
            .enumerate()
            .map(|(idx, h)| {
                let stripped = h.trim_start_matches('\u{feff}');
                let base = if stripped.trim().is_empty() {
                    format!("Unnamed: {}", idx)
                } else {
                    stripped.to_string()
                };
                let name = if used.contains(&base) {
                    let suffix = next_suffix.entry(base.clone()).or_insert(1);
                    loop {
                        let candidate = format!("{}.{}", base, suffix);
                        *suffix += 1;
                        if !used.contains(&candidate) {
                            break candidate;
                        }
                    }
                } else {
                    base
                };
                used.insert(name.clone());
                name
            })
            .collect();

        RawTable {
            source: source.into(),
            headers,
            rows,
        }
    }
}

/// A row of the merged table, remembering where it came from.
#[derive(Debug, Clone)]
pub struct MergedRow {
    /// Index into `MergedTable::sources`
    pub source: usize,
    /// 1-based data row number within its source (header not counted)
    pub line: usize,
    /// One cell per merged header
    pub cells: Vec<Cell>,
}

/// Several inputs concatenated row-wise.
#[derive(Debug, Clone)]
pub struct MergedTable {
    pub sources: Vec<String>,
    pub headers: Vec<String>,
    pub rows: Vec<MergedRow>,
}

impl MergedTable {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Concatenate tables row-wise and check the identity columns.
///
/// The merged header is the union of all input headers in order of first
/// appearance. A row gets `Cell::Empty` for any column its own input lacked.
pub fn merge_tables(tables: Vec<RawTable>) -> Result<MergedTable, IngestError> {
    let mut headers: Vec<String> = Vec::new();
    let mut header_index: HashMap<String, usize> = HashMap::new();

    for table in &tables {
        for h in &table.headers {
            if !header_index.contains_key(h) {
                header_index.insert(h.clone(), headers.len());
                headers.push(h.clone());
            }
        }
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !header_index.contains_key(**c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(IngestError::MissingRequiredColumns { missing });
    }

    let mut sources = Vec::with_capacity(tables.len());
    let mut rows = Vec::new();

    for (source_idx, table) in tables.into_iter().enumerate() {
        let positions: Vec<usize> = table.headers.iter().map(|h| header_index[h]).collect();

        for (row_idx, row) in table.rows.into_iter().enumerate() {
            let mut cells = vec![Cell::Empty; headers.len()];
            for (cell, &pos) in row.into_iter().zip(positions.iter()) {
                cells[pos] = cell;
            }
            rows.push(MergedRow {
                source: source_idx,
                line: row_idx + 1,
                cells,
            });
        }

        log::debug!(
            "Merged '{}' ({} columns)",
            table.source,
            table.headers.len()
        );
        sources.push(table.source);
    }

    Ok(MergedTable {
        sources,
        headers,
        rows,
    })
}
