//! Pipeline functions for programmatic use by both CLI and GUI.
//!
//! Each operation loads the inputs, builds the requested view and returns
//! structured data or a formatted report instead of printing to stdout.

use crate::chart::{BarChart, PieChart};
use crate::export::{write_csv_file, write_workbook, ExportShape};
use crate::ranking::{rank_results, RankedEntry, RankedView, TopN};
use crate::results::ResultSet;
use crate::scoring::Category;
use crate::table::format_number;
use anyhow::{Context, Result};
use std::fmt::Write;
use std::path::{Path, PathBuf};

// ============================================================================
// Loading
// ============================================================================

/// Inputs and selections shared by every operation.
#[derive(Debug, Clone)]
pub struct EvaluateConfig {
    /// Result files to merge, in order
    pub inputs: Vec<PathBuf>,
    /// Category to rank by
    pub category: Category,
    /// How many top records to keep
    pub top_n: TopN,
}

/// Read, merge and score the inputs.
pub fn load_results(inputs: &[PathBuf]) -> Result<ResultSet> {
    if inputs.is_empty() {
        anyhow::bail!("No input files given");
    }
    let results = ResultSet::load(inputs).context("Failed to load results")?;
    log::info!(
        "Loaded {} students from {} file(s)",
        results.len(),
        results.sources().len()
    );
    Ok(results)
}

// ============================================================================
// Ranking report
// ============================================================================

/// Load the inputs and return the ranked table as text.
///
/// With `export` set, the same view is also written there as a Ranking
/// CSV and the report ends with a line naming the file.
pub fn rank_report(config: &EvaluateConfig, export: Option<&Path>) -> Result<String> {
    let results = load_results(&config.inputs)?;
    let view = rank_results(&results, config.category, config.top_n);
    let mut report = format_report(&results, &view)?;
    if let Some(path) = export {
        write_csv_file(&view, &results, ExportShape::Ranking, path)?;
        writeln!(report, "\nWrote {} rows to {}", view.len(), path.display())?;
    }
    Ok(report)
}

/// Ranked table plus a text rendering of both charts.
pub fn format_report(results: &ResultSet, view: &RankedView<'_>) -> Result<String> {
    let category = view.category();
    let mut out = String::new();

    writeln!(
        out,
        "Loaded {} students from {}",
        results.len(),
        results.sources().join(", ")
    )?;
    if !results.coerced().is_empty() {
        writeln!(
            out,
            "{} non-numeric answer(s) counted as 0",
            results.coerced().len()
        )?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "{:=^96}",
        format!(" Top {} - {} ", view.top_n(), category.label())
    )?;
    writeln!(
        out,
        "\n{:>5}  {:<28} {:<40} {:>10}",
        "Rank", "Student name", "Email", "Score"
    )?;
    writeln!(out, "{:-<96}", "")?;

    for entry in view.entries() {
        writeln!(
            out,
            "{:>5}  {:<28} {:<40} {:>10}",
            entry.rank,
            truncate_name(entry.record.name(), 28),
            truncate_name(entry.record.email(), 40),
            format_number(entry.score(category))
        )?;
    }
    if view.is_empty() {
        writeln!(out, "  (no students)")?;
    }

    let bars = BarChart::from_view(view);
    if !bars.is_empty() {
        writeln!(out, "\n{:=^96}", " Performance Chart ")?;
        for bar in &bars.bars {
            let width = (bar.height * 50.0).round() as usize;
            writeln!(
                out,
                "{:<28} {:<50} {}",
                truncate_name(&bar.label, 28),
                "#".repeat(width),
                format_number(bar.value)
            )?;
        }
    }

    writeln!(out, "\n{:=^96}", " Score Contribution ")?;
    writeln!(out, "{}", PieChart::from_view(view).describe())?;

    Ok(out)
}

// ============================================================================
// Display Record
// ============================================================================

/// Load the inputs and describe the record at a 1-based rank of the view.
pub fn display_record(config: &EvaluateConfig, rank: usize) -> Result<String> {
    let results = load_results(&config.inputs)?;
    let view = rank_results(&results, config.category, config.top_n);

    let entry = view.get(rank).ok_or_else(|| {
        anyhow::anyhow!(
            "Rank {} out of range (the view has {} students)",
            rank,
            view.len()
        )
    })?;

    format_record(entry, view.category(), view.len())
}

/// Card for one student: identity, all five scores and the answers given.
pub fn format_record(
    entry: &RankedEntry<'_>,
    category: Category,
    total: usize,
) -> Result<String> {
    let record = entry.record;
    let scores = record.scores();
    let mut out = String::new();

    writeln!(out, "Rank {} of {} by {}", entry.rank, total, category.label())?;
    writeln!(out, "{:-<60}", "")?;
    writeln!(out, "{:<14} {}", "Student name:", record.name())?;
    writeln!(out, "{:<14} {}", "Email:", record.email())?;
    writeln!(out, "{:<14} {} (row {})", "Source:", record.source(), record.line())?;
    writeln!(out)?;

    for c in Category::BUCKETS {
        writeln!(out, "{:<40} {:>8}", c.label(), format_number(scores.get(c)))?;
    }
    writeln!(
        out,
        "{:<40} {:>8}",
        Category::Overall.label(),
        format_number(scores.overall())
    )?;

    writeln!(out)?;
    if record.answers().is_empty() {
        writeln!(out, "No answers recorded")?;
    } else {
        let answers: Vec<String> = record
            .answers()
            .iter()
            .map(|(q, v)| format!("Q{}={}", q, format_number(v)))
            .collect();
        writeln!(out, "Answers ({}):", answers.len())?;
        for chunk in answers.chunks(10) {
            writeln!(out, "  {}", chunk.join("  "))?;
        }
    }

    Ok(out)
}

// ============================================================================
// Export
// ============================================================================

/// Load the inputs and write the view as CSV.
pub fn export_csv(config: &EvaluateConfig, output: &Path, shape: ExportShape) -> Result<String> {
    let results = load_results(&config.inputs)?;
    let view = rank_results(&results, config.category, config.top_n);
    write_csv_file(&view, &results, shape, output)?;
    Ok(format!(
        "Wrote {} rows ({}) to {}",
        view.len(),
        config.category.label(),
        output.display()
    ))
}

/// Load the inputs and write a workbook with every category ranking.
pub fn package_workbook(inputs: &[PathBuf], output: &Path) -> Result<String> {
    let results = load_results(inputs)?;
    write_workbook(&results, output)?;
    Ok(format!(
        "Workbook with {} students and {} ranking sheets saved to {}",
        results.len(),
        Category::ALL.len(),
        output.display()
    ))
}

// ============================================================================
// Internal Helpers
// ============================================================================

/// Truncate a name to fit in a column.
fn truncate_name(name: &str, max_len: usize) -> String {
    if name.chars().count() <= max_len {
        name.to_string()
    } else {
        let kept: String = name.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
