//! Writing ranked views out as CSV, and packaging every category ranking
//! into one Excel workbook.

use crate::ranking::{rank_results, RankedView, TopN};
use crate::results::ResultSet;
use crate::scoring::Category;
use crate::table::format_number;
use anyhow::{Context, Result};
use serde::{Serialize, Serializer};
use std::io::Write;
use std::path::Path;

/// Column layout of a CSV export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportShape {
    /// Every original column followed by the five derived scores
    #[default]
    Full,
    /// Rank, name, email and the selected category's score only
    Ranking,
}

/// Headers of a full export: merged originals, then derived scores.
pub fn full_headers(results: &ResultSet) -> Vec<String> {
    results
        .headers()
        .iter()
        .cloned()
        .chain(Category::BUCKETS.iter().map(|c| c.label().to_string()))
        .chain(std::iter::once(Category::Overall.label().to_string()))
        .collect()
}

/// Write a view as CSV in displayed order. No index column is written.
pub fn write_csv<W: Write>(
    view: &RankedView<'_>,
    results: &ResultSet,
    shape: ExportShape,
    output: W,
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(output);
    match shape {
        ExportShape::Full => write_full(view, results, &mut writer)?,
        ExportShape::Ranking => write_ranking(view, &mut writer)?,
    }
    writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

fn write_full<W: Write>(
    view: &RankedView<'_>,
    results: &ResultSet,
    writer: &mut csv::Writer<W>,
) -> Result<()> {
    writer.write_record(full_headers(results))?;

    for entry in view.entries() {
        let record = entry.record;
        let mut row: Vec<String> = record.cells().iter().map(|c| c.to_string()).collect();
        // Records from the same set always span all headers, but keep the
        // row rectangular regardless.
        row.resize(results.headers().len(), String::new());
        for category in Category::BUCKETS {
            row.push(format_number(record.score(category)));
        }
        row.push(format_number(record.score(Category::Overall)));
        writer
            .write_record(&row)
            .with_context(|| format!("Failed to write rank {}", entry.rank))?;
    }
    Ok(())
}

#[derive(Serialize)]
struct RankingRow<'a> {
    #[serde(rename = "Rank")]
    rank: usize,
    #[serde(rename = "Student name")]
    name: &'a str,
    #[serde(rename = "Email")]
    email: &'a str,
    #[serde(rename = "Category")]
    category: &'static str,
    #[serde(rename = "Score", serialize_with = "plain_number")]
    score: f64,
}

fn plain_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_number(*value))
}

fn write_ranking<W: Write>(view: &RankedView<'_>, writer: &mut csv::Writer<W>) -> Result<()> {
    let category = view.category();
    if view.is_empty() {
        // serialize() only emits the header alongside the first row
        writer.write_record(["Rank", "Student name", "Email", "Category", "Score"])?;
        return Ok(());
    }
    for entry in view.entries() {
        writer.serialize(RankingRow {
            rank: entry.rank,
            name: entry.record.name(),
            email: entry.record.email(),
            category: category.label(),
            score: entry.score(category),
        })?;
    }
    Ok(())
}

/// Render a view as CSV text.
pub fn csv_string(view: &RankedView<'_>, results: &ResultSet, shape: ExportShape) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(view, results, shape, &mut buf)?;
    String::from_utf8(buf).context("CSV output is not valid UTF-8")
}

/// Write a view as CSV to a file.
pub fn write_csv_file(
    view: &RankedView<'_>,
    results: &ResultSet,
    shape: ExportShape,
    path: &Path,
) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(view, results, shape, std::io::BufWriter::new(file))
}

/// Build a workbook with a Summary sheet and one full ranking sheet per
/// category, and save it to `path`.
pub fn write_workbook(results: &ResultSet, path: &Path) -> Result<()> {
    use rust_xlsxwriter::{Format, Workbook};

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let header_fmt = Format::new()
        .set_bold()
        .set_font_color("#FFFFFF")
        .set_background_color("#F4A303");

    // -- Summary --
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        sheet.set_column_width(0, 28)?;
        sheet.set_column_width(1, 40)?;

        let generated = chrono::Local::now().format("%Y-%m-%d %H:%M").to_string();
        let mut row = 0u32;
        sheet.write_string_with_format(row, 0, "Result Evaluator", &bold)?;
        row += 2;
        sheet.write_string_with_format(row, 0, "Generated", &bold)?;
        sheet.write_string(row, 1, &generated)?;
        row += 1;
        sheet.write_string_with_format(row, 0, "Students", &bold)?;
        sheet.write_number(row, 1, results.len() as f64)?;
        row += 1;
        sheet.write_string_with_format(row, 0, "Non-numeric answers", &bold)?;
        sheet.write_number(row, 1, results.coerced().len() as f64)?;
        row += 1;
        sheet.write_string_with_format(row, 0, "Sources", &bold)?;
        for source in results.sources() {
            sheet.write_string(row, 1, source)?;
            row += 1;
        }

        row += 1;
        sheet.write_string_with_format(row, 0, "Category", &header_fmt)?;
        sheet.write_string_with_format(row, 1, "Top student", &header_fmt)?;
        sheet.write_string_with_format(row, 2, "Score", &header_fmt)?;
        for category in Category::ALL {
            row += 1;
            let view = rank_results(results, category, TopN::Count(1));
            sheet.write_string(row, 0, category.label())?;
            if let Some(top) = view.get(1) {
                sheet.write_string(row, 1, top.record.name())?;
                sheet.write_number(row, 2, top.score(category))?;
            }
        }
    }

    // -- One ranking sheet per category --
    for category in Category::ALL {
        let view = rank_results(results, category, TopN::All);
        let sheet = workbook.add_worksheet();
        sheet.set_name(sheet_name(category))?;
        sheet.set_column_width(1, 28)?;
        sheet.set_column_width(2, 32)?;

        for (col, header) in ["Rank", "Student name", "Email", category.label()]
            .iter()
            .enumerate()
        {
            sheet.write_string_with_format(0, col as u16, *header, &header_fmt)?;
        }

        for entry in view.entries() {
            let row = entry.rank as u32;
            sheet.write_number(row, 0, entry.rank as f64)?;
            sheet.write_string(row, 1, entry.record.name())?;
            sheet.write_string(row, 2, entry.record.email())?;
            sheet.write_number(row, 3, entry.score(category))?;
        }
        sheet.set_freeze_panes(1, 0)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save workbook {}", path.display()))?;
    Ok(())
}

/// Worksheet names may not contain `/` or `[]`, so ranking sheets use the
/// bucket names without ranges.
fn sheet_name(category: Category) -> &'static str {
    match category {
        Category::Overall => "Overall",
        Category::Aptitude => "Aptitude",
        Category::AiMlDs => "AI-ML-DS",
        Category::FsdDb => "FSD-DB",
        Category::DevOpsTesting => "DevOps-Testing",
    }
}
