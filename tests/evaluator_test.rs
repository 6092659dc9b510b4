//! End-to-end tests over real files on disk.
//!
//! Inputs are written into a temp directory (CSV/TSV as text, spreadsheets
//! through rust_xlsxwriter) and go through the same loading, ranking and
//! export paths the binaries use.

use calamine::{open_workbook_auto, Data, Reader};
use result_evaluator::export::ExportShape;
use result_evaluator::pipeline::{self, EvaluateConfig};
use result_evaluator::{rank_results, Category, IngestError, ResultSet, TopN, ViewState};
use rust_xlsxwriter::Workbook;
use std::fs;
use std::path::{Path, PathBuf};

fn write_text(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Single-sheet workbook: a header row of strings, then numeric answers
/// after the name and email columns.
fn write_xlsx(dir: &Path, name: &str, headers: &[&str], rows: &[(&str, &str, &[f64])]) -> PathBuf {
    let path = dir.join(name);
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    for (idx, (student, email, answers)) in rows.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_string(row, 0, *student).unwrap();
        sheet.write_string(row, 1, *email).unwrap();
        for (offset, value) in answers.iter().enumerate() {
            sheet.write_number(row, offset as u16 + 2, *value).unwrap();
        }
    }
    workbook.save(&path).unwrap();
    path
}

#[test]
fn test_csv_and_spreadsheet_merge_with_disjoint_columns() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_text(
        dir.path(),
        "morning.csv",
        "Student name,Email,Q1,Q21\nAsha,asha@x.com,4,6\nBen,ben@x.com,2,1\n",
    );
    let xlsx = write_xlsx(
        dir.path(),
        "evening.xlsx",
        &["Student name", "Email", "Q41", "Q81"],
        &[("Chen", "chen@x.com", &[7.0, 3.0][..])],
    );

    let results = ResultSet::load(&[csv, xlsx]).unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(
        results.headers(),
        ["Student name", "Email", "Q1", "Q21", "Q41", "Q81"]
    );
    assert_eq!(results.sources(), ["morning.csv", "evening.xlsx"]);

    let names: Vec<&str> = results.records().iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["Asha", "Ben", "Chen"]);

    let asha = &results.records()[0];
    assert_eq!(asha.scores().aptitude(), 4.0);
    assert_eq!(asha.scores().ai_ml_ds(), 6.0);
    assert_eq!(asha.scores().fsd_db(), 0.0);
    assert_eq!(asha.scores().devops(), 0.0);
    assert_eq!(asha.answers().get(41), 0.0);

    let chen = &results.records()[2];
    assert_eq!(chen.email(), "chen@x.com");
    assert_eq!(chen.scores().aptitude(), 0.0);
    assert_eq!(chen.scores().fsd_db(), 7.0);
    assert_eq!(chen.scores().devops(), 3.0);
    assert_eq!(chen.score(Category::Overall), 10.0);
    assert_eq!(chen.source(), "evening.xlsx");
}

#[test]
fn test_email_present_in_one_input_is_enough() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_text(dir.path(), "names.csv", "Student name,Q1\nAsha,3\n");
    let second = write_text(
        dir.path(),
        "emails.tsv",
        "Student name\tEmail\tQ1\nBen\tben@x.com\t5\n",
    );

    let results = ResultSet::load(&[first, second]).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results.records()[0].email(), "");
    assert_eq!(results.records()[1].email(), "ben@x.com");
}

#[test]
fn test_email_absent_everywhere_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_text(dir.path(), "a.csv", "Student name,Q1\nAsha,3\n");
    let second = write_text(dir.path(), "b.csv", "Student name,Q2\nBen,4\n");

    match ResultSet::load(&[first, second]) {
        Err(IngestError::MissingRequiredColumns { missing }) => {
            assert_eq!(missing, vec!["Email".to_string()]);
        }
        other => panic!("expected MissingRequiredColumns, got {:?}", other),
    }
}

#[test]
fn test_unsupported_file_rejects_whole_upload() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_text(dir.path(), "a.csv", "Student name,Email\nAsha,a@x.com\n");
    let bad = write_text(dir.path(), "notes.pdf", "%PDF-1.4");

    match ResultSet::load(&[good, bad]) {
        Err(IngestError::UnsupportedFileType {
            source_name,
            extension,
        }) => {
            assert_eq!(source_name, "notes.pdf");
            assert_eq!(extension, "pdf");
        }
        other => panic!("expected UnsupportedFileType, got {:?}", other),
    }
}

#[test]
fn test_corrupt_spreadsheet_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let bad = write_text(dir.path(), "scores.xlsx", "this is not a zip archive");

    match ResultSet::load(&[bad]) {
        Err(IngestError::SourceParse { source_name, .. }) => {
            assert_eq!(source_name, "scores.xlsx");
        }
        other => panic!("expected SourceParse, got {:?}", other),
    }
}

#[test]
fn test_reference_scores_and_order() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_text(
        dir.path(),
        "results.csv",
        "Student name,Email,Q1,Q21\nB,b@x.com,3,\nA,a@x.com,5,10\n",
    );

    let results = ResultSet::load(&[input]).unwrap();
    let a = &results.records()[1];
    assert_eq!(a.score(Category::Aptitude), 5.0);
    assert_eq!(a.score(Category::Overall), 15.0);
    let b = &results.records()[0];
    assert_eq!(b.score(Category::Aptitude), 3.0);
    assert_eq!(b.score(Category::Overall), 3.0);

    let view = rank_results(&results, Category::Overall, TopN::Count(10));
    let order: Vec<&str> = view.entries().iter().map(|e| e.record.name()).collect();
    assert_eq!(order, vec!["A", "B"]);
}

#[test]
fn test_non_numeric_answers_count_as_zero() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_text(
        dir.path(),
        "results.csv",
        "Student name,Email,Q1,Q2\nAsha,a@x.com,absent, 2.5 \n",
    );

    let results = ResultSet::load(&[input]).unwrap();
    assert_eq!(results.records()[0].score(Category::Aptitude), 2.5);
    assert_eq!(results.coerced().len(), 1);
    assert_eq!(results.coerced()[0].column, "Q1");
    assert_eq!(results.coerced()[0].raw, "absent");
}

#[test]
fn test_cursor_survives_smaller_upload() {
    let dir = tempfile::tempdir().unwrap();
    let mut big = String::from("Student name,Email,Q1\n");
    for i in 0..12 {
        big.push_str(&format!("S{},s{}@x.com,{}\n", i, i, i));
    }
    let big = write_text(dir.path(), "big.csv", &big);
    let small = write_text(
        dir.path(),
        "small.csv",
        "Student name,Email,Q1\nX,x@x.com,1\nY,y@x.com,2\n",
    );

    let mut state = ViewState::new(Category::Aptitude, TopN::Count(10));
    let first = ResultSet::load(&[big]).unwrap();
    assert_eq!(state.refresh(&first).len(), 10);
    for _ in 0..20 {
        state.next();
    }
    assert_eq!(state.rank(), 10);

    let second = ResultSet::load(&[small]).unwrap();
    let view = state.refresh(&second);
    assert_eq!(state.rank(), 2);
    assert_eq!(state.current(&view).unwrap().record.name(), "X");
}

#[test]
fn test_export_csv_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![
        write_text(
            dir.path(),
            "a.csv",
            "Student name,Email,Q1,Q81\nAsha,a@x.com,2,9\nBen,b@x.com,8,0\n",
        ),
        write_text(dir.path(), "b.tsv", "Student name\tEmail\tQ1\nChen\tc@x.com\t5\n"),
    ];
    let output = dir.path().join("devops.csv");
    let config = EvaluateConfig {
        inputs,
        category: Category::DevOpsTesting,
        top_n: TopN::Count(2),
    };

    let summary = pipeline::export_csv(&config, &output, ExportShape::Full).unwrap();
    assert!(summary.starts_with("Wrote 2 rows"));

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.len(), 4 + 5);
    assert_eq!(&headers[4], Category::Aptitude.label());
    assert_eq!(&headers[8], Category::Overall.label());

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    // Asha leads DevOps; Ben and Chen tie at 0 and keep upload order.
    assert_eq!(&rows[0][0], "Asha");
    assert_eq!(&rows[0][7], "9");
    assert_eq!(&rows[0][8], "11");
    assert_eq!(&rows[1][0], "Ben");
    assert_eq!(&rows[1][3], "0");
}

#[test]
fn test_package_workbook_sheets() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![write_text(
        dir.path(),
        "results.csv",
        "Student name,Email,Q1,Q41\nAsha,a@x.com,2,9\nBen,b@x.com,8,1\n",
    )];
    let output = dir.path().join("package.xlsx");

    let summary = pipeline::package_workbook(&inputs, &output).unwrap();
    assert!(summary.contains("2 students"));

    let mut workbook = open_workbook_auto(&output).unwrap();
    assert_eq!(
        workbook.sheet_names(),
        vec![
            "Summary",
            "Overall",
            "Aptitude",
            "AI-ML-DS",
            "FSD-DB",
            "DevOps-Testing"
        ]
    );

    let aptitude = workbook.worksheet_range("Aptitude").unwrap();
    assert_eq!(
        aptitude.get_value((1, 1)),
        Some(&Data::String("Ben".to_string()))
    );
    assert_eq!(aptitude.get_value((1, 3)), Some(&Data::Float(8.0)));

    let fsd = workbook.worksheet_range("FSD-DB").unwrap();
    assert_eq!(fsd.get_value((1, 1)), Some(&Data::String("Asha".to_string())));
}

#[test]
fn test_padded_required_headers_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_text(
        dir.path(),
        "padded.csv",
        "Student name ,Email ,Q1\nAsha,a@x.com,3\n",
    );

    match ResultSet::load(&[input]) {
        Err(IngestError::MissingRequiredColumns { missing }) => {
            assert_eq!(missing, vec!["Student name", "Email"]);
        }
        other => panic!("expected MissingRequiredColumns, got {:?}", other),
    }
}

#[test]
fn test_reuploaded_export_keeps_one_set_of_scores() {
    let dir = tempfile::tempdir().unwrap();
    let first_export = dir.path().join("first.csv");
    let second_export = dir.path().join("second.csv");
    let config = EvaluateConfig {
        inputs: vec![write_text(
            dir.path(),
            "results.csv",
            "Student name,Email,Q1,Q81\nAsha,a@x.com,2,9\n",
        )],
        category: Category::Overall,
        top_n: TopN::All,
    };
    pipeline::export_csv(&config, &first_export, ExportShape::Full).unwrap();

    let again = EvaluateConfig {
        inputs: vec![first_export.clone()],
        ..config
    };
    pipeline::export_csv(&again, &second_export, ExportShape::Full).unwrap();

    let first = fs::read_to_string(&first_export).unwrap();
    let second = fs::read_to_string(&second_export).unwrap();
    assert_eq!(second, first);
    let header = second.lines().next().unwrap();
    assert_eq!(header.matches(Category::Overall.label()).count(), 1);
}
