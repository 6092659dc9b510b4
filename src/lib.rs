//! Result Evaluator
//!
//! Merges exam result exports, scores every student into fixed question
//! buckets and ranks them by category.
//!
//! This library provides:
//! - `ingest` / `table`: reading CSV, TSV and spreadsheet exports and merging them row-wise
//! - `scoring`: the question buckets and per-student score aggregation
//! - `results`: student records and the per-upload result set
//! - `ranking` / `view`: sorted top-N views and the rank cursor
//! - `chart`: bar and pie chart models for a view
//! - `export`: CSV export and the Excel ranking workbook
//! - `pipeline`: end-to-end operations shared by the binaries
//!
//! Binaries:
//! - `results-cli`: rank, inspect, export and package from the command line
//! - `evaluator-ui`: interactive dashboard

pub mod chart;
pub mod config;
pub mod error;
pub mod export;
pub mod ingest;
pub mod pipeline;
pub mod ranking;
pub mod results;
pub mod scoring;
pub mod table;
pub mod view;

pub use error::IngestError;
pub use ranking::{rank_results, RankedEntry, RankedView, TopN};
pub use results::{ResultSet, StudentRecord};
pub use scoring::{Answers, Category, Scores};
pub use view::ViewState;
