//! Results CLI - rank exam results and export summaries
//!
//! Merges one or more result exports, scores every student into the
//! question buckets, and prints or exports the ranking for a category.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use result_evaluator::config::Settings;
use result_evaluator::export::ExportShape;
use result_evaluator::pipeline::{self, EvaluateConfig};
use result_evaluator::{Category, TopN};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "results-cli")]
#[command(about = "Rank exam results by category and export summaries")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Selection {
    /// Result file (csv, tsv, txt, xlsx, xlsm, xlsb, xls, ods). Repeat to merge several.
    #[arg(short, long = "input", required = true, num_args = 1..)]
    inputs: Vec<PathBuf>,

    /// Category to rank by: overall, aptitude, ai-ml-ds, fsd-db, devops
    /// (default: from ~/.result-evaluator.conf, else overall)
    #[arg(short, long, env = "RESULTS_CATEGORY")]
    category: Option<Category>,

    /// Number of top students to keep, or "all"
    /// (default: from ~/.result-evaluator.conf, else 10)
    #[arg(short, long, env = "RESULTS_TOP")]
    top: Option<TopN>,
}

impl Selection {
    fn into_config(self, settings: &Settings) -> EvaluateConfig {
        EvaluateConfig {
            inputs: self.inputs,
            category: self.category.unwrap_or(settings.default_category),
            top_n: self.top.unwrap_or(settings.default_top),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the ranked table and chart summaries for a category
    Rank {
        #[command(flatten)]
        selection: Selection,

        /// Also write the ranking (rank, name, email, score) to this CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show one student of the ranking with all scores and answers
    Show {
        #[command(flatten)]
        selection: Selection,

        /// Rank to display (1-indexed within the ranking)
        #[arg(short = 'n', long, default_value = "1")]
        rank: usize,
    },

    /// Export the ranking as CSV with all original and derived columns
    Export {
        #[command(flatten)]
        selection: Selection,

        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,

        /// Write only rank, name, email and score instead of all columns
        #[arg(long)]
        ranking_only: bool,
    },

    /// Create an Excel workbook with a summary and every category ranking
    Package {
        /// Result file. Repeat to merge several.
        #[arg(short, long = "input", required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Output xlsx file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let settings = Settings::load();

    match cli.command {
        Commands::Rank { selection, output } => {
            let config = selection.into_config(&settings);
            print!("{}", pipeline::rank_report(&config, output.as_deref())?);
        }
        Commands::Show { selection, rank } => {
            let config = selection.into_config(&settings);
            print!("{}", pipeline::display_record(&config, rank)?);
        }
        Commands::Export {
            selection,
            output,
            ranking_only,
        } => {
            let config = selection.into_config(&settings);
            let shape = if ranking_only {
                ExportShape::Ranking
            } else {
                ExportShape::Full
            };
            println!("{}", pipeline::export_csv(&config, &output, shape)?);
        }
        Commands::Package { inputs, output } => {
            println!("{}", pipeline::package_workbook(&inputs, &output)?);
        }
    }

    Ok(())
}
