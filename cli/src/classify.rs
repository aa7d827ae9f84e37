//! The full pipeline: load both catalogs, classify, estimate impact, and
//! write the report CSV.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colander_core::{write_csv, write_csv_path, ClassificationStatus, MatchOptions, PipelineOptions};
use tracing::info;

use crate::args::InputArgs;

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Where to write the report (stdout when omitted)
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Labels to keep per recipe
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub top_k: usize,

    /// Discard labels scoring below this
    #[arg(long, value_name = "SCORE", default_value_t = 0.0)]
    pub min_score: f64,

    /// Abort on malformed rows instead of skipping them
    #[arg(long)]
    pub strict: bool,

    /// Skip the impact pass; the impact column stays empty
    #[arg(long)]
    pub no_impact: bool,
}

pub fn run(args: ClassifyArgs) -> Result<()> {
    let opts = PipelineOptions {
        load: args.input.load_options(args.strict)?,
        matching: MatchOptions {
            top_k: args.top_k,
            min_score: args.min_score,
        },
        skip_impact: args.no_impact,
    };
    let outcome =
        colander_core::run_from_paths(&args.input.food_classes, &args.input.recipes, &opts)?;

    match &args.output {
        Some(path) => {
            write_csv_path(&outcome.rows, path)
                .with_context(|| format!("writing report to {}", path.display()))?;
            info!("wrote {} rows to {}", outcome.rows.len(), path.display());
        }
        None => {
            write_csv(&outcome.rows, io::stdout().lock()).context("writing report to stdout")?;
        }
    }

    let unclassified = outcome
        .rows
        .iter()
        .filter(|row| row.status != ClassificationStatus::Classified)
        .count();
    info!(
        "classified {} recipes against {} food classes ({} without a label)",
        outcome.recipes_loaded, outcome.classes_loaded, unclassified
    );
    Ok(())
}
