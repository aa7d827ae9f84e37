mod args;
mod classify;
mod impact;
mod validate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "colander")]
#[command(about = "Classify recipes into food classes and estimate their carbon impact", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every recipe and write the report CSV
    Classify(classify::ClassifyArgs),
    /// Print each recipe's total carbon impact
    Impact(impact::ImpactArgs),
    /// Check both catalogs for structural problems
    Validate(validate::ValidateArgs),
}

fn init_logging() {
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    match cli.command {
        Commands::Classify(args) => classify::run(args),
        Commands::Impact(args) => impact::run(args),
        Commands::Validate(args) => validate::run(args),
    }
}
