//! Flags shared by every subcommand.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colander_core::{LoadOptions, MissingFieldPolicy, NormalizeOptions};

#[derive(Args, Debug)]
pub struct InputArgs {
    /// Path to the food-class catalog
    #[arg(long, value_name = "PATH", default_value = "food_classes.csv")]
    pub food_classes: PathBuf,

    /// Path to the recipe catalog
    #[arg(long, value_name = "PATH", default_value = "recipes.csv")]
    pub recipes: PathBuf,

    /// File with one stop-word per line, removed during tokenization
    #[arg(long, value_name = "PATH")]
    pub stopwords: Option<PathBuf>,

    /// Also strip common measurement words (cup, tbsp, kg, ...)
    #[arg(long)]
    pub strip_units: bool,
}

impl InputArgs {
    /// Builds loader options from the shared flags and the subcommand's
    /// strictness, reading the stop-word file when one was given.
    pub fn load_options(&self, strict: bool) -> Result<LoadOptions> {
        let mut normalize = if self.strip_units {
            NormalizeOptions::with_measurement_stopwords()
        } else {
            NormalizeOptions::default()
        };
        if let Some(path) = &self.stopwords {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading stop-word file {}", path.display()))?;
            normalize.stopwords.extend(stopword_lines(&text));
        }
        let on_missing_field = if strict {
            MissingFieldPolicy::Fail
        } else {
            MissingFieldPolicy::Skip
        };
        Ok(LoadOptions {
            on_missing_field,
            normalize,
        })
    }
}

/// One stop-word per line; blank lines and `#` comments are ignored.
fn stopword_lines(text: &str) -> impl Iterator<Item = String> + '_ {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_lowercase)
}
