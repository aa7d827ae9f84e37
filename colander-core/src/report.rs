//! Output assembly and CSV writing.
//!
//! One row per recipe, in input order. Unclassified and token-free recipes
//! keep their row with the class and score cells empty; a recipe with more
//! than one label joins the per-label cells with `;`.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::ReportError;
use crate::impact::RecipeImpact;
use crate::types::{Classification, ClassificationStatus, FoodClass, Recipe};

/// Header of the report artifact, in column order.
pub const OUTPUT_COLUMNS: [&str; 7] = [
    "recipe_id",
    "recipe_name",
    "class_id",
    "class_name",
    "score",
    "status",
    "impact_kg_co2e",
];

const MULTI_VALUE_SEPARATOR: &str = ";";

/// One label with its class name resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledClass {
    pub class_id: u64,
    pub class_name: String,
    pub score: f64,
}

/// One output row, ready for serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub recipe_id: u64,
    pub recipe_name: String,
    /// Best first; empty when the recipe is unclassified.
    pub labels: Vec<LabeledClass>,
    pub status: ClassificationStatus,
    pub impact_kg_co2e: Option<f64>,
}

/// Joins classifications with class names and impact totals.
///
/// `classifications` must be parallel to `recipes`, as produced by
/// [`crate::classifier::classify_all`]; `impacts` is keyed by recipe id and
/// may be absent entirely when the impact pass was skipped.
pub fn build_report(
    recipes: &[Recipe],
    classifications: &[Classification],
    classes: &[FoodClass],
    impacts: Option<&[RecipeImpact]>,
) -> Vec<ReportRow> {
    let class_names: HashMap<u64, &str> =
        classes.iter().map(|c| (c.id, c.name.as_str())).collect();
    let impact_by_recipe: HashMap<u64, &RecipeImpact> = impacts
        .unwrap_or_default()
        .iter()
        .map(|i| (i.recipe_id, i))
        .collect();

    recipes
        .iter()
        .zip(classifications)
        .map(|(recipe, classification)| {
            let labels = classification
                .labels
                .iter()
                .map(|label| LabeledClass {
                    class_id: label.class_id,
                    class_name: class_names
                        .get(&label.class_id)
                        .copied()
                        .unwrap_or("")
                        .to_string(),
                    score: label.score,
                })
                .collect();
            let impact_kg_co2e = impact_by_recipe
                .get(&recipe.id)
                .and_then(|i| i.total_kg_co2e);
            ReportRow {
                recipe_id: recipe.id,
                recipe_name: recipe.name.clone(),
                labels,
                status: classification.status,
                impact_kg_co2e,
            }
        })
        .collect()
}

/// Writes the report as CSV. Quotes only where the content demands it, so
/// identical rows always serialize to identical bytes.
pub fn write_csv<W: Write>(rows: &[ReportRow], writer: W) -> Result<(), ReportError> {
    let mut out = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(writer);
    out.write_record(OUTPUT_COLUMNS)?;
    for row in rows {
        let ids = join_cells(row.labels.iter().map(|l| l.class_id.to_string()));
        let names = join_cells(row.labels.iter().map(|l| l.class_name.clone()));
        let scores = join_cells(row.labels.iter().map(|l| format_decimal(l.score)));
        let impact = row.impact_kg_co2e.map(format_decimal).unwrap_or_default();
        out.write_record([
            row.recipe_id.to_string(),
            row.recipe_name.clone(),
            ids,
            names,
            scores,
            row.status.as_str().to_string(),
            impact,
        ])?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_csv_path(rows: &[ReportRow], path: impl AsRef<Path>) -> Result<(), ReportError> {
    let file = File::create(path)?;
    write_csv(rows, io::BufWriter::new(file))
}

/// Renders the report to a string; what [`write_csv`] would emit.
pub fn to_csv_string(rows: &[ReportRow]) -> Result<String, ReportError> {
    let mut buf = Vec::new();
    write_csv(rows, &mut buf)?;
    // The writer only ever emits UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// At most four decimals, trailing zeros trimmed. Keeps reruns of the same
/// inputs byte-identical without printing float noise.
pub fn format_decimal(value: f64) -> String {
    let fixed = format!("{value:.4}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

fn join_cells<I: Iterator<Item = String>>(parts: I) -> String {
    parts.collect::<Vec<_>>().join(MULTI_VALUE_SEPARATOR)
}
