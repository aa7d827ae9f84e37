//! End-to-end composition: load, classify, price the impact, build rows.
//! The CLI and the integration tests share this so they can never drift.

use std::io::Read;
use std::path::Path;

use crate::classifier::{classify_all, MatchOptions};
use crate::error::LoadError;
use crate::impact::{compute_recipe_impacts, ImpactIndex, ImpactStats};
use crate::loader::{
    load_food_classes, load_food_classes_path, load_recipes, load_recipes_path, ClassLoadStats,
    LoadOptions, RecipeLoadStats,
};
use crate::report::{build_report, ReportRow};
use crate::types::{FoodClass, Recipe};

/// Everything a single run needs to know.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub load: LoadOptions,
    pub matching: MatchOptions,
    /// Skip the impact pass entirely; the output column stays, empty.
    pub skip_impact: bool,
}

/// The report plus everything the stages counted along the way.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub rows: Vec<ReportRow>,
    pub classes_loaded: usize,
    pub recipes_loaded: usize,
    pub class_stats: ClassLoadStats,
    pub recipe_stats: RecipeLoadStats,
    /// `None` when the impact pass was skipped.
    pub impact_stats: Option<ImpactStats>,
}

/// Runs the whole pipeline over two already-open CSV sources. `*_source`
/// labels show up in errors and logs.
pub fn run_from_readers<C: Read, R: Read>(
    classes_reader: C,
    recipes_reader: R,
    classes_source: &str,
    recipes_source: &str,
    opts: &PipelineOptions,
) -> Result<PipelineOutcome, LoadError> {
    let (classes, class_stats) = load_food_classes(classes_reader, classes_source, &opts.load)?;
    let (recipes, recipe_stats) = load_recipes(recipes_reader, recipes_source, &opts.load)?;
    Ok(finish(classes, recipes, class_stats, recipe_stats, opts))
}

/// Same as [`run_from_readers`], reading both catalogs from disk.
pub fn run_from_paths(
    classes_path: impl AsRef<Path>,
    recipes_path: impl AsRef<Path>,
    opts: &PipelineOptions,
) -> Result<PipelineOutcome, LoadError> {
    let (classes, class_stats) = load_food_classes_path(classes_path, &opts.load)?;
    let (recipes, recipe_stats) = load_recipes_path(recipes_path, &opts.load)?;
    Ok(finish(classes, recipes, class_stats, recipe_stats, opts))
}

fn finish(
    classes: Vec<FoodClass>,
    recipes: Vec<Recipe>,
    class_stats: ClassLoadStats,
    recipe_stats: RecipeLoadStats,
    opts: &PipelineOptions,
) -> PipelineOutcome {
    let classifications = classify_all(&recipes, &classes, &opts.matching);
    let (impacts, impact_stats) = if opts.skip_impact {
        (None, None)
    } else {
        let (index, stats) = ImpactIndex::build(&classes);
        (Some(compute_recipe_impacts(&recipes, &index)), Some(stats))
    };
    let rows = build_report(&recipes, &classifications, &classes, impacts.as_deref());
    PipelineOutcome {
        rows,
        classes_loaded: classes.len(),
        recipes_loaded: recipes.len(),
        class_stats,
        recipe_stats,
        impact_stats,
    }
}
