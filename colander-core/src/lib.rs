//! Deterministic recipe classification: load a food-class catalog and a
//! recipe catalog, score every pair by token overlap, pick the best class
//! per recipe, and estimate each recipe's carbon impact from per-ingredient
//! weights and the class hierarchy's impact figures.

pub mod classifier;
pub mod error;
pub mod impact;
pub mod loader;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod types;

pub use classifier::{classify_all, classify_recipe, jaccard, MatchOptions};
pub use error::{LoadError, ReportError};
pub use impact::{compute_recipe_impacts, ImpactGap, ImpactIndex, ImpactStats, RecipeImpact};
pub use loader::{
    load_food_classes, load_food_classes_path, load_recipes, load_recipes_path, ClassLoadStats,
    LoadOptions, MissingFieldPolicy, RecipeLoadStats,
};
pub use normalize::{canonical_key, tokenize, NormalizeOptions, MEASUREMENT_STOPWORDS};
pub use pipeline::{run_from_paths, run_from_readers, PipelineOptions, PipelineOutcome};
pub use report::{
    build_report, format_decimal, to_csv_string, write_csv, write_csv_path, ReportRow,
    OUTPUT_COLUMNS,
};
pub use types::{
    Classification, ClassificationStatus, FoodClass, Ingredient, Label, Recipe,
};
