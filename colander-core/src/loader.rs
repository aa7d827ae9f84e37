//! CSV catalog loading.
//!
//! Both datasets arrive as headered CSV. Required columns are resolved
//! case-insensitively on trimmed header names; a missing column or an
//! unreadable stream is fatal, while row-level problems follow
//! [`MissingFieldPolicy`]. The recipe dataset is one row per ingredient,
//! grouped here by recipe id in first-seen order.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::warn;

use crate::error::LoadError;
use crate::normalize::NormalizeOptions;
use crate::types::{FoodClass, Ingredient, Recipe};

const COL_CLASS_ID: &str = "ID";
const COL_CLASS_NAME: &str = "Name";
const COL_CLASS_IMPACT: &str = "Impact / kg";
const COL_CLASS_PARENT: &str = "Parent ID";

const COL_RECIPE_ID: &str = "Recipe ID";
const COL_RECIPE_NAME: &str = "Recipe Name";
const COL_INGREDIENT_NAME: &str = "Ingredient Name";
const COL_INGREDIENT_WEIGHT: &str = "Ingredient Weight / kg";

/// What to do when a data row is missing a required value or carries an
/// unparsable number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingFieldPolicy {
    /// Drop the row, log it, keep going.
    #[default]
    Skip,
    /// Abort the whole load.
    Fail,
}

/// Options shared by both loaders.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub on_missing_field: MissingFieldPolicy,
    pub normalize: NormalizeOptions,
}

/// What the food-class loader tolerated rather than failed on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassLoadStats {
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub duplicate_ids: usize,
    pub empty_keyword_classes: usize,
}

/// Same, for the recipe loader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeLoadStats {
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub conflicting_names: usize,
    pub empty_token_recipes: usize,
}

/// Loads the food-class catalog. Duplicate ids keep their first occurrence;
/// classes whose names normalize to nothing are kept but flagged, since they
/// can never match.
pub fn load_food_classes<R: Read>(
    reader: R,
    source: &str,
    opts: &LoadOptions,
) -> Result<(Vec<FoodClass>, ClassLoadStats), LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers().map_err(|e| csv_error(source, e))?.clone();
    let cols = ClassColumns {
        id: require_column(&headers, COL_CLASS_ID, source)?,
        name: require_column(&headers, COL_CLASS_NAME, source)?,
        impact: resolve_column(&headers, COL_CLASS_IMPACT),
        parent: resolve_column(&headers, COL_CLASS_PARENT),
    };

    let mut classes = Vec::new();
    let mut seen = HashSet::new();
    let mut stats = ClassLoadStats::default();
    for (i, record) in rdr.records().enumerate() {
        let row = i + 1;
        stats.rows_read += 1;
        let Some(record) = read_record(record, source, row, opts, &mut stats.rows_skipped)? else {
            continue;
        };
        let (id, name, impact_per_kg, parent_id) = match parse_class_row(&record, &cols) {
            Ok(parsed) => parsed,
            Err(reason) => {
                skip_or_fail(source, row, reason, opts, &mut stats.rows_skipped)?;
                continue;
            }
        };
        if !seen.insert(id) {
            stats.duplicate_ids += 1;
            warn!("{source}: duplicate food class id {id} at row {row}; keeping the first");
            continue;
        }
        let class = FoodClass::new(id, name, impact_per_kg, parent_id, &opts.normalize);
        if class.keywords.is_empty() {
            stats.empty_keyword_classes += 1;
            warn!(
                "{source}: food class {id} \"{}\" has no usable name tokens and will never match",
                class.name
            );
        }
        classes.push(class);
    }
    Ok((classes, stats))
}

/// Loads the recipe catalog, grouping ingredient rows by recipe id. A row
/// whose id was already seen extends that recipe; a conflicting name for the
/// same id keeps the first and warns.
pub fn load_recipes<R: Read>(
    reader: R,
    source: &str,
    opts: &LoadOptions,
) -> Result<(Vec<Recipe>, RecipeLoadStats), LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers().map_err(|e| csv_error(source, e))?.clone();
    let cols = RecipeColumns {
        id: require_column(&headers, COL_RECIPE_ID, source)?,
        name: require_column(&headers, COL_RECIPE_NAME, source)?,
        ingredient: require_column(&headers, COL_INGREDIENT_NAME, source)?,
        weight: resolve_column(&headers, COL_INGREDIENT_WEIGHT),
    };

    let mut recipes: Vec<Recipe> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();
    let mut stats = RecipeLoadStats::default();
    for (i, record) in rdr.records().enumerate() {
        let row = i + 1;
        stats.rows_read += 1;
        let Some(record) = read_record(record, source, row, opts, &mut stats.rows_skipped)? else {
            continue;
        };
        let (id, name, ingredient_name, weight_kg) = match parse_recipe_row(&record, &cols) {
            Ok(parsed) => parsed,
            Err(reason) => {
                skip_or_fail(source, row, reason, opts, &mut stats.rows_skipped)?;
                continue;
            }
        };
        let ingredient = Ingredient::new(ingredient_name, weight_kg, &opts.normalize);
        match index.get(&id) {
            Some(&at) => {
                let recipe = &mut recipes[at];
                if recipe.name != name {
                    stats.conflicting_names += 1;
                    warn!(
                        "{source}: row {row} calls recipe {id} \"{name}\" but it was first seen as \"{}\"; keeping the first",
                        recipe.name
                    );
                }
                recipe.push_ingredient(ingredient);
            }
            None => {
                index.insert(id, recipes.len());
                recipes.push(Recipe::new(id, name, vec![ingredient]));
            }
        }
    }
    for recipe in &recipes {
        if recipe.tokens.is_empty() {
            stats.empty_token_recipes += 1;
            warn!(
                "{source}: recipe {} \"{}\" has no usable ingredient tokens and cannot be classified",
                recipe.id, recipe.name
            );
        }
    }
    Ok((recipes, stats))
}

pub fn load_food_classes_path(
    path: impl AsRef<Path>,
    opts: &LoadOptions,
) -> Result<(Vec<FoodClass>, ClassLoadStats), LoadError> {
    let path = path.as_ref();
    let label = path.display().to_string();
    let file = File::open(path).map_err(|e| LoadError::Io {
        path: label.clone(),
        source: e,
    })?;
    load_food_classes(file, &label, opts)
}

pub fn load_recipes_path(
    path: impl AsRef<Path>,
    opts: &LoadOptions,
) -> Result<(Vec<Recipe>, RecipeLoadStats), LoadError> {
    let path = path.as_ref();
    let label = path.display().to_string();
    let file = File::open(path).map_err(|e| LoadError::Io {
        path: label.clone(),
        source: e,
    })?;
    load_recipes(file, &label, opts)
}

struct ClassColumns {
    id: usize,
    name: usize,
    impact: Option<usize>,
    parent: Option<usize>,
}

struct RecipeColumns {
    id: usize,
    name: usize,
    ingredient: usize,
    weight: Option<usize>,
}

fn parse_class_row(
    record: &StringRecord,
    cols: &ClassColumns,
) -> Result<(u64, String, Option<f64>, Option<u64>), String> {
    let id = parse_required_u64(record, cols.id, COL_CLASS_ID)?;
    let name = required_text(record, cols.name, COL_CLASS_NAME)?.to_string();
    let impact = parse_optional_f64(record, cols.impact, COL_CLASS_IMPACT)?;
    let parent = parse_optional_u64(record, cols.parent, COL_CLASS_PARENT)?;
    Ok((id, name, impact, parent))
}

fn parse_recipe_row(
    record: &StringRecord,
    cols: &RecipeColumns,
) -> Result<(u64, String, String, Option<f64>), String> {
    let id = parse_required_u64(record, cols.id, COL_RECIPE_ID)?;
    let name = required_text(record, cols.name, COL_RECIPE_NAME)?.to_string();
    // A blank ingredient name is legal: it tokenizes to nothing and the
    // recipe just ends up with fewer usable tokens.
    let ingredient = field(record, cols.ingredient).to_string();
    let weight = parse_optional_f64(record, cols.weight, COL_INGREDIENT_WEIGHT)?;
    Ok((id, name, ingredient, weight))
}

fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("")
}

fn required_text<'r>(
    record: &'r StringRecord,
    idx: usize,
    column: &str,
) -> Result<&'r str, String> {
    let value = field(record, idx);
    if value.is_empty() {
        return Err(format!("missing value for \"{column}\""));
    }
    Ok(value)
}

fn parse_required_u64(record: &StringRecord, idx: usize, column: &str) -> Result<u64, String> {
    let raw = required_text(record, idx, column)?;
    raw.parse()
        .map_err(|_| format!("unparsable {column} \"{raw}\""))
}

fn parse_optional_u64(
    record: &StringRecord,
    idx: Option<usize>,
    column: &str,
) -> Result<Option<u64>, String> {
    let Some(idx) = idx else { return Ok(None) };
    let raw = field(record, idx);
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| format!("unparsable {column} \"{raw}\""))
}

fn parse_optional_f64(
    record: &StringRecord,
    idx: Option<usize>,
    column: &str,
) -> Result<Option<f64>, String> {
    let Some(idx) = idx else { return Ok(None) };
    let raw = field(record, idx);
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| format!("unparsable {column} \"{raw}\""))
}

fn resolve_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.eq_ignore_ascii_case(name))
}

fn require_column(
    headers: &StringRecord,
    name: &'static str,
    source: &str,
) -> Result<usize, LoadError> {
    resolve_column(headers, name).ok_or_else(|| LoadError::MissingColumn {
        path: source.to_string(),
        column: name,
    })
}

/// Ok(None) means the row was ragged and the policy said to skip it.
fn read_record(
    result: Result<StringRecord, csv::Error>,
    source: &str,
    row: usize,
    opts: &LoadOptions,
    skipped: &mut usize,
) -> Result<Option<StringRecord>, LoadError> {
    match result {
        Ok(record) => Ok(Some(record)),
        Err(e) if matches!(e.kind(), csv::ErrorKind::UnequalLengths { .. }) => {
            skip_or_fail(source, row, e.to_string(), opts, skipped)?;
            Ok(None)
        }
        Err(e) => Err(csv_error(source, e)),
    }
}

fn skip_or_fail(
    source: &str,
    row: usize,
    reason: String,
    opts: &LoadOptions,
    skipped: &mut usize,
) -> Result<(), LoadError> {
    match opts.on_missing_field {
        MissingFieldPolicy::Skip => {
            *skipped += 1;
            warn!("{source}: skipping row {row}: {reason}");
            Ok(())
        }
        MissingFieldPolicy::Fail => Err(LoadError::MalformedRow {
            path: source.to_string(),
            row,
            reason,
        }),
    }
}

fn csv_error(path: &str, e: csv::Error) -> LoadError {
    LoadError::Csv {
        path: path.to_string(),
        source: e,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skip_opts() -> LoadOptions {
        LoadOptions::default()
    }

    fn fail_opts() -> LoadOptions {
        LoadOptions {
            on_missing_field: MissingFieldPolicy::Fail,
            ..Default::default()
        }
    }

    #[test]
    fn loads_food_classes_with_all_columns() {
        let csv = "ID,Name,Impact / kg,Parent ID\n\
                   1,Beef,25.0,\n\
                   2,Minced Beef,,1\n";
        let (classes, stats) = load_food_classes(csv.as_bytes(), "test", &skip_opts()).unwrap();
        assert_eq!(classes.len(), 2);
        assert_eq!(classes[0].id, 1);
        assert_eq!(classes[0].impact_per_kg, Some(25.0));
        assert_eq!(classes[0].parent_id, None);
        assert_eq!(classes[1].impact_per_kg, None);
        assert_eq!(classes[1].parent_id, Some(1));
        assert!(classes[1].keywords.contains("minced"));
        assert_eq!(stats.rows_read, 2);
        assert_eq!(stats.rows_skipped, 0);
    }

    #[test]
    fn optional_class_columns_may_be_absent() {
        let csv = "ID,Name\n5,Lentils\n";
        let (classes, _) = load_food_classes(csv.as_bytes(), "test", &skip_opts()).unwrap();
        assert_eq!(classes[0].impact_per_kg, None);
        assert_eq!(classes[0].parent_id, None);
    }

    #[test]
    fn headers_match_case_insensitively() {
        let csv = "id , NAME\n1,Rice\n";
        let (classes, _) = load_food_classes(csv.as_bytes(), "test", &skip_opts()).unwrap();
        assert_eq!(classes[0].name, "Rice");
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let csv = "ID,Impact / kg\n1,2.0\n";
        let err = load_food_classes(csv.as_bytes(), "classes.csv", &skip_opts()).unwrap_err();
        match err {
            LoadError::MissingColumn { path, column } => {
                assert_eq!(path, "classes.csv");
                assert_eq!(column, COL_CLASS_NAME);
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_class_ids_keep_the_first() {
        let csv = "ID,Name\n1,Beef\n1,Chicken\n2,Rice\n";
        let (classes, stats) = load_food_classes(csv.as_bytes(), "test", &skip_opts()).unwrap();
        assert_eq!(classes.len(), 2);
        assert_eq!(classes[0].name, "Beef");
        assert_eq!(stats.duplicate_ids, 1);
    }

    #[test]
    fn malformed_class_row_is_skipped_by_default() {
        let csv = "ID,Name\nnot-a-number,Beef\n2,Rice\n";
        let (classes, stats) = load_food_classes(csv.as_bytes(), "test", &skip_opts()).unwrap();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].id, 2);
        assert_eq!(stats.rows_read, 2);
        assert_eq!(stats.rows_skipped, 1);
    }

    #[test]
    fn malformed_class_row_aborts_under_fail_policy() {
        let csv = "ID,Name\n1,Beef\n,Rice\n";
        let err = load_food_classes(csv.as_bytes(), "classes.csv", &fail_opts()).unwrap_err();
        match err {
            LoadError::MalformedRow { row, reason, .. } => {
                assert_eq!(row, 2);
                assert!(reason.contains(COL_CLASS_ID), "reason: {reason}");
            }
            other => panic!("expected MalformedRow, got {other:?}"),
        }
    }

    #[test]
    fn ragged_row_follows_the_policy() {
        let csv = "ID,Name,Impact / kg,Parent ID\n1,Beef\n2,Rice,,\n";
        let (classes, stats) = load_food_classes(csv.as_bytes(), "test", &skip_opts()).unwrap();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].id, 2);
        assert_eq!(stats.rows_skipped, 1);

        assert!(load_food_classes(csv.as_bytes(), "test", &fail_opts()).is_err());
    }

    #[test]
    fn class_with_no_usable_tokens_is_kept_and_counted() {
        let csv = "ID,Name\n1,---\n";
        let (classes, stats) = load_food_classes(csv.as_bytes(), "test", &skip_opts()).unwrap();
        assert_eq!(classes.len(), 1);
        assert!(classes[0].keywords.is_empty());
        assert_eq!(stats.empty_keyword_classes, 1);
    }

    #[test]
    fn recipes_group_by_id_in_first_seen_order() {
        let csv = "Recipe ID,Recipe Name,Ingredient Name,Ingredient Weight / kg\n\
                   7,Stew,Beef,0.5\n\
                   3,Salad,Lettuce,0.2\n\
                   7,Stew,Carrots,0.3\n";
        let (recipes, stats) = load_recipes(csv.as_bytes(), "test", &skip_opts()).unwrap();
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0].id, 7);
        assert_eq!(recipes[0].ingredients.len(), 2);
        assert_eq!(recipes[1].id, 3);
        assert!(recipes[0].tokens.contains("beef"));
        assert!(recipes[0].tokens.contains("carrots"));
        assert_eq!(stats.rows_read, 3);
        assert_eq!(stats.conflicting_names, 0);
    }

    #[test]
    fn conflicting_recipe_names_keep_the_first() {
        let csv = "Recipe ID,Recipe Name,Ingredient Name\n\
                   7,Stew,Beef\n\
                   7,Beef Stew,Carrots\n";
        let (recipes, stats) = load_recipes(csv.as_bytes(), "test", &skip_opts()).unwrap();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].name, "Stew");
        assert_eq!(recipes[0].ingredients.len(), 2);
        assert_eq!(stats.conflicting_names, 1);
    }

    #[test]
    fn blank_ingredient_name_yields_an_empty_token_recipe() {
        let csv = "Recipe ID,Recipe Name,Ingredient Name\n9,Mystery,\n";
        let (recipes, stats) = load_recipes(csv.as_bytes(), "test", &skip_opts()).unwrap();
        assert_eq!(recipes.len(), 1);
        assert!(recipes[0].tokens.is_empty());
        assert_eq!(stats.empty_token_recipes, 1);
        assert_eq!(stats.rows_skipped, 0);
    }

    #[test]
    fn blank_weight_is_none_and_bad_weight_follows_policy() {
        let csv = "Recipe ID,Recipe Name,Ingredient Name,Ingredient Weight / kg\n\
                   1,Stew,Beef,\n\
                   1,Stew,Carrots,heavy\n";
        let (recipes, stats) = load_recipes(csv.as_bytes(), "test", &skip_opts()).unwrap();
        assert_eq!(recipes[0].ingredients.len(), 1);
        assert_eq!(recipes[0].ingredients[0].weight_kg, None);
        assert_eq!(stats.rows_skipped, 1);

        let err = load_recipes(csv.as_bytes(), "recipes.csv", &fail_opts()).unwrap_err();
        match err {
            LoadError::MalformedRow { row, .. } => assert_eq!(row, 2),
            other => panic!("expected MalformedRow, got {other:?}"),
        }
    }

    #[test]
    fn missing_weight_column_means_no_weights() {
        let csv = "Recipe ID,Recipe Name,Ingredient Name\n1,Stew,Beef\n";
        let (recipes, _) = load_recipes(csv.as_bytes(), "test", &skip_opts()).unwrap();
        assert_eq!(recipes[0].ingredients[0].weight_kg, None);
    }

    #[test]
    fn missing_file_reports_the_path() {
        let err = load_food_classes_path("/no/such/file.csv", &skip_opts()).unwrap_err();
        match err {
            LoadError::Io { path, .. } => assert!(path.contains("no/such/file.csv")),
            other => panic!("expected Io, got {other:?}"),
        }
    }
}
