//! Golden file tests for the classification pipeline.
//!
//! Each fixture in `fixtures/` is one JSON file holding two CSV catalogs,
//! optional matcher options, and the exact report the pipeline must emit:
//!
//! ```json
//! {
//!   "food_classes_csv": "ID,Name,Impact / kg,Parent ID\n1,Beef,30.0,\n",
//!   "recipes_csv": "Recipe ID,Recipe Name,Ingredient Name,Ingredient Weight / kg\n...",
//!   "top_k": 1,
//!   "min_score": 0.0,
//!   "skip_impact": false,
//!   "expected_csv": "recipe_id,recipe_name,...\n"
//! }
//! ```

use std::fs;
use std::path::PathBuf;

use colander_core::{run_from_readers, to_csv_string, MatchOptions, PipelineOptions};
use glob::glob;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct GoldenCase {
    food_classes_csv: String,
    recipes_csv: String,
    #[serde(default = "default_top_k")]
    top_k: usize,
    #[serde(default)]
    min_score: f64,
    #[serde(default)]
    skip_impact: bool,
    expected_csv: String,
}

fn default_top_k() -> usize {
    1
}

fn run_case(case: &GoldenCase) -> String {
    let opts = PipelineOptions {
        matching: MatchOptions {
            top_k: case.top_k,
            min_score: case.min_score,
        },
        skip_impact: case.skip_impact,
        ..Default::default()
    };
    let outcome = run_from_readers(
        case.food_classes_csv.as_bytes(),
        case.recipes_csv.as_bytes(),
        "food_classes.csv",
        "recipes.csv",
        &opts,
    )
    .unwrap_or_else(|e| panic!("pipeline failed: {e}"));
    to_csv_string(&outcome.rows).expect("report rendering failed")
}

fn load_cases() -> Vec<(String, GoldenCase)> {
    let pattern = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/*.json");
    let pattern_str = pattern.to_string_lossy();

    let mut cases = Vec::new();
    for entry in glob(&pattern_str).expect("Failed to read glob pattern") {
        let path = entry.expect("Failed to read directory entry");
        let name = path.file_stem().unwrap().to_string_lossy().into_owned();
        let content = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
        let case: GoldenCase = serde_json::from_str(&content)
            .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e));
        cases.push((name, case));
    }

    // Sort by name for deterministic ordering
    cases.sort_by(|a, b| a.0.cmp(&b.0));
    cases
}

#[test]
fn golden_reports_match() {
    let cases = load_cases();
    assert!(!cases.is_empty(), "no golden fixtures found");

    let mut failures = Vec::new();
    for (name, case) in &cases {
        let actual = run_case(case);
        if actual != case.expected_csv {
            failures.push((name.clone(), case.expected_csv.clone(), actual));
        }
    }

    if !failures.is_empty() {
        let mut msg = format!("\n{} failures across {} fixtures:\n", failures.len(), cases.len());
        for (name, expected, actual) in &failures {
            msg.push_str(&format!("\n=== {} ===\n", name));
            msg.push_str(&format!("Expected:\n{expected}\n"));
            msg.push_str(&format!("Actual:\n{actual}\n"));
        }
        panic!("{}", msg);
    }

    println!("All {} golden fixtures passed!", cases.len());
}

#[test]
fn golden_fixtures_are_idempotent() {
    for (name, case) in &load_cases() {
        let first = run_case(case);
        let second = run_case(case);
        assert_eq!(first, second, "fixture {name} is not deterministic");
    }
}
