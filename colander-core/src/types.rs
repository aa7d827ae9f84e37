//! Record types shared across the pipeline. Built once per run by the
//! loaders and immutable afterwards.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::normalize::{join_key, tokenize, NormalizeOptions};

/// One row of the food-class catalog after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodClass {
    pub id: u64,
    pub name: String,
    /// kg CO2e per kg of this class, when the catalog provides one.
    pub impact_per_kg: Option<f64>,
    pub parent_id: Option<u64>,
    /// Normalized tokens of `name`; what the matcher scores against. A class
    /// whose keywords are empty can never match anything.
    pub keywords: BTreeSet<String>,
    /// Sorted-token join key; what the impact join matches against.
    pub name_key: String,
}

impl FoodClass {
    /// Builds a class record, deriving `keywords` and `name_key` from `name`.
    pub fn new(
        id: u64,
        name: impl Into<String>,
        impact_per_kg: Option<f64>,
        parent_id: Option<u64>,
        normalize: &NormalizeOptions,
    ) -> Self {
        let name = name.into();
        let keywords = tokenize(&name, normalize);
        let name_key = join_key(&keywords);
        Self {
            id,
            name,
            impact_per_kg,
            parent_id,
            keywords,
            name_key,
        }
    }
}

/// One ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub weight_kg: Option<f64>,
    pub tokens: BTreeSet<String>,
    pub name_key: String,
}

impl Ingredient {
    pub fn new(
        name: impl Into<String>,
        weight_kg: Option<f64>,
        normalize: &NormalizeOptions,
    ) -> Self {
        let name = name.into();
        let tokens = tokenize(&name, normalize);
        let name_key = join_key(&tokens);
        Self {
            name,
            weight_kg,
            tokens,
            name_key,
        }
    }
}

/// A recipe with its grouped ingredient lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: u64,
    pub name: String,
    pub ingredients: Vec<Ingredient>,
    /// Union of the ingredient token sets; what the matcher scores.
    pub tokens: BTreeSet<String>,
}

impl Recipe {
    pub fn new(id: u64, name: impl Into<String>, ingredients: Vec<Ingredient>) -> Self {
        let mut tokens = BTreeSet::new();
        for ingredient in &ingredients {
            tokens.extend(ingredient.tokens.iter().cloned());
        }
        Self {
            id,
            name: name.into(),
            ingredients,
            tokens,
        }
    }

    /// Appends an ingredient, keeping the token union current.
    pub fn push_ingredient(&mut self, ingredient: Ingredient) {
        self.tokens.extend(ingredient.tokens.iter().cloned());
        self.ingredients.push(ingredient);
    }
}

/// Terminal state of one recipe's classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationStatus {
    /// At least one label survived scoring and selection.
    Classified,
    /// The recipe had tokens but no class scored above zero and the
    /// thresholds. A valid outcome, not an error.
    Unclassified,
    /// The recipe's token set was empty, so scoring never ran.
    NoTokens,
}

impl ClassificationStatus {
    /// Stable string used in the report's `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationStatus::Classified => "classified",
            ClassificationStatus::Unclassified => "unclassified",
            ClassificationStatus::NoTokens => "no_tokens",
        }
    }
}

/// One scored class assignment for a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub class_id: u64,
    /// Jaccard overlap in [0, 1]; always greater than zero for a label.
    pub score: f64,
    /// 1-based position in the ranking that produced this label.
    pub rank: usize,
}

/// Everything the matcher decided about one recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub recipe_id: u64,
    pub status: ClassificationStatus,
    /// Best first; empty unless `status` is `Classified`.
    pub labels: Vec<Label>,
}
