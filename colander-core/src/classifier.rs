//! Jaccard scoring and label selection.
//!
//! Every recipe is scored against every class; at catalog scale the full
//! scan is cheap and keeps the ranking exact. Ties break toward the lower
//! class id so reruns of the same inputs are byte-identical.

use std::collections::BTreeSet;

use crate::types::{Classification, ClassificationStatus, FoodClass, Label, Recipe};

/// Selection knobs for [`classify_recipe`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    /// Maximum labels kept per recipe. Treated as at least 1.
    pub top_k: usize,
    /// Labels scoring below this are discarded. Clamped to [0, 1].
    pub min_score: f64,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            top_k: 1,
            min_score: 0.0,
        }
    }
}

/// One scored class, before selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub class_id: u64,
    pub score: f64,
}

/// |A ∩ B| / |A ∪ B|. Zero when either set is empty, one only when two
/// non-empty sets are identical.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count() as f64;
    let union = (a.len() + b.len()) as f64 - intersection;
    intersection / union
}

/// Every class scored against `tokens`, best first. Classes with empty
/// keyword sets score zero like everything else and sink to the bottom.
pub fn rank_candidates(tokens: &BTreeSet<String>, classes: &[FoodClass]) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = classes
        .iter()
        .map(|class| Candidate {
            class_id: class.id,
            score: jaccard(tokens, &class.keywords),
        })
        .collect();
    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.class_id.cmp(&b.class_id))
    });
    candidates
}

/// Scores and labels one recipe. A zero score never labels, regardless of
/// `min_score`, so a recipe disjoint from the whole catalog comes back
/// `Unclassified` rather than pinned to an arbitrary class.
pub fn classify_recipe(
    recipe: &Recipe,
    classes: &[FoodClass],
    opts: &MatchOptions,
) -> Classification {
    if recipe.tokens.is_empty() {
        return Classification {
            recipe_id: recipe.id,
            status: ClassificationStatus::NoTokens,
            labels: Vec::new(),
        };
    }
    let top_k = opts.top_k.max(1);
    let min_score = opts.min_score.clamp(0.0, 1.0);
    let labels: Vec<Label> = rank_candidates(&recipe.tokens, classes)
        .into_iter()
        .filter(|c| c.score > 0.0 && c.score >= min_score)
        .take(top_k)
        .enumerate()
        .map(|(i, c)| Label {
            class_id: c.class_id,
            score: c.score,
            rank: i + 1,
        })
        .collect();
    let status = if labels.is_empty() {
        ClassificationStatus::Unclassified
    } else {
        ClassificationStatus::Classified
    };
    Classification {
        recipe_id: recipe.id,
        status,
        labels,
    }
}

/// One classification per recipe, input order preserved.
pub fn classify_all(
    recipes: &[Recipe],
    classes: &[FoodClass],
    opts: &MatchOptions,
) -> Vec<Classification> {
    recipes
        .iter()
        .map(|recipe| classify_recipe(recipe, classes, opts))
        .collect()
}
