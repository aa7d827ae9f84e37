//! Carbon-impact resolution and per-recipe totals.
//!
//! A class without its own `impact_per_kg` inherits the nearest ancestor's.
//! Ingredients join to classes by canonical name key, exactly; the fuzzy
//! scoring in [`crate::classifier`] is deliberately not used here, since a
//! partial overlap is not evidence that two foods share an impact figure.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::warn;

use crate::types::{FoodClass, Recipe};

/// Why a recipe's total impact could not be computed. Only the first gap
/// encountered is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImpactGap {
    /// No food class shares this ingredient's canonical name key.
    UnmatchedIngredient(String),
    /// The ingredient matched a class but carries no weight.
    MissingWeight(String),
    /// The matched class has no impact figure anywhere in its parent chain.
    UnresolvedImpact { class_id: u64 },
}

impl fmt::Display for ImpactGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImpactGap::UnmatchedIngredient(name) => {
                write!(f, "no food class matches ingredient \"{name}\"")
            }
            ImpactGap::MissingWeight(name) => {
                write!(f, "ingredient \"{name}\" has no weight")
            }
            ImpactGap::UnresolvedImpact { class_id } => {
                write!(f, "food class {class_id} has no impact figure in its parent chain")
            }
        }
    }
}

/// A recipe's total, or the reason there is none.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeImpact {
    pub recipe_id: u64,
    pub total_kg_co2e: Option<f64>,
    pub gap: Option<ImpactGap>,
}

/// Counters from building an [`ImpactIndex`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImpactStats {
    /// Classes carrying their own impact figure.
    pub direct_impacts: usize,
    /// Classes that picked an ancestor's figure up.
    pub inherited_impacts: usize,
    /// Classes with no figure anywhere in their chain.
    pub unresolved_impacts: usize,
    pub parent_cycles: usize,
    pub unknown_parents: usize,
    /// Distinct classes sharing a canonical name key with an earlier one.
    pub key_collisions: usize,
}

/// Precomputed joins for the impact pass: canonical key -> class, and
/// class -> effective impact.
#[derive(Debug)]
pub struct ImpactIndex {
    class_by_key: HashMap<String, u64>,
    impact_by_id: HashMap<u64, f64>,
}

impl ImpactIndex {
    /// Resolves every class's effective impact and builds the name join.
    /// Unknown parents, cycles, and impact-free chains are warnings, never
    /// failures; the affected classes simply resolve to nothing.
    pub fn build(classes: &[FoodClass]) -> (Self, ImpactStats) {
        let mut stats = ImpactStats::default();
        let by_id: HashMap<u64, &FoodClass> = classes.iter().map(|c| (c.id, c)).collect();
        let mut impact_by_id: HashMap<u64, f64> = HashMap::new();
        let mut unresolved: HashSet<u64> = HashSet::new();

        for class in classes {
            // Walk the parent chain until a figure, a memoized id, a dead
            // end, or a loop. `chain` holds the impact-less ids walked so
            // far, so whole chains memoize in one pass.
            let mut chain: Vec<u64> = Vec::new();
            let mut walked: HashSet<u64> = HashSet::new();
            let mut cursor = Some(class.id);
            let mut found: Option<f64> = None;
            while let Some(id) = cursor {
                if let Some(&impact) = impact_by_id.get(&id) {
                    found = Some(impact);
                    break;
                }
                if unresolved.contains(&id) {
                    break;
                }
                if !walked.insert(id) {
                    stats.parent_cycles += 1;
                    warn!(
                        "food class {}: parent chain loops back to {id}; treating its impact as unknown",
                        class.id
                    );
                    break;
                }
                let Some(node) = by_id.get(&id) else {
                    stats.unknown_parents += 1;
                    warn!(
                        "food class {}: parent {id} is not in the catalog; treating its impact as unknown",
                        chain.last().copied().unwrap_or(class.id)
                    );
                    break;
                };
                if let Some(impact) = node.impact_per_kg {
                    found = Some(impact);
                    break;
                }
                chain.push(id);
                cursor = node.parent_id;
            }

            match found {
                Some(impact) => {
                    for id in &chain {
                        impact_by_id.insert(*id, impact);
                    }
                    impact_by_id.insert(class.id, impact);
                    if class.impact_per_kg.is_some() {
                        stats.direct_impacts += 1;
                    } else {
                        stats.inherited_impacts += 1;
                    }
                }
                None => {
                    for id in &chain {
                        unresolved.insert(*id);
                    }
                    unresolved.insert(class.id);
                    stats.unresolved_impacts += 1;
                }
            }
        }

        let mut class_by_key: HashMap<String, u64> = HashMap::new();
        for class in classes {
            if class.name_key.is_empty() {
                continue;
            }
            match class_by_key.entry(class.name_key.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(class.id);
                }
                Entry::Occupied(first) => {
                    stats.key_collisions += 1;
                    warn!(
                        "food classes {} and {} share the name key \"{}\"; keeping the first",
                        first.get(),
                        class.id,
                        class.name_key
                    );
                }
            }
        }

        (
            Self {
                class_by_key,
                impact_by_id,
            },
            stats,
        )
    }

    pub fn class_for_key(&self, key: &str) -> Option<u64> {
        self.class_by_key.get(key).copied()
    }

    pub fn impact_for_class(&self, class_id: u64) -> Option<f64> {
        self.impact_by_id.get(&class_id).copied()
    }
}

/// Sum of weight x effective impact over every ingredient, or the first gap.
pub fn recipe_impact(recipe: &Recipe, index: &ImpactIndex) -> RecipeImpact {
    let mut total = 0.0;
    for ingredient in &recipe.ingredients {
        let Some(class_id) = index.class_for_key(&ingredient.name_key) else {
            return with_gap(recipe.id, ImpactGap::UnmatchedIngredient(ingredient.name.clone()));
        };
        let Some(impact) = index.impact_for_class(class_id) else {
            return with_gap(recipe.id, ImpactGap::UnresolvedImpact { class_id });
        };
        let Some(weight) = ingredient.weight_kg else {
            return with_gap(recipe.id, ImpactGap::MissingWeight(ingredient.name.clone()));
        };
        total += weight * impact;
    }
    RecipeImpact {
        recipe_id: recipe.id,
        total_kg_co2e: Some(total),
        gap: None,
    }
}

/// One [`RecipeImpact`] per recipe, input order preserved. Gaps are logged
/// here so callers get the totals without re-walking the reasons.
pub fn compute_recipe_impacts(recipes: &[Recipe], index: &ImpactIndex) -> Vec<RecipeImpact> {
    recipes
        .iter()
        .map(|recipe| {
            let result = recipe_impact(recipe, index);
            if let Some(gap) = &result.gap {
                warn!("recipe {} \"{}\": no impact total: {gap}", recipe.id, recipe.name);
            }
            result
        })
        .collect()
}

fn with_gap(recipe_id: u64, gap: ImpactGap) -> RecipeImpact {
    RecipeImpact {
        recipe_id,
        total_kg_co2e: None,
        gap: Some(gap),
    }
}
