//! Structural checks over both catalogs. Loads with the skip policy so every
//! problem is seen in one pass, prints a summary, and exits non-zero when
//! anything was wrong.

use anyhow::{bail, Result};
use clap::Args;
use colander_core::{load_food_classes_path, load_recipes_path, ImpactIndex};

use crate::args::InputArgs;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    // Never strict: one pass must surface every problem.
    let load = args.input.load_options(false)?;

    let (classes, class_stats) = load_food_classes_path(&args.input.food_classes, &load)?;
    let (recipes, recipe_stats) = load_recipes_path(&args.input.recipes, &load)?;
    let (_, impact_stats) = ImpactIndex::build(&classes);

    println!(
        "food classes: {} loaded from {} rows, {} skipped, {} duplicate ids, {} with no usable name tokens",
        classes.len(),
        class_stats.rows_read,
        class_stats.rows_skipped,
        class_stats.duplicate_ids,
        class_stats.empty_keyword_classes,
    );
    println!(
        "recipes: {} loaded from {} rows, {} skipped, {} conflicting names, {} with no usable tokens",
        recipes.len(),
        recipe_stats.rows_read,
        recipe_stats.rows_skipped,
        recipe_stats.conflicting_names,
        recipe_stats.empty_token_recipes,
    );
    println!(
        "impact: {} direct, {} inherited, {} unresolved, {} parent cycles, {} unknown parents, {} shared name keys",
        impact_stats.direct_impacts,
        impact_stats.inherited_impacts,
        impact_stats.unresolved_impacts,
        impact_stats.parent_cycles,
        impact_stats.unknown_parents,
        impact_stats.key_collisions,
    );

    let problems = class_stats.rows_skipped
        + class_stats.duplicate_ids
        + class_stats.empty_keyword_classes
        + recipe_stats.rows_skipped
        + recipe_stats.conflicting_names
        + recipe_stats.empty_token_recipes
        + impact_stats.unresolved_impacts
        + impact_stats.parent_cycles
        + impact_stats.unknown_parents
        + impact_stats.key_collisions;
    if problems > 0 {
        bail!("validation found {problems} problems");
    }
    println!("ok");
    Ok(())
}
