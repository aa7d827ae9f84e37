//! Per-recipe impact totals, printed one per line.

use anyhow::Result;
use clap::Args;
use colander_core::{
    compute_recipe_impacts, format_decimal, load_food_classes_path, load_recipes_path, ImpactIndex,
};
use tracing::{info, warn};

use crate::args::InputArgs;

#[derive(Args, Debug)]
pub struct ImpactArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Abort on malformed rows instead of skipping them
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: ImpactArgs) -> Result<()> {
    let load = args.input.load_options(args.strict)?;
    let (classes, _) = load_food_classes_path(&args.input.food_classes, &load)?;
    let (recipes, _) = load_recipes_path(&args.input.recipes, &load)?;

    let (index, stats) = ImpactIndex::build(&classes);
    if stats.unresolved_impacts > 0 {
        info!(
            "{} of {} food classes have no impact figure in their parent chain",
            stats.unresolved_impacts,
            classes.len()
        );
    }

    let impacts = compute_recipe_impacts(&recipes, &index);
    let mut gaps = 0;
    for (recipe, impact) in recipes.iter().zip(&impacts) {
        match impact.total_kg_co2e {
            Some(total) => {
                println!(
                    "Recipe {} Total Impact: {} kg CO2e",
                    recipe.id,
                    format_decimal(total)
                );
            }
            None => gaps += 1,
        }
    }
    if gaps > 0 {
        warn!("{gaps} of {} recipes have no impact total", recipes.len());
    }
    Ok(())
}
