//! Machine and proliferator selection for a recipe node

use crate::constants::{machine_ids, rank_index};
use crate::error::CalcError;
use crate::game_data::GameData;
use crate::models::{Machine, MachineId, Recipe, RecipeType};
use crate::settings::{
    GlobalSettings, NodeOverrideSettings, ProliferatorConfig, ProliferatorMode, ProliferatorType,
};

fn ranked_machine_id(recipe_type: RecipeType, rank: &str) -> Option<MachineId> {
    rank_index(recipe_type, rank).and_then(|i| machine_ids(recipe_type).get(i).copied())
}

/// Pick the machine that runs `recipe`.
///
/// An override rank wins when its machine exists; otherwise the globally chosen
/// tier, then the lowest tier, then any machine in the catalog.
pub fn resolve_machine<'a>(
    recipe: &Recipe,
    game_data: &'a GameData,
    settings: &GlobalSettings,
    node_override: Option<&NodeOverrideSettings>,
) -> Result<&'a Machine, CalcError> {
    let recipe_type = recipe.recipe_type;

    if let Some(rank) = node_override.and_then(|o| o.machine_rank.as_deref()) {
        match ranked_machine_id(recipe_type, rank).and_then(|id| game_data.machine(id)) {
            Some(machine) => return Ok(machine),
            None => log::warn!(
                "Override rank '{}' has no machine for {} recipe '{}', using default",
                rank,
                recipe_type,
                recipe.name
            ),
        }
    }

    let target = settings
        .machine_ranks
        .rank_for(recipe_type)
        .and_then(|rank| ranked_machine_id(recipe_type, rank))
        .or_else(|| machine_ids(recipe_type).first().copied());

    if let Some(machine) = target.and_then(|id| game_data.machine(id)) {
        return Ok(machine);
    }

    let fallback = game_data
        .first_machine()
        .ok_or(CalcError::NoMachine(recipe_type))?;
    log::debug!(
        "No {} machine for recipe '{}', falling back to {}",
        recipe_type,
        recipe.name,
        fallback.name
    );
    Ok(fallback)
}

/// Pick the proliferator config for a node.
///
/// A global yield boost drops to speed boost on recipes that can't take it.
/// Node overrides are left as chosen, and speed boost is never switched to yield boost.
pub fn resolve_proliferator(
    recipe: &Recipe,
    settings: &GlobalSettings,
    node_override: Option<&NodeOverrideSettings>,
) -> ProliferatorConfig {
    let mut config = node_override
        .and_then(|o| o.proliferator)
        .unwrap_or(settings.proliferator);

    let global = settings.proliferator;
    if global.kind != ProliferatorType::None
        && global.mode == ProliferatorMode::Production
        && !recipe.productive
    {
        log::debug!("Recipe '{}' can't take extra products, using speed boost", recipe.name);
        config.mode = ProliferatorMode::Speed;
    }

    config
}
