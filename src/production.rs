//! Per-machine production rates

use crate::constants::{photon, SPEED_SCALE, TICKS_PER_SECOND};
use crate::models::{Machine, Recipe, RecipeType};
use crate::proliferator::effective_bonuses;
use crate::settings::{PhotonSettings, ProliferatorConfig, ProliferatorMode, ProliferatorMultiplier};

/// Machine speed as a multiplier; a speed of 0 means no scaling
pub fn machine_speed_multiplier(machine: &Machine) -> f64 {
    if machine.speed == 0 {
        1.0
    } else {
        f64::from(machine.speed) / SPEED_SCALE
    }
}

/// Index into the photon tables: (lens loaded, continuous reception)
pub(crate) fn photon_tier(settings: &PhotonSettings) -> (usize, usize) {
    (
        usize::from(settings.graviton_lens),
        usize::from(settings.continuous_reception >= photon::CONTINUOUS_RECEPTION_FULL),
    )
}

/// Speed factor from spraying the graviton lens; 1 without a lens
pub(crate) fn lens_speed_factor(
    settings: &PhotonSettings,
    proliferator: &ProliferatorConfig,
    multiplier: &ProliferatorMultiplier,
) -> f64 {
    if settings.graviton_lens {
        1.0 + effective_bonuses(proliferator, multiplier).speed_bonus
    } else {
        1.0
    }
}

/// Items per second of the main output one machine makes.
pub fn production_rate(
    recipe: &Recipe,
    machine: &Machine,
    proliferator: &ProliferatorConfig,
    multiplier: &ProliferatorMultiplier,
    photon_settings: Option<&PhotonSettings>,
) -> f64 {
    if recipe.recipe_type == RecipeType::PhotonStore {
        let settings = photon_settings.copied().unwrap_or_default();
        let (lens, continuous) = photon_tier(&settings);
        return photon::BASE_RATE[lens][continuous] * lens_speed_factor(&settings, proliferator, multiplier);
    }

    let bonuses = effective_bonuses(proliferator, multiplier);
    let base_time = f64::from(recipe.time_spend) / TICKS_PER_SECOND;
    let speed_bonus_factor = match proliferator.mode {
        ProliferatorMode::Speed => 1.0 + bonuses.speed_bonus,
        ProliferatorMode::Production => 1.0,
    };
    let time_per_craft = base_time / machine_speed_multiplier(machine) / speed_bonus_factor;

    let yield_factor = match proliferator.mode {
        ProliferatorMode::Production => 1.0 + bonuses.production_bonus,
        ProliferatorMode::Speed => 1.0,
    };
    let output_per_craft = recipe.output_count() * yield_factor;

    output_per_craft / time_per_craft
}
