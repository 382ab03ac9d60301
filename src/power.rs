//! Power draw of machines, sorters and ray receivers (kW)

use crate::constants::{photon, TICKS_PER_SECOND};
use crate::models::{Machine, PowerConsumption, Recipe, RecipeType};
use crate::production::{lens_speed_factor, photon_tier};
use crate::proliferator::effective_bonuses;
use crate::settings::{PhotonSettings, ProliferatorConfig, ProliferatorMultiplier};

/// Ray transmission efficiency in percent for a research level
pub fn transmission_efficiency(level: u32) -> f64 {
    match photon::TRANSMISSION_EFFICIENCY.get(level as usize) {
        Some(&efficiency) => efficiency,
        None => {
            let exponent = i32::try_from(level).unwrap_or(i32::MAX).saturating_sub(7);
            100.0 - 31.62 * 0.85_f64.powi(exponent)
        }
    }
}

/// Fraction of sent energy a receiver actually gets
pub fn reception_efficiency(level: u32, continuous_reception: f64) -> f64 {
    let loss = 1.0 - transmission_efficiency(level) / 100.0;
    let reception = continuous_reception.clamp(0.0, 100.0);
    1.0 - loss * (1.0 - 0.4 * reception / 100.0)
}

/// Sphere power (kW) a set of photon-generating receivers pulls
pub fn dyson_sphere_power(
    machine_count: u32,
    proliferator: &ProliferatorConfig,
    multiplier: &ProliferatorMultiplier,
    settings: &PhotonSettings,
) -> f64 {
    let (lens, continuous) = photon_tier(settings);
    let theoretical_mw =
        photon::THEORETICAL_POWER_MW[lens][continuous] * lens_speed_factor(settings, proliferator, multiplier);
    let efficiency = reception_efficiency(settings.ray_transmission_level, settings.continuous_reception);
    let required_mw = theoretical_mw / efficiency;

    required_mw * 1000.0 * f64::from(machine_count)
}

/// Machine power for a node. Sorters are filled in by the caller.
pub fn machine_power(
    machine: &Machine,
    machine_count: u32,
    proliferator: &ProliferatorConfig,
    multiplier: &ProliferatorMultiplier,
    recipe_type: Option<RecipeType>,
    photon_settings: Option<&PhotonSettings>,
) -> PowerConsumption {
    if recipe_type == Some(RecipeType::PhotonStore) {
        let settings = photon_settings.copied().unwrap_or_default();
        let sphere = dyson_sphere_power(machine_count, proliferator, multiplier, &settings);
        return PowerConsumption::new(0.0, 0.0, sphere);
    }

    let base_power = machine.work_energy_per_tick * TICKS_PER_SECOND / 1000.0;
    let power_multiplier = 1.0 + effective_bonuses(proliferator, multiplier).power_increase;

    PowerConsumption::new(base_power * power_multiplier * f64::from(machine_count), 0.0, 0.0)
}

/// One sorter per input and output item type on every machine
pub fn sorter_power(recipe: &Recipe, machine_count: u32, sorter_power_per_unit: f64) -> f64 {
    let sorters_per_machine = (recipe.inputs.len() + recipe.outputs.len()) as f64;
    sorter_power_per_unit * sorters_per_machine * f64::from(machine_count)
}
