//! Effective proliferator bonuses after research multipliers

use crate::settings::{ProliferatorConfig, ProliferatorMode, ProliferatorMultiplier};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EffectiveBonuses {
    pub production_bonus: f64,
    pub speed_bonus: f64,
    pub power_increase: f64,
}

/// Scale a proliferator's base effect by the research multipliers.
///
/// The power penalty follows whichever effect the mode uses.
pub fn effective_bonuses(
    proliferator: &ProliferatorConfig,
    multiplier: &ProliferatorMultiplier,
) -> EffectiveBonuses {
    let power_scale = match proliferator.mode {
        ProliferatorMode::Speed => multiplier.speed,
        ProliferatorMode::Production => multiplier.production,
    };

    EffectiveBonuses {
        production_bonus: proliferator.production_bonus() * multiplier.production,
        speed_bonus: proliferator.speed_bonus() * multiplier.speed,
        power_increase: proliferator.power_increase() * power_scale,
    }
}
