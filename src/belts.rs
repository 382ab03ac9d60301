//! Conveyor belt requirements and saturation

use crate::models::{Bottleneck, ConveyorBeltRequirement, InputRequirement};

/// Saturation above which the bottleneck side is reported
pub const BOTTLENECK_THRESHOLD: f64 = 80.0;

/// Belts needed to carry `rate` items/s, 0 when belts have no throughput
pub fn belts_for(rate: f64, belt_speed: f64) -> u32 {
    if belt_speed <= 0.0 || rate <= 0.0 {
        return 0;
    }
    (rate / belt_speed).ceil() as u32
}

/// Fill of the belts carrying `rate`, in percent
fn saturation(rate: f64, belt_speed: f64) -> f64 {
    let belts = belts_for(rate, belt_speed);
    if belts == 0 {
        return 0.0;
    }
    rate / (f64::from(belts) * belt_speed) * 100.0
}

pub fn conveyor_belts(
    target_rate: f64,
    inputs: &[InputRequirement],
    belt_speed: f64,
) -> ConveyorBeltRequirement {
    if belt_speed <= 0.0 {
        return ConveyorBeltRequirement::default();
    }

    let outputs = belts_for(target_rate, belt_speed);
    let input_belts: u32 = inputs
        .iter()
        .map(|input| belts_for(input.required_rate, belt_speed))
        .sum();

    let output_saturation = saturation(target_rate, belt_speed);
    let input_saturation = inputs
        .iter()
        .map(|input| saturation(input.required_rate, belt_speed))
        .fold(0.0, f64::max);

    let max_saturation = output_saturation.max(input_saturation);
    let bottleneck = (max_saturation > BOTTLENECK_THRESHOLD).then(|| {
        if output_saturation > input_saturation {
            Bottleneck::Output
        } else {
            Bottleneck::Input
        }
    });

    ConveyorBeltRequirement {
        inputs: input_belts,
        outputs,
        total: input_belts + outputs,
        saturation: max_saturation,
        bottleneck,
    }
}
