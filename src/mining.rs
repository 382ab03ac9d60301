//! Raw material leaves and the extraction equipment behind them

use crate::belts::belts_for;
use crate::constants::{items, mining, CIRCULAR_SOURCE, UNKNOWN_SOURCE};
use crate::error::MiningError;
use crate::game_data::GameData;
use crate::models::{
    ConveyorBeltRequirement, ItemId, MiningEquipment, PowerConsumption, Recipe, RecipeTreeNode,
};
use crate::settings::{GlobalSettings, MiningSettings, ProliferatorConfig};

/// Extraction machine: name, items/s per machine, kW per machine
fn extractor(item_id: ItemId, settings: &MiningSettings) -> Result<(&'static str, f64, f64), MiningError> {
    let veins = f64::from(settings.veins_per_miner);
    let research = settings.speed_multiplier;

    let extractor = match item_id {
        items::IRON_ORE
        | items::COPPER_ORE
        | items::SILICON_ORE
        | items::TITANIUM_ORE
        | items::STONE
        | items::COAL
        | items::FIRE_ICE
        | items::KIMBERLITE
        | items::FRACTAL_SILICON
        | items::OPTICAL_GRATING_CRYSTAL
        | items::SPINIFORM_STALAGMITE
        | items::UNIPOLAR_MAGNET => {
            if settings.advanced_miner {
                let speed = settings.advanced_miner_speed / 100.0;
                (
                    "Advanced Mining Machine",
                    mining::ADVANCED_MINER_VEIN_RATE * speed * research * veins,
                    mining::ADVANCED_MINER_POWER_KW * speed,
                )
            } else {
                (
                    "Mining Machine",
                    mining::MINER_VEIN_RATE * research * veins,
                    mining::MINER_POWER_KW,
                )
            }
        }
        items::WATER | items::SULFURIC_ACID => (
            "Water Pump",
            mining::WATER_PUMP_RATE * research,
            mining::WATER_PUMP_POWER_KW,
        ),
        items::CRUDE_OIL => (
            "Oil Extractor",
            settings.oil_seep_rate * research,
            mining::OIL_EXTRACTOR_POWER_KW,
        ),
        items::HYDROGEN => ("Orbital Collector", mining::ORBITAL_HYDROGEN_RATE, 0.0),
        items::DEUTERIUM => ("Orbital Collector", mining::ORBITAL_DEUTERIUM_RATE, 0.0),
        _ => return Err(MiningError::NotMinable { item_id }),
    };

    Ok(extractor)
}

/// Size the extraction equipment needed to gather `rate` items/s
pub fn mining_requirements(
    item_id: ItemId,
    rate: f64,
    settings: &MiningSettings,
    belt_speed: f64,
) -> Result<MiningEquipment, MiningError> {
    let (machine_name, per_machine, power_per_machine) = extractor(item_id, settings)?;
    if !(per_machine > 0.0) {
        return Err(MiningError::NoThroughput { item_id });
    }

    let count = if rate > 0.0 { (rate / per_machine).ceil() as u32 } else { 0 };

    Ok(MiningEquipment {
        machine_name: machine_name.to_string(),
        count,
        power_kw: power_per_machine * f64::from(count),
        output_belts: belts_for(rate, belt_speed),
    })
}

/// Build a leaf for an item taken from outside the tree.
///
/// Circular leaves stand for an item the chain recycles internally; they get no
/// mining equipment and name the recipe that loops.
pub fn create_raw_material_node(
    item_id: ItemId,
    item_name: &str,
    required_rate: f64,
    settings: &GlobalSettings,
    game_data: &GameData,
    node_id: String,
    is_circular: bool,
    mining_settings: &MiningSettings,
    source_recipe: Option<&Recipe>,
) -> RecipeTreeNode {
    let belt_speed = settings.belt.total_speed();

    let mining_from = if is_circular {
        CIRCULAR_SOURCE.to_string()
    } else {
        game_data
            .item(item_id)
            .and_then(|item| item.mining_from.clone())
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string())
    };

    let mining_equipment = if is_circular {
        None
    } else {
        match mining_requirements(item_id, required_rate, mining_settings, belt_speed) {
            Ok(equipment) => Some(equipment),
            Err(e) => {
                log::warn!("Mining equipment for {} ({}) unavailable: {}", item_name, item_id, e);
                None
            }
        }
    };

    let outputs = belts_for(required_rate, belt_speed);

    RecipeTreeNode {
        node_id,
        recipe: None,
        item_id,
        item_name: item_name.to_string(),
        target_item_id: Some(item_id),
        is_raw_material: true,
        is_circular_dependency: is_circular,
        circular_source_recipe: if is_circular { source_recipe.cloned() } else { None },
        target_output_rate: required_rate,
        machine_count: 0,
        proliferator: ProliferatorConfig::default(),
        machine: None,
        power: PowerConsumption::default(),
        inputs: Vec::new(),
        children: Vec::new(),
        conveyor_belts: ConveyorBeltRequirement {
            inputs: 0,
            outputs,
            total: outputs,
            saturation: 0.0,
            bottleneck: None,
        },
        mining_from: Some(mining_from),
        mining_equipment,
    }
}
