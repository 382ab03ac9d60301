//! Built-in Dyson Sphere Program sample data
//!
//! A small but connected slice of the game's catalog: early smelting and
//! assembly, the electromagnetic matrix, oil refining with its hydrogen loop,
//! and critical photon generation with graviton lenses.

use anyhow::Result;
use rusqlite::Connection;

use crate::db;
use crate::game_data::GameData;
use crate::models::{Item, ItemId, Machine, Recipe, RecipeItem, RecipeType};

pub fn sample_items() -> Vec<Item> {
    let mined = |id: ItemId, name: &str, from: &str| Item {
        id,
        name: name.to_string(),
        mining_from: Some(from.to_string()),
    };
    let crafted = |id: ItemId, name: &str| Item {
        id,
        name: name.to_string(),
        mining_from: None,
    };

    vec![
        mined(1000, "Water", "Ocean"),
        mined(1001, "Iron Ore", "Iron vein"),
        mined(1002, "Copper Ore", "Copper vein"),
        mined(1003, "Silicon Ore", "Silicon vein"),
        mined(1004, "Titanium Ore", "Titanium vein"),
        mined(1005, "Stone", "Stone vein"),
        mined(1006, "Coal", "Coal vein"),
        mined(1007, "Crude Oil", "Oil seep"),
        crafted(1101, "Iron Ingot"),
        crafted(1102, "Magnet"),
        crafted(1104, "Copper Ingot"),
        crafted(1109, "Energetic Graphite"),
        crafted(1112, "Diamond"),
        crafted(1114, "Refined Oil"),
        crafted(1115, "Plastic"),
        mined(1120, "Hydrogen", "Gas giant"),
        mined(1121, "Deuterium", "Gas giant"),
        crafted(1127, "Strange Matter"),
        crafted(1201, "Gear"),
        crafted(1202, "Magnetic Coil"),
        crafted(1208, "Critical Photon"),
        crafted(1209, "Graviton Lens"),
        crafted(1301, "Circuit Board"),
        crafted(6001, "Electromagnetic Matrix"),
    ]
}

pub fn sample_machines() -> Vec<Machine> {
    let machine = |id, name: &str, recipe_type, speed, work: f64, idle: f64| Machine {
        id,
        name: name.to_string(),
        recipe_type: Some(recipe_type),
        speed,
        work_energy_per_tick: work,
        idle_energy_per_tick: idle,
        power_consumer: true,
        power_generator: false,
    };

    vec![
        Machine {
            power_consumer: false,
            power_generator: true,
            ..machine(2208, "Ray Receiver", RecipeType::PhotonStore, 10000, 0.0, 0.0)
        },
        machine(2302, "Arc Smelter", RecipeType::Smelt, 10000, 6000.0, 200.0),
        machine(2303, "Assembling Machine Mk.I", RecipeType::Assemble, 7500, 4500.0, 200.0),
        machine(2304, "Assembling Machine Mk.II", RecipeType::Assemble, 10000, 8000.0, 250.0),
        machine(2305, "Assembling Machine Mk.III", RecipeType::Assemble, 15000, 13000.0, 300.0),
        machine(2308, "Oil Refinery", RecipeType::Refine, 10000, 16000.0, 200.0),
        machine(2309, "Chemical Plant", RecipeType::Chemical, 10000, 12000.0, 200.0),
        machine(2310, "Miniature Particle Collider", RecipeType::Particle, 10000, 200000.0, 2000.0),
        machine(2315, "Plane Smelter", RecipeType::Smelt, 20000, 24000.0, 400.0),
        machine(2317, "Quantum Chemical Plant", RecipeType::Chemical, 20000, 24000.0, 400.0),
        machine(2318, "Re-composing Assembler", RecipeType::Assemble, 30000, 45000.0, 500.0),
        machine(2319, "Negentropy Smelter", RecipeType::Smelt, 30000, 48000.0, 500.0),
        // Labs run research at a fixed pace
        machine(2901, "Matrix Lab", RecipeType::Research, 0, 8000.0, 200.0),
        machine(2902, "Self-evolution Lab", RecipeType::Research, 30000, 30000.0, 400.0),
    ]
}

fn entries(list: &[(ItemId, &str, f64)]) -> Vec<RecipeItem> {
    list.iter()
        .map(|&(item_id, name, count)| RecipeItem {
            item_id,
            name: name.to_string(),
            count,
        })
        .collect()
}

fn recipe(
    id: u32,
    name: &str,
    recipe_type: RecipeType,
    time_spend: u32,
    inputs: &[(ItemId, &str, f64)],
    outputs: &[(ItemId, &str, f64)],
    productive: bool,
) -> Recipe {
    Recipe {
        id,
        name: name.to_string(),
        recipe_type,
        time_spend,
        inputs: entries(inputs),
        outputs: entries(outputs),
        productive,
    }
}

pub fn sample_recipes() -> Vec<Recipe> {
    use RecipeType::*;

    vec![
        recipe(1, "Iron Ingot", Smelt, 60, &[(1001, "Iron Ore", 1.0)], &[(1101, "Iron Ingot", 1.0)], true),
        recipe(2, "Magnet", Smelt, 90, &[(1001, "Iron Ore", 1.0)], &[(1102, "Magnet", 1.0)], true),
        recipe(3, "Copper Ingot", Smelt, 60, &[(1002, "Copper Ore", 1.0)], &[(1104, "Copper Ingot", 1.0)], true),
        recipe(5, "Gear", Assemble, 60, &[(1101, "Iron Ingot", 1.0)], &[(1201, "Gear", 1.0)], true),
        recipe(
            6,
            "Magnetic Coil",
            Assemble,
            60,
            &[(1102, "Magnet", 2.0), (1104, "Copper Ingot", 1.0)],
            &[(1202, "Magnetic Coil", 2.0)],
            true,
        ),
        recipe(
            9,
            "Electromagnetic Matrix",
            Research,
            180,
            &[(1202, "Magnetic Coil", 1.0), (1301, "Circuit Board", 1.0)],
            &[(6001, "Electromagnetic Matrix", 1.0)],
            true,
        ),
        recipe(
            16,
            "Plasma Refining",
            Refine,
            240,
            &[(1007, "Crude Oil", 2.0)],
            &[(1114, "Refined Oil", 2.0), (1120, "Hydrogen", 1.0)],
            false,
        ),
        recipe(17, "Energetic Graphite", Smelt, 120, &[(1006, "Coal", 2.0)], &[(1109, "Energetic Graphite", 1.0)], true),
        recipe(
            23,
            "Plastic",
            Chemical,
            180,
            &[(1114, "Refined Oil", 2.0), (1109, "Energetic Graphite", 1.0)],
            &[(1115, "Plastic", 1.0)],
            true,
        ),
        recipe(40, "Deuterium", Particle, 150, &[(1120, "Hydrogen", 10.0)], &[(1121, "Deuterium", 5.0)], false),
        recipe(
            50,
            "Circuit Board",
            Assemble,
            60,
            &[(1101, "Iron Ingot", 2.0), (1104, "Copper Ingot", 1.0)],
            &[(1301, "Circuit Board", 2.0)],
            true,
        ),
        recipe(
            58,
            "X-Ray Cracking",
            Refine,
            240,
            &[(1114, "Refined Oil", 1.0), (1120, "Hydrogen", 2.0)],
            &[(1120, "Hydrogen", 3.0), (1109, "Energetic Graphite", 1.0)],
            false,
        ),
        recipe(60, "Diamond", Smelt, 120, &[(1109, "Energetic Graphite", 1.0)], &[(1112, "Diamond", 1.0)], true),
        recipe(
            67,
            "Graviton Lens",
            Assemble,
            360,
            &[(1112, "Diamond", 4.0), (1127, "Strange Matter", 1.0)],
            &[(1209, "Graviton Lens", 1.0)],
            true,
        ),
        recipe(
            68,
            "Strange Matter",
            Particle,
            480,
            &[(1101, "Iron Ingot", 2.0), (1121, "Deuterium", 10.0)],
            &[(1127, "Strange Matter", 1.0)],
            true,
        ),
        recipe(75, "Critical Photon", PhotonStore, 60, &[], &[(1208, "Critical Photon", 1.0)], false),
    ]
}

pub fn sample_game_data() -> GameData {
    GameData::new(sample_items(), sample_machines(), sample_recipes())
}

/// Replace the database contents with the sample catalog
pub fn load_sample_data(conn: &Connection) -> Result<()> {
    db::clear_game_data(conn)?;

    for item in sample_items() {
        db::upsert_item(conn, &item)?;
    }
    for machine in sample_machines() {
        db::upsert_machine(conn, &machine)?;
    }
    let recipes = sample_recipes();
    for recipe in &recipes {
        db::insert_recipe(conn, recipe)?;
    }

    log::info!("Loaded {} sample recipes", recipes.len());
    Ok(())
}
