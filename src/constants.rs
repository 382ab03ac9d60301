//! Fixed game constants: machine tiers, proliferator effects, raw materials

use crate::models::{ItemId, MachineId, RecipeType};
use crate::settings::ProliferatorType;

/// Game ticks per second
pub const TICKS_PER_SECOND: f64 = 60.0;

/// Machine speed value meaning 100%
pub const SPEED_SCALE: f64 = 10000.0;

/// Alternative-recipe preference meaning "mine it, don't craft it"
pub const MINING_SENTINEL: i64 = -1;

pub const CIRCULAR_SOURCE: &str = "externalSupplyCircular";
pub const UNKNOWN_SOURCE: &str = "Unknown Source";

pub const DEFAULT_MAX_DEPTH: usize = 20;

pub mod items {
    use crate::models::ItemId;

    pub const WATER: ItemId = 1000;
    pub const IRON_ORE: ItemId = 1001;
    pub const COPPER_ORE: ItemId = 1002;
    pub const SILICON_ORE: ItemId = 1003;
    pub const TITANIUM_ORE: ItemId = 1004;
    pub const STONE: ItemId = 1005;
    pub const COAL: ItemId = 1006;
    pub const CRUDE_OIL: ItemId = 1007;
    pub const FIRE_ICE: ItemId = 1011;
    pub const KIMBERLITE: ItemId = 1012;
    pub const FRACTAL_SILICON: ItemId = 1013;
    pub const OPTICAL_GRATING_CRYSTAL: ItemId = 1014;
    pub const SPINIFORM_STALAGMITE: ItemId = 1015;
    pub const UNIPOLAR_MAGNET: ItemId = 1016;
    pub const LOG: ItemId = 1030;
    pub const PLANT_FUEL: ItemId = 1031;
    pub const SULFURIC_ACID: ItemId = 1116;
    pub const ORGANIC_CRYSTAL: ItemId = 1117;
    pub const HYDROGEN: ItemId = 1120;
    pub const DEUTERIUM: ItemId = 1121;
    pub const GRAVITON_LENS: ItemId = 1209;
}

const RAW_MATERIALS: [ItemId; 20] = [
    items::WATER,
    items::IRON_ORE,
    items::COPPER_ORE,
    items::SILICON_ORE,
    items::TITANIUM_ORE,
    items::STONE,
    items::COAL,
    items::CRUDE_OIL,
    items::FIRE_ICE,
    items::KIMBERLITE,
    items::FRACTAL_SILICON,
    items::OPTICAL_GRATING_CRYSTAL,
    items::SPINIFORM_STALAGMITE,
    items::UNIPOLAR_MAGNET,
    items::LOG,
    items::PLANT_FUEL,
    items::SULFURIC_ACID,
    items::ORGANIC_CRYSTAL,
    items::HYDROGEN,
    items::DEUTERIUM,
];

/// Items that can be gathered directly from a planet or gas giant
pub fn is_raw_material(item_id: ItemId) -> bool {
    RAW_MATERIALS.contains(&item_id)
}

/// Candidate machines per recipe type, lowest tier first
pub fn machine_ids(recipe_type: RecipeType) -> &'static [MachineId] {
    match recipe_type {
        RecipeType::Smelt => &[2302, 2315, 2319],
        RecipeType::Assemble => &[2303, 2304, 2305, 2318],
        RecipeType::Chemical => &[2309, 2317],
        RecipeType::Research => &[2901, 2902],
        RecipeType::Refine => &[2308],
        RecipeType::Particle => &[2310],
        RecipeType::PhotonStore => &[2208],
    }
}

/// Rank names accepted for a recipe type, parallel to [`machine_ids`]
pub fn rank_names(recipe_type: RecipeType) -> &'static [&'static str] {
    match recipe_type {
        RecipeType::Smelt => &["basic", "mid", "high"],
        RecipeType::Assemble => &["mk1", "mk2", "mk3", "advanced"],
        RecipeType::Chemical | RecipeType::Research => &["standard", "advanced"],
        RecipeType::Refine | RecipeType::Particle | RecipeType::PhotonStore => &["standard"],
    }
}

pub fn rank_index(recipe_type: RecipeType, rank: &str) -> Option<usize> {
    rank_names(recipe_type)
        .iter()
        .position(|name| name.eq_ignore_ascii_case(rank))
}

/// Base effect of a proliferator tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProliferatorEffect {
    pub speed_bonus: f64,
    pub production_bonus: f64,
    pub power_increase: f64,
}

pub fn proliferator_effect(kind: ProliferatorType) -> ProliferatorEffect {
    let (speed_bonus, production_bonus, power_increase) = match kind {
        ProliferatorType::None => (0.0, 0.0, 0.0),
        ProliferatorType::Mk1 => (0.25, 0.125, 0.30),
        ProliferatorType::Mk2 => (0.50, 0.20, 0.70),
        ProliferatorType::Mk3 => (1.00, 0.25, 1.50),
    };
    ProliferatorEffect {
        speed_bonus,
        production_bonus,
        power_increase,
    }
}

pub mod photon {
    /// Critical photons per second per ray receiver: [lens][continuous]
    pub const BASE_RATE: [[f64; 2]; 2] = [[0.05, 0.1], [0.1, 0.2]];

    /// Theoretical receiver power in MW: [lens][continuous]
    pub const THEORETICAL_POWER_MW: [[f64; 2]; 2] = [[7.5, 15.0], [15.0, 30.0]];

    /// Graviton lenses burned per second per receiver
    pub const LENS_CONSUMPTION_PER_SECOND: f64 = 1.0 / 600.0;

    /// Ray transmission efficiency (%) for research levels 0..=6
    pub const TRANSMISSION_EFFICIENCY: [f64; 7] = [30.00, 37.00, 43.30, 48.97, 54.07, 58.67, 62.80];

    pub const CONTINUOUS_RECEPTION_FULL: f64 = 100.0;
}

pub mod mining {
    /// Ore per second per vein for the basic mining machine
    pub const MINER_VEIN_RATE: f64 = 0.5;
    pub const MINER_POWER_KW: f64 = 420.0;

    /// Ore per second per vein for the advanced mining machine at 100% speed
    pub const ADVANCED_MINER_VEIN_RATE: f64 = 1.0;
    pub const ADVANCED_MINER_POWER_KW: f64 = 630.0;

    pub const WATER_PUMP_RATE: f64 = 50.0 / 60.0;
    pub const WATER_PUMP_POWER_KW: f64 = 300.0;

    pub const OIL_EXTRACTOR_POWER_KW: f64 = 840.0;

    pub const ORBITAL_HYDROGEN_RATE: f64 = 0.84;
    pub const ORBITAL_DEUTERIUM_RATE: f64 = 0.03;
}
