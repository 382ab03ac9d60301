//! Data models for DSP recipes, machines and computed production trees

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::settings::ProliferatorConfig;

pub type ItemId = u32;
pub type RecipeId = u32;
pub type MachineId = u32;

/// Kind of facility a recipe runs in. Names match the game's `ERecipeType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecipeType {
    Smelt,
    Assemble,
    Chemical,
    Research,
    Refine,
    Particle,
    PhotonStore,
}

impl RecipeType {
    pub const ALL: [RecipeType; 7] = [
        RecipeType::Smelt,
        RecipeType::Assemble,
        RecipeType::Chemical,
        RecipeType::Research,
        RecipeType::Refine,
        RecipeType::Particle,
        RecipeType::PhotonStore,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecipeType::Smelt => "Smelt",
            RecipeType::Assemble => "Assemble",
            RecipeType::Chemical => "Chemical",
            RecipeType::Research => "Research",
            RecipeType::Refine => "Refine",
            RecipeType::Particle => "Particle",
            RecipeType::PhotonStore => "PhotonStore",
        }
    }
}

impl fmt::Display for RecipeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for RecipeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecipeType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown recipe type '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    /// Free text describing where the item is gathered (e.g. "Iron vein")
    pub mining_from: Option<String>,
}

/// One entry of a recipe's input or output list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeItem {
    pub item_id: ItemId,
    pub name: String,
    pub count: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    pub recipe_type: RecipeType,
    /// Craft time in game ticks (60 ticks = 1 second)
    pub time_spend: u32,
    pub inputs: Vec<RecipeItem>,
    /// First entry is the main output
    pub outputs: Vec<RecipeItem>,
    /// Whether extra-products (yield boost) proliferation is allowed
    pub productive: bool,
}

impl Recipe {
    pub fn main_output(&self) -> Option<&RecipeItem> {
        self.outputs.first()
    }

    /// The output the node is asked to supply: the one matching `target_item_id`,
    /// else the main output.
    pub fn output_for(&self, target_item_id: Option<ItemId>) -> Option<&RecipeItem> {
        target_item_id
            .and_then(|id| self.outputs.iter().find(|o| o.item_id == id))
            .or_else(|| self.main_output())
    }

    /// Per-craft count of the main output, 1 when the recipe lists no outputs
    pub fn output_count(&self) -> f64 {
        self.main_output().map_or(1.0, |o| o.count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub id: MachineId,
    pub name: String,
    pub recipe_type: Option<RecipeType>,
    /// Speed multiplier where 10000 = 100%; 0 means no speed scaling
    pub speed: u32,
    pub work_energy_per_tick: f64,
    pub idle_energy_per_tick: f64,
    pub power_consumer: bool,
    pub power_generator: bool,
}

/// Power breakdown in kW
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PowerConsumption {
    pub machines: f64,
    pub sorters: f64,
    pub dyson_sphere: f64,
    pub total: f64,
}

impl PowerConsumption {
    pub fn new(machines: f64, sorters: f64, dyson_sphere: f64) -> Self {
        Self {
            machines,
            sorters,
            dyson_sphere,
            total: machines + sorters + dyson_sphere,
        }
    }

    pub fn with_sorters(self, sorters: f64) -> Self {
        Self::new(self.machines, sorters, self.dyson_sphere)
    }
}

impl std::ops::Add for PowerConsumption {
    type Output = PowerConsumption;

    fn add(self, rhs: PowerConsumption) -> PowerConsumption {
        PowerConsumption::new(
            self.machines + rhs.machines,
            self.sorters + rhs.sorters,
            self.dyson_sphere + rhs.dyson_sphere,
        )
    }
}

/// Which side of a node saturates its belts first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Bottleneck {
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ConveyorBeltRequirement {
    pub inputs: u32,
    pub outputs: u32,
    pub total: u32,
    /// Highest belt fill across the node, in percent
    pub saturation: f64,
    pub bottleneck: Option<Bottleneck>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputRequirement {
    pub item_id: ItemId,
    pub name: String,
    /// Items per second
    pub required_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MiningEquipment {
    pub machine_name: String,
    pub count: u32,
    pub power_kw: f64,
    pub output_belts: u32,
}

/// One node of a resolved production tree
#[derive(Debug, Clone, Serialize)]
pub struct RecipeTreeNode {
    /// Path-encoded and stable across recalculation, e.g. `r-9/r-6/raw-1001`
    pub node_id: String,
    pub recipe: Option<Recipe>,
    /// Item this node supplies to its parent
    pub item_id: ItemId,
    pub item_name: String,
    pub target_item_id: Option<ItemId>,
    pub is_raw_material: bool,
    pub is_circular_dependency: bool,
    /// Recipe that both consumes and produces this item
    pub circular_source_recipe: Option<Recipe>,
    /// Items per second supplied upward
    pub target_output_rate: f64,
    pub machine_count: u32,
    pub proliferator: ProliferatorConfig,
    pub machine: Option<Machine>,
    pub power: PowerConsumption,
    pub inputs: Vec<InputRequirement>,
    pub children: Vec<RecipeTreeNode>,
    pub conveyor_belts: ConveyorBeltRequirement,
    pub mining_from: Option<String>,
    pub mining_equipment: Option<MiningEquipment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiOutputResult {
    pub item_id: ItemId,
    pub name: String,
    /// Items per second
    pub production_rate: f64,
    pub count_per_craft: f64,
}

/// Result of a production chain calculation
#[derive(Debug, Clone, Serialize)]
pub struct CalculationResult {
    pub root: RecipeTreeNode,
    pub total_power: PowerConsumption,
    pub total_machines: u32,
    /// Item id to aggregate draw in items/s, circular breaks excluded
    pub raw_materials: BTreeMap<ItemId, f64>,
    pub multi_output_results: Option<Vec<MultiOutputResult>>,
}
