//! DSP Production Calculator
//!
//! Resolves the full production tree behind a Dyson Sphere Program recipe:
//! machine counts, power by category, belts, proliferator effects and the raw
//! materials the chain draws.

pub mod belts;
pub mod calculator;
pub mod constants;
pub mod db;
pub mod error;
pub mod extract;
pub mod game_data;
pub mod mining;
pub mod models;
pub mod power;
pub mod production;
pub mod proliferator;
pub mod resolve;
pub mod sample;
pub mod settings;
pub mod tree;
pub mod units;

pub use calculator::calculate_production_chain;
pub use error::CalcError;
pub use game_data::GameData;
pub use models::{CalculationResult, RecipeTreeNode};
pub use settings::{Config, GlobalSettings, MiningSettings, NodeOverrides};
pub use tree::TreeBuilder;
