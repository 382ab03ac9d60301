//! User settings, per-node overrides and the on-disk config file

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{self, MINING_SENTINEL};
use crate::models::{ItemId, RecipeId, RecipeType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProliferatorType {
    #[default]
    None,
    Mk1,
    Mk2,
    Mk3,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProliferatorMode {
    #[default]
    Speed,
    Production,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProliferatorConfig {
    #[serde(rename = "type", default)]
    pub kind: ProliferatorType,
    #[serde(default)]
    pub mode: ProliferatorMode,
}

impl ProliferatorConfig {
    pub fn new(kind: ProliferatorType, mode: ProliferatorMode) -> Self {
        Self { kind, mode }
    }

    pub fn speed_bonus(&self) -> f64 {
        constants::proliferator_effect(self.kind).speed_bonus
    }

    pub fn production_bonus(&self) -> f64 {
        constants::proliferator_effect(self.kind).production_bonus
    }

    pub fn power_increase(&self) -> f64 {
        constants::proliferator_effect(self.kind).power_increase
    }
}

/// Research scaling applied on top of the proliferator's base effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProliferatorMultiplier {
    #[serde(default = "one")]
    pub production: f64,
    #[serde(default = "one")]
    pub speed: f64,
}

impl Default for ProliferatorMultiplier {
    fn default() -> Self {
        Self {
            production: 1.0,
            speed: 1.0,
        }
    }
}

fn one() -> f64 {
    1.0
}

/// Chosen machine tier per recipe type, by rank name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineRanks {
    pub smelter: String,
    pub assembler: String,
    pub chemical: String,
    pub research: String,
}

impl Default for MachineRanks {
    fn default() -> Self {
        Self {
            smelter: "basic".to_string(),
            assembler: "mk1".to_string(),
            chemical: "standard".to_string(),
            research: "standard".to_string(),
        }
    }
}

impl MachineRanks {
    /// Rank chosen for a recipe type; single-tier types have no choice
    pub fn rank_for(&self, recipe_type: RecipeType) -> Option<&str> {
        match recipe_type {
            RecipeType::Smelt => Some(&self.smelter),
            RecipeType::Assemble => Some(&self.assembler),
            RecipeType::Chemical => Some(&self.chemical),
            RecipeType::Research => Some(&self.research),
            RecipeType::Refine | RecipeType::Particle | RecipeType::PhotonStore => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeltConfig {
    /// Items per second for a single-layer belt
    pub base_speed: f64,
    pub stack_count: u32,
}

impl Default for BeltConfig {
    fn default() -> Self {
        Self {
            base_speed: 6.0,
            stack_count: 1,
        }
    }
}

impl BeltConfig {
    pub fn total_speed(&self) -> f64 {
        self.base_speed * f64::from(self.stack_count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotonSettings {
    pub graviton_lens: bool,
    /// Continuous reception in percent, 0..=100
    pub continuous_reception: f64,
    pub ray_transmission_level: u32,
}

impl Default for PhotonSettings {
    fn default() -> Self {
        Self {
            graviton_lens: false,
            continuous_reception: 100.0,
            ray_transmission_level: 0,
        }
    }
}

/// What the user asked for when an item has several ways to be obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipePreference {
    Mine,
    Recipe(RecipeId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    pub proliferator: ProliferatorConfig,
    pub machine_ranks: MachineRanks,
    pub belt: BeltConfig,
    /// kW drawn by one sorter
    pub sorter_power: f64,
    /// Item id to preferred recipe id, or -1 to force mining
    #[serde(
        serialize_with = "serialize_item_keys",
        deserialize_with = "deserialize_item_keys"
    )]
    pub alternative_recipes: HashMap<ItemId, i64>,
    pub proliferator_multiplier: ProliferatorMultiplier,
    pub photon: Option<PhotonSettings>,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            proliferator: ProliferatorConfig::default(),
            machine_ranks: MachineRanks::default(),
            belt: BeltConfig::default(),
            sorter_power: 18.0,
            alternative_recipes: HashMap::new(),
            proliferator_multiplier: ProliferatorMultiplier::default(),
            photon: None,
        }
    }
}

impl GlobalSettings {
    pub fn recipe_preference(&self, item_id: ItemId) -> Option<RecipePreference> {
        self.alternative_recipes
            .get(&item_id)
            .and_then(|&value| match value {
                MINING_SENTINEL => Some(RecipePreference::Mine),
                id => u32::try_from(id).ok().map(RecipePreference::Recipe),
            })
    }
}

// TOML tables only have string keys
fn serialize_item_keys<S: Serializer>(map: &HashMap<ItemId, i64>, s: S) -> Result<S::Ok, S::Error> {
    let mut sorted: Vec<_> = map.iter().map(|(k, v)| (k.to_string(), *v)).collect();
    sorted.sort();
    s.collect_map(sorted)
}

fn deserialize_item_keys<'de, D: Deserializer<'de>>(d: D) -> Result<HashMap<ItemId, i64>, D::Error> {
    let raw: HashMap<String, i64> = HashMap::deserialize(d)?;
    raw.into_iter()
        .map(|(key, value)| {
            key.trim()
                .parse::<ItemId>()
                .map(|id| (id, value))
                .map_err(|e| serde::de::Error::custom(format!("bad item id '{}': {}", key, e)))
        })
        .collect()
}

/// Per-node override; absent fields inherit from [`GlobalSettings`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeOverrideSettings {
    pub proliferator: Option<ProliferatorConfig>,
    pub machine_rank: Option<String>,
}

/// Node id to override
pub type NodeOverrides = HashMap<String, NodeOverrideSettings>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningSettings {
    /// Vein utilization research multiplier
    pub speed_multiplier: f64,
    pub veins_per_miner: u32,
    pub advanced_miner: bool,
    /// Advanced mining machine speed in percent, 100..=300
    pub advanced_miner_speed: f64,
    /// Crude oil per second per extractor before research
    pub oil_seep_rate: f64,
}

impl Default for MiningSettings {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            veins_per_miner: 6,
            advanced_miner: false,
            advanced_miner_speed: 100.0,
            oil_seep_rate: 1.0,
        }
    }
}

/// Everything a calculation reads from disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub settings: GlobalSettings,
    pub mining: MiningSettings,
    pub overrides: NodeOverrides,
}

pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "dsp-calculator")
        .map(|dirs| dirs.config_dir().join("settings.toml"))
}

impl Config {
    /// Load an explicit config file; missing or malformed files are errors
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Load from the platform config directory, falling back to defaults
    pub fn load_default() -> Self {
        let Some(path) = default_config_path() else {
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("Failed to parse config {}: {e}. Using defaults.", path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = GlobalSettings::default();
        assert_eq!(settings.proliferator.kind, ProliferatorType::None);
        assert_eq!(settings.belt.total_speed(), 6.0);
        assert_eq!(settings.sorter_power, 18.0);
        assert!(settings.photon.is_none());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [settings]
            sorter_power = 36.0

            [settings.proliferator]
            type = "mk3"
            mode = "production"

            [settings.alternative_recipes]
            1120 = -1
            1109 = 17

            [overrides."r-9/r-6"]
            machine_rank = "mk3"
            "#,
        )
        .expect("parse");

        assert_eq!(config.settings.sorter_power, 36.0);
        assert_eq!(config.settings.proliferator.kind, ProliferatorType::Mk3);
        assert_eq!(config.settings.proliferator.mode, ProliferatorMode::Production);
        assert_eq!(config.settings.machine_ranks.smelter, "basic");
        assert_eq!(config.settings.recipe_preference(1120), Some(RecipePreference::Mine));
        assert_eq!(config.settings.recipe_preference(1109), Some(RecipePreference::Recipe(17)));
        assert_eq!(config.settings.recipe_preference(1001), None);
        assert_eq!(
            config.overrides["r-9/r-6"].machine_rank.as_deref(),
            Some("mk3")
        );
        assert_eq!(config.mining.veins_per_miner, 6);
    }

    #[test]
    fn test_bad_item_key_is_rejected() {
        let result: Result<Config, _> = toml::from_str(
            r#"
            [settings.alternative_recipes]
            hydrogen = -1
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let mut config = Config::default();
        config.settings.alternative_recipes.insert(1120, 58);
        config.settings.photon = Some(PhotonSettings {
            graviton_lens: true,
            ..PhotonSettings::default()
        });
        config.overrides.insert(
            "r-1".to_string(),
            NodeOverrideSettings {
                proliferator: Some(ProliferatorConfig::new(ProliferatorType::Mk2, ProliferatorMode::Speed)),
                machine_rank: None,
            },
        );

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("settings.toml");
        config.save(&path).expect("save");
        let loaded = Config::load(&path).expect("load");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(Config::load(&dir.path().join("absent.toml")).is_err());
    }
}
