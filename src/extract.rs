//! Game data extraction from exported JSON proto dumps
//!
//! Walks a directory for `Items*.json`, `Machines*.json` and `Recipes*.json`
//! files (as written by the usual proto-set exporters) and loads them into
//! the database. Items go first so recipe entries can be named.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use rusqlite::Connection;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use walkdir::WalkDir;

use crate::db;
use crate::models::{Item, ItemId, Machine, Recipe, RecipeItem, RecipeType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DataKind {
    Items,
    Machines,
    Recipes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ItemProto {
    #[serde(rename = "ID")]
    id: ItemId,
    name: String,
    #[serde(default)]
    mining_from: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MachineProto {
    #[serde(rename = "ID")]
    id: u32,
    name: String,
    #[serde(rename = "Type", default)]
    recipe_type: Option<RecipeType>,
    speed: u32,
    work_energy_per_tick: f64,
    #[serde(default)]
    idle_energy_per_tick: f64,
    #[serde(default = "default_true")]
    is_power_consumer: bool,
    #[serde(default)]
    is_power_gen: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RecipeProto {
    #[serde(rename = "ID")]
    id: u32,
    name: String,
    #[serde(rename = "Type")]
    recipe_type: RecipeType,
    time_spend: u32,
    items: Vec<ItemId>,
    item_counts: Vec<f64>,
    results: Vec<ItemId>,
    result_counts: Vec<f64>,
    #[serde(default)]
    non_productive: bool,
}

/// Exporters write either a bare array or the proto set's `dataArray` wrapper
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProtoFile<T> {
    List(Vec<T>),
    Wrapped {
        #[serde(rename = "dataArray")]
        data_array: Vec<T>,
    },
}

impl<T> ProtoFile<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            ProtoFile::List(list) => list,
            ProtoFile::Wrapped { data_array } => data_array,
        }
    }
}

/// Decide what a file holds from its name
pub fn classify_file(path: &Path) -> Result<Option<DataKind>> {
    let name_re = Regex::new(r"(?i)^(items|machines|recipes)(?:[_\-][\w\-]*)?\.json$")?;
    let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

    let kind = name_re.captures(filename).map(|cap| {
        match cap[1].to_ascii_lowercase().as_str() {
            "items" => DataKind::Items,
            "machines" => DataKind::Machines,
            _ => DataKind::Recipes,
        }
    });
    Ok(kind)
}

/// Find all data files under a directory, items first, then machines, then recipes
pub fn find_data_files(source_dir: &Path) -> Result<(Vec<(DataKind, PathBuf)>, usize)> {
    let mut files = Vec::new();
    let mut skipped = 0;

    for entry in WalkDir::new(source_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| !ext.eq_ignore_ascii_case("json")) {
            continue;
        }
        match classify_file(path)? {
            Some(kind) => files.push((kind, path.to_path_buf())),
            None => skipped += 1,
        }
    }

    files.sort();
    Ok((files, skipped))
}

fn read_protos<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let parsed: ProtoFile<T> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(parsed.into_vec())
}

fn recipe_entries(
    ids: &[ItemId],
    counts: &[f64],
    names: &HashMap<ItemId, String>,
) -> Option<Vec<RecipeItem>> {
    if ids.len() != counts.len() {
        return None;
    }
    Some(
        ids.iter()
            .zip(counts)
            .map(|(&item_id, &count)| RecipeItem {
                item_id,
                name: names
                    .get(&item_id)
                    .cloned()
                    .unwrap_or_else(|| format!("Item {}", item_id)),
                count,
            })
            .collect(),
    )
}

fn convert_recipe(proto: RecipeProto, names: &HashMap<ItemId, String>) -> Option<Recipe> {
    let inputs = recipe_entries(&proto.items, &proto.item_counts, names)?;
    let outputs = recipe_entries(&proto.results, &proto.result_counts, names)?;
    Some(Recipe {
        id: proto.id,
        name: proto.name,
        recipe_type: proto.recipe_type,
        time_spend: proto.time_spend,
        inputs,
        outputs,
        productive: !proto.non_productive,
    })
}

fn import_file(
    conn: &Connection,
    kind: DataKind,
    path: &Path,
    stats: &mut ExtractStats,
) -> Result<()> {
    match kind {
        DataKind::Items => {
            for proto in read_protos::<ItemProto>(path)? {
                db::upsert_item(
                    conn,
                    &Item {
                        id: proto.id,
                        name: proto.name,
                        mining_from: proto.mining_from.filter(|s| !s.trim().is_empty()),
                    },
                )?;
                stats.items += 1;
            }
        }
        DataKind::Machines => {
            for proto in read_protos::<MachineProto>(path)? {
                db::upsert_machine(
                    conn,
                    &Machine {
                        id: proto.id,
                        name: proto.name,
                        recipe_type: proto.recipe_type,
                        speed: proto.speed,
                        work_energy_per_tick: proto.work_energy_per_tick,
                        idle_energy_per_tick: proto.idle_energy_per_tick,
                        power_consumer: proto.is_power_consumer,
                        power_generator: proto.is_power_gen,
                    },
                )?;
                stats.machines += 1;
            }
        }
        DataKind::Recipes => {
            let names: HashMap<ItemId, String> = db::list_items(conn)?
                .into_iter()
                .map(|item| (item.id, item.name))
                .collect();

            for proto in read_protos::<RecipeProto>(path)? {
                let (id, name) = (proto.id, proto.name.clone());
                match convert_recipe(proto, &names) {
                    Some(recipe) => {
                        db::insert_recipe(conn, &recipe)?;
                        stats.recipes += 1;
                    }
                    None => {
                        log::warn!("Recipe {} ({}) has mismatched item/count lists, skipped", id, name);
                        stats.errors += 1;
                    }
                }
            }
        }
    }
    Ok(())
}

/// Extract all game data under a directory and populate the database
pub fn extract_to_database(conn: &Connection, source_dir: &Path) -> Result<ExtractStats> {
    let mut stats = ExtractStats::default();

    log::info!("Scanning {} for game data...", source_dir.display());
    let (files, skipped) = find_data_files(source_dir)?;
    stats.skipped = skipped;
    log::info!("Found {} data files", files.len());

    for (kind, path) in &files {
        match import_file(conn, *kind, path, &mut stats) {
            Ok(()) => log::info!("  Imported {:?} from {}", kind, path.display()),
            Err(e) => {
                log::warn!("  Error importing {}: {:#}", path.display(), e);
                stats.errors += 1;
            }
        }
    }

    Ok(stats)
}

#[derive(Debug, Default)]
pub struct ExtractStats {
    pub items: usize,
    pub machines: usize,
    pub recipes: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl std::fmt::Display for ExtractStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Extracted {} items, {} machines, {} recipes. Skipped: {}, Errors: {}",
            self.items, self.machines, self.recipes, self.skipped, self.errors
        )
    }
}
