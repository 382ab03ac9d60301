//! Production chain calculator logic

use std::collections::BTreeMap;

use crate::error::CalcError;
use crate::game_data::GameData;
use crate::models::{
    CalculationResult, ItemId, MultiOutputResult, PowerConsumption, Recipe, RecipeTreeNode,
};
use crate::settings::{GlobalSettings, MiningSettings, NodeOverrides};
use crate::tree::TreeBuilder;

/// Calculate the production chain for a recipe at a given rate of its main output
///
/// Returns the resolved tree plus whole-tree totals.
pub fn calculate_production_chain(
    recipe: &Recipe,
    target_rate: f64,
    game_data: &GameData,
    settings: &GlobalSettings,
    overrides: Option<&NodeOverrides>,
    mining: &MiningSettings,
) -> Result<CalculationResult, CalcError> {
    let builder = TreeBuilder::new(game_data, settings, mining).with_overrides(overrides);
    calculate_with(&builder, recipe, target_rate)
}

/// Same as [`calculate_production_chain`] with a preconfigured builder
pub fn calculate_with(
    builder: &TreeBuilder<'_>,
    recipe: &Recipe,
    target_rate: f64,
) -> Result<CalculationResult, CalcError> {
    let root = builder.build(recipe, target_rate)?;

    Ok(CalculationResult {
        total_power: total_power(&root),
        total_machines: total_machines(&root),
        raw_materials: raw_materials(&root),
        multi_output_results: multi_output_results(recipe, target_rate),
        root,
    })
}

/// Every output's rate when the main output runs at `target_rate`
pub fn multi_output_results(recipe: &Recipe, target_rate: f64) -> Option<Vec<MultiOutputResult>> {
    if recipe.outputs.len() <= 1 {
        return None;
    }
    let main_count = recipe.output_count();

    Some(
        recipe
            .outputs
            .iter()
            .enumerate()
            .map(|(i, output)| MultiOutputResult {
                item_id: output.item_id,
                name: output.name.clone(),
                production_rate: if i == 0 {
                    target_rate
                } else {
                    target_rate * output.count / main_count
                },
                count_per_craft: output.count,
            })
            .collect(),
    )
}

/// Calculate total power consumption for an entire production chain
pub fn total_power(node: &RecipeTreeNode) -> PowerConsumption {
    let own = PowerConsumption::new(node.power.machines, node.power.sorters, node.power.dyson_sphere);
    node.children.iter().fold(own, |acc, child| acc + total_power(child))
}

pub fn total_machines(node: &RecipeTreeNode) -> u32 {
    node.machine_count + node.children.iter().map(total_machines).sum::<u32>()
}

/// Raw material draw by item; circular breaks are recycled inside the chain and skipped
pub fn raw_materials(node: &RecipeTreeNode) -> BTreeMap<ItemId, f64> {
    let mut totals = BTreeMap::new();
    collect_raw_materials(node, &mut totals);
    totals
}

fn collect_raw_materials(node: &RecipeTreeNode, totals: &mut BTreeMap<ItemId, f64>) {
    if node.is_raw_material && !node.is_circular_dependency {
        *totals.entry(node.item_id).or_default() += node.target_output_rate;
    }
    for child in &node.children {
        collect_raw_materials(child, totals);
    }
}

/// Machines by name, extraction equipment included
pub fn machine_counts(node: &RecipeTreeNode) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    collect_machine_counts(node, &mut counts);
    counts
}

fn collect_machine_counts(node: &RecipeTreeNode, counts: &mut BTreeMap<String, u32>) {
    if let Some(machine) = &node.machine {
        *counts.entry(machine.name.clone()).or_default() += node.machine_count;
    }
    if let Some(equipment) = &node.mining_equipment {
        *counts.entry(equipment.machine_name.clone()).or_default() += equipment.count;
    }
    for child in &node.children {
        collect_machine_counts(child, counts);
    }
}

/// Power drawn by extraction equipment across the tree (kW)
pub fn mining_power(node: &RecipeTreeNode) -> f64 {
    let own = node.mining_equipment.as_ref().map_or(0.0, |m| m.power_kw);
    own + node.children.iter().map(mining_power).sum::<f64>()
}

fn format_power(kw: f64) -> String {
    if kw >= 1000.0 {
        format!("{:.2} MW", kw / 1000.0)
    } else {
        format!("{:.0} kW", kw)
    }
}

/// Format a production chain as a readable string
pub fn format_production_chain(node: &RecipeTreeNode, indent: usize) -> String {
    let mut output = String::new();
    let prefix = "  ".repeat(indent);

    if node.is_raw_material {
        let source = match (&node.circular_source_recipe, &node.mining_from) {
            (Some(recipe), _) if node.is_circular_dependency => format!("recycled by {}", recipe.name),
            (_, Some(from)) => format!("raw, {}", from),
            _ => "raw".to_string(),
        };
        output.push_str(&format!(
            "{}-> {} @ {:.3}/s ({}) [{}]\n",
            prefix, node.item_name, node.target_output_rate, source, node.node_id
        ));
        if let Some(equipment) = &node.mining_equipment {
            output.push_str(&format!(
                "{}   {}x {} ({})\n",
                prefix,
                equipment.count,
                equipment.machine_name,
                format_power(equipment.power_kw)
            ));
        }
        return output;
    }

    let machine_name = node.machine.as_ref().map_or("?", |m| m.name.as_str());
    let recipe_name = node.recipe.as_ref().map_or("?", |r| r.name.as_str());
    let proliferator = format!("{:?}", node.proliferator.kind).to_lowercase();
    output.push_str(&format!(
        "{}{}x {} [{}] {} @ {:.3}/s via {} ({}, {} belts) [{}]\n",
        prefix,
        node.machine_count,
        machine_name,
        proliferator,
        node.item_name,
        node.target_output_rate,
        recipe_name,
        format_power(node.power.total),
        node.conveyor_belts.total,
        node.node_id
    ));

    for (input, child) in node.inputs.iter().zip(&node.children) {
        output.push_str(&format!(
            "{}  needs {} @ {:.3}/s\n",
            prefix, input.name, input.required_rate
        ));
        output.push_str(&format_production_chain(child, indent + 2));
    }

    output
}

/// Summary of a production chain calculation
#[derive(Debug)]
pub struct ChainSummary {
    pub target: String,
    pub target_rate: f64,
    pub power: PowerConsumption,
    pub mining_power: f64,
    pub total_machines: u32,
    pub machine_counts: Vec<(String, u32)>,
    pub raw_inputs: Vec<(String, f64)>,
    pub outputs: Vec<(String, f64)>,
}

/// Generate a summary of the production chain
pub fn summarize_chain(result: &CalculationResult, game_data: &GameData) -> ChainSummary {
    let raw_inputs = result
        .raw_materials
        .iter()
        .map(|(&id, &rate)| (game_data.item_name(id), rate))
        .collect();

    let outputs = result
        .multi_output_results
        .iter()
        .flatten()
        .map(|o| (o.name.clone(), o.production_rate))
        .collect();

    ChainSummary {
        target: result.root.item_name.clone(),
        target_rate: result.root.target_output_rate,
        power: result.total_power,
        mining_power: mining_power(&result.root),
        total_machines: result.total_machines,
        machine_counts: machine_counts(&result.root).into_iter().collect(),
        raw_inputs,
        outputs,
    }
}

impl std::fmt::Display for ChainSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Production Summary ===")?;
        writeln!(f, "Target: {} @ {:.3}/s ({:.1}/min)", self.target, self.target_rate, self.target_rate * 60.0)?;
        writeln!(f)?;

        if !self.outputs.is_empty() {
            writeln!(f, "Outputs:")?;
            for (name, rate) in &self.outputs {
                writeln!(f, "  {} @ {:.3}/s", name, rate)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "Machines required ({} production):", self.total_machines)?;
        for (name, count) in &self.machine_counts {
            writeln!(f, "  {}x {}", count, name)?;
        }
        writeln!(f)?;

        writeln!(f, "Raw inputs required:")?;
        for (name, rate) in &self.raw_inputs {
            writeln!(f, "  {} @ {:.3}/s", name, rate)?;
        }
        writeln!(f)?;

        writeln!(f, "Power:")?;
        writeln!(f, "  Machines:     {}", format_power(self.power.machines))?;
        writeln!(f, "  Sorters:      {}", format_power(self.power.sorters))?;
        writeln!(f, "  Dyson sphere: {}", format_power(self.power.dyson_sphere))?;
        writeln!(f, "  Total:        {}", format_power(self.power.total))?;
        writeln!(f, "  Mining:       {}", format_power(self.mining_power))?;

        Ok(())
    }
}
