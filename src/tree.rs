//! Recursive production tree builder
//!
//! Each recipe node resolves its machine and proliferator, works out how many
//! machines the requested rate needs, and recurses into a producer recipe for
//! every input. Inputs become raw-material leaves when:
//!
//! - the item is the main output of an ancestor (or of the node itself), which marks a
//!   circular dependency and ends recursion along that path;
//! - the user asked for the item to be mined instead of crafted;
//! - no recipe in the catalog produces the item.
//!
//! Node ids are built from the path (`r-9/r-6/raw-1001`) so overrides keyed
//! by id stay attached to the same node when settings change elsewhere.

use std::collections::HashSet;

use crate::belts::conveyor_belts;
use crate::constants::{self, items, photon, DEFAULT_MAX_DEPTH};
use crate::error::CalcError;
use crate::game_data::GameData;
use crate::mining::create_raw_material_node;
use crate::models::{InputRequirement, ItemId, Recipe, RecipeTreeNode, RecipeType};
use crate::power::{machine_power, sorter_power};
use crate::production::production_rate;
use crate::proliferator::effective_bonuses;
use crate::resolve::{resolve_machine, resolve_proliferator};
use crate::settings::{GlobalSettings, MiningSettings, NodeOverrides, ProliferatorMode, RecipePreference};

/// Node id of a tree's root
pub fn root_node_id(recipe: &Recipe) -> String {
    format!("r-{}", recipe.id)
}

/// Whole machines needed; partial machines can't be built
pub fn machines_needed(target_rate: f64, rate_per_machine: f64) -> u32 {
    if target_rate <= 0.0 {
        return 0;
    }
    // Zero-time recipes: one machine keeps up with anything
    if !rate_per_machine.is_finite() {
        return 1;
    }
    if rate_per_machine <= 0.0 {
        return 0;
    }
    (target_rate / rate_per_machine).ceil() as u32
}

/// Builds production trees against one catalog and one set of settings
#[derive(Debug, Clone, Copy)]
pub struct TreeBuilder<'a> {
    game_data: &'a GameData,
    settings: &'a GlobalSettings,
    overrides: Option<&'a NodeOverrides>,
    mining: &'a MiningSettings,
    max_depth: usize,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(game_data: &'a GameData, settings: &'a GlobalSettings, mining: &'a MiningSettings) -> Self {
        Self {
            game_data,
            settings,
            overrides: None,
            mining,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_overrides(mut self, overrides: Option<&'a NodeOverrides>) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Build the tree for `recipe` supplying `target_rate` of its main output
    pub fn build(&self, recipe: &Recipe, target_rate: f64) -> Result<RecipeTreeNode, CalcError> {
        self.build_recipe_tree(recipe, target_rate, 0, &root_node_id(recipe), &HashSet::new(), None)
    }

    /// Build the subtree rooted at `recipe`.
    ///
    /// Rates are worked out against the first output's count. `visiting` holds
    /// the main output of every ancestor. `target_item_id` names the output the
    /// parent wants and is only recorded on the node.
    pub fn build_recipe_tree(
        &self,
        recipe: &Recipe,
        target_rate: f64,
        depth: usize,
        node_path: &str,
        visiting: &HashSet<ItemId>,
        target_item_id: Option<ItemId>,
    ) -> Result<RecipeTreeNode, CalcError> {
        if depth > self.max_depth {
            return Err(CalcError::DepthExceeded {
                depth,
                max_depth: self.max_depth,
                node_id: node_path.to_string(),
            });
        }

        let node_id = node_path.to_string();
        let node_override = self.overrides.and_then(|o| o.get(&node_id));
        let settings = self.settings;
        let multiplier = &settings.proliferator_multiplier;
        let photon_settings = settings.photon.as_ref();
        let is_photon = recipe.recipe_type == RecipeType::PhotonStore;

        let machine = resolve_machine(recipe, self.game_data, settings, node_override)?;
        let proliferator = resolve_proliferator(recipe, settings, node_override);

        let rate_per_machine =
            production_rate(recipe, machine, &proliferator, multiplier, photon_settings);
        let machine_count = machines_needed(target_rate, rate_per_machine);

        let mut power = machine_power(
            machine,
            machine_count,
            &proliferator,
            multiplier,
            Some(recipe.recipe_type),
            photon_settings,
        );
        if !is_photon {
            power = power.with_sorters(sorter_power(recipe, machine_count, settings.sorter_power));
        }

        // Extra products mean fewer inputs per unit out; speed boost keeps the ratio
        let input_multiplier = match proliferator.mode {
            ProliferatorMode::Production => {
                1.0 / (1.0 + effective_bonuses(&proliferator, multiplier).production_bonus)
            }
            ProliferatorMode::Speed => 1.0,
        };
        let output_count = recipe.output_count();

        let mut inputs: Vec<InputRequirement> = recipe
            .inputs
            .iter()
            .map(|input| InputRequirement {
                item_id: input.item_id,
                name: input.name.clone(),
                required_rate: input.count * target_rate / output_count * input_multiplier,
            })
            .collect();

        if is_photon && photon_settings.is_some_and(|p| p.graviton_lens) {
            inputs.push(InputRequirement {
                item_id: items::GRAVITON_LENS,
                name: self.game_data.item_name(items::GRAVITON_LENS),
                required_rate: photon::LENS_CONSUMPTION_PER_SECOND * f64::from(machine_count),
            });
        }

        let belts = conveyor_belts(target_rate, &inputs, settings.belt.total_speed());

        let mut child_visiting = visiting.clone();
        if let Some(output) = recipe.main_output() {
            child_visiting.insert(output.item_id);
        }

        let mut children = Vec::with_capacity(inputs.len());
        for input in &inputs {
            children.push(self.resolve_input(recipe, input, &node_id, depth, &child_visiting)?);
        }

        log::debug!(
            "{}: {} x{} ({}) for {:.3}/s",
            node_id,
            recipe.name,
            machine_count,
            machine.name,
            target_rate
        );

        // Label the node with the item the parent asked for
        let supplied = recipe.output_for(target_item_id);

        Ok(RecipeTreeNode {
            node_id,
            recipe: Some(recipe.clone()),
            item_id: supplied.map_or(0, |o| o.item_id),
            item_name: supplied.map_or_else(|| recipe.name.clone(), |o| o.name.clone()),
            target_item_id,
            is_raw_material: false,
            is_circular_dependency: false,
            circular_source_recipe: None,
            target_output_rate: target_rate,
            machine_count,
            proliferator,
            machine: Some(machine.clone()),
            power,
            inputs,
            children,
            conveyor_belts: belts,
            mining_from: None,
            mining_equipment: None,
        })
    }

    /// Turn one input of `parent` into a child node: a leaf or a recursive subtree
    fn resolve_input(
        &self,
        parent: &Recipe,
        input: &InputRequirement,
        parent_id: &str,
        depth: usize,
        visiting: &HashSet<ItemId>,
    ) -> Result<RecipeTreeNode, CalcError> {
        let leaf = |is_circular: bool| {
            create_raw_material_node(
                input.item_id,
                &input.name,
                input.required_rate,
                self.settings,
                self.game_data,
                format!("{}/raw-{}", parent_id, input.item_id),
                is_circular,
                self.mining,
                Some(parent),
            )
        };

        if visiting.contains(&input.item_id) {
            log::debug!("{}: {} loops back through '{}'", parent_id, input.name, parent.name);
            return Ok(leaf(true));
        }

        let preference = self.settings.recipe_preference(input.item_id);
        if preference == Some(RecipePreference::Mine) {
            return Ok(leaf(false));
        }

        let producers = self.game_data.producers(input.item_id);
        let Some(&first) = producers.first() else {
            if !constants::is_raw_material(input.item_id) {
                log::debug!("{}: nothing produces {}, treating as raw", parent_id, input.name);
            }
            return Ok(leaf(false));
        };

        let chosen = match preference {
            Some(RecipePreference::Recipe(id)) => match producers.iter().find(|r| r.id == id) {
                Some(&recipe) => recipe,
                None => {
                    log::warn!(
                        "Preferred recipe {} does not produce {}, using '{}'",
                        id,
                        input.name,
                        first.name
                    );
                    first
                }
            },
            _ => first,
        };

        self.build_recipe_tree(
            chosen,
            input.required_rate,
            depth + 1,
            &format!("{}/r-{}", parent_id, chosen.id),
            visiting,
            Some(input.item_id),
        )
    }
}
