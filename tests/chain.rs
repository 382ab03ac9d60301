//! End-to-end production chain scenarios

use dsp_calculator::calculator::calculate_with;
use dsp_calculator::constants::{items, CIRCULAR_SOURCE, UNKNOWN_SOURCE};
use dsp_calculator::models::{
    Bottleneck, Item, ItemId, Machine, Recipe, RecipeItem, RecipeTreeNode, RecipeType,
};
use dsp_calculator::sample::sample_game_data;
use dsp_calculator::settings::{
    NodeOverrideSettings, NodeOverrides, PhotonSettings, ProliferatorConfig, ProliferatorMode,
    ProliferatorType,
};
use dsp_calculator::{
    calculate_production_chain, CalcError, CalculationResult, GameData, GlobalSettings,
    MiningSettings, TreeBuilder,
};

// ===========================================================================
// Helpers
// ===========================================================================

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn entry(item_id: ItemId, name: &str, count: f64) -> RecipeItem {
    RecipeItem {
        item_id,
        name: name.to_string(),
        count,
    }
}

fn smelter(speed: u32) -> Machine {
    Machine {
        id: 2302,
        name: "Arc Smelter".to_string(),
        recipe_type: Some(RecipeType::Smelt),
        speed,
        work_energy_per_tick: 6000.0,
        idle_energy_per_tick: 200.0,
        power_consumer: true,
        power_generator: false,
    }
}

/// Single smelting step: 1 ore -> `per_craft` bars in `ticks`
fn one_step_catalog(speed: u32, ticks: u32, per_craft: f64) -> GameData {
    let items = vec![
        Item {
            id: 1001,
            name: "Iron Ore".to_string(),
            mining_from: Some("Iron vein".to_string()),
        },
        Item {
            id: 1101,
            name: "Iron Ingot".to_string(),
            mining_from: None,
        },
    ];
    let recipe = Recipe {
        id: 1,
        name: "Iron Ingot".to_string(),
        recipe_type: RecipeType::Smelt,
        time_spend: ticks,
        inputs: vec![entry(1001, "Iron Ore", 1.0)],
        outputs: vec![entry(1101, "Iron Ingot", per_craft)],
        productive: true,
    };
    GameData::new(items, vec![smelter(speed)], vec![recipe])
}

fn run(data: &GameData, recipe_id: u32, rate: f64, settings: &GlobalSettings) -> CalculationResult {
    let recipe = data.recipe(recipe_id).expect("recipe");
    calculate_production_chain(recipe, rate, data, settings, None, &MiningSettings::default())
        .expect("calculate")
}

fn walk<'a>(node: &'a RecipeTreeNode, out: &mut Vec<&'a RecipeTreeNode>) {
    out.push(node);
    for child in &node.children {
        walk(child, out);
    }
}

fn all_nodes(result: &CalculationResult) -> Vec<&RecipeTreeNode> {
    let mut nodes = Vec::new();
    walk(&result.root, &mut nodes);
    nodes
}

// ===========================================================================
// Rates, machines and power
// ===========================================================================

#[test]
fn one_second_recipe_needs_one_machine() {
    let data = one_step_catalog(10000, 60, 1.0);
    let result = run(&data, 1, 1.0, &GlobalSettings::default());

    assert_eq!(result.root.machine_count, 1);
    assert!(approx(result.root.power.machines, 6000.0 * 60.0 / 1000.0));
    // One input and one output sorter
    assert!(approx(result.root.power.sorters, 36.0));
    assert!(approx(result.total_power.total, 396.0));
}

#[test]
fn partial_machines_round_up() {
    let data = one_step_catalog(10000, 60, 1.0);
    let result = run(&data, 1, 2.5, &GlobalSettings::default());
    assert_eq!(result.root.machine_count, 3);
}

#[test]
fn zero_speed_machine_runs_at_base_speed() {
    let unscaled = run(&one_step_catalog(0, 120, 1.0), 1, 3.0, &GlobalSettings::default());
    let normal = run(&one_step_catalog(10000, 120, 1.0), 1, 3.0, &GlobalSettings::default());

    assert_eq!(unscaled.root.machine_count, 6);
    assert_eq!(unscaled.root.machine_count, normal.root.machine_count);
    assert!(approx(unscaled.total_power.total, normal.total_power.total));
}

#[test]
fn yield_boost_reduces_input_draw() {
    let data = one_step_catalog(10000, 60, 1.0);
    let settings = GlobalSettings {
        proliferator: ProliferatorConfig::new(ProliferatorType::Mk3, ProliferatorMode::Production),
        ..GlobalSettings::default()
    };
    let result = run(&data, 1, 1.0, &settings);

    assert!(approx(result.root.inputs[0].required_rate, 0.8));
    assert!(approx(result.raw_materials[&items::IRON_ORE], 0.8));
    // Sprayed machines draw 150% more
    assert!(approx(result.root.power.machines, 360.0 * 2.5));
}

#[test]
fn speed_boost_keeps_input_ratio() {
    let data = one_step_catalog(10000, 60, 1.0);
    let settings = GlobalSettings {
        proliferator: ProliferatorConfig::new(ProliferatorType::Mk3, ProliferatorMode::Speed),
        ..GlobalSettings::default()
    };
    let result = run(&data, 1, 4.0, &settings);

    assert_eq!(result.root.machine_count, 2);
    assert!(approx(result.root.inputs[0].required_rate, 4.0));
}

#[test]
fn multi_output_rates_scale_with_counts() {
    let items = vec![
        Item {
            id: 1007,
            name: "Crude Oil".to_string(),
            mining_from: Some("Oil seep".to_string()),
        },
        Item {
            id: 1114,
            name: "Refined Oil".to_string(),
            mining_from: None,
        },
        Item {
            id: 1120,
            name: "Hydrogen".to_string(),
            mining_from: None,
        },
    ];
    let refinery = Machine {
        id: 2308,
        name: "Oil Refinery".to_string(),
        recipe_type: Some(RecipeType::Refine),
        speed: 10000,
        work_energy_per_tick: 16000.0,
        idle_energy_per_tick: 200.0,
        power_consumer: true,
        power_generator: false,
    };
    let recipe = Recipe {
        id: 16,
        name: "Split".to_string(),
        recipe_type: RecipeType::Refine,
        time_spend: 60,
        inputs: vec![entry(1007, "Crude Oil", 1.0)],
        outputs: vec![entry(1114, "Refined Oil", 1.0), entry(1120, "Hydrogen", 2.0)],
        productive: false,
    };
    let data = GameData::new(items, vec![refinery], vec![recipe]);

    let result = run(&data, 16, 3.0, &GlobalSettings::default());
    let outputs = result.multi_output_results.expect("multi output");
    assert_eq!(outputs[0].production_rate, 3.0);
    assert_eq!(outputs[1].production_rate, 6.0);
    assert_eq!(outputs[1].count_per_craft, 2.0);
}

// ===========================================================================
// Belts
// ===========================================================================

#[test]
fn belts_for_balanced_node() {
    let data = one_step_catalog(10000, 60, 1.0);
    let result = run(&data, 1, 18.0, &GlobalSettings::default());
    let belts = &result.root.conveyor_belts;

    assert_eq!(belts.inputs, 3);
    assert_eq!(belts.outputs, 3);
    assert_eq!(belts.total, 6);
    assert!(approx(belts.saturation, 100.0));
    assert_eq!(belts.bottleneck, Some(Bottleneck::Input));
}

#[test]
fn output_bottleneck_when_output_denser() {
    // 2 bars per ore: output belts fill faster than input belts
    let data = one_step_catalog(10000, 60, 2.0);
    let result = run(&data, 1, 6.0, &GlobalSettings::default());
    let belts = &result.root.conveyor_belts;

    assert_eq!(belts.outputs, 1);
    assert_eq!(belts.inputs, 1);
    assert_eq!(belts.bottleneck, Some(Bottleneck::Output));
}

#[test]
fn lightly_loaded_belts_have_no_bottleneck() {
    let data = one_step_catalog(10000, 60, 1.0);
    let result = run(&data, 1, 1.0, &GlobalSettings::default());
    assert!(result.root.conveyor_belts.bottleneck.is_none());
}

// ===========================================================================
// Raw materials, preferences and cycles
// ===========================================================================

#[test]
fn mining_preference_cuts_subtree() {
    let data = sample_game_data();
    let mut settings = GlobalSettings::default();
    settings.alternative_recipes.insert(1101, -1);

    let result = run(&data, 5, 1.0, &settings);
    let leaf = &result.root.children[0];

    assert!(leaf.is_raw_material);
    assert!(!leaf.is_circular_dependency);
    assert_eq!(leaf.node_id, "r-5/raw-1101");
    assert_eq!(leaf.mining_from.as_deref(), Some(UNKNOWN_SOURCE));
    assert!(approx(result.raw_materials[&1101], 1.0));
    assert!(!result.raw_materials.contains_key(&items::IRON_ORE));
}

#[test]
fn circular_leaves_excluded_from_raw_totals() {
    let data = sample_game_data();
    let result = run(&data, 58, 1.0, &GlobalSettings::default());

    let circular: Vec<_> = all_nodes(&result)
        .into_iter()
        .filter(|n| n.is_circular_dependency)
        .collect();
    assert!(!circular.is_empty());
    for node in &circular {
        assert!(node.is_raw_material);
        assert_eq!(node.mining_from.as_deref(), Some(CIRCULAR_SOURCE));
        assert!(node.mining_equipment.is_none());
        assert!(node.children.is_empty());
        assert!(node.circular_source_recipe.is_some());
    }
    assert!(!result.raw_materials.contains_key(&items::HYDROGEN));
}

#[test]
fn raw_totals_sum_non_circular_leaves() {
    let data = sample_game_data();
    let result = run(&data, 9, 2.0, &GlobalSettings::default());

    let mut expected = std::collections::BTreeMap::new();
    for node in all_nodes(&result) {
        if node.is_raw_material && !node.is_circular_dependency {
            *expected.entry(node.item_id).or_insert(0.0) += node.target_output_rate;
        }
    }
    assert_eq!(expected.len(), result.raw_materials.len());
    for (id, rate) in expected {
        assert!(approx(result.raw_materials[&id], rate));
    }
}

#[test]
fn cycle_through_ancestor_terminates_without_depth_limit() {
    // A needs B, B needs A and C, C needs A
    let assembler = Machine {
        id: 2303,
        name: "Assembling Machine Mk.I".to_string(),
        recipe_type: Some(RecipeType::Assemble),
        speed: 7500,
        work_energy_per_tick: 4500.0,
        idle_energy_per_tick: 200.0,
        power_consumer: true,
        power_generator: false,
    };
    let assemble = |id: u32, output: ItemId, inputs: &[ItemId]| Recipe {
        id,
        name: format!("Part {}", output),
        recipe_type: RecipeType::Assemble,
        time_spend: 60,
        inputs: inputs.iter().map(|&item| entry(item, "part", 1.0)).collect(),
        outputs: vec![entry(output, "part", 1.0)],
        productive: true,
    };
    let data = GameData::new(
        Vec::new(),
        vec![assembler],
        vec![
            assemble(1, 5001, &[5002]),
            assemble(2, 5002, &[5001, 5003]),
            assemble(3, 5003, &[5001]),
        ],
    );

    let settings = GlobalSettings::default();
    let mining = MiningSettings::default();
    let builder = TreeBuilder::new(&data, &settings, &mining).with_max_depth(usize::MAX);
    let recipe = data.recipe(1).expect("recipe");
    let result = calculate_with(&builder, recipe, 1.0).expect("calculate");

    let b = &result.root.children[0];
    assert_eq!(b.node_id, "r-1/r-2");
    assert_eq!(b.children[0].node_id, "r-1/r-2/raw-5001");
    assert!(b.children[0].is_circular_dependency);
    assert_eq!(b.children[0].circular_source_recipe.as_ref().map(|r| r.id), Some(2));

    let c = &b.children[1];
    assert_eq!(c.node_id, "r-1/r-2/r-3");
    assert!(!c.is_raw_material);
    assert_eq!(c.children[0].node_id, "r-1/r-2/r-3/raw-5001");
    assert!(c.children[0].is_circular_dependency);

    assert!(result.raw_materials.is_empty());
    assert_eq!(all_nodes(&result).len(), 5);
}

// ===========================================================================
// Whole-tree invariants
// ===========================================================================

#[test]
fn node_power_and_belts_are_consistent() {
    let data = sample_game_data();
    let settings = GlobalSettings {
        proliferator: ProliferatorConfig::new(ProliferatorType::Mk2, ProliferatorMode::Speed),
        ..GlobalSettings::default()
    };
    let result = run(&data, 67, 0.5, &settings);

    let mut machines = 0;
    let mut power = 0.0;
    for node in all_nodes(&result) {
        let p = node.power;
        assert!(approx(p.total, p.machines + p.sorters + p.dyson_sphere));
        let b = &node.conveyor_belts;
        assert_eq!(b.total, b.inputs + b.outputs);
        if node.is_raw_material {
            assert_eq!(node.machine_count, 0);
        }
        machines += node.machine_count;
        power += p.total;
    }
    assert_eq!(result.total_machines, machines);
    assert!(approx(result.total_power.total, power));
}

#[test]
fn node_override_changes_only_that_node() {
    let data = sample_game_data();
    let settings = GlobalSettings::default();
    let mut overrides = NodeOverrides::new();
    overrides.insert(
        "r-9/r-50".to_string(),
        NodeOverrideSettings {
            proliferator: None,
            machine_rank: Some("mk3".to_string()),
        },
    );

    let recipe = data.recipe(9).expect("recipe");
    let mining = MiningSettings::default();
    let result =
        calculate_production_chain(recipe, 1.0, &data, &settings, Some(&overrides), &mining)
            .expect("calculate");

    let boards = result.root.children.iter().find(|c| c.node_id == "r-9/r-50").expect("boards");
    assert_eq!(boards.machine.as_ref().map(|m| m.id), Some(2305));
    let coils = result.root.children.iter().find(|c| c.node_id == "r-9/r-6").expect("coils");
    assert_eq!(coils.machine.as_ref().map(|m| m.id), Some(2303));
}

#[test]
fn photon_receivers_draw_sphere_power() {
    let data = sample_game_data();
    let settings = GlobalSettings {
        photon: Some(PhotonSettings {
            graviton_lens: false,
            continuous_reception: 100.0,
            ray_transmission_level: 0,
        }),
        ..GlobalSettings::default()
    };
    let result = run(&data, 75, 1.0, &settings);

    // 0.1 photons/s per receiver with continuous reception
    assert_eq!(result.root.machine_count, 10);
    assert!(approx(result.root.power.machines, 0.0));
    assert!(approx(result.root.power.sorters, 0.0));
    assert!(result.root.power.dyson_sphere > 0.0);
    assert!(result.root.children.is_empty());
}

#[test]
fn depth_limit_is_an_error() {
    let data = sample_game_data();
    let settings = GlobalSettings::default();
    let mining = MiningSettings::default();
    let builder = TreeBuilder::new(&data, &settings, &mining).with_max_depth(1);
    let recipe = data.recipe(9).expect("recipe");

    let err = calculate_with(&builder, recipe, 1.0).expect_err("too deep");
    assert!(matches!(err, CalcError::DepthExceeded { depth: 2, max_depth: 1, .. }));
}

#[test]
fn empty_catalog_has_no_machine() {
    let data = one_step_catalog(10000, 60, 1.0);
    let recipe = data.recipe(1).expect("recipe").clone();
    let empty = GameData::new(Vec::new(), Vec::new(), vec![recipe.clone()]);

    let err = calculate_production_chain(
        &recipe,
        1.0,
        &empty,
        &GlobalSettings::default(),
        None,
        &MiningSettings::default(),
    )
    .expect_err("no machines");
    assert!(matches!(err, CalcError::NoMachine(RecipeType::Smelt)));
}

#[test]
fn result_serializes_to_json() {
    let data = sample_game_data();
    let result = run(&data, 6, 1.0, &GlobalSettings::default());
    let json = serde_json::to_value(&result).expect("json");

    assert_eq!(json["root"]["node_id"], "r-6");
    assert_eq!(json["total_machines"], result.total_machines);
}
