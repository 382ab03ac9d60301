//! In-memory game data catalog

use std::collections::{BTreeMap, HashMap};

use crate::models::{Item, ItemId, Machine, MachineId, Recipe, RecipeId};

/// Read-only catalog of items, machines and recipes, with producers indexed by item.
#[derive(Debug, Clone, Default)]
pub struct GameData {
    /// Catalog order
    recipes: Vec<Recipe>,
    by_id: HashMap<RecipeId, usize>,
    recipes_by_item_id: HashMap<ItemId, Vec<usize>>,
    machines: BTreeMap<MachineId, Machine>,
    items: HashMap<ItemId, Item>,
}

impl GameData {
    pub fn new(items: Vec<Item>, machines: Vec<Machine>, recipes: Vec<Recipe>) -> Self {
        let mut by_id = HashMap::new();
        let mut recipes_by_item_id: HashMap<ItemId, Vec<usize>> = HashMap::new();

        for (i, recipe) in recipes.iter().enumerate() {
            by_id.insert(recipe.id, i);
            for output in &recipe.outputs {
                let producers = recipes_by_item_id.entry(output.item_id).or_default();
                if !producers.contains(&i) {
                    producers.push(i);
                }
            }
        }

        Self {
            recipes,
            by_id,
            recipes_by_item_id,
            machines: machines.into_iter().map(|m| (m.id, m)).collect(),
            items: items.into_iter().map(|i| (i.id, i)).collect(),
        }
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn recipe(&self, id: RecipeId) -> Option<&Recipe> {
        self.by_id.get(&id).map(|&i| &self.recipes[i])
    }

    /// Recipes that list `item_id` among their outputs, in catalog order
    pub fn producers(&self, item_id: ItemId) -> Vec<&Recipe> {
        self.recipes_by_item_id
            .get(&item_id)
            .map(|indices| indices.iter().map(|&i| &self.recipes[i]).collect())
            .unwrap_or_default()
    }

    pub fn machine(&self, id: MachineId) -> Option<&Machine> {
        self.machines.get(&id)
    }

    /// Lowest-id machine in the catalog
    pub fn first_machine(&self) -> Option<&Machine> {
        self.machines.values().next()
    }

    pub fn machines(&self) -> impl Iterator<Item = &Machine> {
        self.machines.values()
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn item_name(&self, id: ItemId) -> String {
        self.item(id)
            .map(|i| i.name.clone())
            .unwrap_or_else(|| format!("Item {}", id))
    }

    /// Look a recipe up by SID or, failing that, by case-insensitive name
    pub fn find_recipe(&self, query: &str) -> Option<&Recipe> {
        if let Ok(id) = query.trim().parse::<RecipeId>() {
            if let Some(recipe) = self.recipe(id) {
                return Some(recipe);
            }
        }
        self.recipes
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(query.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_game_data;

    #[test]
    fn test_producers_in_catalog_order() {
        let data = sample_game_data();
        let producers: Vec<_> = data.producers(1120).iter().map(|r| r.id).collect();
        assert_eq!(producers, vec![16, 58]);
    }

    #[test]
    fn test_unknown_item_has_no_producers() {
        let data = sample_game_data();
        assert!(data.producers(1001).is_empty());
        assert!(data.producers(424242).is_empty());
    }

    #[test]
    fn test_find_recipe_by_id_or_name() {
        let data = sample_game_data();
        assert_eq!(data.find_recipe("1").map(|r| r.id), Some(1));
        assert_eq!(data.find_recipe("magnetic coil").map(|r| r.id), Some(6));
        assert!(data.find_recipe("Dyson Sphere").is_none());
    }

    #[test]
    fn test_first_machine_is_lowest_id() {
        let data = sample_game_data();
        assert_eq!(data.first_machine().map(|m| m.id), Some(2208));
        assert!(GameData::default().first_machine().is_none());
    }
}
