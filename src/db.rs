//! Database schema and operations

use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use rusqlite::{Connection, OptionalExtension};

use crate::game_data::GameData;
use crate::models::{Item, Machine, Recipe, RecipeId, RecipeItem, RecipeType};

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS items (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            mining_from TEXT
        );

        CREATE TABLE IF NOT EXISTS machines (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            recipe_type TEXT,
            speed INTEGER NOT NULL,
            work_energy_per_tick REAL NOT NULL,
            idle_energy_per_tick REAL NOT NULL,
            power_consumer INTEGER NOT NULL,
            power_generator INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS recipes (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            recipe_type TEXT NOT NULL,
            time_spend INTEGER NOT NULL,
            productive INTEGER NOT NULL
        );

        -- Position keeps the game's ordering; the first output is the main one
        CREATE TABLE IF NOT EXISTS recipe_inputs (
            recipe_id INTEGER,
            position INTEGER,
            item_id INTEGER NOT NULL,
            count REAL NOT NULL,
            PRIMARY KEY (recipe_id, position)
        );

        CREATE TABLE IF NOT EXISTS recipe_outputs (
            recipe_id INTEGER,
            position INTEGER,
            item_id INTEGER NOT NULL,
            count REAL NOT NULL,
            PRIMARY KEY (recipe_id, position)
        );

        CREATE INDEX IF NOT EXISTS idx_recipe_outputs_item ON recipe_outputs(item_id);
        "#,
    )?;
    Ok(())
}

/// Insert or replace an item
pub fn upsert_item(conn: &Connection, item: &Item) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO items (id, name, mining_from) VALUES (?1, ?2, ?3)",
        (item.id, &item.name, &item.mining_from),
    )?;
    Ok(())
}

/// Insert or replace a machine
pub fn upsert_machine(conn: &Connection, machine: &Machine) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO machines (id, name, recipe_type, speed, work_energy_per_tick,
             idle_energy_per_tick, power_consumer, power_generator)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        (
            machine.id,
            &machine.name,
            machine.recipe_type.map(|t| t.as_str()),
            machine.speed,
            machine.work_energy_per_tick,
            machine.idle_energy_per_tick,
            machine.power_consumer,
            machine.power_generator,
        ),
    )?;
    Ok(())
}

/// Insert or replace a recipe together with its input and output lists.
///
/// All rows go in one transaction; a failure leaves the previous recipe intact.
pub fn insert_recipe(conn: &Connection, recipe: &Recipe) -> Result<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "INSERT OR REPLACE INTO recipes (id, name, recipe_type, time_spend, productive)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            recipe.id,
            &recipe.name,
            recipe.recipe_type.as_str(),
            recipe.time_spend,
            recipe.productive,
        ),
    )?;

    tx.execute("DELETE FROM recipe_inputs WHERE recipe_id = ?1", [recipe.id])?;
    tx.execute("DELETE FROM recipe_outputs WHERE recipe_id = ?1", [recipe.id])?;

    for (position, input) in recipe.inputs.iter().enumerate() {
        tx.execute(
            "INSERT INTO recipe_inputs (recipe_id, position, item_id, count) VALUES (?1, ?2, ?3, ?4)",
            (recipe.id, position as i64, input.item_id, input.count),
        )?;
    }
    for (position, output) in recipe.outputs.iter().enumerate() {
        tx.execute(
            "INSERT INTO recipe_outputs (recipe_id, position, item_id, count) VALUES (?1, ?2, ?3, ?4)",
            (recipe.id, position as i64, output.item_id, output.count),
        )?;
    }

    tx.commit()?;
    Ok(())
}

/// Clear all game data (for re-extraction)
pub fn clear_game_data(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM recipe_outputs;
        DELETE FROM recipe_inputs;
        DELETE FROM recipes;
        DELETE FROM machines;
        DELETE FROM items;
        "#,
    )?;
    Ok(())
}

fn parse_recipe_type(raw: String) -> Result<RecipeType> {
    raw.parse::<RecipeType>().map_err(|e| anyhow!(e))
}

/// List all items
pub fn list_items(conn: &Connection) -> Result<Vec<Item>> {
    let mut stmt = conn.prepare("SELECT id, name, mining_from FROM items ORDER BY id")?;

    let rows = stmt.query_map([], |row| {
        Ok(Item {
            id: row.get(0)?,
            name: row.get(1)?,
            mining_from: row.get(2)?,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// List all machines in the database
pub fn list_machines(conn: &Connection) -> Result<Vec<Machine>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, recipe_type, speed, work_energy_per_tick, idle_energy_per_tick,
                power_consumer, power_generator
         FROM machines ORDER BY id",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, u32>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, u32>(3)?,
            row.get::<_, f64>(4)?,
            row.get::<_, f64>(5)?,
            row.get::<_, bool>(6)?,
            row.get::<_, bool>(7)?,
        ))
    })?;

    let mut results = Vec::new();
    for row in rows {
        let (id, name, recipe_type, speed, work, idle, consumer, generator) = row?;
        results.push(Machine {
            id,
            name,
            recipe_type: recipe_type.map(parse_recipe_type).transpose()?,
            speed,
            work_energy_per_tick: work,
            idle_energy_per_tick: idle,
            power_consumer: consumer,
            power_generator: generator,
        });
    }
    Ok(results)
}

fn load_recipe_items(conn: &Connection, table: &str) -> Result<HashMap<RecipeId, Vec<RecipeItem>>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT ri.recipe_id, ri.item_id, COALESCE(i.name, 'Item ' || ri.item_id), ri.count
         FROM {table} ri
         LEFT JOIN items i ON i.id = ri.item_id
         ORDER BY ri.recipe_id, ri.position"
    ))?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, RecipeId>(0)?,
            RecipeItem {
                item_id: row.get(1)?,
                name: row.get(2)?,
                count: row.get(3)?,
            },
        ))
    })?;

    let mut by_recipe: HashMap<RecipeId, Vec<RecipeItem>> = HashMap::new();
    for row in rows {
        let (recipe_id, entry) = row?;
        by_recipe.entry(recipe_id).or_default().push(entry);
    }
    Ok(by_recipe)
}

/// List all recipes with their inputs and outputs, in catalog (SID) order
pub fn list_recipes(conn: &Connection) -> Result<Vec<Recipe>> {
    let mut inputs = load_recipe_items(conn, "recipe_inputs")?;
    let mut outputs = load_recipe_items(conn, "recipe_outputs")?;

    let mut stmt =
        conn.prepare("SELECT id, name, recipe_type, time_spend, productive FROM recipes ORDER BY id")?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, RecipeId>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, u32>(3)?,
            row.get::<_, bool>(4)?,
        ))
    })?;

    let mut results = Vec::new();
    for row in rows {
        let (id, name, recipe_type, time_spend, productive) = row?;
        let recipe_type =
            parse_recipe_type(recipe_type).with_context(|| format!("Recipe {} ({})", id, name))?;
        results.push(Recipe {
            id,
            name,
            recipe_type,
            time_spend,
            inputs: inputs.remove(&id).unwrap_or_default(),
            outputs: outputs.remove(&id).unwrap_or_default(),
            productive,
        });
    }
    Ok(results)
}

/// Load the whole catalog into memory
pub fn load_game_data(conn: &Connection) -> Result<GameData> {
    Ok(GameData::new(
        list_items(conn)?,
        list_machines(conn)?,
        list_recipes(conn)?,
    ))
}

/// Find the recipe id matching an id or a (case-insensitive) name
pub fn find_recipe_id(conn: &Connection, query: &str) -> Result<Option<RecipeId>> {
    if let Ok(id) = query.trim().parse::<RecipeId>() {
        let found: Option<RecipeId> = conn
            .query_row("SELECT id FROM recipes WHERE id = ?1", [id], |row| row.get(0))
            .optional()?;
        if found.is_some() {
            return Ok(found);
        }
    }

    let found = conn
        .query_row(
            "SELECT id FROM recipes WHERE name = ?1 COLLATE NOCASE ORDER BY id LIMIT 1",
            [query.trim()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::{load_sample_data, sample_recipes};

    fn sample_db() -> Connection {
        let conn = Connection::open_in_memory().expect("open");
        init_schema(&conn).expect("schema");
        load_sample_data(&conn).expect("sample");
        conn
    }

    #[test]
    fn test_recipes_survive_storage() {
        let conn = sample_db();
        let stored = list_recipes(&conn).expect("list");
        let mut expected = sample_recipes();
        expected.sort_by_key(|r| r.id);
        assert_eq!(stored, expected);
    }

    #[test]
    fn test_load_game_data_indexes_producers() {
        let conn = sample_db();
        let data = load_game_data(&conn).expect("load");
        let producers: Vec<_> = data.producers(1109).iter().map(|r| r.id).collect();
        assert_eq!(producers, vec![17, 58]);
        assert_eq!(data.machine(2901).map(|m| m.speed), Some(0));
        assert_eq!(
            data.item(1001).and_then(|i| i.mining_from.clone()).as_deref(),
            Some("Iron vein")
        );
    }

    #[test]
    fn test_find_recipe_id() {
        let conn = sample_db();
        assert_eq!(find_recipe_id(&conn, "58").expect("query"), Some(58));
        assert_eq!(find_recipe_id(&conn, "x-ray cracking").expect("query"), Some(58));
        assert_eq!(find_recipe_id(&conn, "Antimatter").expect("query"), None);
    }

    #[test]
    fn test_clear_game_data() {
        let conn = sample_db();
        clear_game_data(&conn).expect("clear");
        assert!(list_recipes(&conn).expect("list").is_empty());
        assert!(list_machines(&conn).expect("list").is_empty());
    }

    #[test]
    fn test_failed_recipe_insert_rolls_back() {
        let conn = sample_db();
        let before = list_recipes(&conn).expect("list");
        let mut magnet = before.iter().find(|r| r.id == 2).expect("magnet").clone();
        magnet.name = "Half Written Magnet".to_string();
        magnet.inputs[0].count = 5.0;

        // Outputs are written last; make them fail after inputs went in
        conn.execute_batch(
            "CREATE TRIGGER reject_outputs BEFORE INSERT ON recipe_outputs
             BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .expect("trigger");
        assert!(insert_recipe(&conn, &magnet).is_err());

        conn.execute_batch("DROP TRIGGER reject_outputs").expect("drop");
        assert_eq!(list_recipes(&conn).expect("list"), before);
    }

    #[test]
    fn test_unknown_item_name_falls_back() {
        let conn = sample_db();
        let recipe = Recipe {
            id: 999,
            name: "Mystery".to_string(),
            recipe_type: RecipeType::Assemble,
            time_spend: 60,
            inputs: vec![RecipeItem {
                item_id: 4242,
                name: "ignored".to_string(),
                count: 1.0,
            }],
            outputs: vec![],
            productive: false,
        };
        insert_recipe(&conn, &recipe).expect("insert");
        let stored = list_recipes(&conn).expect("list");
        let mystery = stored.iter().find(|r| r.id == 999).expect("stored");
        assert_eq!(mystery.inputs[0].name, "Item 4242");
        assert!(mystery.outputs.is_empty());
    }
}
