//! DSP Production Calculator
//!
//! A production chain calculator for Dyson Sphere Program.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rusqlite::Connection;

use dsp_calculator::calculator::{self, calculate_with};
use dsp_calculator::constants::DEFAULT_MAX_DEPTH;
use dsp_calculator::settings::{default_config_path, Config};
use dsp_calculator::tree::TreeBuilder;
use dsp_calculator::{db, extract, sample, units};

#[derive(Parser)]
#[command(name = "dsp-calculator")]
#[command(about = "Production chain calculator for Dyson Sphere Program")]
struct Cli {
    /// Path to the SQLite database
    #[arg(short, long, default_value = "dsp_data.db")]
    database: PathBuf,

    /// Settings file (TOML); defaults to the platform config directory
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract game data from exported JSON proto files
    Extract {
        /// Directory holding Items/Machines/Recipes JSON files
        source_dir: PathBuf,

        /// Clear existing data before extraction
        #[arg(long)]
        clear: bool,
    },

    /// Calculate the production chain for a recipe
    Calc {
        /// Recipe id or name (e.g. "9" or "Electromagnetic Matrix")
        recipe: String,

        /// Target rate of the main output: 1.5, 1.5/s, 90/min, 5400/h
        #[arg(short, long, default_value = "1/s")]
        rate: String,

        /// Show the full production tree
        #[arg(short, long)]
        verbose: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Recursion limit for malformed data
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },

    /// List all recipes in the database
    ListRecipes,

    /// List all machines in the database
    ListMachines,

    /// Show details for a specific recipe
    Recipe {
        /// Recipe id or name
        id: String,
    },

    /// Write the current settings to the config file
    InitConfig,

    /// Initialize empty database with schema
    Init,

    /// Load sample data for testing (without game exports)
    LoadSample,
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::load(path),
        None => Ok(Config::load_default()),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let conn = Connection::open(&cli.database)
        .with_context(|| format!("Failed to open {}", cli.database.display()))?;
    db::init_schema(&conn)?;

    match &cli.command {
        Commands::Extract { source_dir, clear } => {
            if *clear {
                println!("Clearing existing data...");
                db::clear_game_data(&conn)?;
            }

            let stats = extract::extract_to_database(&conn, source_dir)?;
            println!("\n{}", stats);
        }

        Commands::Calc {
            recipe,
            rate,
            verbose,
            json,
            max_depth,
        } => {
            let target_rate = units::parse_rate(rate)?;
            if target_rate <= 0.0 {
                println!("No result: target rate must be above zero.");
                return Ok(());
            }

            let config = load_config(&cli)?;
            let game_data = db::load_game_data(&conn)?;
            let Some(recipe) = game_data.find_recipe(recipe) else {
                bail!("Recipe '{}' not found. Run 'extract' or 'load-sample' first.", recipe);
            };

            let builder = TreeBuilder::new(&game_data, &config.settings, &config.mining)
                .with_overrides(Some(&config.overrides))
                .with_max_depth(*max_depth);
            let result = calculate_with(&builder, recipe, target_rate)?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            if *verbose {
                println!("Production chain:\n");
                println!("{}", calculator::format_production_chain(&result.root, 0));
            }

            let summary = calculator::summarize_chain(&result, &game_data);
            println!("{}", summary);
        }

        Commands::ListRecipes => {
            let recipes = db::list_recipes(&conn)?;
            if recipes.is_empty() {
                println!("No recipes in database. Run 'extract' or 'load-sample' first.");
            } else {
                println!("{:>6} {:<30} {:<12} {:>8}", "ID", "Recipe", "Type", "Time (s)");
                println!("{}", "-".repeat(59));
                for r in recipes {
                    println!(
                        "{:>6} {:<30} {:<12} {:>8.2}",
                        r.id,
                        r.name,
                        r.recipe_type,
                        f64::from(r.time_spend) / 60.0
                    );
                }
            }
        }

        Commands::ListMachines => {
            let machines = db::list_machines(&conn)?;
            if machines.is_empty() {
                println!("No machines in database. Run 'extract' or 'load-sample' first.");
            } else {
                println!("{:>6} {:<30} {:>8} {:>12}", "ID", "Machine", "Speed", "Power (kW)");
                println!("{}", "-".repeat(59));
                for m in machines {
                    println!(
                        "{:>6} {:<30} {:>7.0}% {:>12.0}",
                        m.id,
                        m.name,
                        f64::from(m.speed) / 100.0,
                        m.work_energy_per_tick * 60.0 / 1000.0
                    );
                }
            }
        }

        Commands::Recipe { id } => {
            let Some(recipe_id) = db::find_recipe_id(&conn, id)? else {
                println!("Recipe '{}' not found", id);
                return Ok(());
            };
            let game_data = db::load_game_data(&conn)?;
            let Some(r) = game_data.recipe(recipe_id) else {
                println!("Recipe '{}' not found", id);
                return Ok(());
            };

            println!("Recipe: {}", r.name);
            println!("  ID: {}", r.id);
            println!("  Type: {}", r.recipe_type);
            println!("  Time: {:.2}s", f64::from(r.time_spend) / 60.0);
            println!("  Extra products: {}", if r.productive { "yes" } else { "no" });

            if !r.inputs.is_empty() {
                println!("  Inputs:");
                for i in &r.inputs {
                    println!("    {}x {} ({})", i.count, i.name, i.item_id);
                }
            }
            if !r.outputs.is_empty() {
                println!("  Outputs:");
                for o in &r.outputs {
                    println!("    {}x {} ({})", o.count, o.name, o.item_id);
                }
            }
        }

        Commands::InitConfig => {
            let Some(path) = cli.config.clone().or_else(default_config_path) else {
                bail!("Could not determine config directory; pass --config");
            };
            let config = if path.exists() { Config::load(&path)? } else { Config::default() };
            config.save(&path)?;
            println!("Settings written to: {}", path.display());
        }

        Commands::Init => {
            println!("Database initialized at: {}", cli.database.display());
        }

        Commands::LoadSample => {
            sample::load_sample_data(&conn)?;
            println!("Sample data loaded successfully!");
        }
    }

    Ok(())
}
