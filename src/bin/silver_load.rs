use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};

use player_market::config::{AppConfig, load_dotenv};
use player_market::logging::init_tracing;
use player_market::search::{SearchIndex, TypesenseIndex};
use player_market::silver::SilverStore;
use player_market::store::PlayerStore;

const DEFAULT_CSV: &str = "bronze/argentina_players.csv";

fn main() -> Result<()> {
    load_dotenv();
    init_tracing();
    let cfg = AppConfig::from_env();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let csv_path = arg_value(&args, "--csv")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CSV));
    let db_path = arg_value(&args, "--db")
        .map(PathBuf::from)
        .unwrap_or(cfg.silver_db.clone());
    let replace = args.iter().any(|a| a == "--replace");
    let index = args.iter().any(|a| a == "--index");

    let mut silver = SilverStore::open(&db_path)?;
    if replace {
        let removed = silver.delete_all()?;
        println!("Cleared {removed} existing players");
    }
    let reader = File::open(&csv_path).with_context(|| format!("open {}", csv_path.display()))?;
    let loaded = silver.load_csv(reader)?;

    println!("Players loaded into silver");
    println!("DB: {}", db_path.display());
    println!("Rows: {loaded}");

    if index {
        if !cfg.search.enabled {
            println!("Search disabled (SEARCH_ENABLED); skipping index sync");
            return Ok(());
        }
        let players = silver.list_all()?;
        let search = TypesenseIndex::new(&cfg.search)?;
        search.ensure_collection()?;
        let imported = search.upsert_players(&players)?;
        println!("Indexed: {imported}/{}", players.len());
    }

    Ok(())
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
