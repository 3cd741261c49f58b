use std::path::PathBuf;

use anyhow::Result;

use player_market::config::{AppConfig, load_dotenv};
use player_market::gold::GoldStore;
use player_market::gold_export::export_gold_workbook;
use player_market::logging::init_tracing;
use player_market::pipeline::{RunOptions, run_silver_to_gold};
use player_market::rates::{DolarApiRates, RateSource};
use player_market::silver::SilverStore;

fn main() -> Result<()> {
    load_dotenv();
    init_tracing();
    let cfg = AppConfig::from_env();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let silver_path = arg_value(&args, "--silver")
        .map(PathBuf::from)
        .unwrap_or(cfg.silver_db.clone());
    let gold_path = arg_value(&args, "--gold")
        .map(PathBuf::from)
        .unwrap_or(cfg.gold_db.clone());
    let top_n = arg_value(&args, "--top-n")
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(cfg.top_n);
    let export = arg_value(&args, "--export").map(PathBuf::from);

    let silver = SilverStore::open(&silver_path)?;
    let mut gold = GoldStore::open(&gold_path)?;
    let rates = DolarApiRates::new(&cfg.rates)?;

    let opts = RunOptions {
        top_n,
        replace_gold: !args.iter().any(|a| a == "--append"),
        run_date: None,
    };
    let summary = run_silver_to_gold(&silver, &mut gold, &rates, &opts)?;

    println!("Silver -> Gold complete");
    println!("Gold DB: {}", gold_path.display());
    println!("Run date: {}", summary.run_date);
    match &summary.rate.source {
        RateSource::Live => println!("USD/ARS rate: {} (live)", summary.rate.rate),
        RateSource::Fallback { reason } => {
            println!("USD/ARS rate: {} (fallback: {reason})", summary.rate.rate)
        }
    }
    println!("Players: {}", summary.players);
    println!(
        "Dimensions: player={} performance={} discipline={} value={} date={}",
        summary.dimensions.players,
        summary.dimensions.performances,
        summary.dimensions.disciplines,
        summary.dimensions.values,
        summary.dimensions.dates
    );
    println!("Facts: {}", summary.facts);
    println!("Top players view: {} rows", summary.top_players);

    if let Some(path) = export {
        let report = export_gold_workbook(&gold, &path)?;
        println!(
            "Exported {} top players and {} facts to {}",
            report.top_players,
            report.facts,
            path.display()
        );
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
