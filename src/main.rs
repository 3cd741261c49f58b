use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use serde::Serialize;

use player_market::config::{AppConfig, load_dotenv};
use player_market::gold::GoldStore;
use player_market::logging::init_tracing;
use player_market::query::{DEFAULT_RANKING_LIMIT, QueryError, QueryService};
use player_market::rates::DolarApiRates;
use player_market::search::{PlayerSearch, SearchIndex, TypesenseIndex};
use player_market::silver::SilverStore;

const USAGE: &str = "usage: player_market <command>
  players                    list all silver players
  player <id>                one silver player
  ranking [--limit N]        facts by composite score
  top                        materialized top players view
  price <id>                 market value in ARS
  search [--name X] [--position Y] [--team Z]";

fn main() -> ExitCode {
    load_dotenv();
    init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(QueryError::NotFound { .. }) = err.downcast_ref::<QueryError>() {
                eprintln!("{err}");
                return ExitCode::from(4);
            }
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cfg = AppConfig::from_env();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let Some(command) = args.first() else {
        return Err(anyhow!(USAGE));
    };

    let silver = SilverStore::open(&cfg.silver_db)?;
    let gold = GoldStore::open(&cfg.gold_db)?;
    let rates = DolarApiRates::new(&cfg.rates)?;
    let index = if cfg.search.enabled {
        TypesenseIndex::new(&cfg.search).ok()
    } else {
        None
    };
    let service = QueryService::new(
        &silver,
        &gold,
        &rates,
        index.as_ref().map(|i| i as &dyn SearchIndex),
    );

    match command.as_str() {
        "players" => print_json(&service.list_players()?),
        "player" => print_json(&service.get_player(id_arg(&args)?)?),
        "ranking" => {
            let limit = arg_value(&args, "--limit")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(DEFAULT_RANKING_LIMIT);
            print_json(&service.ranking(limit)?)
        }
        "top" => print_json(&service.top_players()?),
        "price" => print_json(&service.price_in_ars(id_arg(&args)?)?),
        "search" => {
            let query = PlayerSearch {
                name: arg_value(&args, "--name"),
                position: arg_value(&args, "--position"),
                team: arg_value(&args, "--team"),
            };
            print_json(&service.search(query)?)
        }
        other => Err(anyhow!("unknown command {other:?}\n{USAGE}")),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{out}");
    Ok(())
}

fn id_arg(args: &[String]) -> Result<i64> {
    let raw = args.get(1).ok_or_else(|| anyhow!("missing player id\n{USAGE}"))?;
    raw.trim()
        .parse::<i64>()
        .with_context(|| format!("invalid player id {raw:?}"))
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
