//! Silver to Gold run: rate lookup, dimension and fact building, persistence, Top-N.
//!
//! Stages run strictly in order and each one finishes before the next begins.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::dimensions::{DimensionCounts, build_dimensions_on};
use crate::facts::build_facts;
use crate::gold::GoldStore;
use crate::rates::{RateProvider, RateQuote, RateSource};
use crate::store::PlayerStore;
use crate::top_players::DEFAULT_TOP_N;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub top_n: usize,
    /// Clear Gold before writing. Without it the batch is appended.
    pub replace_gold: bool,
    /// Override the run date; defaults to today's local date.
    pub run_date: Option<NaiveDate>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            replace_gold: true,
            run_date: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub players: usize,
    pub dimensions: DimensionCounts,
    pub facts: usize,
    pub rate: RateQuote,
    pub run_date: NaiveDate,
    pub top_players: usize,
}

pub fn run_silver_to_gold(
    silver: &dyn PlayerStore,
    gold: &mut GoldStore,
    rates: &dyn RateProvider,
    opts: &RunOptions,
) -> Result<RunSummary> {
    let players = silver.list_all().context("read silver players")?;
    info!(players = players.len(), "read silver layer");

    let rate = rates.quote();
    if let RateSource::Fallback { reason } = &rate.source {
        warn!(rate = rate.rate, %reason, "building value dimension with fallback rate");
    }

    let run_date = opts.run_date.unwrap_or_else(|| Local::now().date_naive());
    let dims = build_dimensions_on(&players, rate.rate, run_date);
    let facts = build_facts(&players);

    if opts.replace_gold {
        gold.replace(&dims, &facts).context("replace gold layer")?;
    } else {
        gold.persist(&dims, &facts).context("append gold layer")?;
    }

    let top = gold
        .rebuild_top_n(opts.top_n)
        .context("rebuild top players view")?;
    info!(top_players = top.len(), "silver to gold complete");

    Ok(RunSummary {
        players: players.len(),
        dimensions: dims.counts(),
        facts: facts.len(),
        rate,
        run_date,
        top_players: top.len(),
    })
}
