//! Read-only access to the Silver and Gold layers.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::gold::GoldStore;
use crate::models::{ConformedPlayer, FactPlayerPerformance, TopPlayer};
use crate::rates::RateProvider;
use crate::search::{PlayerSearch, SearchIndex, filter_players};
use crate::store::{FactStore, PlayerStore};

pub const DEFAULT_RANKING_LIMIT: usize = 10;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub player_id: i64,
    pub market_value_usd: f64,
    pub exchange_rate: f64,
    pub market_value_ars: f64,
    pub used_fallback: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchSource {
    Index,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub source: SearchSource,
    pub players: Vec<ConformedPlayer>,
}

pub struct QueryService<'a> {
    silver: &'a dyn PlayerStore,
    gold: &'a GoldStore,
    rates: &'a dyn RateProvider,
    search: Option<&'a dyn SearchIndex>,
}

impl<'a> QueryService<'a> {
    pub fn new(
        silver: &'a dyn PlayerStore,
        gold: &'a GoldStore,
        rates: &'a dyn RateProvider,
        search: Option<&'a dyn SearchIndex>,
    ) -> Self {
        Self {
            silver,
            gold,
            rates,
            search,
        }
    }

    pub fn list_players(&self) -> Result<Vec<ConformedPlayer>, QueryError> {
        Ok(self.silver.list_all()?)
    }

    pub fn get_player(&self, id: i64) -> Result<ConformedPlayer, QueryError> {
        self.silver
            .get(id)?
            .ok_or(QueryError::NotFound { entity: "player", id })
    }

    /// Facts with the highest composite score first.
    pub fn ranking(&self, limit: usize) -> Result<Vec<FactPlayerPerformance>, QueryError> {
        Ok(self.gold.top_by_score(limit)?)
    }

    /// Materialized Top-N view, by rank.
    pub fn top_players(&self) -> Result<Vec<TopPlayer>, QueryError> {
        Ok(self.gold.top_players()?)
    }

    pub fn price_in_ars(&self, id: i64) -> Result<PriceQuote, QueryError> {
        let player = self.get_player(id)?;
        let quote = self.rates.quote();
        Ok(PriceQuote {
            player_id: player.id,
            market_value_usd: player.market_value_usd,
            exchange_rate: quote.rate,
            market_value_ars: round_cents(player.market_value_usd * quote.rate),
            used_fallback: quote.used_fallback(),
        })
    }

    /// Ask the index first; on error or zero hits filter the Silver rows in memory.
    pub fn search(&self, query: PlayerSearch) -> Result<SearchOutcome, QueryError> {
        let query = query.normalized();
        let players = self.silver.list_all()?;

        if let Some(index) = self.search {
            match index.search(&query) {
                Ok(ids) if !ids.is_empty() => {
                    let by_id: HashMap<i64, &ConformedPlayer> =
                        players.iter().map(|p| (p.id, p)).collect();
                    let hits: Vec<ConformedPlayer> = ids
                        .iter()
                        .filter_map(|id| by_id.get(id).map(|p| (*p).clone()))
                        .collect();
                    if !hits.is_empty() {
                        return Ok(SearchOutcome {
                            source: SearchSource::Index,
                            players: hits,
                        });
                    }
                    debug!("index hits not present in silver, filtering locally");
                }
                Ok(_) => debug!("index returned no hits, filtering locally"),
                Err(err) => warn!(error = %err, "search index failed, filtering locally"),
            }
        }

        Ok(SearchOutcome {
            source: SearchSource::Fallback,
            players: filter_players(&players, &query),
        })
    }
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
