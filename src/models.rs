use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Single shared date row every fact points at.
pub const RUN_DATE_ID: i64 = 1;

/// One cleaned row per player in the Silver layer.
///
/// `id` is reused verbatim as the key of every Gold dimension row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConformedPlayer {
    pub id: i64,
    pub name: String,
    pub position: String,
    pub team: String,
    pub market_value_usd: f64,
    pub passes: i64,
    pub pass_accuracy: f64,
    pub shots: i64,
    pub shots_on_target: i64,
    pub saves: i64,
    pub fouls: i64,
    pub yellow_cards: i64,
    pub red_cards: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerDimension {
    pub player_id: i64,
    pub name: String,
    pub position: String,
    pub team: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceDimension {
    pub performance_id: i64,
    pub passes: i64,
    pub pass_accuracy: f64,
    pub shots: i64,
    pub shots_on_target: i64,
    pub saves: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisciplineDimension {
    pub discipline_id: i64,
    pub fouls: i64,
    pub yellow_cards: i64,
    pub red_cards: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueDimension {
    pub value_id: i64,
    pub market_value_usd: f64,
    pub exchange_rate: f64,
    pub market_value_ars: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateDimension {
    pub date_id: i64,
    pub date: NaiveDate,
    pub day_of_week: String,
    pub month: String,
    pub year: i32,
}

impl DateDimension {
    /// Decompose a run date into weekday/month names and calendar year.
    pub fn for_run_date(date: NaiveDate) -> Self {
        Self {
            date_id: RUN_DATE_ID,
            date,
            day_of_week: date.format("%A").to_string(),
            month: date.format("%B").to_string(),
            year: chrono::Datelike::year(&date),
        }
    }
}

/// Fact row linking a player to the five dimensions.
///
/// `fact_id` is assigned by the Gold store on insert; freshly built facts carry `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactPlayerPerformance {
    pub fact_id: Option<i64>,
    pub player_id: i64,
    pub performance_id: i64,
    pub discipline_id: i64,
    pub value_id: i64,
    pub date_id: i64,
    pub composite_score: f64,
    pub ranking: i64,
}

/// Flattened row of the materialized Top-N view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopPlayer {
    pub rank: i64,
    pub player_id: i64,
    pub name: String,
    pub team: String,
    pub composite_score: f64,
}
