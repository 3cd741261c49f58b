use chrono::{Local, NaiveDate};

use crate::models::{
    ConformedPlayer, DateDimension, DisciplineDimension, PerformanceDimension, PlayerDimension,
    ValueDimension,
};

/// The five Gold dimension sets derived from one Silver snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dimensions {
    pub players: Vec<PlayerDimension>,
    pub performances: Vec<PerformanceDimension>,
    pub disciplines: Vec<DisciplineDimension>,
    pub values: Vec<ValueDimension>,
    pub dates: Vec<DateDimension>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DimensionCounts {
    pub players: usize,
    pub performances: usize,
    pub disciplines: usize,
    pub values: usize,
    pub dates: usize,
}

impl Dimensions {
    pub fn counts(&self) -> DimensionCounts {
        DimensionCounts {
            players: self.players.len(),
            performances: self.performances.len(),
            disciplines: self.disciplines.len(),
            values: self.values.len(),
            dates: self.dates.len(),
        }
    }
}

/// Build dimensions dated with today's local date.
pub fn build_dimensions(players: &[ConformedPlayer], rate: f64) -> Dimensions {
    build_dimensions_on(players, rate, Local::now().date_naive())
}

/// Build one row per player in each keyed dimension plus a single date row.
///
/// Every dimension key is the player's id. `rate` is snapshotted into each value row.
pub fn build_dimensions_on(players: &[ConformedPlayer], rate: f64, run_date: NaiveDate) -> Dimensions {
    let mut dims = Dimensions {
        players: Vec::with_capacity(players.len()),
        performances: Vec::with_capacity(players.len()),
        disciplines: Vec::with_capacity(players.len()),
        values: Vec::with_capacity(players.len()),
        dates: Vec::with_capacity(1),
    };

    for p in players {
        dims.players.push(PlayerDimension {
            player_id: p.id,
            name: p.name.clone(),
            position: p.position.clone(),
            team: p.team.clone(),
        });
        dims.performances.push(PerformanceDimension {
            performance_id: p.id,
            passes: p.passes,
            pass_accuracy: p.pass_accuracy,
            shots: p.shots,
            shots_on_target: p.shots_on_target,
            saves: p.saves,
        });
        dims.disciplines.push(DisciplineDimension {
            discipline_id: p.id,
            fouls: p.fouls,
            yellow_cards: p.yellow_cards,
            red_cards: p.red_cards,
        });
        dims.values.push(ValueDimension {
            value_id: p.id,
            market_value_usd: p.market_value_usd,
            exchange_rate: rate,
            market_value_ars: p.market_value_usd * rate,
        });
    }

    dims.dates.push(DateDimension::for_run_date(run_date));
    dims
}
