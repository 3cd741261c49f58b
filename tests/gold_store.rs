use chrono::NaiveDate;

use player_market::dimensions::{Dimensions, build_dimensions_on};
use player_market::facts::build_facts;
use player_market::gold::{GoldStore, GoldTable};
use player_market::gold_export::export_gold_workbook;
use player_market::models::{ConformedPlayer, FactPlayerPerformance};
use player_market::store::FactStore;

fn player(id: i64, name: &str, team: &str, pass_accuracy: f64) -> ConformedPlayer {
    ConformedPlayer {
        id,
        name: name.to_string(),
        position: "Midfielder".to_string(),
        team: team.to_string(),
        market_value_usd: 1_000_000.0,
        passes: 500,
        pass_accuracy,
        shots: 0,
        shots_on_target: 0,
        saves: 0,
        fouls: 0,
        yellow_cards: 0,
        red_cards: 0,
    }
}

/// Pass accuracy 25/125/75/225 gives composite scores 10/50/30/90.
fn scored_players() -> Vec<ConformedPlayer> {
    vec![
        player(1, "Paredes", "Boca Juniors", 25.0),
        player(2, "De Paul", "Inter Miami", 125.0),
        player(3, "Lo Celso", "Real Betis", 75.0),
        player(4, "Almada", "Botafogo", 225.0),
    ]
}

fn dims_for(players: &[ConformedPlayer]) -> Dimensions {
    build_dimensions_on(players, 1000.0, NaiveDate::from_ymd_opt(2026, 5, 4).unwrap())
}

fn seeded_gold() -> GoldStore {
    let players = scored_players();
    let mut gold = GoldStore::open_in_memory().unwrap();
    gold.persist(&dims_for(&players), &build_facts(&players))
        .unwrap();
    gold
}

#[test]
fn top_n_ranks_by_descending_score() {
    let mut gold = seeded_gold();
    let top = gold.rebuild_top_n(10).unwrap();

    let scores: Vec<f64> = top.iter().map(|t| t.composite_score.round()).collect();
    let ranks: Vec<i64> = top.iter().map(|t| t.rank).collect();
    let ids: Vec<i64> = top.iter().map(|t| t.player_id).collect();
    assert_eq!(scores, vec![90.0, 50.0, 30.0, 10.0]);
    assert_eq!(ranks, vec![1, 2, 3, 4]);
    assert_eq!(ids, vec![4, 2, 3, 1]);
    assert_eq!(top[0].name, "Almada");
    assert_eq!(top[0].team, "Botafogo");

    assert_eq!(gold.top_players().unwrap(), top);
}

#[test]
fn rebuilding_twice_is_identical() {
    let mut gold = seeded_gold();
    gold.rebuild_top_n(10).unwrap();
    let first = serde_json::to_string(&gold.top_players().unwrap()).unwrap();
    gold.rebuild_top_n(10).unwrap();
    let second = serde_json::to_string(&gold.top_players().unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn rebuild_clears_rows_from_larger_previous_view() {
    let mut gold = seeded_gold();
    gold.rebuild_top_n(10).unwrap();
    assert_eq!(gold.count_rows(GoldTable::TopPlayers).unwrap(), 4);

    gold.rebuild_top_n(2).unwrap();
    let top = gold.top_players().unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[1].player_id, 2);
}

#[test]
fn persist_is_all_or_nothing() {
    let players = scored_players();
    let mut facts = build_facts(&players);
    // References a player with no dimension rows.
    facts.push(FactPlayerPerformance {
        fact_id: None,
        player_id: 99,
        performance_id: 99,
        discipline_id: 99,
        value_id: 99,
        date_id: 1,
        composite_score: 1.0,
        ranking: 5,
    });

    let mut gold = GoldStore::open_in_memory().unwrap();
    assert!(gold.persist(&dims_for(&players), &facts).is_err());
    assert_eq!(gold.count_rows(GoldTable::PlayerDimension).unwrap(), 0);
    assert_eq!(gold.count_rows(GoldTable::DateDimension).unwrap(), 0);
    assert_eq!(gold.count_rows(GoldTable::Facts).unwrap(), 0);
}

#[test]
fn fact_store_reads_back_assigned_ids() {
    let gold = seeded_gold();
    let facts = gold.list_all().unwrap();
    assert_eq!(facts.len(), 4);
    assert!(facts.iter().all(|f| f.fact_id.is_some()));

    let first_id = facts[0].fact_id.unwrap();
    assert_eq!(gold.get(first_id).unwrap().map(|f| f.player_id), Some(1));
    assert!(gold.get(first_id + 100).unwrap().is_none());

    let ranked: Vec<i64> = gold
        .top_by_score(2)
        .unwrap()
        .iter()
        .map(|f| f.player_id)
        .collect();
    assert_eq!(ranked, vec![4, 2]);
}

#[test]
fn reset_empties_every_table() {
    let mut gold = seeded_gold();
    gold.rebuild_top_n(10).unwrap();
    gold.reset().unwrap();
    for table in [
        GoldTable::PlayerDimension,
        GoldTable::PerformanceDimension,
        GoldTable::DisciplineDimension,
        GoldTable::ValueDimension,
        GoldTable::DateDimension,
        GoldTable::Facts,
        GoldTable::TopPlayers,
    ] {
        assert_eq!(gold.count_rows(table).unwrap(), 0, "{table:?}");
    }
}

#[test]
fn gold_file_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gold.db");
    {
        let players = scored_players();
        let mut gold = GoldStore::open(&path).unwrap();
        gold.persist(&dims_for(&players), &build_facts(&players))
            .unwrap();
        gold.rebuild_top_n(10).unwrap();
    }
    let gold = GoldStore::open(&path).unwrap();
    assert_eq!(gold.top_players().unwrap().len(), 4);
    assert_eq!(gold.date_dimensions().unwrap()[0].month, "May");
}

#[test]
fn exports_workbook() {
    let mut gold = seeded_gold();
    gold.rebuild_top_n(10).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gold.xlsx");
    let report = export_gold_workbook(&gold, &path).unwrap();
    assert_eq!(report.top_players, 4);
    assert_eq!(report.facts, 4);
    assert!(path.metadata().unwrap().len() > 0);
}
