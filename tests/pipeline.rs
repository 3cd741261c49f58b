use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use player_market::facts::composite_score;
use player_market::gold::{GoldStore, GoldTable};
use player_market::pipeline::{RunOptions, run_silver_to_gold};
use player_market::rates::FixedRate;
use player_market::silver::SilverStore;
use player_market::store::{FactStore, PlayerStore};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn loaded_silver() -> SilverStore {
    let mut silver = SilverStore::open_in_memory().expect("silver should open");
    silver
        .load_csv(read_fixture("argentina_players.csv").as_bytes())
        .expect("fixture should load");
    silver
}

fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

fn opts() -> RunOptions {
    RunOptions {
        run_date: Some(run_date()),
        ..RunOptions::default()
    }
}

#[test]
fn run_builds_star_schema_keyed_by_player_id() {
    let silver = loaded_silver();
    let mut gold = GoldStore::open_in_memory().unwrap();

    let summary = run_silver_to_gold(&silver, &mut gold, &FixedRate(1200.0), &opts()).unwrap();
    assert_eq!(summary.players, 6);
    assert_eq!(summary.facts, 6);
    assert_eq!(summary.dimensions.players, 6);
    assert_eq!(summary.dimensions.dates, 1);
    assert_eq!(summary.top_players, 6);
    assert!(!summary.rate.used_fallback());

    for table in [
        GoldTable::PlayerDimension,
        GoldTable::PerformanceDimension,
        GoldTable::DisciplineDimension,
        GoldTable::ValueDimension,
        GoldTable::Facts,
    ] {
        assert_eq!(gold.count_rows(table).unwrap(), 6, "{table:?}");
    }
    assert_eq!(gold.count_rows(GoldTable::DateDimension).unwrap(), 1);

    let dates = gold.date_dimensions().unwrap();
    assert_eq!(dates[0].date, run_date());
    assert_eq!(dates[0].day_of_week, "Friday");

    let silver_ids: Vec<i64> = silver.list_all().unwrap().iter().map(|p| p.id).collect();
    let facts = gold.list_all().unwrap();
    for f in &facts {
        assert!(silver_ids.contains(&f.player_id));
        assert_eq!(f.performance_id, f.player_id);
        assert_eq!(f.discipline_id, f.player_id);
        assert_eq!(f.value_id, f.player_id);
        assert_eq!(f.date_id, 1);
    }

    for v in gold.value_dimensions().unwrap() {
        assert_eq!(v.exchange_rate, 1200.0);
        assert_eq!(v.market_value_ars, v.market_value_usd * 1200.0);
    }
}

#[test]
fn fact_ranking_is_input_position_while_view_rank_is_score_order() {
    let silver = loaded_silver();
    let mut gold = GoldStore::open_in_memory().unwrap();
    run_silver_to_gold(&silver, &mut gold, &FixedRate(1000.0), &opts()).unwrap();

    let players = silver.list_all().unwrap();
    let facts = gold.list_all().unwrap();
    for (idx, (p, f)) in players.iter().zip(&facts).enumerate() {
        assert_eq!(f.player_id, p.id);
        assert_eq!(f.ranking, idx as i64 + 1);
    }
    // Third input row is Enzo Fernandez.
    assert_eq!(facts[2].player_id, 24);
    assert_eq!(facts[2].ranking, 3);

    // Martinez (88 saves) tops the score-ordered view despite input position 2.
    let top = gold.top_players().unwrap();
    assert_eq!(top[0].player_id, 23);
    assert_eq!(top[0].rank, 1);
    let martinez = facts.iter().find(|f| f.player_id == 23).unwrap();
    assert_eq!(martinez.ranking, 2);

    let scores: Vec<f64> = top.iter().map(|t| t.composite_score).collect();
    let mut sorted = scores.clone();
    sorted.sort_by(|a, b| b.total_cmp(a));
    assert_eq!(scores, sorted);
    let ranks: Vec<i64> = top.iter().map(|t| t.rank).collect();
    assert_eq!(ranks, (1..=6).collect::<Vec<i64>>());

    let expected = composite_score(&silver.get(23).unwrap().unwrap());
    assert_eq!(top[0].composite_score, expected);
}

#[test]
fn rerun_replaces_gold_instead_of_appending() {
    let silver = loaded_silver();
    let mut gold = GoldStore::open_in_memory().unwrap();
    run_silver_to_gold(&silver, &mut gold, &FixedRate(1000.0), &opts()).unwrap();
    run_silver_to_gold(&silver, &mut gold, &FixedRate(1500.0), &opts()).unwrap();

    assert_eq!(gold.count_rows(GoldTable::Facts).unwrap(), 6);
    assert_eq!(gold.count_rows(GoldTable::DateDimension).unwrap(), 1);
    assert!(
        gold.value_dimensions()
            .unwrap()
            .iter()
            .all(|v| v.exchange_rate == 1500.0)
    );
}

#[test]
fn append_onto_populated_gold_fails_and_keeps_prior_rows() {
    let silver = loaded_silver();
    let mut gold = GoldStore::open_in_memory().unwrap();
    run_silver_to_gold(&silver, &mut gold, &FixedRate(1000.0), &opts()).unwrap();
    let before = gold.top_players().unwrap();

    let append = RunOptions {
        replace_gold: false,
        ..opts()
    };
    let err = run_silver_to_gold(&silver, &mut gold, &FixedRate(1100.0), &append);
    assert!(err.is_err());

    assert_eq!(gold.count_rows(GoldTable::Facts).unwrap(), 6);
    assert!(
        gold.value_dimensions()
            .unwrap()
            .iter()
            .all(|v| v.exchange_rate == 1000.0)
    );
    assert_eq!(gold.top_players().unwrap(), before);
}

#[test]
fn empty_silver_still_writes_single_date_row() {
    let silver = SilverStore::open_in_memory().unwrap();
    let mut gold = GoldStore::open_in_memory().unwrap();
    let summary = run_silver_to_gold(&silver, &mut gold, &FixedRate(1000.0), &opts()).unwrap();

    assert_eq!(summary.facts, 0);
    assert_eq!(summary.top_players, 0);
    assert_eq!(gold.count_rows(GoldTable::DateDimension).unwrap(), 1);
    assert!(gold.top_players().unwrap().is_empty());
}

#[test]
fn top_n_option_limits_view() {
    let silver = loaded_silver();
    let mut gold = GoldStore::open_in_memory().unwrap();
    let small = RunOptions {
        top_n: 3,
        ..opts()
    };
    let summary = run_silver_to_gold(&silver, &mut gold, &FixedRate(1000.0), &small).unwrap();
    assert_eq!(summary.top_players, 3);
    assert_eq!(gold.count_rows(GoldTable::TopPlayers).unwrap(), 3);
}
