use crate::models::{ConformedPlayer, FactPlayerPerformance, RUN_DATE_ID};

pub const PASS_ACCURACY_WEIGHT: f64 = 0.4;
pub const SHOTS_ON_TARGET_WEIGHT: f64 = 0.3;
pub const SAVES_WEIGHT: f64 = 0.3;

pub fn composite_score(player: &ConformedPlayer) -> f64 {
    player.pass_accuracy * PASS_ACCURACY_WEIGHT
        + player.shots_on_target as f64 * SHOTS_ON_TARGET_WEIGHT
        + player.saves as f64 * SAVES_WEIGHT
}

/// Build one fact per player.
///
/// `ranking` is the 1-based position in `players`, NOT the position by score. The
/// materialized Top-N view ranks by score, so the two disagree whenever the input is
/// not already sorted. This mirrors how existing Gold data was produced and is most
/// likely unintended; callers wanting a score rank should read the Top-N view.
pub fn build_facts(players: &[ConformedPlayer]) -> Vec<FactPlayerPerformance> {
    players
        .iter()
        .enumerate()
        .map(|(idx, p)| FactPlayerPerformance {
            fact_id: None,
            player_id: p.id,
            performance_id: p.id,
            discipline_id: p.id,
            value_id: p.id,
            date_id: RUN_DATE_ID,
            composite_score: composite_score(p),
            ranking: idx as i64 + 1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: i64, pass_accuracy: f64, shots_on_target: i64, saves: i64) -> ConformedPlayer {
        ConformedPlayer {
            id,
            name: format!("P{id}"),
            position: "Midfielder".to_string(),
            team: "River Plate".to_string(),
            market_value_usd: 1.0,
            passes: 0,
            pass_accuracy,
            shots: 0,
            shots_on_target,
            saves,
            fouls: 0,
            yellow_cards: 0,
            red_cards: 0,
        }
    }

    #[test]
    fn composite_score_uses_fixed_weights() {
        let score = composite_score(&player(1, 80.0, 5, 3));
        assert!((score - 34.4).abs() < 1e-9, "score={score}");
    }

    #[test]
    fn ranking_follows_input_order_not_score() {
        let players = vec![
            player(10, 20.0, 0, 0),
            player(11, 95.0, 9, 0),
            player(12, 50.0, 1, 0),
        ];
        let facts = build_facts(&players);
        let rankings: Vec<i64> = facts.iter().map(|f| f.ranking).collect();
        assert_eq!(rankings, vec![1, 2, 3]);
        // Highest score sits at input position 2 and keeps ranking 2.
        assert_eq!(facts[1].player_id, 11);
        assert_eq!(facts[1].ranking, 2);
        assert!(facts[1].composite_score > facts[0].composite_score);
    }

    #[test]
    fn facts_reference_player_keys_and_shared_date() {
        let facts = build_facts(&[player(5, 60.0, 2, 1), player(9, 70.0, 0, 4)]);
        for f in &facts {
            assert_eq!(f.performance_id, f.player_id);
            assert_eq!(f.discipline_id, f.player_id);
            assert_eq!(f.value_id, f.player_id);
            assert_eq!(f.date_id, 1);
            assert!(f.fact_id.is_none());
        }
    }
}
