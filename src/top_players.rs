use std::collections::HashMap;

use crate::models::{FactPlayerPerformance, PlayerDimension, TopPlayer};

pub const DEFAULT_TOP_N: usize = 10;

/// One row of the fact x player-dimension join, before ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankCandidate {
    pub player_id: i64,
    pub name: String,
    pub team: String,
    pub composite_score: f64,
}

/// Inner join on player id, preserving fact order. Facts without a player row are dropped.
pub fn join_facts_with_players(
    facts: &[FactPlayerPerformance],
    players: &[PlayerDimension],
) -> Vec<RankCandidate> {
    let by_id: HashMap<i64, &PlayerDimension> = players.iter().map(|p| (p.player_id, p)).collect();
    facts
        .iter()
        .filter_map(|f| {
            let p = by_id.get(&f.player_id)?;
            Some(RankCandidate {
                player_id: f.player_id,
                name: p.name.clone(),
                team: p.team.clone(),
                composite_score: f.composite_score,
            })
        })
        .collect()
}

/// Sort by score descending and keep the first `n`, ranked 1..=n.
///
/// Ties break on player id ascending; equal ids keep their incoming order.
pub fn rank_top_n(mut candidates: Vec<RankCandidate>, n: usize) -> Vec<TopPlayer> {
    candidates.sort_by(|a, b| {
        b.composite_score
            .total_cmp(&a.composite_score)
            .then_with(|| a.player_id.cmp(&b.player_id))
    });
    candidates
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(idx, c)| TopPlayer {
            rank: idx as i64 + 1,
            player_id: c.player_id,
            name: c.name,
            team: c.team,
            composite_score: c.composite_score,
        })
        .collect()
}
