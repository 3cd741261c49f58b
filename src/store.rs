//! Narrow per-entity store capabilities.
//!
//! The pipeline and query layer only see these traits; SQLite backs them in practice and
//! `MemoryPlayerStore` backs them in tests and benches.

use anyhow::{Result, anyhow};

use crate::models::{ConformedPlayer, FactPlayerPerformance};

pub trait PlayerStore {
    fn list_all(&self) -> Result<Vec<ConformedPlayer>>;
    fn get(&self, id: i64) -> Result<Option<ConformedPlayer>>;
    /// Insert all rows or none.
    fn insert_batch(&mut self, players: &[ConformedPlayer]) -> Result<usize>;
    fn delete_all(&mut self) -> Result<usize>;
}

pub trait FactStore {
    fn list_all(&self) -> Result<Vec<FactPlayerPerformance>>;
    fn get(&self, fact_id: i64) -> Result<Option<FactPlayerPerformance>>;
    /// Highest composite score first, ties on player id ascending.
    fn top_by_score(&self, limit: usize) -> Result<Vec<FactPlayerPerformance>>;
    /// Insert all rows or none.
    fn insert_batch(&mut self, facts: &[FactPlayerPerformance]) -> Result<usize>;
    fn delete_all(&mut self) -> Result<usize>;
}

/// Vec-backed player store kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryPlayerStore {
    players: Vec<ConformedPlayer>,
}

impl MemoryPlayerStore {
    pub fn new(players: Vec<ConformedPlayer>) -> Self {
        Self { players }
    }
}

impl PlayerStore for MemoryPlayerStore {
    fn list_all(&self) -> Result<Vec<ConformedPlayer>> {
        Ok(self.players.clone())
    }

    fn get(&self, id: i64) -> Result<Option<ConformedPlayer>> {
        Ok(self.players.iter().find(|p| p.id == id).cloned())
    }

    fn insert_batch(&mut self, players: &[ConformedPlayer]) -> Result<usize> {
        for (idx, p) in players.iter().enumerate() {
            let clashes_existing = self.players.iter().any(|e| e.id == p.id);
            let clashes_batch = players[..idx].iter().any(|e| e.id == p.id);
            if clashes_existing || clashes_batch {
                return Err(anyhow!("duplicate player id {}", p.id));
            }
        }
        self.players.extend_from_slice(players);
        Ok(players.len())
    }

    fn delete_all(&mut self) -> Result<usize> {
        let n = self.players.len();
        self.players.clear();
        Ok(n)
    }
}
