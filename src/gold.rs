use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info};

use crate::dimensions::Dimensions;
use crate::models::{
    DateDimension, FactPlayerPerformance, PlayerDimension, TopPlayer, ValueDimension,
};
use crate::store::FactStore;
use crate::top_players::{join_facts_with_players, rank_top_n};

const FACT_COLUMNS: &str = "fact_id, player_id, performance_id, discipline_id, value_id, date_id, \
     composite_score, ranking";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoldTable {
    PlayerDimension,
    PerformanceDimension,
    DisciplineDimension,
    ValueDimension,
    DateDimension,
    Facts,
    TopPlayers,
}

impl GoldTable {
    fn table_name(self) -> &'static str {
        match self {
            GoldTable::PlayerDimension => "playerdimension",
            GoldTable::PerformanceDimension => "performancedimension",
            GoldTable::DisciplineDimension => "disciplinedimension",
            GoldTable::ValueDimension => "valuedimension",
            GoldTable::DateDimension => "datedimension",
            GoldTable::Facts => "factplayerperformance",
            GoldTable::TopPlayers => "topplayers",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistSummary {
    pub dimension_rows: usize,
    pub fact_rows: usize,
}

/// SQLite-backed analytical store: five dimensions, the fact table and the Top-N view.
pub struct GoldStore {
    conn: Connection,
}

impl GoldStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn =
            Connection::open(path).with_context(|| format!("open gold db {}", path.display()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory gold db")?;
        Self::from_connection(conn)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Append all dimension and fact rows in one transaction.
    ///
    /// Does not diff or upsert: a key already present aborts the batch and nothing lands.
    pub fn persist(
        &mut self,
        dims: &Dimensions,
        facts: &[FactPlayerPerformance],
    ) -> Result<PersistSummary> {
        let tx = self.conn.transaction().context("begin gold transaction")?;
        let summary = insert_all(&tx, dims, facts)?;
        tx.commit().context("commit gold transaction")?;
        info!(
            dimension_rows = summary.dimension_rows,
            fact_rows = summary.fact_rows,
            "persisted gold batch"
        );
        Ok(summary)
    }

    /// Clear every Gold table and write the new batch, atomically.
    pub fn replace(
        &mut self,
        dims: &Dimensions,
        facts: &[FactPlayerPerformance],
    ) -> Result<PersistSummary> {
        let tx = self.conn.transaction().context("begin gold transaction")?;
        clear_all(&tx)?;
        let summary = insert_all(&tx, dims, facts)?;
        tx.commit().context("commit gold transaction")?;
        info!(
            dimension_rows = summary.dimension_rows,
            fact_rows = summary.fact_rows,
            "replaced gold contents"
        );
        Ok(summary)
    }

    pub fn reset(&mut self) -> Result<()> {
        let tx = self.conn.transaction().context("begin gold transaction")?;
        clear_all(&tx)?;
        tx.commit().context("commit gold reset")?;
        Ok(())
    }

    /// Clear and recompute the Top-N view inside one transaction.
    ///
    /// Readers see either the previous view or the new one; a failure rolls back and
    /// leaves the previous rows in place.
    pub fn rebuild_top_n(&mut self, n: usize) -> Result<Vec<TopPlayer>> {
        let tx = self.conn.transaction().context("begin top-n transaction")?;

        let facts = load_facts(&tx)?;
        let players = load_player_dimensions(&tx)?;
        let top = rank_top_n(join_facts_with_players(&facts, &players), n);

        tx.execute("DELETE FROM topplayers", [])
            .context("clear top players view")?;
        for row in &top {
            tx.execute(
                "INSERT INTO topplayers (rank, player_id, name, team, composite_score)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![row.rank, row.player_id, row.name, row.team, row.composite_score],
            )
            .with_context(|| format!("insert top player rank {}", row.rank))?;
        }
        tx.commit().context("commit top-n transaction")?;

        debug!(candidates = facts.len(), rows = top.len(), n, "rebuilt top players view");
        Ok(top)
    }

    pub fn top_players(&self) -> Result<Vec<TopPlayer>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT rank, player_id, name, team, composite_score
                 FROM topplayers ORDER BY rank ASC",
            )
            .context("prepare top players query")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(TopPlayer {
                    rank: row.get(0)?,
                    player_id: row.get(1)?,
                    name: row.get(2)?,
                    team: row.get(3)?,
                    composite_score: row.get(4)?,
                })
            })
            .context("query top players")?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.context("decode top player row")?);
        }
        Ok(out)
    }

    pub fn player_dimensions(&self) -> Result<Vec<PlayerDimension>> {
        load_player_dimensions(&self.conn)
    }

    pub fn value_dimensions(&self) -> Result<Vec<ValueDimension>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT value_id, market_value_usd, exchange_rate, market_value_ars
                 FROM valuedimension ORDER BY value_id ASC",
            )
            .context("prepare value dimension query")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ValueDimension {
                    value_id: row.get(0)?,
                    market_value_usd: row.get(1)?,
                    exchange_rate: row.get(2)?,
                    market_value_ars: row.get(3)?,
                })
            })
            .context("query value dimension")?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.context("decode value dimension row")?);
        }
        Ok(out)
    }

    pub fn date_dimensions(&self) -> Result<Vec<DateDimension>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT date_id, date, day_of_week, month, year
                 FROM datedimension ORDER BY date_id ASC",
            )
            .context("prepare date dimension query")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i32>(4)?,
                ))
            })
            .context("query date dimension")?;

        let mut out = Vec::new();
        for row in rows {
            let (date_id, date, day_of_week, month, year) =
                row.context("decode date dimension row")?;
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .with_context(|| format!("invalid stored date {date}"))?;
            out.push(DateDimension {
                date_id,
                date,
                day_of_week,
                month,
                year,
            });
        }
        Ok(out)
    }

    pub fn count_rows(&self, table: GoldTable) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.table_name());
        let n = self
            .conn
            .query_row(&sql, [], |row| row.get::<_, i64>(0))
            .with_context(|| format!("count rows in {}", table.table_name()))?;
        Ok(n as usize)
    }
}

impl FactStore for GoldStore {
    fn list_all(&self) -> Result<Vec<FactPlayerPerformance>> {
        load_facts(&self.conn)
    }

    fn get(&self, fact_id: i64) -> Result<Option<FactPlayerPerformance>> {
        self.conn
            .query_row(
                &format!("SELECT {FACT_COLUMNS} FROM factplayerperformance WHERE fact_id = ?1"),
                params![fact_id],
                fact_from_row,
            )
            .optional()
            .with_context(|| format!("query fact {fact_id}"))
    }

    fn top_by_score(&self, limit: usize) -> Result<Vec<FactPlayerPerformance>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {FACT_COLUMNS} FROM factplayerperformance
                 ORDER BY composite_score DESC, player_id ASC, fact_id ASC
                 LIMIT ?1"
            ))
            .context("prepare ranking query")?;
        let rows = stmt
            .query_map(params![limit as i64], fact_from_row)
            .context("query ranking")?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.context("decode fact row")?);
        }
        Ok(out)
    }

    fn insert_batch(&mut self, facts: &[FactPlayerPerformance]) -> Result<usize> {
        let tx = self.conn.transaction().context("begin fact transaction")?;
        insert_facts(&tx, facts)?;
        tx.commit().context("commit fact transaction")?;
        Ok(facts.len())
    }

    fn delete_all(&mut self) -> Result<usize> {
        self.conn
            .execute("DELETE FROM factplayerperformance", [])
            .context("clear facts")
    }
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;
        CREATE TABLE IF NOT EXISTS playerdimension (
            player_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            position TEXT NOT NULL,
            team TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS performancedimension (
            performance_id INTEGER PRIMARY KEY,
            passes INTEGER NOT NULL,
            pass_accuracy REAL NOT NULL,
            shots INTEGER NOT NULL,
            shots_on_target INTEGER NOT NULL,
            saves INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS disciplinedimension (
            discipline_id INTEGER PRIMARY KEY,
            fouls INTEGER NOT NULL,
            yellow_cards INTEGER NOT NULL,
            red_cards INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS valuedimension (
            value_id INTEGER PRIMARY KEY,
            market_value_usd REAL NOT NULL,
            exchange_rate REAL NOT NULL,
            market_value_ars REAL NOT NULL
        );
        CREATE TABLE IF NOT EXISTS datedimension (
            date_id INTEGER PRIMARY KEY,
            date TEXT NOT NULL,
            day_of_week TEXT NOT NULL,
            month TEXT NOT NULL,
            year INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS factplayerperformance (
            fact_id INTEGER PRIMARY KEY AUTOINCREMENT,
            player_id INTEGER NOT NULL REFERENCES playerdimension(player_id),
            performance_id INTEGER NOT NULL REFERENCES performancedimension(performance_id),
            discipline_id INTEGER NOT NULL REFERENCES disciplinedimension(discipline_id),
            value_id INTEGER NOT NULL REFERENCES valuedimension(value_id),
            date_id INTEGER NOT NULL REFERENCES datedimension(date_id),
            composite_score REAL NOT NULL,
            ranking INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_facts_score ON factplayerperformance(composite_score);

        CREATE TABLE IF NOT EXISTS topplayers (
            rank INTEGER PRIMARY KEY,
            player_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            team TEXT NOT NULL,
            composite_score REAL NOT NULL
        );
        "#,
    )
    .context("create gold schema")?;
    Ok(())
}

fn clear_all(conn: &Connection) -> Result<()> {
    // Facts first: they hold the foreign keys.
    conn.execute_batch(
        r#"
        DELETE FROM topplayers;
        DELETE FROM factplayerperformance;
        DELETE FROM playerdimension;
        DELETE FROM performancedimension;
        DELETE FROM disciplinedimension;
        DELETE FROM valuedimension;
        DELETE FROM datedimension;
        "#,
    )
    .context("clear gold tables")?;
    Ok(())
}

fn insert_all(
    conn: &Connection,
    dims: &Dimensions,
    facts: &[FactPlayerPerformance],
) -> Result<PersistSummary> {
    for d in &dims.players {
        conn.execute(
            "INSERT INTO playerdimension (player_id, name, position, team) VALUES (?1, ?2, ?3, ?4)",
            params![d.player_id, d.name, d.position, d.team],
        )
        .with_context(|| format!("insert player dimension {}", d.player_id))?;
    }
    for d in &dims.performances {
        conn.execute(
            "INSERT INTO performancedimension
                (performance_id, passes, pass_accuracy, shots, shots_on_target, saves)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                d.performance_id,
                d.passes,
                d.pass_accuracy,
                d.shots,
                d.shots_on_target,
                d.saves
            ],
        )
        .with_context(|| format!("insert performance dimension {}", d.performance_id))?;
    }
    for d in &dims.disciplines {
        conn.execute(
            "INSERT INTO disciplinedimension (discipline_id, fouls, yellow_cards, red_cards)
             VALUES (?1, ?2, ?3, ?4)",
            params![d.discipline_id, d.fouls, d.yellow_cards, d.red_cards],
        )
        .with_context(|| format!("insert discipline dimension {}", d.discipline_id))?;
    }
    for d in &dims.values {
        conn.execute(
            "INSERT INTO valuedimension (value_id, market_value_usd, exchange_rate, market_value_ars)
             VALUES (?1, ?2, ?3, ?4)",
            params![d.value_id, d.market_value_usd, d.exchange_rate, d.market_value_ars],
        )
        .with_context(|| format!("insert value dimension {}", d.value_id))?;
    }
    for d in &dims.dates {
        conn.execute(
            "INSERT INTO datedimension (date_id, date, day_of_week, month, year)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                d.date_id,
                d.date.format("%Y-%m-%d").to_string(),
                d.day_of_week,
                d.month,
                d.year
            ],
        )
        .with_context(|| format!("insert date dimension {}", d.date_id))?;
    }
    insert_facts(conn, facts)?;

    let c = dims.counts();
    Ok(PersistSummary {
        dimension_rows: c.players + c.performances + c.disciplines + c.values + c.dates,
        fact_rows: facts.len(),
    })
}

fn insert_facts(conn: &Connection, facts: &[FactPlayerPerformance]) -> Result<()> {
    for f in facts {
        conn.execute(
            "INSERT INTO factplayerperformance
                (fact_id, player_id, performance_id, discipline_id, value_id, date_id,
                 composite_score, ranking)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                f.fact_id,
                f.player_id,
                f.performance_id,
                f.discipline_id,
                f.value_id,
                f.date_id,
                f.composite_score,
                f.ranking
            ],
        )
        .with_context(|| format!("insert fact for player {}", f.player_id))?;
    }
    Ok(())
}

fn load_facts(conn: &Connection) -> Result<Vec<FactPlayerPerformance>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {FACT_COLUMNS} FROM factplayerperformance ORDER BY fact_id ASC"
        ))
        .context("prepare fact query")?;
    let rows = stmt.query_map([], fact_from_row).context("query facts")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode fact row")?);
    }
    Ok(out)
}

fn load_player_dimensions(conn: &Connection) -> Result<Vec<PlayerDimension>> {
    let mut stmt = conn
        .prepare(
            "SELECT player_id, name, position, team FROM playerdimension ORDER BY player_id ASC",
        )
        .context("prepare player dimension query")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(PlayerDimension {
                player_id: row.get(0)?,
                name: row.get(1)?,
                position: row.get(2)?,
                team: row.get(3)?,
            })
        })
        .context("query player dimension")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode player dimension row")?);
    }
    Ok(out)
}

fn fact_from_row(row: &Row<'_>) -> rusqlite::Result<FactPlayerPerformance> {
    Ok(FactPlayerPerformance {
        fact_id: Some(row.get(0)?),
        player_id: row.get(1)?,
        performance_id: row.get(2)?,
        discipline_id: row.get(3)?,
        value_id: row.get(4)?,
        date_id: row.get(5)?,
        composite_score: row.get(6)?,
        ranking: row.get(7)?,
    })
}
