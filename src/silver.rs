use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info};

use crate::models::ConformedPlayer;
use crate::store::PlayerStore;

const PLAYER_COLUMNS: &str = "id, name, position, team, market_value_usd, passes, pass_accuracy, \
     shots, shots_on_target, saves, fouls, yellow_cards, red_cards";

/// SQLite-backed Silver table of conformed players.
pub struct SilverStore {
    conn: Connection,
}

impl SilverStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn =
            Connection::open(path).with_context(|| format!("open silver db {}", path.display()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory silver db")?;
        Self::from_connection(conn)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Read a Bronze CSV and insert every row in one transaction.
    pub fn load_csv<R: Read>(&mut self, reader: R) -> Result<usize> {
        let players = read_players_csv(reader)?;
        let n = self.insert_batch(&players)?;
        info!(rows = n, "loaded players into silver");
        Ok(n)
    }
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS player (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            position TEXT NOT NULL,
            team TEXT NOT NULL,
            market_value_usd REAL NOT NULL,
            passes INTEGER NOT NULL,
            pass_accuracy REAL NOT NULL,
            shots INTEGER NOT NULL,
            shots_on_target INTEGER NOT NULL,
            saves INTEGER NOT NULL,
            fouls INTEGER NOT NULL,
            yellow_cards INTEGER NOT NULL,
            red_cards INTEGER NOT NULL
        );
        "#,
    )
    .context("create silver schema")?;
    Ok(())
}

pub fn read_players_csv<R: Read>(reader: R) -> Result<Vec<ConformedPlayer>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut out = Vec::new();
    for (idx, record) in rdr.deserialize::<ConformedPlayer>().enumerate() {
        // +2: header line plus 1-based numbering.
        out.push(record.with_context(|| format!("decode csv line {}", idx + 2))?);
    }
    debug!(rows = out.len(), "parsed player csv");
    Ok(out)
}

impl PlayerStore for SilverStore {
    fn list_all(&self) -> Result<Vec<ConformedPlayer>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {PLAYER_COLUMNS} FROM player ORDER BY rowid ASC"))
            .context("prepare list players query")?;
        let rows = stmt
            .query_map([], player_from_row)
            .context("query list players")?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.context("decode player row")?);
        }
        Ok(out)
    }

    fn get(&self, id: i64) -> Result<Option<ConformedPlayer>> {
        self.conn
            .query_row(
                &format!("SELECT {PLAYER_COLUMNS} FROM player WHERE id = ?1"),
                params![id],
                player_from_row,
            )
            .optional()
            .with_context(|| format!("query player {id}"))
    }

    fn insert_batch(&mut self, players: &[ConformedPlayer]) -> Result<usize> {
        let tx = self.conn.transaction().context("begin silver transaction")?;
        for p in players {
            tx.execute(
                &format!(
                    "INSERT INTO player ({PLAYER_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
                ),
                params![
                    p.id,
                    p.name,
                    p.position,
                    p.team,
                    p.market_value_usd,
                    p.passes,
                    p.pass_accuracy,
                    p.shots,
                    p.shots_on_target,
                    p.saves,
                    p.fouls,
                    p.yellow_cards,
                    p.red_cards,
                ],
            )
            .with_context(|| format!("insert player {}", p.id))?;
        }
        tx.commit().context("commit silver transaction")?;
        Ok(players.len())
    }

    fn delete_all(&mut self) -> Result<usize> {
        self.conn
            .execute("DELETE FROM player", [])
            .context("clear silver players")
    }
}

fn player_from_row(row: &Row<'_>) -> rusqlite::Result<ConformedPlayer> {
    Ok(ConformedPlayer {
        id: row.get(0)?,
        name: row.get(1)?,
        position: row.get(2)?,
        team: row.get(3)?,
        market_value_usd: row.get(4)?,
        passes: row.get(5)?,
        pass_accuracy: row.get(6)?,
        shots: row.get(7)?,
        shots_on_target: row.get(8)?,
        saves: row.get(9)?,
        fouls: row.get(10)?,
        yellow_cards: row.get(11)?,
        red_cards: row.get(12)?,
    })
}
