use anyhow::{Context, Result};
use rusqlite::{Connection, Row, params};

use crate::db::Database;

pub const UNSPECIFIED_TIME: &str = "Time Not Specified";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledGame {
    pub id: i64,
    pub game_date: String,
    pub opponent: String,
    pub location: String,
    pub time: String,
}

impl ScheduledGame {
    pub fn display_time(&self) -> &str {
        if self.time.trim().is_empty() {
            UNSPECIFIED_TIME
        } else {
            &self.time
        }
    }
}

/// A game that has not been stored yet. All four fields form its dedup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEntry {
    pub game_date: String,
    pub opponent: String,
    pub location: String,
    pub time: String,
}

impl GameEntry {
    pub fn new(
        game_date: impl Into<String>,
        opponent: impl Into<String>,
        location: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self {
            game_date: game_date.into(),
            opponent: opponent.into(),
            location: location.into(),
            time: time.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkInsertSummary {
    pub added: usize,
    pub duplicates: usize,
}

pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schedule (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            game_date TEXT NOT NULL,
            opponent TEXT NOT NULL,
            location TEXT NOT NULL,
            time TEXT NOT NULL
        );
        "#,
    )
    .context("create schedule table")?;
    if ensure_time_column(conn)? {
        log::info!("migrated schedule table: added time column");
    }
    Ok(())
}

/// Tables created before `time` existed get it added in place.
/// Returns `true` when the column had to be added.
fn ensure_time_column(conn: &Connection) -> Result<bool> {
    let mut stmt = conn
        .prepare("PRAGMA table_info(schedule)")
        .context("prepare schedule table_info")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .context("query schedule table_info")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("decode schedule table_info")?;
    if columns.iter().any(|c| c == "time") {
        return Ok(false);
    }
    conn.execute(
        "ALTER TABLE schedule ADD COLUMN time TEXT NOT NULL DEFAULT ''",
        [],
    )
    .context("add schedule time column")?;
    Ok(true)
}

pub fn insert_game(db: &Database, entry: &GameEntry) -> Result<i64> {
    let conn = db.connect()?;
    insert_game_row(&conn, entry)?;
    Ok(conn.last_insert_rowid())
}

/// Inserts every entry not already stored, inside a single transaction.
///
/// Rows added earlier in the same batch count as existing, so a file that
/// repeats a line yields one row.
pub fn insert_games_dedup(db: &Database, entries: &[GameEntry]) -> Result<BulkInsertSummary> {
    let mut conn = db.connect()?;
    let tx = conn.transaction().context("begin schedule import transaction")?;

    let mut summary = BulkInsertSummary::default();
    for entry in entries {
        let existing: i64 = tx
            .query_row(
                "SELECT COUNT(*) FROM schedule
                 WHERE game_date = ?1 AND opponent = ?2 AND location = ?3 AND time = ?4",
                params![entry.game_date, entry.opponent, entry.location, entry.time],
                |row| row.get(0),
            )
            .context("check duplicate game")?;
        if existing == 0 {
            insert_game_row(&tx, entry)?;
            summary.added += 1;
        } else {
            summary.duplicates += 1;
        }
    }

    tx.commit().context("commit schedule import transaction")?;
    Ok(summary)
}

/// Ordered by the stored date text, not by calendar date.
pub fn list_games(db: &Database) -> Result<Vec<ScheduledGame>> {
    let conn = db.connect()?;
    let mut stmt = conn
        .prepare(
            "SELECT id, game_date, opponent, location, time FROM schedule
             ORDER BY game_date ASC, id ASC",
        )
        .context("prepare schedule query")?;
    let rows = stmt
        .query_map([], game_from_row)
        .context("query schedule")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode game row")?);
    }
    Ok(out)
}

pub fn count_games(db: &Database) -> Result<usize> {
    let conn = db.connect()?;
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM schedule", [], |row| row.get(0))
        .context("count games")?;
    Ok(usize::try_from(n).unwrap_or_default())
}

/// Removes every game and resets the id sequence so the next insert gets id 1.
pub fn delete_all_games(db: &Database) -> Result<usize> {
    let mut conn = db.connect()?;
    let tx = conn.transaction().context("begin clear schedule")?;
    let removed = tx
        .execute("DELETE FROM schedule", [])
        .context("delete all games")?;
    tx.execute("DELETE FROM sqlite_sequence WHERE name = 'schedule'", [])
        .context("reset schedule id sequence")?;
    tx.commit().context("commit clear schedule")?;
    Ok(removed)
}

fn insert_game_row(conn: &Connection, entry: &GameEntry) -> Result<()> {
    conn.execute(
        "INSERT INTO schedule (game_date, opponent, location, time) VALUES (?1, ?2, ?3, ?4)",
        params![entry.game_date, entry.opponent, entry.location, entry.time],
    )
    .context("insert game")?;
    Ok(())
}

fn game_from_row(row: &Row<'_>) -> rusqlite::Result<ScheduledGame> {
    Ok(ScheduledGame {
        id: row.get(0)?,
        game_date: row.get(1)?,
        opponent: row.get(2)?,
        location: row.get(3)?,
        time: row.get(4)?,
    })
}
