use anyhow::{Context, Result};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;

use crate::db::Database;

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub position: String,
    pub age: u32,
    pub height: String,
    pub weight: String,
    pub salary: f64,
}

/// Raw text as typed into the add/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerInput {
    pub name: String,
    pub position: String,
    pub age: String,
    pub height: String,
    pub weight: String,
    pub salary: String,
}

impl PlayerInput {
    pub fn from_player(player: &Player) -> Self {
        Self {
            name: player.name.clone(),
            position: player.position.clone(),
            age: player.age.to_string(),
            height: player.height.clone(),
            weight: player.weight.clone(),
            salary: format!("{}", player.salary),
        }
    }

    fn validated(&self) -> Result<ValidPlayer<'_>, PlayerInputError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(PlayerInputError::EmptyName);
        }
        let age = self
            .age
            .trim()
            .parse::<u32>()
            .map_err(|_| PlayerInputError::InvalidAge(self.age.clone()))?;
        Ok(ValidPlayer {
            name,
            position: self.position.trim(),
            age,
            height: self.height.trim(),
            weight: self.weight.trim(),
            salary: coerce_salary(&self.salary),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerInputError {
    #[error("player name is required")]
    EmptyName,
    #[error("age must be a whole number, got {0:?}")]
    InvalidAge(String),
}

struct ValidPlayer<'a> {
    name: &'a str,
    position: &'a str,
    age: u32,
    height: &'a str,
    weight: &'a str,
    salary: f64,
}

/// Unparsable, negative or non-finite input degrades to 0.0.
pub fn coerce_salary(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => 0.0,
    }
}

/// `1234567.891` -> `$1,234,567.89`
pub fn format_salary(value: f64) -> String {
    let value = if value.is_finite() && value > 0.0 { value } else { 0.0 };
    let fixed = format!("{value:.2}");
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${grouped}.{frac}")
}

pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS roster (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            position TEXT NOT NULL,
            age INTEGER NOT NULL,
            height TEXT NOT NULL,
            weight TEXT NOT NULL,
            salary REAL NOT NULL
        );
        "#,
    )
    .context("create roster table")?;
    Ok(())
}

pub fn insert_player(db: &Database, input: &PlayerInput) -> Result<i64> {
    let p = input.validated()?;
    let conn = db.connect()?;
    conn.execute(
        "INSERT INTO roster (name, position, age, height, weight, salary)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![p.name, p.position, p.age, p.height, p.weight, p.salary],
    )
    .context("insert player")?;
    Ok(conn.last_insert_rowid())
}

/// Returns `false` when no player has `id`.
pub fn update_player(db: &Database, id: i64, input: &PlayerInput) -> Result<bool> {
    let p = input.validated()?;
    let conn = db.connect()?;
    let changed = conn
        .execute(
            "UPDATE roster
             SET name = ?1, position = ?2, age = ?3, height = ?4, weight = ?5, salary = ?6
             WHERE id = ?7",
            params![p.name, p.position, p.age, p.height, p.weight, p.salary, id],
        )
        .context("update player")?;
    Ok(changed > 0)
}

pub fn delete_player(db: &Database, id: i64) -> Result<bool> {
    let conn = db.connect()?;
    let removed = conn
        .execute("DELETE FROM roster WHERE id = ?1", params![id])
        .context("delete player")?;
    Ok(removed > 0)
}

pub fn get_player(db: &Database, id: i64) -> Result<Option<Player>> {
    let conn = db.connect()?;
    conn.query_row(
        "SELECT id, name, position, age, height, weight, salary FROM roster WHERE id = ?1",
        params![id],
        player_from_row,
    )
    .optional()
    .context("query player")
}

pub fn list_players(db: &Database) -> Result<Vec<Player>> {
    let conn = db.connect()?;
    let mut stmt = conn
        .prepare("SELECT id, name, position, age, height, weight, salary FROM roster ORDER BY id")
        .context("prepare roster query")?;
    let rows = stmt
        .query_map([], player_from_row)
        .context("query roster")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode player row")?);
    }
    Ok(out)
}

fn player_from_row(row: &Row<'_>) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        name: row.get(1)?,
        position: row.get(2)?,
        age: decode_age(row.get(3)?),
        height: row.get(4)?,
        weight: row.get(5)?,
        salary: decode_salary(row.get(6)?),
    })
}

/// Older databases never validated these columns, so a stored value may be
/// text. Anything that is not a usable number reads back as 0.
fn decode_age(value: Value) -> u32 {
    match value {
        Value::Integer(n) => u32::try_from(n).unwrap_or(0),
        Value::Real(f) if f.is_finite() && f >= 0.0 && f <= f64::from(u32::MAX) => f as u32,
        Value::Text(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn decode_salary(value: Value) -> f64 {
    match value {
        Value::Integer(n) => (n as f64).max(0.0),
        Value::Real(f) if f.is_finite() && f >= 0.0 => f,
        Value::Text(s) => coerce_salary(&s),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::types::Value;

    use super::{coerce_salary, decode_age, decode_salary, format_salary};

    #[test]
    fn stored_values_decode_leniently() {
        assert_eq!(decode_age(Value::Integer(24)), 24);
        assert_eq!(decode_age(Value::Integer(-1)), 0);
        assert_eq!(decode_age(Value::Text("twenty".to_string())), 0);
        assert_eq!(decode_age(Value::Text(" 31 ".to_string())), 31);
        assert_eq!(decode_age(Value::Null), 0);
        assert_eq!(decode_salary(Value::Integer(5)), 5.0);
        assert_eq!(decode_salary(Value::Text("lots".to_string())), 0.0);
        assert_eq!(decode_salary(Value::Null), 0.0);
    }

    #[test]
    fn coerce_salary_degrades_to_zero() {
        assert_eq!(coerce_salary("42177968"), 42_177_968.0);
        assert_eq!(coerce_salary(" 1500.5 "), 1500.5);
        assert_eq!(coerce_salary("$1,000"), 0.0);
        assert_eq!(coerce_salary(""), 0.0);
        assert_eq!(coerce_salary("-20"), 0.0);
        assert_eq!(coerce_salary("NaN"), 0.0);
        assert_eq!(coerce_salary("inf"), 0.0);
    }

    #[test]
    fn format_salary_groups_thousands() {
        assert_eq!(format_salary(0.0), "$0.00");
        assert_eq!(format_salary(999.5), "$999.50");
        assert_eq!(format_salary(1000.0), "$1,000.00");
        assert_eq!(format_salary(42_177_968.0), "$42,177,968.00");
        assert_eq!(format_salary(-3.0), "$0.00");
    }
}
