use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::calendar::parse_game_date;
use crate::db::Database;
use crate::schedule::{self, BulkInsertSummary, GameEntry};

pub const FIELD_DELIMITER: &str = ", ";
const FIELD_COUNT: usize = 4;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read schedule file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: expected 4 fields (date, opponent, location, time), found {found}")]
    Malformed { line: usize, found: usize },
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Splits one `date, opponent, location, time` record.
///
/// Fields are taken from the right so a date like `Oct 22, 2024` survives.
/// Extra pieces are only accepted when they rejoin into a parsable date;
/// otherwise the error carries the number of pieces found.
pub fn parse_schedule_line(line: &str) -> Result<GameEntry, usize> {
    let pieces: Vec<&str> = line.trim().split(FIELD_DELIMITER).collect();
    let found = pieces.len();
    if found < FIELD_COUNT {
        return Err(found);
    }
    let (date_parts, rest) = pieces.split_at(found - (FIELD_COUNT - 1));
    let date = date_parts.join(FIELD_DELIMITER);
    if found > FIELD_COUNT && parse_game_date(&date).is_none() {
        return Err(found);
    }
    Ok(GameEntry::new(date, rest[0], rest[1], rest[2]))
}

/// Parses a whole file's text; the first malformed line aborts the parse.
pub fn parse_schedule_text(text: &str) -> Result<Vec<GameEntry>, ImportError> {
    let mut entries = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let entry = parse_schedule_line(line).map_err(|found| ImportError::Malformed {
            line: idx + 1,
            found,
        })?;
        entries.push(entry);
    }
    Ok(entries)
}

/// Reads and parses `path`, then stores new games in one transaction.
/// Nothing is written unless every line parses.
pub fn import_schedule_file(db: &Database, path: &Path) -> Result<BulkInsertSummary, ImportError> {
    let text = fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let entries = parse_schedule_text(&text)?;
    let summary = schedule::insert_games_dedup(db, &entries)?;
    log::info!(
        "imported {}: {} added, {} duplicate",
        path.display(),
        summary.added,
        summary.duplicates
    );
    Ok(summary)
}
