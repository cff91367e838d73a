use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::{roster, schedule};

/// Handle to the on-disk store.
///
/// Holds only the path: every operation opens its own connection through
/// [`Database::connect`] and drops it before returning.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Opens (creating if needed) the sqlite file and ensures both tables exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create db dir {}", parent.display()))?;
        }
        let db = Self { path };
        db.init_schema()?;
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn connect(&self) -> Result<Connection> {
        Connection::open(&self.path)
            .with_context(|| format!("open sqlite db {}", self.path.display()))
    }

    pub fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        roster::create_schema(&conn)?;
        schedule::create_schema(&conn)?;
        Ok(())
    }
}
