use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::calendar::SeasonLabel;
use crate::stats_fetch::NBA_STATS_BASE_URL;

const APP_DIR: &str = "roster_terminal";
const DB_FILE: &str = "roster.sqlite";
const LOG_FILE: &str = "roster_terminal.log";
const DEFAULT_SEASON: &str = "2024-25";
const DEFAULT_TEAM: &str = "Toronto Raptors";

#[derive(Debug, Parser)]
#[command(name = "roster_terminal", about = "Team roster and schedule tracker")]
pub struct Cli {
    /// SQLite file to use instead of ROSTER_DB_PATH.
    #[arg(long)]
    pub db: Option<PathBuf>,
    /// Season label, e.g. 2024-25.
    #[arg(long)]
    pub season: Option<String>,
    /// Skip network stats lookups.
    #[arg(long)]
    pub offline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub season: SeasonLabel,
    pub team_name: String,
    pub stats_base_url: String,
    pub stats_offline: bool,
    pub log_path: PathBuf,
}

impl AppConfig {
    /// Loads `.env.local` / `.env` then reads the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let data_dir = app_data_dir(&get);

        let db_path = get("ROSTER_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(DB_FILE));
        let season_raw = get("ROSTER_SEASON").unwrap_or_else(|| DEFAULT_SEASON.to_string());
        let season = season_raw
            .parse::<SeasonLabel>()
            .context("ROSTER_SEASON")?;
        let team_name = get("ROSTER_TEAM_NAME").unwrap_or_else(|| DEFAULT_TEAM.to_string());
        let stats_base_url =
            get("ROSTER_STATS_BASE_URL").unwrap_or_else(|| NBA_STATS_BASE_URL.to_string());
        let stats_offline = get("ROSTER_STATS_OFFLINE").is_some_and(|v| is_truthy(&v));
        let log_path = get("ROSTER_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(LOG_FILE));

        Ok(Self {
            db_path,
            season,
            team_name,
            stats_base_url,
            stats_offline,
            log_path,
        })
    }

    /// Command-line flags win over the environment.
    pub fn apply_cli(&mut self, cli: &Cli) -> Result<()> {
        if let Some(db) = &cli.db {
            self.db_path = db.clone();
        }
        if let Some(season) = &cli.season {
            self.season = season.parse().context("--season")?;
        }
        if cli.offline {
            self.stats_offline = true;
        }
        Ok(())
    }
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn app_data_dir(get: &impl Fn(&str) -> Option<String>) -> PathBuf {
    // Prefer XDG data.
    if let Some(base) = get("XDG_DATA_HOME") {
        return PathBuf::from(base).join(APP_DIR);
    }
    // Fallback to ~/.local/share on linux-like systems.
    if let Some(home) = get("HOME") {
        return PathBuf::from(home).join(".local").join("share").join(APP_DIR);
    }
    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::is_truthy;

    #[test]
    fn truthy_values() {
        assert!(is_truthy("1"));
        assert!(is_truthy(" TRUE "));
        assert!(is_truthy("yes"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("off"));
    }
}
