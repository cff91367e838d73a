use std::collections::HashMap;
use std::path::PathBuf;

use clap::Parser;
use pretty_assertions::assert_eq;

use roster_terminal::calendar::SeasonLabel;
use roster_terminal::config::{AppConfig, Cli};
use roster_terminal::stats_fetch::NBA_STATS_BASE_URL;

fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    AppConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn defaults_live_under_xdg_data_home() {
    let config = config_from(&[("XDG_DATA_HOME", "/data"), ("HOME", "/home/fan")]).expect("config");
    assert_eq!(
        config,
        AppConfig {
            db_path: PathBuf::from("/data/roster_terminal/roster.sqlite"),
            season: SeasonLabel::new(2024),
            team_name: "Toronto Raptors".to_string(),
            stats_base_url: NBA_STATS_BASE_URL.to_string(),
            stats_offline: false,
            log_path: PathBuf::from("/data/roster_terminal/roster_terminal.log"),
        }
    );
}

#[test]
fn home_is_the_fallback_and_blank_values_are_ignored() {
    let config = config_from(&[
        ("XDG_DATA_HOME", "  "),
        ("HOME", "/home/fan"),
        ("ROSTER_TEAM_NAME", ""),
    ])
    .expect("config");
    assert_eq!(
        config.db_path,
        PathBuf::from("/home/fan/.local/share/roster_terminal/roster.sqlite")
    );
    assert_eq!(config.team_name, "Toronto Raptors");
}

#[test]
fn environment_overrides_are_applied() {
    let config = config_from(&[
        ("ROSTER_DB_PATH", "/tmp/team.sqlite"),
        ("ROSTER_SEASON", "2023-2024"),
        ("ROSTER_TEAM_NAME", "Boston Celtics"),
        ("ROSTER_STATS_OFFLINE", "yes"),
        ("ROSTER_LOG_FILE", "/tmp/roster.log"),
    ])
    .expect("config");
    assert_eq!(config.db_path, PathBuf::from("/tmp/team.sqlite"));
    assert_eq!(config.season, SeasonLabel::new(2023));
    assert_eq!(config.team_name, "Boston Celtics");
    assert!(config.stats_offline);
    assert_eq!(config.log_path, PathBuf::from("/tmp/roster.log"));
}

#[test]
fn bad_season_label_is_an_error() {
    assert!(config_from(&[("ROSTER_SEASON", "next year")]).is_err());
}

#[test]
fn cli_flags_win_over_environment() {
    let mut config = config_from(&[("ROSTER_DB_PATH", "/tmp/env.sqlite")]).expect("config");
    let cli = Cli::parse_from(["roster_terminal", "--db", "/tmp/cli.sqlite", "--season", "2022-23", "--offline"]);
    config.apply_cli(&cli).expect("apply cli");

    assert_eq!(config.db_path, PathBuf::from("/tmp/cli.sqlite"));
    assert_eq!(config.season, SeasonLabel::new(2022));
    assert!(config.stats_offline);

    let bad = Cli::parse_from(["roster_terminal", "--season", "2022-24"]);
    assert!(config.apply_cli(&bad).is_err());
}
