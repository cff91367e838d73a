use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

use crate::calendar::SeasonLabel;
use crate::http_client::http_client;

pub const NBA_STATS_BASE_URL: &str = "https://stats.nba.com/stats";

/// Per-game averages for one season, as displayed on the player profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonAverages {
    pub ppg: f64,
    pub rpg: f64,
    pub apg: f64,
    /// Percent, e.g. `47.3`.
    pub fg_pct: f64,
    pub three_pt_pct: f64,
    pub games_played: u32,
}

/// Read-only season stats lookup. `Ok(None)` means the name did not resolve.
pub trait StatsProvider {
    fn lookup(&self, name: &str, season: &SeasonLabel) -> Result<Option<SeasonAverages>>;
}

/// Used when the network lookup is switched off by configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineStats;

impl StatsProvider for OfflineStats {
    fn lookup(&self, _name: &str, _season: &SeasonLabel) -> Result<Option<SeasonAverages>> {
        Err(anyhow!("stats lookup disabled (offline mode)"))
    }
}

#[derive(Debug, Clone)]
pub struct NbaStatsProvider {
    base_url: String,
}

impl Default for NbaStatsProvider {
    fn default() -> Self {
        Self::new(NBA_STATS_BASE_URL)
    }
}

impl NbaStatsProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    fn get_json(&self, endpoint: &str, query: &[(&str, String)]) -> Result<String> {
        let client = http_client()?;
        let url = format!("{}/{endpoint}", self.base_url);
        let resp = client
            .get(&url)
            .query(query)
            .send()
            .with_context(|| format!("request {endpoint} failed"))?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        if !status.is_success() {
            return Err(anyhow!("http {}: {}", status, body));
        }
        Ok(body)
    }
}

impl StatsProvider for NbaStatsProvider {
    fn lookup(&self, name: &str, season: &SeasonLabel) -> Result<Option<SeasonAverages>> {
        let season = season.to_string();
        let index = self.get_json(
            "commonallplayers",
            &[
                ("LeagueID", "00".to_string()),
                ("Season", season.clone()),
                ("IsOnlyCurrentSeason", "0".to_string()),
            ],
        )?;
        let Some(player_id) = parse_player_id(&index, name)? else {
            log::info!("no stats player found for name {name:?}");
            return Ok(None);
        };

        let body = self.get_json("playerdashboardbylastngames", &dashboard_query(player_id, &season))?;
        parse_dashboard_averages(&body)
            .with_context(|| format!("decode {season} stats for {name}"))
    }
}

fn dashboard_query(player_id: u64, season: &str) -> Vec<(&'static str, String)> {
    let fixed: [(&'static str, &str); 21] = [
        ("DateFrom", ""),
        ("DateTo", ""),
        ("GameSegment", ""),
        ("LastNGames", "82"),
        ("LeagueID", "00"),
        ("Location", ""),
        ("MeasureType", "Base"),
        ("Month", "0"),
        ("OpponentTeamID", "0"),
        ("Outcome", ""),
        ("PORound", "0"),
        ("PaceAdjust", "N"),
        ("PerMode", "Totals"),
        ("Period", "0"),
        ("PlusMinus", "N"),
        ("Rank", "N"),
        ("SeasonSegment", ""),
        ("SeasonType", "Regular Season"),
        ("ShotClockRange", ""),
        ("VsConference", ""),
        ("VsDivision", ""),
    ];
    let mut query: Vec<(&'static str, String)> =
        fixed.iter().map(|(k, v)| (*k, v.to_string())).collect();
    query.push(("PlayerID", player_id.to_string()));
    query.push(("Season", season.to_string()));
    query
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(rename = "resultSets", default)]
    result_sets: Vec<ResultSet>,
}

#[derive(Debug, Deserialize)]
struct ResultSet {
    #[serde(default)]
    name: String,
    #[serde(default)]
    headers: Vec<String>,
    #[serde(rename = "rowSet", default)]
    row_set: Vec<Vec<Value>>,
}

impl ResultSet {
    fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    fn cell<'a>(&self, row: &'a [Value], header: &str) -> Option<&'a Value> {
        self.column(header).and_then(|idx| row.get(idx))
    }
}

fn result_set<'a>(resp: &'a StatsResponse, name: &str) -> Option<&'a ResultSet> {
    resp.result_sets
        .iter()
        .find(|rs| rs.name == name)
        .or_else(|| resp.result_sets.first())
}

/// Resolves a display name (case-insensitive, exact) to a player id.
pub fn parse_player_id(raw: &str, name: &str) -> Result<Option<u64>> {
    let resp: StatsResponse =
        serde_json::from_str(raw.trim()).context("invalid player index json")?;
    let Some(set) = result_set(&resp, "CommonAllPlayers") else {
        return Ok(None);
    };
    let wanted = name.trim().to_lowercase();
    if wanted.is_empty() {
        return Ok(None);
    }
    for row in &set.row_set {
        let Some(display) = set.cell(row, "DISPLAY_FIRST_LAST").and_then(|v| v.as_str()) else {
            continue;
        };
        if display.trim().to_lowercase() == wanted {
            return Ok(set.cell(row, "PERSON_ID").and_then(as_u64_any));
        }
    }
    Ok(None)
}

/// Turns a season-totals dashboard into per-game averages.
/// An empty row set (no games that season) yields `None`.
pub fn parse_dashboard_averages(raw: &str) -> Result<Option<SeasonAverages>> {
    let resp: StatsResponse =
        serde_json::from_str(raw.trim()).context("invalid player dashboard json")?;
    let Some(set) = result_set(&resp, "OverallPlayerDashboard") else {
        return Ok(None);
    };
    let Some(row) = set.row_set.first() else {
        return Ok(None);
    };
    let num = |header: &str| set.cell(row, header).and_then(as_f64_any);

    let games_played = num("GP").ok_or_else(|| anyhow!("dashboard missing GP"))?;
    let per_game = |total: Option<f64>| {
        if games_played > 0.0 {
            round1(total.unwrap_or_default() / games_played)
        } else {
            0.0
        }
    };

    Ok(Some(SeasonAverages {
        ppg: per_game(num("PTS")),
        rpg: per_game(num("REB")),
        apg: per_game(num("AST")),
        fg_pct: round1(num("FG_PCT").unwrap_or_default() * 100.0),
        three_pt_pct: round1(num("FG3_PCT").unwrap_or_default() * 100.0),
        games_played: games_played.max(0.0) as u32,
    }))
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn as_f64_any(v: &Value) -> Option<f64> {
    if let Some(n) = v.as_f64() {
        return Some(n);
    }
    v.as_str()?.trim().parse::<f64>().ok()
}

fn as_u64_any(v: &Value) -> Option<u64> {
    if let Some(n) = v.as_u64() {
        return Some(n);
    }
    v.as_str()?.trim().parse::<u64>().ok()
}
