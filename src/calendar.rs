use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use crate::schedule::ScheduledGame;

/// Accepted textual forms of a stored game date, tried in order.
pub const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m-%d-%Y", "%b %d, %Y"];

pub const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Months a season spans as (month, years after the season's start year).
const SEASON_MONTHS: &[(u32, i32)] = &[
    (10, 0),
    (11, 0),
    (12, 0),
    (1, 1),
    (2, 1),
    (3, 1),
    (4, 1),
    (5, 1),
    (6, 1),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeasonError {
    #[error("invalid season label {0:?}, expected e.g. 2024-25")]
    InvalidLabel(String),
    #[error("season month table is invalid at {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },
}

/// A year-pair season label such as `2024-25`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeasonLabel {
    start_year: i32,
}

impl SeasonLabel {
    pub fn new(start_year: i32) -> Self {
        Self { start_year }
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn previous(&self) -> Self {
        Self::new(self.start_year - 1)
    }

    /// `2024-2025`
    pub fn long_label(&self) -> String {
        format!("{}-{}", self.start_year, self.start_year + 1)
    }
}

impl fmt::Display for SeasonLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02}",
            self.start_year,
            (self.start_year + 1).rem_euclid(100)
        )
    }
}

impl FromStr for SeasonLabel {
    type Err = SeasonError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || SeasonError::InvalidLabel(raw.to_string());
        let (start, end) = raw.trim().split_once('-').ok_or_else(invalid)?;
        if start.len() != 4 {
            return Err(invalid());
        }
        let start_year = start.parse::<i32>().map_err(|_| invalid())?;
        let end_year = match end.len() {
            2 => {
                let yy = end.parse::<i32>().map_err(|_| invalid())?;
                let century = start_year - start_year.rem_euclid(100);
                if yy < start_year.rem_euclid(100) {
                    century + 100 + yy
                } else {
                    century + yy
                }
            }
            4 => end.parse::<i32>().map_err(|_| invalid())?,
            _ => return Err(invalid()),
        };
        if end_year != start_year + 1 {
            return Err(invalid());
        }
        Ok(Self::new(start_year))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthSpec {
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub days: u32,
}

impl MonthSpec {
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

/// The season's month table, validated once when built.
#[derive(Debug, Clone)]
pub struct SeasonCalendar {
    season: SeasonLabel,
    months: Vec<MonthSpec>,
}

impl SeasonCalendar {
    pub fn new(season: SeasonLabel) -> Result<Self, SeasonError> {
        let mut months = Vec::with_capacity(SEASON_MONTHS.len());
        let mut prev: Option<NaiveDate> = None;
        for &(month, offset) in SEASON_MONTHS {
            let year = season.start_year + offset;
            let bad = SeasonError::InvalidMonth { year, month };
            let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(bad.clone())?;
            if prev.is_some_and(|p| p >= first) {
                return Err(bad);
            }
            let days = days_in_month(year, month).ok_or(bad)?;
            months.push(MonthSpec {
                label: first.format("%B %Y").to_string(),
                year,
                month,
                days,
            });
            prev = Some(first);
        }
        Ok(Self { season, months })
    }

    pub fn season(&self) -> SeasonLabel {
        self.season
    }

    pub fn months(&self) -> &[MonthSpec] {
        &self.months
    }
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    next.pred_opt().map(|d| d.day())
}

pub fn parse_game_date(raw: &str) -> Option<NaiveDate> {
    let cleaned = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cleaned, fmt).ok())
}

/// Parses `raw` and pulls any year before `start_year` forward into it.
pub fn normalize_game_date(raw: &str, start_year: i32) -> Option<NaiveDate> {
    let date = parse_game_date(raw)?;
    if date.year() < start_year {
        return date.with_year(start_year);
    }
    Some(date)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarGame {
    pub opponent: String,
    pub location: String,
    pub time: String,
}

impl CalendarGame {
    /// `Celtics (Home, 7:30 PM)`
    pub fn label(&self) -> String {
        format!("{} ({}, {})", self.opponent, self.location, self.time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub games: Vec<CalendarGame>,
}

impl DayCell {
    pub fn day(&self) -> u32 {
        self.date.day()
    }
}

pub type Week = [Option<DayCell>; 7];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub label: String,
    pub weeks: Vec<Week>,
}

impl MonthGrid {
    pub fn cell(&self, day: u32) -> Option<&DayCell> {
        self.weeks
            .iter()
            .flat_map(|w| w.iter())
            .flatten()
            .find(|c| c.day() == day)
    }

    pub fn game_count(&self) -> usize {
        self.weeks
            .iter()
            .flat_map(|w| w.iter())
            .flatten()
            .map(|c| c.games.len())
            .sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarView {
    pub months: Vec<MonthGrid>,
    /// Stored date strings that matched none of [`DATE_FORMATS`].
    pub skipped: Vec<String>,
}

impl CalendarView {
    pub fn month(&self, label: &str) -> Option<&MonthGrid> {
        self.months.iter().find(|m| m.label == label)
    }
}

pub fn build_calendar(calendar: &SeasonCalendar, games: &[ScheduledGame]) -> CalendarView {
    let start_year = calendar.season().start_year();
    let mut by_date: HashMap<NaiveDate, Vec<CalendarGame>> = HashMap::new();
    let mut skipped = Vec::new();

    for game in games {
        let Some(date) = normalize_game_date(&game.game_date, start_year) else {
            log::warn!("could not parse game date {:?} (id {})", game.game_date, game.id);
            skipped.push(game.game_date.clone());
            continue;
        };
        log::debug!(
            "calendar game {}: {} {} {}",
            date,
            game.opponent,
            game.location,
            game.display_time()
        );
        by_date.entry(date).or_default().push(CalendarGame {
            opponent: game.opponent.clone(),
            location: game.location.clone(),
            time: game.display_time().to_string(),
        });
    }

    let months = calendar
        .months()
        .iter()
        .filter_map(|month| month_grid(month, &mut by_date))
        .collect();

    CalendarView { months, skipped }
}

fn month_grid(
    month: &MonthSpec,
    by_date: &mut HashMap<NaiveDate, Vec<CalendarGame>>,
) -> Option<MonthGrid> {
    let first = month.first_day()?;
    let mut weeks: Vec<Week> = Vec::with_capacity(6);
    let mut week: Week = Default::default();
    let mut col = first.weekday().num_days_from_sunday() as usize;

    for day in 1..=month.days {
        let date = NaiveDate::from_ymd_opt(month.year, month.month, day)?;
        week[col] = Some(DayCell {
            date,
            games: by_date.remove(&date).unwrap_or_default(),
        });
        col += 1;
        if col > 6 {
            weeks.push(std::mem::take(&mut week));
            col = 0;
        }
    }
    if col > 0 {
        weeks.push(week);
    }

    Some(MonthGrid {
        label: month.label.clone(),
        weeks,
    })
}
