use std::fs;

use anyhow::{Result, anyhow};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tempfile::TempDir;

use roster_terminal::app::App;
use roster_terminal::calendar::{SeasonCalendar, SeasonLabel};
use roster_terminal::db::Database;
use roster_terminal::roster::{self, PlayerInput};
use roster_terminal::schedule::{self, GameEntry};
use roster_terminal::state::{NoticeKind, PendingAction, StatsOutcome, View};
use roster_terminal::stats_fetch::{SeasonAverages, StatsProvider};

/// Known names get current-season numbers only; "Offline Guy" always errors.
struct FakeStats;

impl StatsProvider for FakeStats {
    fn lookup(&self, name: &str, season: &SeasonLabel) -> Result<Option<SeasonAverages>> {
        if name == "Offline Guy" {
            return Err(anyhow!("connection refused"));
        }
        if name == "Scottie Barnes" && season.start_year() == 2024 {
            return Ok(Some(SeasonAverages {
                ppg: 19.5,
                rpg: 7.7,
                apg: 5.4,
                fg_pct: 44.0,
                three_pt_pct: 27.4,
                games_played: 64,
            }));
        }
        Ok(None)
    }
}

fn new_app() -> (TempDir, App) {
    let dir = tempfile::tempdir().expect("temp dir");
    let db = Database::open(dir.path().join("roster.sqlite")).expect("open db");
    let calendar = SeasonCalendar::new(SeasonLabel::new(2024)).expect("season table");
    let app = App::new(db, calendar, Box::new(FakeStats), "Toronto Raptors");
    (dir, app)
}

fn press(app: &mut App, code: KeyCode) {
    app.on_key(KeyEvent::new(code, KeyModifiers::NONE));
}

fn type_text(app: &mut App, text: &str) {
    for ch in text.chars() {
        press(app, KeyCode::Char(ch));
    }
}

fn seed_player(app: &App, name: &str) -> i64 {
    let input = PlayerInput {
        name: name.to_string(),
        position: "F".to_string(),
        age: "23".to_string(),
        height: "6'7\"".to_string(),
        weight: "225".to_string(),
        salary: "10130980".to_string(),
    };
    roster::insert_player(app.db(), &input).expect("seed player")
}

#[test]
fn home_menu_opens_schedule_and_roster() {
    let (_dir, mut app) = new_app();
    assert_eq!(app.state.view, View::Home);

    press(&mut app, KeyCode::Enter);
    assert_eq!(app.state.view, View::Schedule);
    assert_eq!(app.state.calendar.months.len(), 9);

    press(&mut app, KeyCode::Esc);
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.state.view, View::Roster);

    press(&mut app, KeyCode::Char('q'));
    assert!(app.should_quit);
}

#[test]
fn add_player_form_saves_typed_fields() {
    let (_dir, mut app) = new_app();
    press(&mut app, KeyCode::Char('r'));
    press(&mut app, KeyCode::Char('a'));
    assert_eq!(app.state.view, View::PlayerForm);
    assert_eq!(app.state.form_background(), View::Roster);

    // Form fields swallow printable keys, including the quit key.
    type_text(&mut app, "Jaquan Walker");
    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "G");
    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "24");
    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "6'4\"");
    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "200");
    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "1000x");
    press(&mut app, KeyCode::Backspace);
    press(&mut app, KeyCode::Enter);

    assert!(!app.should_quit);
    assert_eq!(app.state.view, View::Roster);
    assert_eq!(app.state.players.len(), 1);
    let player = &app.state.players[0];
    assert_eq!(player.name, "Jaquan Walker");
    assert_eq!(player.position, "G");
    assert_eq!(player.age, 24);
    assert_eq!(player.salary, 1000.0);
}

#[test]
fn invalid_age_keeps_form_open_with_error() {
    let (_dir, mut app) = new_app();
    press(&mut app, KeyCode::Char('r'));
    press(&mut app, KeyCode::Char('a'));
    type_text(&mut app, "Ja'Kobe Walter");
    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "abc");
    press(&mut app, KeyCode::Enter);

    assert_eq!(app.state.view, View::PlayerForm);
    let form = app.state.form.as_ref().expect("form still open");
    assert!(form.error.is_some());
    assert!(app.state.notice.is_none());
    assert!(roster::list_players(app.db()).expect("list").is_empty());

    press(&mut app, KeyCode::Esc);
    assert_eq!(app.state.view, View::Roster);
    assert!(app.state.form.is_none());
}

#[test]
fn edit_from_profile_returns_to_profile() {
    let (_dir, mut app) = new_app();
    let id = seed_player(&app, "Scottie Barnes");
    app.view_profile(id);
    assert_eq!(app.state.view, View::PlayerProfile);

    press(&mut app, KeyCode::Char('e'));
    assert_eq!(app.state.view, View::PlayerForm);
    assert_eq!(app.state.form_background(), View::PlayerProfile);
    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Backspace);
    type_text(&mut app, "G");
    press(&mut app, KeyCode::Enter);

    assert_eq!(app.state.view, View::PlayerProfile);
    let profile = app.state.profile.as_ref().expect("profile loaded");
    assert_eq!(profile.player.position, "G");
}

#[test]
fn delete_requires_confirmation() {
    let (_dir, mut app) = new_app();
    seed_player(&app, "Chris Boucher");
    app.show_roster();

    press(&mut app, KeyCode::Char('d'));
    let prompt = app.state.confirm.as_ref().map(PendingAction::prompt);
    assert_eq!(
        prompt.as_deref(),
        Some("Are you sure you want to delete Chris Boucher?")
    );

    press(&mut app, KeyCode::Char('n'));
    assert!(app.state.confirm.is_none());
    assert_eq!(app.state.players.len(), 1);

    press(&mut app, KeyCode::Char('d'));
    press(&mut app, KeyCode::Char('y'));
    assert!(app.state.players.is_empty());
    assert!(roster::list_players(app.db()).expect("list").is_empty());
}

#[test]
fn profile_shows_each_season_outcome() {
    let (_dir, mut app) = new_app();
    let known = seed_player(&app, "Scottie Barnes");
    let broken = seed_player(&app, "Offline Guy");

    app.view_profile(known);
    let profile = app.state.profile.as_ref().expect("profile loaded");
    assert_eq!(profile.seasons.len(), 2);
    assert_eq!(profile.seasons[0].season.to_string(), "2024-25");
    assert!(matches!(profile.seasons[0].outcome, StatsOutcome::Loaded(avg) if avg.games_played == 64));
    assert_eq!(profile.seasons[1].season.to_string(), "2023-24");
    assert_eq!(profile.seasons[1].outcome, StatsOutcome::NotFound);

    app.view_profile(broken);
    let profile = app.state.profile.as_ref().expect("profile loaded");
    assert!(matches!(
        &profile.seasons[0].outcome,
        StatsOutcome::Unavailable(msg) if msg.contains("connection refused")
    ));
    // A failed lookup still shows the profile.
    assert_eq!(app.state.view, View::PlayerProfile);
    assert!(app.state.notice.is_none());
}

#[test]
fn clear_schedule_confirms_then_reports() {
    let (_dir, mut app) = new_app();
    schedule::insert_game(
        app.db(),
        &GameEntry::new("2024-10-23", "Cavaliers", "Home", "7:30 PM"),
    )
    .expect("insert");
    app.show_schedule();
    assert_eq!(app.state.game_count, 1);

    press(&mut app, KeyCode::Char('c'));
    assert_eq!(app.state.confirm, Some(PendingAction::ClearSchedule));
    press(&mut app, KeyCode::Char('y'));

    assert_eq!(app.state.game_count, 0);
    let notice = app.state.notice.clone().expect("notice shown");
    assert_eq!(notice.kind, NoticeKind::Info);
    assert_eq!(notice.title, "Schedule Cleared");
    assert_eq!(notice.body, "All schedules have been removed.");

    // Keys other than dismiss are swallowed while the notice is up.
    press(&mut app, KeyCode::Char('b'));
    assert_eq!(app.state.view, View::Schedule);
    press(&mut app, KeyCode::Enter);
    assert!(app.state.notice.is_none());
}

#[test]
fn import_prompt_loads_file_and_summarizes() {
    let (dir, mut app) = new_app();
    let path = dir.path().join("games.txt");
    fs::write(
        &path,
        "Oct 22, 2024, Celtics, Home, 7:30 PM\nOct 22, 2024, Celtics, Home, 7:30 PM\n2024-11-01, Hawks, Away, 7:00 PM\n",
    )
    .expect("write schedule");

    app.show_schedule();
    press(&mut app, KeyCode::Char('u'));
    assert_eq!(app.state.view, View::ImportPrompt);
    type_text(&mut app, &path.display().to_string());
    press(&mut app, KeyCode::Enter);

    assert_eq!(app.state.view, View::Schedule);
    assert_eq!(app.state.game_count, 2);
    let notice = app.state.notice.clone().expect("summary shown");
    assert_eq!(notice.title, "Schedule Upload");
    assert_eq!(
        notice.body,
        "Schedule upload complete.\nNew games added: 2\nDuplicate games skipped: 1"
    );

    let october = app.state.calendar.month("October 2024").expect("october");
    assert_eq!(october.cell(22).map(|c| c.games.len()), Some(1));
}

#[test]
fn failed_import_shows_error_and_keeps_schedule_empty() {
    let (dir, mut app) = new_app();
    let missing = dir.path().join("missing.txt");

    app.show_schedule();
    press(&mut app, KeyCode::Char('u'));
    type_text(&mut app, &missing.display().to_string());
    press(&mut app, KeyCode::Enter);

    assert_eq!(app.state.view, View::Schedule);
    let notice = app.state.notice.clone().expect("error shown");
    assert_eq!(notice.kind, NoticeKind::Error);
    assert!(notice.body.contains("missing.txt"));
    assert_eq!(schedule::count_games(app.db()).expect("count"), 0);
    assert!(app.state.logs.iter().any(|l| l.starts_with("[ERROR]")));
}

#[test]
fn month_navigation_wraps() {
    let (_dir, mut app) = new_app();
    app.show_schedule();
    assert_eq!(app.state.schedule_month, 0);
    press(&mut app, KeyCode::Left);
    assert_eq!(app.state.schedule_month, 8);
    press(&mut app, KeyCode::Right);
    press(&mut app, KeyCode::Right);
    assert_eq!(app.state.schedule_month, 1);
}
