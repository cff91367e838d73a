use std::path::PathBuf;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::calendar::{SeasonCalendar, SeasonLabel, build_calendar};
use crate::db::Database;
use crate::roster::{self, PlayerInputError};
use crate::schedule;
use crate::schedule_import::import_schedule_file;
use crate::state::{
    AppState, FormMode, HomeItem, Notice, PendingAction, PlayerForm, PlayerProfile, SeasonStats,
    StatsOutcome, View,
};
use crate::stats_fetch::StatsProvider;

/// Key handling and store access. Each action finishes its store calls
/// before returning, so the next draw always reflects the database.
pub struct App {
    pub state: AppState,
    pub should_quit: bool,
    db: Database,
    calendar: SeasonCalendar,
    stats: Box<dyn StatsProvider>,
}

impl App {
    pub fn new(
        db: Database,
        calendar: SeasonCalendar,
        stats: Box<dyn StatsProvider>,
        team_name: impl Into<String>,
    ) -> Self {
        let mut state = AppState::new();
        state.team_name = team_name.into();
        Self {
            state,
            should_quit: false,
            db,
            calendar,
            stats,
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn calendar(&self) -> &SeasonCalendar {
        &self.calendar
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if self.state.notice.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.state.notice = None;
            }
            return;
        }
        if let Some(action) = self.state.confirm.clone() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.state.confirm = None;
                    self.run_confirmed(action);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.state.confirm = None;
                    self.state.push_log("[INFO] Cancelled");
                }
                _ => {}
            }
            return;
        }

        match self.state.view {
            View::PlayerForm => return self.on_form_key(key),
            View::ImportPrompt => return self.on_import_key(key),
            _ => {}
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('?') => {
                self.state.help_overlay = !self.state.help_overlay;
                return;
            }
            _ => {}
        }

        match self.state.view {
            View::Home => self.on_home_key(key),
            View::Roster => self.on_roster_key(key),
            View::PlayerProfile => self.on_profile_key(key),
            View::Schedule => self.on_schedule_key(key),
            View::PlayerForm | View::ImportPrompt => {}
        }
    }

    fn on_home_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.select_home_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_home_prev(),
            KeyCode::Enter => match self.state.selected_home_item() {
                HomeItem::Schedule => self.show_schedule(),
                HomeItem::Roster => self.show_roster(),
            },
            KeyCode::Char('s') => self.show_schedule(),
            KeyCode::Char('r') => self.show_roster(),
            _ => {}
        }
    }

    fn on_roster_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.select_player_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_player_prev(),
            KeyCode::Enter | KeyCode::Char('p') => {
                if let Some(id) = self.state.selected_player().map(|p| p.id) {
                    self.view_profile(id);
                }
            }
            KeyCode::Char('a') => self.open_add_form(),
            KeyCode::Char('e') => {
                if let Some(id) = self.state.selected_player().map(|p| p.id) {
                    self.open_edit_form(id);
                }
            }
            KeyCode::Char('d') => {
                if let Some(p) = self.state.selected_player() {
                    self.state.confirm = Some(PendingAction::DeletePlayer {
                        id: p.id,
                        name: p.name.clone(),
                    });
                }
            }
            KeyCode::Char('b') | KeyCode::Esc => self.show_home(),
            _ => {}
        }
    }

    fn on_profile_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('b') | KeyCode::Esc => self.show_roster(),
            KeyCode::Char('e') => {
                if let Some(id) = self.state.profile.as_ref().map(|p| p.player.id) {
                    self.open_edit_form(id);
                }
            }
            _ => {}
        }
    }

    fn on_schedule_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => self.state.next_month(),
            KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => self.state.prev_month(),
            KeyCode::Char('u') => {
                self.state.import_path.clear();
                self.state.view = View::ImportPrompt;
            }
            KeyCode::Char('c') => self.state.confirm = Some(PendingAction::ClearSchedule),
            KeyCode::Char('b') | KeyCode::Esc => self.show_home(),
            _ => {}
        }
    }

    fn on_form_key(&mut self, key: KeyEvent) {
        let Some(form) = self.state.form.as_mut() else {
            self.state.view = self.state.form_back;
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.state.form = None;
                self.state.view = self.state.form_back;
            }
            KeyCode::Enter => self.submit_form(),
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => form.push_char(ch),
            _ => {}
        }
    }

    fn on_import_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state.view = View::Schedule,
            KeyCode::Enter => self.submit_import(),
            KeyCode::Backspace => {
                self.state.import_path.pop();
            }
            KeyCode::Char(ch) => self.state.import_path.push(ch),
            _ => {}
        }
    }

    pub fn show_home(&mut self) {
        self.state.view = View::Home;
    }

    pub fn show_roster(&mut self) {
        match roster::list_players(&self.db) {
            Ok(players) => {
                self.state.players = players;
                self.state.clamp_roster_selection();
                self.state.view = View::Roster;
            }
            Err(err) => self.fail("Roster", &err),
        }
    }

    pub fn view_profile(&mut self, player_id: i64) {
        let player = match roster::get_player(&self.db, player_id) {
            Ok(Some(player)) => player,
            Ok(None) => {
                self.state.push_log(format!("[WARN] Player {player_id} no longer exists"));
                self.show_roster();
                return;
            }
            Err(err) => return self.fail("Player Profile", &err),
        };

        let current = self.calendar.season();
        let seasons = [current, current.previous()]
            .into_iter()
            .map(|season| SeasonStats {
                season,
                outcome: self.lookup_stats(&player.name, &season),
            })
            .collect();
        self.state.profile = Some(PlayerProfile { player, seasons });
        self.state.view = View::PlayerProfile;
    }

    fn lookup_stats(&mut self, name: &str, season: &SeasonLabel) -> StatsOutcome {
        match self.stats.lookup(name, season) {
            Ok(Some(avg)) => StatsOutcome::Loaded(avg),
            Ok(None) => StatsOutcome::NotFound,
            Err(err) => {
                log::warn!("stats lookup for {name} ({season}) failed: {err:#}");
                self.state
                    .push_log(format!("[WARN] Stats for {name} ({season}) unavailable"));
                StatsOutcome::Unavailable(format!("{err:#}"))
            }
        }
    }

    pub fn open_add_form(&mut self) {
        self.state.form = Some(PlayerForm::add());
        self.state.form_back = View::Roster;
        self.state.view = View::PlayerForm;
    }

    pub fn open_edit_form(&mut self, player_id: i64) {
        match roster::get_player(&self.db, player_id) {
            Ok(Some(player)) => {
                self.state.form_back = self.state.view;
                self.state.form = Some(PlayerForm::edit(&player));
                self.state.view = View::PlayerForm;
            }
            Ok(None) => {
                self.state.push_log(format!("[WARN] Player {player_id} no longer exists"));
                self.show_roster();
            }
            Err(err) => self.fail("Edit Player", &err),
        }
    }

    fn submit_form(&mut self) {
        let Some(form) = self.state.form.as_ref() else {
            return;
        };
        let input = form.to_input();
        let mode = form.mode;
        let result = match mode {
            FormMode::Add => roster::insert_player(&self.db, &input).map(Some),
            FormMode::Edit(id) => roster::update_player(&self.db, id, &input)
                .map(|changed| changed.then_some(id)),
        };

        match result {
            Ok(saved) => {
                self.state.form = None;
                match (mode, saved) {
                    (FormMode::Add, Some(id)) => {
                        self.state.push_log(format!("[INFO] Added {} (id {id})", input.name.trim()));
                    }
                    (FormMode::Edit(id), Some(_)) => {
                        self.state.push_log(format!("[INFO] Updated player {id}"));
                    }
                    (_, None) => self.state.push_log("[WARN] Player no longer exists"),
                }
                let back = self.state.form_back;
                match (back, saved) {
                    (View::PlayerProfile, Some(id)) => self.view_profile(id),
                    _ => self.show_roster(),
                }
            }
            Err(err) => {
                if let Some(input_err) = err.downcast_ref::<PlayerInputError>() {
                    let msg = input_err.to_string();
                    if let Some(form) = self.state.form.as_mut() {
                        form.error = Some(msg);
                    }
                } else {
                    self.fail("Save Player", &err);
                }
            }
        }
    }

    pub fn show_schedule(&mut self) {
        let games = match schedule::list_games(&self.db) {
            Ok(games) => games,
            Err(err) => return self.fail("Schedule", &err),
        };
        let calendar = build_calendar(&self.calendar, &games);
        if !calendar.skipped.is_empty() {
            self.state.push_log(format!(
                "[WARN] Skipped {} game(s) with unparsable dates",
                calendar.skipped.len()
            ));
        }
        self.state
            .push_log(format!("[INFO] Loaded {} games", games.len()));
        self.state.game_count = games.len();
        self.state.calendar = calendar;
        if self.state.schedule_month >= self.state.calendar.months.len() {
            self.state.schedule_month = 0;
        }
        self.state.view = View::Schedule;
    }

    fn submit_import(&mut self) {
        let raw = self.state.import_path.trim().to_string();
        if raw.is_empty() {
            self.state.view = View::Schedule;
            return;
        }
        let path = PathBuf::from(raw);
        match import_schedule_file(&self.db, &path) {
            Ok(summary) => {
                self.state.push_log(format!(
                    "[INFO] Imported {}: {} added, {} duplicate",
                    path.display(),
                    summary.added,
                    summary.duplicates
                ));
                self.show_schedule();
                self.state.notice = Some(Notice::info(
                    "Schedule Upload",
                    format!(
                        "Schedule upload complete.\nNew games added: {}\nDuplicate games skipped: {}",
                        summary.added, summary.duplicates
                    ),
                ));
            }
            Err(err) => {
                let err = anyhow::Error::new(err);
                self.state.view = View::Schedule;
                self.fail("Schedule Upload", &err);
            }
        }
    }

    fn run_confirmed(&mut self, action: PendingAction) {
        match action {
            PendingAction::DeletePlayer { id, name } => {
                match roster::delete_player(&self.db, id) {
                    Ok(true) => self.state.push_log(format!("[INFO] Deleted {name}")),
                    Ok(false) => self.state.push_log(format!("[WARN] {name} was already removed")),
                    Err(err) => return self.fail("Delete Player", &err),
                }
                self.show_roster();
            }
            PendingAction::ClearSchedule => {
                if let Err(err) = self.clear_schedule() {
                    return self.fail("Clear Schedule", &err);
                }
                self.show_schedule();
                self.state.notice = Some(Notice::info(
                    "Schedule Cleared",
                    "All schedules have been removed.",
                ));
            }
        }
    }

    fn clear_schedule(&mut self) -> Result<()> {
        let removed = schedule::delete_all_games(&self.db)?;
        self.state.push_log(format!("[INFO] Cleared {removed} game(s)"));
        Ok(())
    }

    fn fail(&mut self, title: &str, err: &anyhow::Error) {
        log::error!("{title}: {err:#}");
        self.state.push_log(format!("[ERROR] {title}: {err}"));
        self.state.notice = Some(Notice::error("Error", format!("{title} failed: {err:#}")));
    }
}
