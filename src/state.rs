use std::collections::VecDeque;

use crate::calendar::{CalendarView, SeasonLabel};
use crate::roster::{Player, PlayerInput};
use crate::stats_fetch::SeasonAverages;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Roster,
    PlayerProfile,
    PlayerForm,
    Schedule,
    ImportPrompt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeItem {
    Schedule,
    Roster,
}

pub const HOME_ITEMS: [HomeItem; 2] = [HomeItem::Schedule, HomeItem::Roster];

pub fn home_item_label(item: HomeItem) -> &'static str {
    match item {
        HomeItem::Schedule => "View Schedule",
        HomeItem::Roster => "View Roster",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit(i64),
}

pub const FORM_FIELDS: [&str; 6] = ["Name", "Position", "Age", "Height", "Weight", "Salary"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerForm {
    pub mode: FormMode,
    pub fields: [String; 6],
    pub focus: usize,
    pub error: Option<String>,
}

impl PlayerForm {
    pub fn add() -> Self {
        Self {
            mode: FormMode::Add,
            fields: Default::default(),
            focus: 0,
            error: None,
        }
    }

    pub fn edit(player: &Player) -> Self {
        let input = PlayerInput::from_player(player);
        Self {
            mode: FormMode::Edit(player.id),
            fields: [
                input.name,
                input.position,
                input.age,
                input.height,
                input.weight,
                input.salary,
            ],
            focus: 0,
            error: None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Add => "Add New Player",
            FormMode::Edit(_) => "Edit Player",
        }
    }

    pub fn to_input(&self) -> PlayerInput {
        let [name, position, age, height, weight, salary] = self.fields.clone();
        PlayerInput {
            name,
            position,
            age,
            height,
            weight,
            salary,
        }
    }

    pub fn push_char(&mut self, ch: char) {
        self.fields[self.focus].push(ch);
    }

    pub fn backspace(&mut self) {
        self.fields[self.focus].pop();
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % FORM_FIELDS.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + FORM_FIELDS.len() - 1) % FORM_FIELDS.len();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatsOutcome {
    Loaded(SeasonAverages),
    NotFound,
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonStats {
    pub season: SeasonLabel,
    pub outcome: StatsOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerProfile {
    pub player: Player,
    pub seasons: Vec<SeasonStats>,
}

/// An action held back until the user answers the confirmation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    DeletePlayer { id: i64, name: String },
    ClearSchedule,
}

impl PendingAction {
    pub fn prompt(&self) -> String {
        match self {
            PendingAction::DeletePlayer { name, .. } => {
                format!("Are you sure you want to delete {name}?")
            }
            PendingAction::ClearSchedule => {
                "Are you sure you want to clear ALL schedules? This cannot be undone.".to_string()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Blocking message; key input is swallowed until it is dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub view: View,
    pub team_name: String,
    pub home_selected: usize,
    pub players: Vec<Player>,
    pub roster_selected: usize,
    pub profile: Option<PlayerProfile>,
    pub form: Option<PlayerForm>,
    /// Where the form returns to on save or cancel.
    pub form_back: View,
    pub calendar: CalendarView,
    pub schedule_month: usize,
    pub game_count: usize,
    pub import_path: String,
    pub confirm: Option<PendingAction>,
    pub notice: Option<Notice>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            view: View::Home,
            team_name: String::new(),
            home_selected: 0,
            players: Vec::new(),
            roster_selected: 0,
            profile: None,
            form: None,
            form_back: View::Roster,
            calendar: CalendarView::default(),
            schedule_month: 0,
            game_count: 0,
            import_path: String::new(),
            confirm: None,
            notice: None,
            logs: VecDeque::with_capacity(64),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// The view drawn underneath the player form.
    pub fn form_background(&self) -> View {
        match self.form_back {
            View::PlayerProfile if self.profile.is_some() => View::PlayerProfile,
            _ => View::Roster,
        }
    }

    pub fn selected_home_item(&self) -> HomeItem {
        HOME_ITEMS[self.home_selected % HOME_ITEMS.len()]
    }

    pub fn select_home_next(&mut self) {
        self.home_selected = (self.home_selected + 1) % HOME_ITEMS.len();
    }

    pub fn select_home_prev(&mut self) {
        self.home_selected = (self.home_selected + HOME_ITEMS.len() - 1) % HOME_ITEMS.len();
    }

    pub fn selected_player(&self) -> Option<&Player> {
        self.players.get(self.roster_selected)
    }

    pub fn select_player_next(&mut self) {
        let total = self.players.len();
        if total == 0 {
            self.roster_selected = 0;
            return;
        }
        self.roster_selected = (self.roster_selected + 1) % total;
    }

    pub fn select_player_prev(&mut self) {
        let total = self.players.len();
        if total == 0 {
            self.roster_selected = 0;
            return;
        }
        if self.roster_selected == 0 {
            self.roster_selected = total - 1;
        } else {
            self.roster_selected -= 1;
        }
    }

    pub fn clamp_roster_selection(&mut self) {
        let total = self.players.len();
        if total == 0 {
            self.roster_selected = 0;
        } else if self.roster_selected >= total {
            self.roster_selected = total - 1;
        }
    }

    pub fn next_month(&mut self) {
        let total = self.calendar.months.len();
        if total > 0 {
            self.schedule_month = (self.schedule_month + 1) % total;
        }
    }

    pub fn prev_month(&mut self) {
        let total = self.calendar.months.len();
        if total > 0 {
            self.schedule_month = (self.schedule_month + total - 1) % total;
        }
    }
}
