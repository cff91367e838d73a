use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};

use roster_terminal::app::App;
use roster_terminal::calendar::{MonthGrid, SeasonCalendar, WEEKDAYS};
use roster_terminal::config::{AppConfig, Cli};
use roster_terminal::db::Database;
use roster_terminal::logging;
use roster_terminal::roster::format_salary;
use roster_terminal::state::{
    AppState, FORM_FIELDS, HOME_ITEMS, NoticeKind, SeasonStats, StatsOutcome, View,
    home_item_label,
};
use roster_terminal::stats_fetch::{NbaStatsProvider, OfflineStats, StatsProvider};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;
    config.apply_cli(&cli)?;

    if let Err(err) = logging::init_file_logger(&config.log_path) {
        eprintln!("warning: file logging disabled: {err:#}");
    }
    log::info!("starting with db {}", config.db_path.display());

    let db = Database::open(&config.db_path)?;
    let calendar = SeasonCalendar::new(config.season).context("season calendar")?;
    let stats: Box<dyn StatsProvider> = if config.stats_offline {
        Box::new(OfflineStats)
    } else {
        Box::new(NbaStatsProvider::new(config.stats_base_url.clone()))
    };
    let mut app = App::new(db, calendar, stats, config.team_name.clone());
    app.state
        .push_log(format!("[INFO] Database {}", config.db_path.display()));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("terminal loop failed: {err}");
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let poll_rate = Duration::from_millis(250);
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(poll_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let state = &app.state;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match state.view {
        View::Home => render_home(frame, chunks[1], state),
        View::Roster => render_roster(frame, chunks[1], state),
        View::PlayerProfile => render_profile(frame, chunks[1], state),
        View::Schedule => render_schedule(frame, chunks[1], state),
        View::PlayerForm => {
            match state.form_background() {
                View::PlayerProfile => render_profile(frame, chunks[1], state),
                _ => render_roster(frame, chunks[1], state),
            }
            render_player_form(frame, chunks[1], state);
        }
        View::ImportPrompt => {
            render_schedule(frame, chunks[1], state);
            render_import_prompt(frame, chunks[1], state);
        }
    }

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
    if let Some(action) = &state.confirm {
        render_confirm(frame, frame.size(), &action.prompt());
    }
    if state.notice.is_some() {
        render_notice(frame, frame.size(), state);
    }
}

fn header_text(app: &App) -> String {
    let state = &app.state;
    let season = app.calendar().season();
    let title = match state.view {
        View::Home => format!("{} ROSTER | Season {season}", state.team_name.to_uppercase()),
        View::Roster | View::PlayerForm => format!("ROSTER | {} players", state.players.len()),
        View::PlayerProfile => match &state.profile {
            Some(p) => format!("PLAYER | {}", p.player.name),
            None => "PLAYER".to_string(),
        },
        View::Schedule | View::ImportPrompt => {
            format!("SCHEDULE | Season {season} | {} games", state.game_count)
        }
    };
    let line1 = format!("  [#]  {title}");
    let line2 = format!("       {}", app.db().path().display());
    format!("{line1}\n{line2}")
}

fn footer_text(state: &AppState) -> String {
    match state.view {
        View::Home => "j/k/↑/↓ Move | Enter Open | s Schedule | r Roster | ? Help | q Quit".to_string(),
        View::Roster => {
            "j/k Move | Enter Profile | a Add | e Edit | d Delete | b/Esc Home | q Quit".to_string()
        }
        View::PlayerProfile => "e Edit | b/Esc Roster | q Quit".to_string(),
        View::PlayerForm => "Tab/↓ Next field | Shift-Tab/↑ Prev | Enter Save | Esc Cancel".to_string(),
        View::Schedule => {
            "h/l/←/→ Month | u Upload file | c Clear all | b/Esc Home | q Quit".to_string()
        }
        View::ImportPrompt => "Enter Import | Esc Cancel".to_string(),
    }
}

fn render_home(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut lines = vec![
        Line::from(Span::styled(
            format!("Welcome to the {} Roster App", state.team_name),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for (idx, item) in HOME_ITEMS.iter().enumerate() {
        let selected = idx == state.home_selected;
        let style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        let prefix = if selected { "> " } else { "  " };
        lines.push(Line::from(Span::styled(
            format!("{prefix}{}", home_item_label(*item)),
            style,
        )));
    }
    let home = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(home, area);
}

fn render_roster(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Roster").borders(Borders::ALL);
    if state.players.is_empty() {
        let empty = Paragraph::new("No players yet. Press a to add one.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(["Name", "Position", "Age", "Height", "Weight", "Salary"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows = state.players.iter().enumerate().map(|(idx, p)| {
        let style = if idx == state.roster_selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        Row::new(vec![
            Cell::from(p.name.clone()).style(Style::default().fg(Color::Cyan)),
            Cell::from(p.position.clone()),
            Cell::from(p.age.to_string()),
            Cell::from(p.height.clone()),
            Cell::from(p.weight.clone()),
            Cell::from(format_salary(p.salary)),
        ])
        .style(style)
    });
    let widths = [
        Constraint::Min(20),
        Constraint::Length(10),
        Constraint::Length(5),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(18),
    ];
    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

fn render_profile(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(profile) = &state.profile else {
        let empty = Paragraph::new("No player selected")
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    };

    let mut constraints = vec![Constraint::Length(8)];
    constraints.extend(profile.seasons.iter().map(|_| Constraint::Length(5)));
    constraints.push(Constraint::Min(0));
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let p = &profile.player;
    let details = [
        ("Position", p.position.clone()),
        ("Age", p.age.to_string()),
        ("Height", p.height.clone()),
        ("Weight", p.weight.clone()),
        ("Salary", format_salary(p.salary)),
    ];
    let lines: Vec<Line> = details
        .into_iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("{label}: "), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(value),
            ])
        })
        .collect();
    let info = Paragraph::new(lines)
        .block(Block::default().title(p.name.clone()).borders(Borders::ALL));
    frame.render_widget(info, sections[0]);

    for (idx, season) in profile.seasons.iter().enumerate() {
        render_season_stats(frame, sections[idx + 1], season);
    }
}

fn render_season_stats(frame: &mut Frame, area: Rect, stats: &SeasonStats) {
    let block = Block::default()
        .title(format!("{} Season Stats", stats.season.long_label()))
        .borders(Borders::ALL);
    match &stats.outcome {
        StatsOutcome::Loaded(avg) => {
            let header = Row::new([
                "Points Per Game",
                "Rebounds Per Game",
                "Assists Per Game",
                "Field Goal %",
                "3-Point %",
                "GP",
            ])
            .style(Style::default().add_modifier(Modifier::BOLD));
            let row = Row::new(vec![
                format!("{:.1}", avg.ppg),
                format!("{:.1}", avg.rpg),
                format!("{:.1}", avg.apg),
                format!("{:.1}%", avg.fg_pct),
                format!("{:.1}%", avg.three_pt_pct),
                avg.games_played.to_string(),
            ]);
            let widths = [Constraint::Ratio(1, 6); 6];
            let table = Table::new([row], widths).header(header).block(block);
            frame.render_widget(table, area);
        }
        StatsOutcome::NotFound => {
            let text = Paragraph::new("No stats found for this player")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(text, area);
        }
        StatsOutcome::Unavailable(msg) => {
            let text = Paragraph::new(format!("Stats unavailable: {msg}"))
                .style(Style::default().fg(Color::Yellow))
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(text, area);
        }
    }
}

fn render_schedule(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    let titles: Vec<String> = state
        .calendar
        .months
        .iter()
        .map(|m| m.label.clone())
        .collect();
    let tabs = Tabs::new(titles)
        .select(state.schedule_month)
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(tabs, sections[0]);

    let Some(month) = state.calendar.months.get(state.schedule_month) else {
        let empty = Paragraph::new("No calendar months configured")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, sections[2]);
        return;
    };

    let day_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 7); 7])
        .split(sections[1]);
    for (col, name) in WEEKDAYS.iter().enumerate() {
        let label = Paragraph::new(*name)
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::BOLD));
        frame.render_widget(label, day_cols[col]);
    }

    render_month_grid(frame, sections[2], month);
}

fn render_month_grid(frame: &mut Frame, area: Rect, month: &MonthGrid) {
    let weeks = month.weeks.len().max(1) as u32;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints((0..weeks).map(|_| Constraint::Ratio(1, weeks)))
        .split(area);

    for (row_idx, week) in month.weeks.iter().enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 7); 7])
            .split(rows[row_idx]);
        for (col, cell) in week.iter().enumerate() {
            let Some(cell) = cell else {
                continue;
            };
            let has_games = !cell.games.is_empty();
            let border_style = if has_games {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let text = cell
                .games
                .iter()
                .map(|g| g.label())
                .collect::<Vec<_>>()
                .join("\n");
            let day = Paragraph::new(text)
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .title(cell.day().to_string())
                        .borders(Borders::ALL)
                        .border_style(border_style),
                );
            frame.render_widget(day, cols[col]);
        }
    }
}

fn render_player_form(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(form) = &state.form else {
        return;
    };
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let mut lines = Vec::new();
    for (idx, label) in FORM_FIELDS.iter().enumerate() {
        let focused = idx == form.focus;
        let prefix = if focused { "> " } else { "  " };
        let cursor = if focused { "_" } else { "" };
        let style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{prefix}{label:<9}"), style.add_modifier(Modifier::BOLD)),
            Span::styled(format!("{}{cursor}", form.fields[idx]), style),
        ]));
    }
    if let Some(err) = &form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let popup = Paragraph::new(lines)
        .block(Block::default().title(form.title()).borders(Borders::ALL));
    frame.render_widget(popup, popup_area);
}

fn render_import_prompt(frame: &mut Frame, area: Rect, state: &AppState) {
    let popup_area = centered_rect(70, 40, area);
    frame.render_widget(Clear, popup_area);
    let text = [
        "Schedule file path:".to_string(),
        format!("> {}_", state.import_path),
        String::new(),
        "One game per line: date, opponent, location, time".to_string(),
        "e.g. Oct 22, 2024, Celtics, Home, 7:30 PM".to_string(),
    ]
    .join("\n");
    let popup = Paragraph::new(text)
        .block(Block::default().title("Upload Schedule File").borders(Borders::ALL));
    frame.render_widget(popup, popup_area);
}

fn render_confirm(frame: &mut Frame, area: Rect, prompt: &str) {
    let popup_area = centered_rect(50, 25, area);
    frame.render_widget(Clear, popup_area);
    let popup = Paragraph::new(format!("{prompt}\n\n[y] Yes   [n] No"))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title("Confirm")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        );
    frame.render_widget(popup, popup_area);
}

fn render_notice(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(notice) = &state.notice else {
        return;
    };
    let popup_area = centered_rect(50, 30, area);
    frame.render_widget(Clear, popup_area);
    let color = match notice.kind {
        NoticeKind::Info => Color::Green,
        NoticeKind::Error => Color::Red,
    };
    let popup = Paragraph::new(format!("{}\n\n[Enter] OK", notice.body))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(notice.title.clone())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
    frame.render_widget(popup, popup_area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Roster Terminal - Help",
        "",
        "Home:",
        "  s / r        Schedule / Roster",
        "",
        "Roster:",
        "  j/k or ↑/↓   Move",
        "  Enter        Player profile",
        "  a / e / d    Add / Edit / Delete",
        "",
        "Schedule:",
        "  h/l or ←/→   Previous / next month",
        "  u            Upload schedule file",
        "  c            Clear all games",
        "",
        "  b / Esc      Back",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
