use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Screen};
use crate::mode::{GameMode, OptionKind, TimeLimit};
use crate::record::Orientation;
use crate::results::TallyField;
use crate::scoring::{streak_flames, STREAK_BONUS_THRESHOLD};
use crate::session::{HeartState, Phase, Resolution};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn legend(text: &str) -> Paragraph<'_> {
    Paragraph::new(Span::styled(text, Style::default().add_modifier(Modifier::ITALIC)))
        .alignment(Alignment::Center)
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.screen {
            Screen::Home => render_home(self, area, buf),
            Screen::Game => render_game(self, area, buf),
            Screen::Results => render_results(self, area, buf),
        }
    }
}

fn option_value(app: &App, kind: OptionKind) -> String {
    let options = app.selected_options();
    match kind {
        OptionKind::TimeControl => options.time_control.to_string(),
        OptionKind::Evaluation => if options.evaluation { "Yes" } else { "No" }.to_string(),
        OptionKind::TimeLimit => options.time_limit.to_string(),
    }
}

fn render_home(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2), // title
            Constraint::Length(2), // mode tabs
            Constraint::Min(4),    // options or daily status
            Constraint::Length(2), // start
            Constraint::Length(2), // notice
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled("♞ Guess The ELO", bold().fg(Color::Yellow)))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let mut tabs = Vec::new();
    for (i, mode) in GameMode::ALL.iter().enumerate() {
        if i > 0 {
            tabs.push(Span::styled("  |  ", dim()));
        }
        let style = if *mode == app.selected_mode {
            bold().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED)
        } else {
            dim()
        };
        tabs.push(Span::styled(mode.title(), style));
    }
    Paragraph::new(Line::from(tabs))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let body: Vec<Line> = if app.selected_mode == GameMode::Daily {
        let ledger = app.session.ledger();
        vec![
            Line::from(Span::styled(
                format!("Daily Challenge #{}", ledger.challenge_number()),
                bold(),
            )),
            Line::from(format!(
                "Current streak: {}   Best streak: {}",
                ledger.current_streak(),
                ledger.best_streak()
            )),
            Line::from(Span::styled(
                format!("Next challenge in {}", ledger.time_until_reset()),
                dim(),
            )),
            Line::from(Span::styled(
                format!("Time limit {}   Evaluation on", TimeLimit::Secs90),
                dim(),
            )),
        ]
    } else {
        OptionKind::ALL
            .iter()
            .enumerate()
            .map(|(i, kind)| {
                let selected = i == app.selected_option;
                let style = if selected { bold().fg(Color::Cyan) } else { Style::default() };
                Line::from(vec![
                    Span::styled(format!("{:>14}  ", kind.label()), dim()),
                    Span::styled(
                        if selected {
                            format!("< {} >", option_value(app, *kind))
                        } else {
                            format!("  {}  ", option_value(app, *kind))
                        },
                        style,
                    ),
                ])
            })
            .collect()
    };
    Paragraph::new(body)
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    let label = app.start_label();
    Paragraph::new(Span::styled(
        format!("[ {label} ]"),
        bold().fg(Color::Green),
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);

    if let Some(notice) = &app.notice {
        Paragraph::new(Span::styled(notice.as_str(), Style::default().fg(Color::Red)))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[4], buf);
    }

    let keys = if app.selected_mode == GameMode::Daily {
        "(tab) mode / (enter) start / (esc) quit"
    } else {
        "(tab) mode / (↑↓) option / (←→) change / (enter) start / (esc) quit"
    };
    legend(keys).render(chunks[5], buf);
}

fn score_line(app: &App) -> Line<'static> {
    let session = &app.session;
    let streak = session.streak();
    let score_style = if streak >= STREAK_BONUS_THRESHOLD {
        bold().fg(Color::LightRed)
    } else {
        bold()
    };
    let mut spans = vec![
        Span::styled(session.rounds_label(), dim()),
        Span::raw("   "),
        Span::styled(format!("Score {}", session.game_score()), score_style),
    ];
    let flames = streak_flames(streak);
    if flames > 0 {
        spans.push(Span::raw(format!(" {}", "🔥".repeat(flames))));
    }
    if session.mode() == GameMode::Endless {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            "♥ ".repeat(session.lives() as usize),
            Style::default().fg(Color::Red),
        ));
        let partial = match session.heart_state() {
            HeartState::Empty => "",
            HeartState::Low => "♡·",
            HeartState::Mid => "♡♡",
        };
        spans.push(Span::styled(partial, Style::default().fg(Color::Red).add_modifier(Modifier::DIM)));
    }
    Line::from(spans)
}

fn clock_text(app: &App) -> Option<String> {
    let view = app.view.as_ref()?;
    if !view.time_limit.is_limited() {
        return None;
    }
    if let Some(frozen) = view.frozen_seconds_remaining {
        return Some(format!("⏱ {frozen}s"));
    }
    let countdown = app.session.countdown();
    let remaining = match &app.outcome {
        Some(outcome) => outcome.record.seconds_remaining as f64,
        None => countdown.seconds_remaining(),
    };
    Some(format!("⏱ {remaining:.1}s"))
}

fn render_game(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(view) = app.view.as_ref() else {
        return;
    };
    let inner_width = area.width.saturating_sub(HORIZONTAL_MARGIN * 2 + 2).max(1);
    let move_lines = ((view.moves.width() as f64 / inner_width as f64).ceil() as u16).clamp(1, 12);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),              // label
            Constraint::Length(1),              // score, rounds, lives
            Constraint::Length(1),              // clock
            Constraint::Length(move_lines + 2), // moves
            Constraint::Length(1),              // orientation
            Constraint::Length(5),              // choices
            Constraint::Min(2),                 // banner
            Constraint::Length(1),              // legend
        ])
        .split(area);

    Paragraph::new(Span::styled(view.label.as_str(), bold()))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);
    Paragraph::new(score_line(app))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
    if let Some(clock) = clock_text(app) {
        let low = app.session.countdown().is_running()
            && app.session.countdown().seconds_remaining() <= 10.0;
        let style = if low { bold().fg(Color::Red) } else { dim() };
        Paragraph::new(Span::styled(clock, style))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
    }

    let title = if view.evaluation { " Moves · eval on " } else { " Moves " };
    Paragraph::new(view.moves.as_str())
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);

    let side = match view.orientation {
        Orientation::White => "White",
        Orientation::Black => "Black",
    };
    Paragraph::new(Span::styled(
        format!("Guess {side}'s rating"),
        Style::default().fg(Color::Cyan),
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);

    let record = app.outcome.as_ref().map(|o| &o.record);
    let choices: Vec<Line> = view
        .choices
        .iter()
        .enumerate()
        .map(|(i, elo)| {
            let style = match record {
                Some(r) if *elo == r.correct_elo => bold().fg(Color::Green),
                Some(r) if r.user_answer == Some(*elo) => bold().fg(Color::Red),
                Some(_) => dim(),
                None => bold(),
            };
            Line::from(Span::styled(format!("({}) {elo}", i + 1), style))
        })
        .collect();
    Paragraph::new(choices)
        .alignment(Alignment::Center)
        .render(chunks[5], buf);

    if let Some(outcome) = &app.outcome {
        let color = match outcome.resolution {
            Resolution::Correct => Color::Green,
            Resolution::Incorrect => Color::Red,
            Resolution::Timeout => Color::Yellow,
        };
        let lines: Vec<Line> = outcome
            .banner
            .lines()
            .map(|l| Line::from(Span::styled(l.to_string(), bold().fg(color))))
            .collect();
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(chunks[6], buf);
    }

    let keys = match (app.session.phase(), app.outcome.as_ref()) {
        (Phase::RoundResolved, Some(o)) if o.session_over => "(enter) view results / (esc) menu",
        (Phase::RoundResolved, _) => "(enter) next round / (esc) menu",
        _ => "(1-4) answer / (esc) menu",
    };
    legend(keys).render(chunks[7], buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(results) = app.results.as_ref() else {
        return;
    };
    let manual_height = app
        .manual_share
        .as_ref()
        .map_or(0, |t| t.lines().count() as u16 + 2);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),             // header
            Constraint::Length(2),             // summary
            Constraint::Length(6),             // breakdown
            Constraint::Length(1),             // notice
            Constraint::Length(manual_height), // manual copy
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled(results.header.as_str(), bold().fg(Color::Yellow)))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);
    Paragraph::new(results.summary.as_str())
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    if let Some(tally) = &app.tally {
        let t = app.tally_elapsed_ms;
        let row = |name: &str, field: TallyField, suffix: &str| -> Line<'static> {
            let value = if tally.is_visible(field, t) {
                format!("{}{suffix}", tally.value_at(field, t))
            } else {
                String::new()
            };
            Line::from(vec![
                Span::styled(format!("{name:>16}  "), dim()),
                Span::styled(format!("{value:<8}"), bold()),
            ])
        };
        let lines = vec![
            row("Base score", TallyField::Base, ""),
            row("Time bonus", TallyField::TimeBonus, ""),
            row("Streak bonus", TallyField::StreakBonus, ""),
            row("Longest streak", TallyField::LongestStreak, ""),
            Line::default(),
            row("Total", TallyField::Total, ""),
        ];
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
    }

    if let Some(notice) = &app.notice {
        Paragraph::new(Span::styled(notice.as_str(), Style::default().fg(Color::Green)))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
    }
    if let Some(text) = &app.manual_share {
        Paragraph::new(text.as_str())
            .block(Block::default().borders(Borders::ALL).title(" Share "))
            .render(chunks[4], buf);
    }

    legend("(s) share / (enter) menu / (esc) menu").render(chunks[6], buf);
}
