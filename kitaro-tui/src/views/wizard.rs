//! Registration wizard view.

use crate::state::App;
use crate::theme::task_state_color;
use crate::widgets::ProgressBar;
use kitaro_core::{TaskState, TaskStep, WizardPhase};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(columns[0]);

    render_steps(f, app, left[0]);

    let done = TaskStep::all()
        .iter()
        .filter(|step| app.wizard.is_step_completed(**step))
        .count();
    ProgressBar {
        title: "Clearance".to_string(),
        done,
        total: TaskStep::all().len(),
        style: Style::default()
            .fg(app.theme.primary)
            .bg(app.theme.primary_dim),
    }
    .render(f, left[1]);

    if app.wizard.phase() == WizardPhase::Submitted {
        render_granted(f, app, columns[1]);
    } else {
        render_active_step(f, app, columns[1]);
    }
}

fn render_steps(f: &mut Frame<'_>, app: &App, area: Rect) {
    let active = app.wizard.active_step();
    let items: Vec<ListItem> = TaskStep::all()
        .iter()
        .map(|step| {
            let (marker, style) = if app.wizard.is_step_completed(*step) {
                ("[x]", Style::default().fg(app.theme.success))
            } else if *step == active {
                (
                    "[>]",
                    Style::default()
                        .fg(app.theme.primary)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                ("[ ]", Style::default().fg(app.theme.text_dim))
            };
            ListItem::new(Line::from(Span::styled(
                format!("{} {:02} {}", marker, step.number(), step.title()),
                style,
            )))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title("Directives")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(list, area);
}

fn status_label(app: &App) -> &'static str {
    if app.wizard.phase() == WizardPhase::Submitting {
        return app.wizard.active_step().loading_label();
    }
    match app.wizard.task_state() {
        TaskState::Idle if app.wizard.accepts_input() => "AWAITING INPUT",
        TaskState::Idle => "READY: press Enter",
        TaskState::Loading => app.wizard.active_step().loading_label(),
        TaskState::Input => "AWAITING PROOF",
        TaskState::Completed => "VERIFIED",
    }
}

fn render_active_step(f: &mut Frame<'_>, app: &App, area: Rect) {
    let step = app.wizard.active_step();
    let state_color = task_state_color(app.wizard.task_state(), &app.theme);

    let mut lines = vec![
        Line::from(Span::styled(
            format!("STEP {:02} // {}", step.number(), step.title()),
            Style::default()
                .fg(app.theme.primary)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            step.instruction(),
            Style::default().fg(app.theme.text),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("STATUS: {}", status_label(app)),
            Style::default().fg(state_color),
        )),
    ];

    if app.wizard.accepts_input() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("> ", Style::default().fg(app.theme.secondary)),
            Span::styled(
                format!("{}_", app.wizard.input_value()),
                Style::default().fg(app.theme.text),
            ),
        ]));
    }

    let panel = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("Active Directive")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border_focus)),
    );
    f.render_widget(panel, area);
}

fn render_granted(f: &mut Frame<'_>, app: &App, area: Rect) {
    let link = app.referral_link().unwrap_or_default();
    let lines = vec![
        Line::from(Span::styled(
            "ACCESS GRANTED",
            Style::default()
                .fg(app.theme.success)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Operative {} is on the registry.", app.wizard.form().x_handle),
            Style::default().fg(app.theme.text),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Recruit link:",
            Style::default().fg(app.theme.text_dim),
        )),
        Line::from(Span::styled(link, Style::default().fg(app.theme.secondary))),
    ];

    let panel = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("Clearance")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.success)),
    );
    f.render_widget(panel, area);
}
