//! View rendering dispatch.

pub mod registry;
pub mod wizard;

use crate::keys::InputMode;
use crate::nav::View;
use crate::state::App;
use crate::theme::notification_color;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render_view(f: &mut Frame<'_>, app: &App) {
    f.render_widget(
        Block::default().style(Style::default().bg(app.theme.bg)),
        f.size(),
    );

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    render_header(f, app, layout[0]);

    match app.active_view {
        View::Wizard => wizard::render(f, app, layout[1]),
        View::Registry => registry::render(f, app, layout[1]),
    }

    render_footer(f, app, layout[2]);
}

fn render_header(f: &mut Frame<'_>, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        "MEGAKITARO // WHITELIST REGISTRY",
        Style::default()
            .fg(app.theme.primary)
            .add_modifier(Modifier::BOLD),
    )];
    for (i, view) in View::all().iter().enumerate() {
        let style = if *view == app.active_view {
            Style::default()
                .fg(app.theme.text)
                .bg(app.theme.bg_highlight)
        } else {
            Style::default().fg(app.theme.text_dim)
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(format!("[{}] {}", i + 1, view.title()), style));
    }
    if let Some(referrer) = app.wizard.referrer() {
        spans.push(Span::styled(
            format!("  ref: {}", referrer),
            Style::default().fg(app.theme.secondary),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(header, area);
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: Rect) {
    let help = match (app.active_view, app.input_mode()) {
        (View::Wizard, InputMode::Typing) => "type proof • Enter submit • Tab registry • Ctrl-C quit",
        (View::Wizard, InputMode::Navigate) => "Enter execute • Tab registry • q quit",
        (View::Registry, InputMode::Typing) => "type to filter • Enter done • Esc close",
        (View::Registry, InputMode::Navigate) => "/ search • r refresh • Esc clear • Tab mission • q quit",
    };

    let (text, style) = match app.notifications.last() {
        Some(note) => (
            format!("{} {}", note.created_at.format("%H:%M:%S"), note.message),
            Style::default().fg(notification_color(note.level, &app.theme)),
        ),
        None => (help.to_string(), Style::default().fg(app.theme.text_dim)),
    };

    let footer = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title(help));
    f.render_widget(footer, area);
}
