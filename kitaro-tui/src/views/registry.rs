//! Leaderboard view.

use crate::state::App;
use crate::theme::podium_color;
use crate::widgets::SearchBar;
use kitaro_core::registry::{EMPTY_MESSAGE, VERIFIED_STATUS};
use kitaro_core::RegistryStatus;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    SearchBar {
        title: "Search",
        query: app.registry.query(),
        focused: app.search_active,
        placeholder: "press / to search by handle or wallet",
        text_style: Style::default().fg(app.theme.text),
        placeholder_style: Style::default().fg(app.theme.text_dim),
        border_style: Style::default().fg(if app.search_active {
            app.theme.border_focus
        } else {
            app.theme.border
        }),
    }
    .render(f, layout[0]);

    let block = Block::default()
        .title(format!("Global Registry ({} operatives)", app.registry.total()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));

    match app.registry.status() {
        RegistryStatus::Loading if app.registry.total() == 0 => {
            let text = Paragraph::new("ACCESSING MAINFRAME...")
                .style(Style::default().fg(app.theme.warning))
                .block(block);
            f.render_widget(text, layout[1]);
        }
        RegistryStatus::Failed(message) => {
            let text = Paragraph::new(format!("UPLINK FAILED: {}", message))
                .style(Style::default().fg(app.theme.error))
                .block(block);
            f.render_widget(text, layout[1]);
        }
        _ => render_table(f, app, layout[1], block),
    }
}

fn render_table(f: &mut Frame<'_>, app: &App, area: Rect, block: Block<'_>) {
    let visible = app.registry.visible();
    if visible.is_empty() {
        let text = Paragraph::new(EMPTY_MESSAGE)
            .style(Style::default().fg(app.theme.text_dim))
            .block(block);
        f.render_widget(text, area);
        return;
    }

    let header = Row::new(vec!["RANK", "OPERATIVE", "WALLET", "REFERRALS", "STATUS"]).style(
        Style::default()
            .fg(app.theme.primary)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = visible
        .iter()
        .map(|row| {
            let style = if row.is_podium() {
                Style::default()
                    .fg(podium_color(row.rank, &app.theme))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(app.theme.text)
            };
            Row::new(vec![
                Cell::from(row.rank_label().unwrap_or_else(|| row.rank.to_string())),
                Cell::from(row.x_handle.clone()),
                Cell::from(row.wallet_display.clone()),
                Cell::from(row.referrals.to_string()),
                Cell::from(VERIFIED_STATUS),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Percentage(30),
            Constraint::Length(14),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(block);
    f.render_widget(table, area);
}
