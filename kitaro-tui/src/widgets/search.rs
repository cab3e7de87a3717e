//! Search box widget.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub struct SearchBar<'a> {
    pub title: &'a str,
    pub query: &'a str,
    pub focused: bool,
    pub placeholder: &'a str,
    pub text_style: Style,
    pub placeholder_style: Style,
    pub border_style: Style,
}

impl<'a> SearchBar<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let line = if self.query.is_empty() && !self.focused {
            Line::from(Span::styled(self.placeholder, self.placeholder_style))
        } else {
            let cursor = if self.focused { "_" } else { "" };
            Line::from(vec![
                Span::styled("> ", self.placeholder_style),
                Span::styled(format!("{}{}", self.query, cursor), self.text_style),
            ])
        };

        let paragraph = Paragraph::new(line).block(
            Block::default()
                .title(self.title)
                .borders(Borders::ALL)
                .border_style(self.border_style),
        );
        f.render_widget(paragraph, area);
    }
}
