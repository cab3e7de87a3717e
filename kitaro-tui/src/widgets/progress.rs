//! Progress bar widget for wizard completion.

use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Gauge},
    Frame,
};

pub struct ProgressBar {
    pub title: String,
    pub done: usize,
    pub total: usize,
    pub style: Style,
}

impl ProgressBar {
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.done as f64 / self.total as f64).clamp(0.0, 1.0)
        }
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let gauge = Gauge::default()
            .block(Block::default().title(self.title.as_str()).borders(Borders::ALL))
            .gauge_style(self.style)
            .label(format!("{}/{}", self.done, self.total))
            .ratio(self.ratio());
        f.render_widget(gauge, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_is_clamped() {
        let bar = |done, total| ProgressBar {
            title: String::new(),
            done,
            total,
            style: Style::default(),
        };
        assert_eq!(bar(0, 0).ratio(), 0.0);
        assert_eq!(bar(2, 5).ratio(), 0.4);
        assert_eq!(bar(9, 5).ratio(), 1.0);
    }
}
