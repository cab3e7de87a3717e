//! Terminal palette and color helpers.

use crate::notifications::NotificationLevel;
use kitaro_core::TaskState;
use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct KitaroTheme {
    pub bg: Color,
    pub bg_highlight: Color,
    pub primary: Color,
    pub primary_dim: Color,
    pub secondary: Color,
    pub gold: Color,
    pub silver: Color,
    pub bronze: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub text: Color,
    pub text_dim: Color,
    pub border: Color,
    pub border_focus: Color,
}

impl KitaroTheme {
    pub fn kitaro() -> Self {
        Self {
            bg: Color::Rgb(5, 5, 8),
            bg_highlight: Color::Rgb(30, 30, 36),
            primary: Color::Rgb(255, 0, 60),
            primary_dim: Color::Rgb(120, 0, 30),
            secondary: Color::Rgb(0, 255, 255),
            gold: Color::Rgb(255, 215, 0),
            silver: Color::Rgb(192, 192, 192),
            bronze: Color::Rgb(205, 127, 50),
            success: Color::Rgb(0, 255, 0),
            warning: Color::Rgb(255, 255, 0),
            error: Color::Rgb(255, 0, 0),
            info: Color::Rgb(0, 255, 255),
            text: Color::Rgb(255, 255, 255),
            text_dim: Color::Rgb(136, 136, 136),
            border: Color::Rgb(68, 68, 68),
            border_focus: Color::Rgb(255, 0, 60),
        }
    }
}

pub fn task_state_color(state: TaskState, theme: &KitaroTheme) -> Color {
    match state {
        TaskState::Idle => theme.text_dim,
        TaskState::Loading => theme.warning,
        TaskState::Input => theme.secondary,
        TaskState::Completed => theme.success,
    }
}

pub fn notification_color(level: NotificationLevel, theme: &KitaroTheme) -> Color {
    match level {
        NotificationLevel::Info => theme.info,
        NotificationLevel::Success => theme.success,
        NotificationLevel::Error => theme.error,
    }
}

/// Medal color for the top three ranks.
pub fn podium_color(rank: usize, theme: &KitaroTheme) -> Color {
    match rank {
        1 => theme.gold,
        2 => theme.silver,
        3 => theme.bronze,
        _ => theme.text,
    }
}
