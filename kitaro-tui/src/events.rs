//! Event types for the TUI event loop.

use crossterm::event::KeyEvent;
use kitaro_core::{RegistryEntry, SubmitFailure, TaskStep, TimerKind};

#[derive(Debug, Clone)]
pub enum TuiEvent {
    Input(KeyEvent),
    Resize { width: u16, height: u16 },
    /// A wizard timer armed for `step` ran out.
    Timer { step: TaskStep, kind: TimerKind },
    /// Registration finished; `Ok` holds the server's message.
    Submitted(Result<String, SubmitFailure>),
    RegistryLoaded(Result<Vec<RegistryEntry>, String>),
    /// A task link could not be opened in a browser.
    OpenFailed(String),
}
