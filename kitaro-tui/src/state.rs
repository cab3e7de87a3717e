//! Application state.
//!
//! `App` owns the wizard and the leaderboard model and never performs I/O.
//! Every handler returns the [`Command`]s the runtime must execute.

use crate::config::TuiConfig;
use crate::keys::{InputMode, KeyAction};
use crate::nav::View;
use crate::notifications::{Notification, NotificationLevel};
use crate::theme::KitaroTheme;
use kitaro_core::{
    Effect, RegistrationPayload, RegistryEntry, RegistryView, SubmitFailure, TaskStep, TimerKind,
    WizardAction, WizardError, WizardState, WizardTimings,
};
use std::time::Duration;

/// Notifications kept for the footer.
const NOTIFICATION_HISTORY: usize = 32;

/// Work the runtime performs on behalf of the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    OpenUrl(String),
    StartTimer {
        step: TaskStep,
        kind: TimerKind,
        delay: Duration,
    },
    Submit(RegistrationPayload),
    LoadRegistry,
    Quit,
}

#[derive(Debug, Clone)]
pub struct App {
    pub config: TuiConfig,
    pub theme: KitaroTheme,
    pub active_view: View,
    pub wizard: WizardState,
    pub registry: RegistryView,
    /// Search box on the registry view has focus.
    pub search_active: bool,
    pub notifications: Vec<Notification>,
}

impl App {
    /// Build the app from the entry URL or bare `ref` value, along with any
    /// commands the greeting produced.
    pub fn new(config: TuiConfig, entry: Option<&str>) -> (Self, Vec<Command>) {
        Self::with_timings(config, entry, WizardTimings::default())
    }

    pub fn with_timings(
        config: TuiConfig,
        entry: Option<&str>,
        timings: WizardTimings,
    ) -> (Self, Vec<Command>) {
        let (wizard, effects) = WizardState::from_entry(entry);
        let wizard = wizard.with_urls(config.task_urls()).with_timings(timings);
        let mut app = Self {
            config,
            theme: KitaroTheme::kitaro(),
            active_view: View::Wizard,
            wizard,
            registry: RegistryView::new(),
            search_active: false,
            notifications: Vec::new(),
        };
        let commands = app.absorb(effects);
        (app, commands)
    }

    pub fn input_mode(&self) -> InputMode {
        let typing = match self.active_view {
            View::Wizard => self.wizard.accepts_input(),
            View::Registry => self.search_active,
        };
        if typing {
            InputMode::Typing
        } else {
            InputMode::Navigate
        }
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification::new(level, message));
        if self.notifications.len() > NOTIFICATION_HISTORY {
            let excess = self.notifications.len() - NOTIFICATION_HISTORY;
            self.notifications.drain(..excess);
        }
    }

    /// Referral link shown once registration succeeded.
    pub fn referral_link(&self) -> Option<String> {
        self.wizard.referral_link(&self.config.site_origin)
    }

    // ========================================================================
    // INPUT
    // ========================================================================

    pub fn handle_action(&mut self, action: KeyAction) -> Vec<Command> {
        match action {
            KeyAction::Quit => vec![Command::Quit],
            KeyAction::NextView => self.switch_view(self.active_view.next()),
            KeyAction::PrevView => self.switch_view(self.active_view.previous()),
            KeyAction::SwitchView(index) => match View::from_index(index) {
                Some(view) => self.switch_view(view),
                None => Vec::new(),
            },
            KeyAction::Refresh => match self.active_view {
                View::Registry => self.load_registry(),
                View::Wizard => Vec::new(),
            },
            KeyAction::OpenSearch => {
                if self.active_view == View::Registry {
                    self.search_active = true;
                }
                Vec::new()
            }
            KeyAction::Cancel => {
                if self.active_view == View::Registry {
                    if !self.search_active {
                        self.registry.set_query("");
                    }
                    self.search_active = false;
                }
                Vec::new()
            }
            KeyAction::Confirm => match self.active_view {
                View::Wizard => self.confirm_step(),
                View::Registry => {
                    self.search_active = false;
                    Vec::new()
                }
            },
            KeyAction::InsertChar(c) => match self.active_view {
                View::Wizard => {
                    let mut value = self.wizard.input_value().to_string();
                    value.push(c);
                    self.dispatch(WizardAction::Edit(value))
                }
                View::Registry => {
                    self.registry.push_query_char(c);
                    Vec::new()
                }
            },
            KeyAction::DeleteChar => match self.active_view {
                View::Wizard => {
                    let mut value = self.wizard.input_value().to_string();
                    value.pop();
                    self.dispatch(WizardAction::Edit(value))
                }
                View::Registry => {
                    self.registry.pop_query_char();
                    Vec::new()
                }
            },
        }
    }

    fn switch_view(&mut self, view: View) -> Vec<Command> {
        if view == self.active_view {
            return Vec::new();
        }
        self.active_view = view;
        self.search_active = false;
        match view {
            View::Registry => self.load_registry(),
            View::Wizard => Vec::new(),
        }
    }

    fn load_registry(&mut self) -> Vec<Command> {
        self.registry.begin_loading();
        vec![Command::LoadRegistry]
    }

    /// Enter on the wizard: run the step, or submit the typed proof.
    fn confirm_step(&mut self) -> Vec<Command> {
        let action = if self.wizard.active_step() == TaskStep::SecureHardware {
            WizardAction::SubmitWallet
        } else if self.wizard.accepts_input() {
            WizardAction::SubmitInput
        } else {
            WizardAction::Execute
        };
        self.dispatch(action)
    }

    // ========================================================================
    // RUNTIME EVENTS
    // ========================================================================

    pub fn on_timer(&mut self, step: TaskStep, kind: TimerKind) -> Vec<Command> {
        self.dispatch(WizardAction::TimerElapsed { step, kind })
    }

    pub fn on_submitted(&mut self, result: Result<String, SubmitFailure>) -> Vec<Command> {
        let action = match result {
            Ok(_) => WizardAction::SubmissionSucceeded,
            Err(failure) => WizardAction::SubmissionFailed(failure),
        };
        self.dispatch(action)
    }

    /// A task link could not be launched; show it so it can be opened by hand.
    pub fn on_open_failed(&mut self, url: String) {
        self.notify(NotificationLevel::Info, format!("OPEN MANUALLY: {}", url));
    }

    pub fn on_registry_loaded(&mut self, result: Result<Vec<RegistryEntry>, String>) {
        match result {
            Ok(entries) => self.registry.load(entries),
            Err(message) => {
                self.notify(NotificationLevel::Error, message.clone());
                self.registry.fail(message);
            }
        }
    }

    /// Run one wizard transition.
    ///
    /// Validation failures become error notifications. Any other rejection
    /// is a key pressed at the wrong time and is dropped.
    pub fn dispatch(&mut self, action: WizardAction) -> Vec<Command> {
        match self.wizard.apply(action) {
            Ok(effects) => self.absorb(effects),
            Err(WizardError::Validation(err)) => {
                self.notify(NotificationLevel::Error, err.to_string());
                Vec::new()
            }
            Err(_) => Vec::new(),
        }
    }

    /// Turn notifications into footer entries and everything else into
    /// commands, keeping order.
    fn absorb(&mut self, effects: Vec<Effect>) -> Vec<Command> {
        let mut commands = Vec::new();
        for effect in effects {
            match effect {
                Effect::Notify { level, message } => self.notify(level.into(), message),
                Effect::OpenUrl(url) => commands.push(Command::OpenUrl(url)),
                Effect::StartTimer { step, kind, delay } => {
                    commands.push(Command::StartTimer { step, kind, delay })
                }
                Effect::Submit(payload) => commands.push(Command::Submit(payload)),
            }
        }
        commands
    }
}
