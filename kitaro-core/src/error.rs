//! Error types for registry domain operations

use thiserror::Error;

use crate::wizard::{TaskState, TaskStep, WizardPhase};

/// Format validation failures.
///
/// The display strings are the exact operator-facing messages.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("INVALID FORMAT: Handle must be 1-15 characters.")]
    InvalidHandle,

    #[error("INVALID LINK: Must be a direct URL to an X post/reply.")]
    InvalidLink,

    #[error("INVALID HARDWARE: Must be a valid 42-character EVM address.")]
    InvalidWallet,
}

impl ValidationError {
    /// Name of the field this error refers to, in wire (camelCase) form.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::InvalidHandle => "xHandle",
            ValidationError::InvalidLink => "link",
            ValidationError::InvalidWallet => "evmWallet",
        }
    }
}

/// Rejected wizard transitions.
///
/// A rejected action leaves the wizard state untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("{action} is not allowed while step {step:?} is {state:?}")]
    InvalidTransition {
        action: &'static str,
        step: TaskStep,
        state: TaskState,
    },

    #[error("{action} is not allowed in phase {phase:?}")]
    WrongPhase {
        action: &'static str,
        phase: WizardPhase,
    },

    #[error("Timer for step {fired:?} fired while step {active:?} is active")]
    StaleTimer { fired: TaskStep, active: TaskStep },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
