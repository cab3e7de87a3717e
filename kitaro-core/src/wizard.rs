//! Registration wizard state machine.
//!
//! The wizard walks an operative through five tasks in a fixed order. All of
//! its state lives in [`WizardState`] and every change goes through
//! [`WizardState::apply`], which either rejects the action (leaving the state
//! untouched) or mutates the state and returns the [`Effect`]s the client
//! runtime must perform: open a URL, arm a timer, show a notification, or send
//! the registration.
//!
//! Per step: `Idle -> Loading -> (Input | Completed) -> Idle(next step)`.
//! The active step only ever moves forward and there is no way back.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, WizardError};
use crate::validation::{
    normalize_handle_input, referral_link, referrer_from_query, validate_evm_wallet,
    validate_status_link, validate_x_handle,
};

// ============================================================================
// STEPS AND STATES
// ============================================================================

/// The five wizard tasks, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaskStep {
    /// Follow the campaign account, then prove it with a handle.
    Follow,
    /// Like and repost the broadcast. Nothing to prove.
    Amplify,
    /// Tag two allies under the broadcast, then paste the comment link.
    Recruit,
    /// Quote the broadcast, then paste the quote link.
    Declare,
    /// Provide the wallet and submit.
    SecureHardware,
}

impl TaskStep {
    pub fn all() -> &'static [TaskStep] {
        &[
            TaskStep::Follow,
            TaskStep::Amplify,
            TaskStep::Recruit,
            TaskStep::Declare,
            TaskStep::SecureHardware,
        ]
    }

    /// 1-based step number.
    pub fn number(&self) -> u8 {
        match self {
            TaskStep::Follow => 1,
            TaskStep::Amplify => 2,
            TaskStep::Recruit => 3,
            TaskStep::Declare => 4,
            TaskStep::SecureHardware => 5,
        }
    }

    pub fn next(&self) -> Option<TaskStep> {
        match self {
            TaskStep::Follow => Some(TaskStep::Amplify),
            TaskStep::Amplify => Some(TaskStep::Recruit),
            TaskStep::Recruit => Some(TaskStep::Declare),
            TaskStep::Declare => Some(TaskStep::SecureHardware),
            TaskStep::SecureHardware => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TaskStep::Follow => "Establish Comm Link",
            TaskStep::Amplify => "Amplify Signal",
            TaskStep::Recruit => "Recruit Operatives",
            TaskStep::Declare => "Declare Allegiance",
            TaskStep::SecureHardware => "Secure Hardware",
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            TaskStep::Follow => "Follow @megakitaro on X network.",
            TaskStep::Amplify => "Like and Repost the primary broadcast.",
            TaskStep::Recruit => "Tag 2 allies in the broadcast comments.",
            TaskStep::Declare => "Quote the broadcast with: \"MegaKitaro On Top\".",
            TaskStep::SecureHardware => "Provide EVM compatible address for payload delivery.",
        }
    }

    /// Status line shown while the step's simulated check runs.
    pub fn loading_label(&self) -> &'static str {
        match self {
            TaskStep::Follow => "AWAITING HANDSHAKE...",
            TaskStep::Amplify => "SCANNING NETWORK...",
            TaskStep::Recruit => "VERIFYING TARGETS...",
            TaskStep::Declare => "ANALYZING QUOTE...",
            TaskStep::SecureHardware => "INJECTING DATA INTO MAINFRAME...",
        }
    }

    /// Whether the step asks for proof after its external action.
    pub fn requires_input(&self) -> bool {
        !matches!(self, TaskStep::Amplify)
    }

    /// Whether the step starts with an external action (opening a URL).
    pub fn has_external_action(&self) -> bool {
        !matches!(self, TaskStep::SecureHardware)
    }
}

/// Progress within the active step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Idle,
    Loading,
    Input,
    Completed,
}

/// Overall wizard phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardPhase {
    /// Working through the tasks.
    Tasks,
    /// Registration sent, waiting for the server.
    Submitting,
    /// Terminal: the registry accepted the operative.
    Submitted,
}

// ============================================================================
// FORM AND PAYLOAD
// ============================================================================

/// Fields accumulated across the wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    pub x_handle: String,
    pub comment_link: String,
    pub quote_link: String,
    pub evm_wallet: String,
}

/// Registration body sent to the registry.
///
/// Every field defaults so that a sparse body still deserializes and is
/// rejected by validation rather than by the JSON layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationPayload {
    pub x_handle: String,
    pub comment_link: String,
    pub quote_link: String,
    pub evm_wallet: String,
    pub referrer: Option<String>,
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// URLs opened by the external actions of steps 1-4.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUrls {
    pub follow: String,
    pub broadcast: String,
}

impl Default for TaskUrls {
    fn default() -> Self {
        Self {
            follow: "https://x.com/megakitaro".to_string(),
            broadcast: "https://x.com/megakitaro/status/2023794261649752549?s=46".to_string(),
        }
    }
}

/// Simulated delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardTimings {
    /// Loading time after an external action.
    pub handshake: Duration,
    /// Pause before advancing from a step without input.
    pub auto_advance: Duration,
    /// Pause before advancing after a validated input.
    pub input_advance: Duration,
}

impl Default for WizardTimings {
    fn default() -> Self {
        Self {
            handshake: Duration::from_millis(4000),
            auto_advance: Duration::from_millis(1000),
            input_advance: Duration::from_millis(500),
        }
    }
}

// ============================================================================
// ACTIONS AND EFFECTS
// ============================================================================

/// Which simulated delay a timer models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// The external action "completes".
    Handshake,
    /// The completed step hands over to the next one.
    Advance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotifyLevel {
    Info,
    Success,
    Error,
}

/// Why a registration submission did not go through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitFailure {
    /// The registry answered with an error message.
    Rejected(String),
    /// The registry could not be reached.
    Unreachable,
}

impl SubmitFailure {
    /// Notification text for the operator.
    pub fn message(&self) -> String {
        match self {
            SubmitFailure::Rejected(reason) => format!("ERROR: {}", reason),
            SubmitFailure::Unreachable => "CONNECTION FAILED. TRY AGAIN.".to_string(),
        }
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardAction {
    /// Run the active step's external action.
    Execute,
    /// A timer armed by an earlier effect fired.
    TimerElapsed { step: TaskStep, kind: TimerKind },
    /// Replace the text of the active step's input.
    Edit(String),
    /// Submit the proof for steps 1, 3 or 4.
    SubmitInput,
    /// Submit the wallet and send the registration (step 5).
    SubmitWallet,
    SubmissionSucceeded,
    SubmissionFailed(SubmitFailure),
}

impl WizardAction {
    fn name(&self) -> &'static str {
        match self {
            WizardAction::Execute => "Execute",
            WizardAction::TimerElapsed { .. } => "TimerElapsed",
            WizardAction::Edit(_) => "Edit",
            WizardAction::SubmitInput => "SubmitInput",
            WizardAction::SubmitWallet => "SubmitWallet",
            WizardAction::SubmissionSucceeded => "SubmissionSucceeded",
            WizardAction::SubmissionFailed(_) => "SubmissionFailed",
        }
    }
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    OpenUrl(String),
    StartTimer {
        step: TaskStep,
        kind: TimerKind,
        delay: Duration,
    },
    Notify {
        level: NotifyLevel,
        message: String,
    },
    /// Send the registration. The only network call the wizard makes.
    Submit(RegistrationPayload),
}

impl Effect {
    fn notify(level: NotifyLevel, message: impl Into<String>) -> Self {
        Effect::Notify {
            level,
            message: message.into(),
        }
    }
}

// ============================================================================
// STATE
// ============================================================================

/// Complete wizard state for one session. Nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardState {
    active: TaskStep,
    task_state: TaskState,
    phase: WizardPhase,
    form: FormData,
    referrer: Option<String>,
    urls: TaskUrls,
    timings: WizardTimings,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new(None)
    }
}

impl WizardState {
    pub fn new(referrer: Option<String>) -> Self {
        Self {
            active: TaskStep::Follow,
            task_state: TaskState::Idle,
            phase: WizardPhase::Tasks,
            form: FormData::default(),
            referrer,
            urls: TaskUrls::default(),
            timings: WizardTimings::default(),
        }
    }

    /// Start a session from the entry URL (or bare query string), reading the
    /// `ref` parameter once. Returns the greeting effects.
    pub fn from_entry(entry: Option<&str>) -> (Self, Vec<Effect>) {
        let referrer = entry.and_then(referrer_from_query);
        let effects = match &referrer {
            Some(handle) => vec![Effect::notify(
                NotifyLevel::Success,
                format!("UPLINK ESTABLISHED: Referred by {}", handle),
            )],
            None => Vec::new(),
        };
        (Self::new(referrer), effects)
    }

    pub fn with_urls(mut self, urls: TaskUrls) -> Self {
        self.urls = urls;
        self
    }

    pub fn with_timings(mut self, timings: WizardTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn active_step(&self) -> TaskStep {
        self.active
    }

    pub fn task_state(&self) -> TaskState {
        self.task_state
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    pub fn form(&self) -> &FormData {
        &self.form
    }

    pub fn referrer(&self) -> Option<&str> {
        self.referrer.as_deref()
    }

    pub fn is_step_completed(&self, step: TaskStep) -> bool {
        self.phase == WizardPhase::Submitted || step < self.active
    }

    /// Whether the active step currently shows a text input.
    pub fn accepts_input(&self) -> bool {
        if self.phase != WizardPhase::Tasks {
            return false;
        }
        match self.active {
            TaskStep::SecureHardware => self.task_state == TaskState::Idle,
            _ => self.task_state == TaskState::Input,
        }
    }

    /// Current text of the active step's input.
    pub fn input_value(&self) -> &str {
        match self.active {
            TaskStep::Follow => &self.form.x_handle,
            TaskStep::Amplify => "",
            TaskStep::Recruit => &self.form.comment_link,
            TaskStep::Declare => &self.form.quote_link,
            TaskStep::SecureHardware => &self.form.evm_wallet,
        }
    }

    /// The operative's own referral link, once registered.
    pub fn referral_link(&self, origin: &str) -> Option<String> {
        (self.phase == WizardPhase::Submitted)
            .then(|| referral_link(origin, &self.form.x_handle))
    }

    /// The registration body built from the accumulated form.
    pub fn payload(&self) -> RegistrationPayload {
        RegistrationPayload {
            x_handle: self.form.x_handle.clone(),
            comment_link: self.form.comment_link.clone(),
            quote_link: self.form.quote_link.clone(),
            evm_wallet: self.form.evm_wallet.clone(),
            referrer: self.referrer.clone(),
        }
    }

    /// Apply one action.
    ///
    /// On `Err` the state is unchanged. On `Ok` the returned effects must be
    /// executed in order.
    pub fn apply(&mut self, action: WizardAction) -> Result<Vec<Effect>, WizardError> {
        let name = action.name();
        match action {
            WizardAction::Execute => self.execute(name),
            WizardAction::TimerElapsed { step, kind } => self.timer_elapsed(name, step, kind),
            WizardAction::Edit(value) => self.edit(name, value),
            WizardAction::SubmitInput => self.submit_input(name),
            WizardAction::SubmitWallet => self.submit_wallet(name),
            WizardAction::SubmissionSucceeded => {
                self.require_phase(name, WizardPhase::Submitting)?;
                self.phase = WizardPhase::Submitted;
                self.task_state = TaskState::Completed;
                Ok(vec![Effect::notify(NotifyLevel::Success, "SIGNATURE ACCEPTED.")])
            }
            WizardAction::SubmissionFailed(failure) => {
                self.require_phase(name, WizardPhase::Submitting)?;
                self.phase = WizardPhase::Tasks;
                self.task_state = TaskState::Idle;
                Ok(vec![Effect::notify(NotifyLevel::Error, failure.message())])
            }
        }
    }

    fn require_phase(&self, action: &'static str, phase: WizardPhase) -> Result<(), WizardError> {
        if self.phase != phase {
            return Err(WizardError::WrongPhase {
                action,
                phase: self.phase,
            });
        }
        Ok(())
    }

    fn invalid(&self, action: &'static str) -> WizardError {
        WizardError::InvalidTransition {
            action,
            step: self.active,
            state: self.task_state,
        }
    }

    fn execute(&mut self, name: &'static str) -> Result<Vec<Effect>, WizardError> {
        self.require_phase(name, WizardPhase::Tasks)?;
        if self.task_state != TaskState::Idle || !self.active.has_external_action() {
            return Err(self.invalid(name));
        }

        let url = match self.active {
            TaskStep::Follow => self.urls.follow.clone(),
            _ => self.urls.broadcast.clone(),
        };
        self.task_state = TaskState::Loading;
        Ok(vec![
            Effect::OpenUrl(url),
            Effect::StartTimer {
                step: self.active,
                kind: TimerKind::Handshake,
                delay: self.timings.handshake,
            },
        ])
    }

    fn timer_elapsed(
        &mut self,
        name: &'static str,
        step: TaskStep,
        kind: TimerKind,
    ) -> Result<Vec<Effect>, WizardError> {
        self.require_phase(name, WizardPhase::Tasks)?;
        if step != self.active {
            return Err(WizardError::StaleTimer {
                fired: step,
                active: self.active,
            });
        }

        match (kind, self.task_state) {
            (TimerKind::Handshake, TaskState::Loading) => {
                if self.active.requires_input() {
                    self.task_state = TaskState::Input;
                    Ok(Vec::new())
                } else {
                    self.task_state = TaskState::Completed;
                    Ok(vec![Effect::StartTimer {
                        step: self.active,
                        kind: TimerKind::Advance,
                        delay: self.timings.auto_advance,
                    }])
                }
            }
            (TimerKind::Advance, TaskState::Completed) => {
                let next = self.active.next().ok_or_else(|| self.invalid(name))?;
                self.active = next;
                self.task_state = TaskState::Idle;
                Ok(Vec::new())
            }
            _ => Err(self.invalid(name)),
        }
    }

    fn edit(&mut self, name: &'static str, value: String) -> Result<Vec<Effect>, WizardError> {
        if !self.accepts_input() {
            return Err(self.invalid(name));
        }
        match self.active {
            TaskStep::Follow => self.form.x_handle = normalize_handle_input(&value),
            TaskStep::Recruit => self.form.comment_link = value.trim().to_string(),
            TaskStep::Declare => self.form.quote_link = value.trim().to_string(),
            TaskStep::SecureHardware => self.form.evm_wallet = value.trim().to_string(),
            TaskStep::Amplify => return Err(self.invalid(name)),
        }
        Ok(Vec::new())
    }

    fn submit_input(&mut self, name: &'static str) -> Result<Vec<Effect>, WizardError> {
        self.require_phase(name, WizardPhase::Tasks)?;
        if self.task_state != TaskState::Input {
            return Err(self.invalid(name));
        }

        let checked: Result<(), ValidationError> = match self.active {
            TaskStep::Follow => validate_x_handle(&self.form.x_handle),
            TaskStep::Recruit => validate_status_link(&self.form.comment_link),
            TaskStep::Declare => validate_status_link(&self.form.quote_link),
            TaskStep::Amplify | TaskStep::SecureHardware => return Err(self.invalid(name)),
        };
        checked?;

        self.task_state = TaskState::Completed;
        Ok(vec![Effect::StartTimer {
            step: self.active,
            kind: TimerKind::Advance,
            delay: self.timings.input_advance,
        }])
    }

    fn submit_wallet(&mut self, name: &'static str) -> Result<Vec<Effect>, WizardError> {
        self.require_phase(name, WizardPhase::Tasks)?;
        if self.active != TaskStep::SecureHardware || self.task_state != TaskState::Idle {
            return Err(self.invalid(name));
        }
        validate_evm_wallet(&self.form.evm_wallet)?;

        self.phase = WizardPhase::Submitting;
        Ok(vec![
            Effect::notify(NotifyLevel::Info, TaskStep::SecureHardware.loading_label()),
            Effect::Submit(self.payload()),
        ])
    }
}
