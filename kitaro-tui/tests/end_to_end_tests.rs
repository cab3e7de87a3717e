//! Drives the wizard through the real API router over HTTP.
//!
//! The server runs in-process on an ephemeral port over the in-memory store;
//! wizard delays are zero so timers fire immediately.

use std::time::Duration;

use kitaro_api::{create_api_router, ApiConfig, AppState};
use kitaro_core::{RegistryStatus, TaskStep, WizardPhase, WizardTimings};
use kitaro_test_utils::fixtures::wallet;
use kitaro_tui::api_client::ApiClient;
use kitaro_tui::config::{TaskUrlsConfig, TuiConfig};
use kitaro_tui::events::TuiEvent;
use kitaro_tui::keys::KeyAction;
use kitaro_tui::runtime::Runtime;
use kitaro_tui::state::{App, Command};
use tokio::sync::mpsc;

async fn spawn_api() -> std::io::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = create_api_router(AppState::in_memory(), &ApiConfig::default());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{}", addr))
}

struct Harness {
    app: App,
    runtime: Runtime,
    events: mpsc::Receiver<TuiEvent>,
}

impl Harness {
    fn new(base_url: &str, entry: Option<&str>) -> Self {
        let config = TuiConfig {
            api_base_url: base_url.to_string(),
            site_origin: "https://megakitaro.xyz".to_string(),
            request_timeout_ms: 5_000,
            tick_rate_ms: 100,
            open_urls: false,
            task_urls: TaskUrlsConfig {
                follow: "https://x.com/megakitaro".to_string(),
                broadcast: "https://x.com/megakitaro/status/1".to_string(),
            },
        };
        let api = match ApiClient::new(&config) {
            Ok(api) => api,
            Err(e) => panic!("client: {}", e),
        };
        let timings = WizardTimings {
            handshake: Duration::ZERO,
            auto_advance: Duration::ZERO,
            input_advance: Duration::ZERO,
        };
        let (app, startup) = App::with_timings(config, entry, timings);
        let (tx, rx) = mpsc::channel(64);
        let runtime = Runtime::new(api, false, tx);
        runtime.execute(startup);
        Self {
            app,
            runtime,
            events: rx,
        }
    }

    fn press(&mut self, action: KeyAction) {
        let commands = self.app.handle_action(action);
        self.run(commands);
    }

    fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.press(KeyAction::InsertChar(c));
        }
    }

    fn run(&mut self, commands: Vec<Command>) {
        assert!(!self.runtime.execute(commands));
    }

    /// Feed runtime events back into the app until `done` holds.
    async fn pump_until(&mut self, done: impl Fn(&App) -> bool) {
        while !done(&self.app) {
            let event = tokio::time::timeout(Duration::from_secs(5), self.events.recv()).await;
            let commands = match event {
                Ok(Some(TuiEvent::Timer { step, kind })) => self.app.on_timer(step, kind),
                Ok(Some(TuiEvent::Submitted(result))) => self.app.on_submitted(result),
                Ok(Some(TuiEvent::RegistryLoaded(result))) => {
                    self.app.on_registry_loaded(result);
                    Vec::new()
                }
                Ok(Some(TuiEvent::OpenFailed(url))) => {
                    self.app.on_open_failed(url);
                    Vec::new()
                }
                Ok(Some(_)) => Vec::new(),
                Ok(None) | Err(_) => panic!("timed out waiting for the app to settle"),
            };
            self.run(commands);
        }
    }

    async fn complete_wizard(&mut self, handle: &str, wallet: &str) {
        let proofs = [
            (TaskStep::Follow, Some(handle.to_string())),
            (TaskStep::Amplify, None),
            (TaskStep::Recruit, Some("https://x.com/op/status/100".to_string())),
            (TaskStep::Declare, Some("https://x.com/op/status/200".to_string())),
        ];
        for (step, proof) in proofs {
            self.press(KeyAction::Confirm);
            if let Some(text) = proof {
                self.pump_until(|app| app.wizard.accepts_input()).await;
                self.type_text(&text);
                self.press(KeyAction::Confirm);
            }
            self.pump_until(move |app| app.wizard.active_step() > step).await;
        }

        self.type_text(wallet);
        self.press(KeyAction::Confirm);
        self.pump_until(|app| app.wizard.phase() != WizardPhase::Submitting)
            .await;
    }

    fn last_message(&self) -> Option<&str> {
        self.app.notifications.last().map(|n| n.message.as_str())
    }
}

#[tokio::test]
async fn referral_flow_end_to_end() -> std::io::Result<()> {
    let base = spawn_api().await?;

    let mut boss = Harness::new(&base, None);
    boss.complete_wizard("boss", &wallet(1)).await;
    assert_eq!(boss.app.wizard.phase(), WizardPhase::Submitted);
    assert_eq!(boss.last_message(), Some("SIGNATURE ACCEPTED."));
    let link = boss.app.referral_link();
    assert_eq!(link.as_deref(), Some("https://megakitaro.xyz/?ref=boss"));

    let mut recruit = Harness::new(&base, link.as_deref());
    assert_eq!(recruit.app.wizard.referrer(), Some("@boss"));
    recruit.complete_wizard("kitaro", &wallet(2)).await;
    assert_eq!(recruit.app.wizard.phase(), WizardPhase::Submitted);

    recruit.press(KeyAction::SwitchView(1));
    recruit
        .pump_until(|app| app.registry.status() != &RegistryStatus::Loading)
        .await;
    let visible = recruit.app.registry.visible();
    assert_eq!(visible.len(), 2);
    assert_eq!(visible[0].x_handle, "@boss");
    assert_eq!(visible[0].referrals, 1);
    assert!(visible[0].is_podium());
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_reports_server_message() -> std::io::Result<()> {
    let base = spawn_api().await?;

    let mut first = Harness::new(&base, None);
    first.complete_wizard("kitaro", &wallet(7)).await;
    assert_eq!(first.app.wizard.phase(), WizardPhase::Submitted);

    let mut second = Harness::new(&base, None);
    second.complete_wizard("kitaro", &wallet(8)).await;
    assert_eq!(second.app.wizard.phase(), WizardPhase::Tasks);
    assert_eq!(second.app.wizard.active_step(), TaskStep::SecureHardware);
    assert_eq!(
        second.last_message(),
        Some("ERROR: Handle or Wallet already exists in the registry.")
    );
    Ok(())
}
