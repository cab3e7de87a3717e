//! Executes app commands: timers, HTTP calls and browser launches.
//!
//! Each command runs on its own task and reports back through the event
//! channel, so the draw loop never blocks.

use crate::api_client::ApiClient;
use crate::events::TuiEvent;
use crate::state::Command;
use std::process::Stdio;
use tokio::sync::mpsc;

/// Context needed to run commands.
#[derive(Clone)]
pub struct Runtime {
    pub api: ApiClient,
    pub open_urls: bool,
    pub events: mpsc::Sender<TuiEvent>,
}

impl Runtime {
    pub fn new(api: ApiClient, open_urls: bool, events: mpsc::Sender<TuiEvent>) -> Self {
        Self {
            api,
            open_urls,
            events,
        }
    }

    /// Start every command. Returns `true` when one of them asks to quit.
    pub fn execute(&self, commands: Vec<Command>) -> bool {
        let mut quit = false;
        for command in commands {
            match command {
                Command::Quit => quit = true,
                other => self.spawn(other),
            }
        }
        quit
    }

    fn spawn(&self, command: Command) {
        let events = self.events.clone();
        match command {
            Command::StartTimer { step, kind, delay } => {
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = events.send(TuiEvent::Timer { step, kind }).await;
                });
            }
            Command::Submit(payload) => {
                let api = self.api.clone();
                tokio::spawn(async move {
                    let result = api
                        .submit_operative(&payload)
                        .await
                        .map_err(|e| e.submit_failure());
                    let _ = events.send(TuiEvent::Submitted(result)).await;
                });
            }
            Command::LoadRegistry => {
                let api = self.api.clone();
                tokio::spawn(async move {
                    let result = api.fetch_registry().await.map_err(|e| e.user_message());
                    let _ = events.send(TuiEvent::RegistryLoaded(result)).await;
                });
            }
            Command::OpenUrl(url) => {
                let open_urls = self.open_urls;
                tokio::spawn(async move {
                    if !open_urls || open_in_browser(&url).await.is_err() {
                        let _ = events.send(TuiEvent::OpenFailed(url)).await;
                    }
                });
            }
            Command::Quit => {}
        }
    }
}

async fn open_in_browser(url: &str) -> std::io::Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        tokio::process::Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut cmd = tokio::process::Command::new("cmd");
        cmd.args(["/C", "start", ""]);
        cmd
    } else {
        tokio::process::Command::new("xdg-open")
    };
    let status = command
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("opener exited with {}", status),
        ))
    }
}
