//! KITARO TUI entry point.
//!
//! Usage: `kitaro-tui --config kitaro-tui.toml [--ref handle | --entry-url URL]`

use crossterm::{
    event::{self, Event as CrosstermEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use kitaro_tui::api_client::ApiClient;
use kitaro_tui::config::{arg_value, TuiConfig};
use kitaro_tui::error::TuiError;
use kitaro_tui::events::TuiEvent;
use kitaro_tui::keys::map_key;
use kitaro_tui::runtime::Runtime;
use kitaro_tui::state::App;
use kitaro_tui::views::render_view;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), TuiError> {
    let config = TuiConfig::load()?;
    let api = ApiClient::new(&config)?;

    // `--ref boss` is shorthand for an entry URL carrying `?ref=boss`.
    let entry = arg_value("--entry-url").or_else(|| arg_value("--ref").map(|r| format!("ref={}", r)));
    let tick_rate = Duration::from_millis(config.tick_rate_ms);
    let open_urls = config.open_urls;
    let (mut app, startup) = App::new(config, entry.as_deref());

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard;

    let (event_tx, mut event_rx) = mpsc::channel::<TuiEvent>(256);
    let runtime = Runtime::new(api, open_urls, event_tx.clone());

    spawn_input_reader(event_tx.clone());
    runtime.execute(startup);

    let mut ticker = tokio::time::interval(tick_rate);

    loop {
        terminal.draw(|f| render_view(f, &app))?;

        tokio::select! {
            _ = ticker.tick() => {}
            Some(event) = event_rx.recv() => {
                let commands = handle_event(&mut app, event);
                if runtime.execute(commands) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn handle_event(app: &mut App, event: TuiEvent) -> Vec<kitaro_tui::state::Command> {
    match event {
        TuiEvent::Input(key) => match map_key(key, app.input_mode()) {
            Some(action) => app.handle_action(action),
            None => Vec::new(),
        },
        TuiEvent::Timer { step, kind } => app.on_timer(step, kind),
        TuiEvent::Submitted(result) => app.on_submitted(result),
        TuiEvent::RegistryLoaded(result) => {
            app.on_registry_loaded(result);
            Vec::new()
        }
        TuiEvent::OpenFailed(url) => {
            app.on_open_failed(url);
            Vec::new()
        }
        TuiEvent::Resize { .. } => Vec::new(),
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

fn spawn_input_reader(sender: mpsc::Sender<TuiEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            if let Ok(evt) = event::read() {
                let sent = match evt {
                    CrosstermEvent::Key(key) => sender.blocking_send(TuiEvent::Input(key)),
                    CrosstermEvent::Resize(width, height) => {
                        sender.blocking_send(TuiEvent::Resize { width, height })
                    }
                    _ => Ok(()),
                };
                if sent.is_err() {
                    break;
                }
            }
        }
    });
}
