use anyhow::Result;
use tagarela_core::{BotResponder, ChatSession, Config, HistoryStore, TurnEvent};
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::AppEvent;

enum LoopEvent {
    Ui(AppEvent),
    Turn(TurnEvent),
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = Config::load().unwrap_or_else(|err| {
        warn!(error = %err, "failed to load config, using defaults");
        Config::default()
    });

    // Chat works purely in-memory when storage is unavailable.
    let history = match HistoryStore::open_default() {
        Ok(store) => Some(store),
        Err(err) => {
            warn!(error = %err, "history unavailable, running in-memory");
            None
        }
    };

    let responder = BotResponder::from_config(&config);
    let session = ChatSession::new(responder, history);
    let mut app = App::new(session);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    while !app.should_quit {
        terminal.draw(|f| ui::render(f, &mut app))?;

        let next = tokio::select! {
            event = events.next() => event.map(LoopEvent::Ui),
            turn = app.session.next_event() => turn.map(LoopEvent::Turn),
        };

        match next {
            Some(LoopEvent::Ui(event)) => handler::handle_event(&mut app, event)?,
            Some(LoopEvent::Turn(turn)) => handler::handle_turn(&mut app, turn),
            None => break,
        }
    }

    tui::restore()?;
    Ok(())
}

/// Log to a file: stderr carries the alternate screen, so it is not an
/// option while the TUI is up.
fn init_logging() {
    let Some(dir) = dirs::data_dir().map(|d| d.join("tagarela")) else {
        return;
    };
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = std::fs::File::create(dir.join("tagarela.log")) else {
        return;
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(file))
        .with_ansi(false)
        .init();
}
