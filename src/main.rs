mod audio;
mod config;
mod controller;
mod error;
mod logging;
mod model;
mod view;

use std::io;
use std::sync::Arc;
use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use tokio::sync::Mutex;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use view::AppView;
use audio::AudioBackend;
use config::AppConfig;
use controller::AppController;
use model::{AppModel, Preferences, QuranClient};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::parse();

    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!(api_url = %config.api_url, imam_id = config.imam_id, "=== Quran TUI Starting ===");

    let preferences = Preferences::new(&config.data_dir);
    preferences.load_from_disk().await;
    let language = preferences.get_language().await;

    let client = QuranClient::new(&config.api_url, config.imam_id, config.timeout())?;

    let mut app_model = AppModel::new(config.display(), language);
    app_model.set_client(client);
    app_model.set_preferences(preferences);
    let volume = app_model.get_volume().await;

    let model = Arc::new(Mutex::new(app_model));
    let audio_backend: Arc<Mutex<Option<AudioBackend>>> = Arc::new(Mutex::new(None));
    let controller = AppController::new(model.clone(), audio_backend.clone());

    // Initialize audio backend in background; the app stays usable without sound
    let (event_tx, event_rx) = tokio::sync::mpsc::unbounded_channel();
    controller.start_player_event_listener(event_rx);

    let audio_backend_init = audio_backend.clone();
    let model_for_init = model.clone();
    tokio::spawn(async move {
        let opened = tokio::task::spawn_blocking(move || AudioBackend::new(event_tx, volume)).await;
        match opened {
            Ok(Ok(backend)) => {
                tracing::info!(volume, "Audio backend ready");
                *audio_backend_init.lock().await = Some(backend);
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Audio init failed");
                let model = model_for_init.lock().await;
                model.set_error(format!("Audio init failed: {}", e)).await;
            }
            Err(e) => tracing::error!(error = %e, "Audio init task panicked"),
        }
    });

    // Initial route: a surah passed on the command line, otherwise the list
    let controller_for_route = controller.clone();
    let initial_surah = config.surah.clone();
    tokio::spawn(async move {
        match initial_surah {
            Some(raw) => controller_for_route.open_surah(Some(raw.as_str())).await,
            None => controller_for_route.load_surah_list().await,
        }
    });

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model.clone(), controller.clone()).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    // Silence playback before the audio thread is torn down
    let commands = model.lock().await.stop_playback().await;
    controller.dispatch(commands).await;
    audio_backend.lock().await.take();

    tracing::info!("Quran TUI shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
) -> io::Result<()> {
    loop {
        // Get current state
        let (playback, ui_state, content_state, should_quit) = {
            let model_guard = model.lock().await;

            // Auto-clear old errors (after 5 seconds)
            model_guard.auto_clear_old_errors().await;

            (
                model_guard.get_playback_info().await,
                model_guard.get_ui_state().await,
                model_guard.get_content_state().await,
                model_guard.should_quit().await,
            )
        };

        terminal.draw(|f| {
            AppView::render(f, &playback, &ui_state, &content_state);
        })?;

        // Handle input with shorter poll time for smoother UI updates
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = controller.handle_key_event(key).await {
                    tracing::warn!(error = %e, "Key handling failed");
                }
            }
        }

        if should_quit {
            break;
        }
    }

    Ok(())
}
