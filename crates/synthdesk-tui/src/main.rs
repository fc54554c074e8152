use std::io;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use ratatui::Terminal;
use ratatui::crossterm::event;
use ratatui::crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::CrosstermBackend;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

mod action;
mod app;
mod backend;
mod config_file;
mod input;
mod theme;
mod tui_event;
mod view;

use app::App;
use synthdesk_client::HttpSampleService;
use synthdesk_core::SampleService;

/// Synthdesk — enter and submit lab synthesis records from the terminal.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Sample service base URL
    #[arg(long)]
    url: Option<String>,

    /// Email address to prefill on the login screen
    #[arg(long)]
    email: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Color theme: lab (default) or hacker
    #[arg(long)]
    theme: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let file_cfg = config_file::load_config();
    let service_cfg = file_cfg.service.unwrap_or_default();
    let display_cfg = file_cfg.display.unwrap_or_default();

    // Resolve config from CLI flags > env vars > config file > defaults
    let url = args
        .url
        .or_else(|| std::env::var("SYNTHDESK_URL").ok())
        .or(service_cfg.url)
        .unwrap_or_else(|| "http://localhost:8000".to_string());
    let email = args
        .email
        .or_else(|| std::env::var("SYNTHDESK_EMAIL").ok())
        .or(service_cfg.email)
        .unwrap_or_default();
    let timeout_secs = args
        .timeout
        .or_else(|| {
            std::env::var("SYNTHDESK_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
        })
        .or(service_cfg.timeout_secs)
        .unwrap_or(30);
    let theme_name = args
        .theme
        .or(display_cfg.theme)
        .unwrap_or_else(|| "lab".to_string());

    let theme = match theme_name.as_str() {
        "hacker" => theme::Theme::hacker(),
        _ => theme::Theme::lab(),
    };

    // Logs go to a file; stderr belongs to the alternate screen.
    let _log_guard = init_logging();

    let service: Arc<dyn SampleService> = Arc::new(HttpSampleService::with_timeout(
        url,
        Duration::from_secs(timeout_secs),
    ));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    // Install panic hook that restores terminal before printing panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste);
        original_hook(panic_info);
    }));

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    // Drain any stray input events (e.g. Enter keypress from launching the command)
    while event::poll(Duration::from_millis(50)).unwrap_or(false) {
        let _ = event::read();
    }

    let mut app = App::new(theme, email);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();

    app.backend_cmd_tx = Some(cmd_tx);

    tokio::spawn(backend::run(service, cmd_rx, event_tx, cancel.clone()));

    // Also handle Ctrl+C at the OS level for clean shutdown
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_for_signal.cancel();
        }
    });

    // Main event loop
    let tick_rate = Duration::from_millis(100);

    loop {
        terminal.draw(|f| view::render(f, &app))?;

        tokio::select! {
            maybe_event = event_rx.recv() => {
                if let Some(backend_event) = maybe_event {
                    app.handle_backend_event(backend_event);
                    while let Ok(evt) = event_rx.try_recv() {
                        app.handle_backend_event(evt);
                    }
                }
            }
            _ = async {
                if event::poll(tick_rate).unwrap_or(false) {
                    if let Ok(evt) = event::read() {
                        let action = input::map_event(&evt, &app.input_mode);
                        app.update(action);
                    }
                }
            } => {}
            _ = cancel.cancelled() => {
                app.should_quit = true;
            }
        }

        app.update(action::Action::Tick);

        if app.should_quit {
            cancel.cancel();
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableBracketedPaste)?;

    Ok(())
}

/// File logging under the platform config directory, `SYNTHDESK_LOG` filter.
/// Returns the guard keeping the non-blocking writer alive.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let dir = dirs::config_dir()?.join("synthdesk");
    let appender = tracing_appender::rolling::daily(dir, "synthdesk.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_env("SYNTHDESK_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}
