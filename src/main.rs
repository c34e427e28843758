//! termchess entry point
//!
//! Bootstraps logging, loads settings, spawns the engine and hands
//! control to the REPL. The engine is strictly optional: when it
//! cannot be started the session degrades to human-vs-human.

use tracing::{error, warn};

use chess_core::Board;
use termchess::config::Settings;
use termchess::repl;
use uci_client::{EngineConfig, UciEngine};

/// Console + rolling-file tracing setup.
///
/// The console layer writes to stderr (stdout belongs to the board)
/// and defaults to warnings unless `RUST_LOG` says otherwise; the file
/// layer under `logs/` keeps the full debug stream, engine dialogue
/// included.
fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, Layer};

    let _ = std::fs::create_dir_all("logs");
    let file_appender = tracing_appender::rolling::hourly("logs", "termchess");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = tracing_subscriber::fmt::Layer::new()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        );

    let file_layer = tracing_subscriber::fmt::Layer::new()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(tracing_subscriber::EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::Registry::default()
        .with(console_layer)
        .with(file_layer);
    let _ = tracing::subscriber::set_global_default(subscriber);

    // The appender guard must outlive the session or file logging
    // stops as soon as this function returns.
    Box::leak(Box::new(guard));
}

#[tokio::main]
async fn main() {
    init_logging();

    let mut settings = Settings::load();
    if !Settings::path().exists() {
        settings.save();
    }

    // A single optional argument overrides the configured engine path.
    if let Some(executable) = std::env::args().nth(1) {
        settings.engine.executable = executable.into();
    }

    let mut engine_config = EngineConfig::new(settings.engine.executable.clone());
    engine_config.movetime_ms = settings.engine.movetime_ms;
    engine_config.handshake_timeout_ms = settings.engine.handshake_timeout_ms;

    let engine = UciEngine::new(engine_config);
    match engine.start().await {
        Ok(()) => println!("Engine ready: {}", engine.name()),
        Err(err) => {
            warn!(%err, "engine start failed");
            println!("No engine available ({err}), you play both sides.");
        }
    }

    let mut board = Board::new();
    if let Err(err) = repl::run(&mut board, &engine, &settings).await {
        error!(%err, "session ended with an I/O error");
    }

    engine.stop().await;
    println!("Bye.");
}
