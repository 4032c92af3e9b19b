//! Heartcheck: heart disease risk estimation in the terminal.
//!
//! Main entry point for the terminal application.

use anyhow::Result;
use std::io::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use heartcheck::adapters::sanitize::SanitizingMakeWriter;
use heartcheck::config::Config;
use heartcheck::tui::App;

fn main() -> Result<()> {
    let config = Config::from_env();

    // Writing logs to the terminal would corrupt the TUI (alternate screen),
    // so an interactive session logs to a file unless told otherwise.
    let interactive = std::io::stdout().is_terminal();
    let use_file = config.log_mode.use_file(interactive);

    let (writer, _guard) = if use_file {
        if let Some(parent) = config.log_file.parent() {
            // Best-effort: don't fail startup just because the directory is missing.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(!use_file)
                .with_writer(SanitizingMakeWriter::with_limit(
                    writer,
                    config.sanitize_max_bytes,
                )),
        )
        .init();

    tracing::info!("Starting Heartcheck...");

    // Refuse to start without a usable model.
    let mut app = App::new(&config)?;
    app.run()?;

    tracing::info!("Heartcheck shutdown complete.");
    Ok(())
}
