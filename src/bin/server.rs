//! Event tracker HTTP server.
//!
//! Loads the config (`BAT_CONFIG` or the platform config dir), installs
//! logging and serves until Ctrl+C or SIGTERM.

use bat::config::{BatConfig, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = BatConfig::default_config_path();
    let config = {
        // Stderr-only until the configured filter and file layer are known.
        let _bootstrap = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .finish()
            .set_default();
        BatConfig::load(&config_path)
            .map_err(|e| anyhow::anyhow!("cannot load config {}: {e}", config_path.display()))?
    };

    // Keep the guard alive so buffered file output is flushed on exit.
    let _log_guard = init_tracing(&config.logging);

    tracing::info!("bat-server starting");

    bat::server::serve(config).await.map_err(|e| {
        tracing::error!(error = %e, "bat-server exited with error");
        anyhow::anyhow!("bat-server failed: {e}")
    })?;

    Ok(())
}

/// Stderr logging plus an optional daily rolling file. `RUST_LOG` wins over
/// the configured filter.
fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match &config.file_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "bat-server.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}
