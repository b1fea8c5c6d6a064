use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use engram::config::{self, CliArgs};
use engram::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before parsing CLI args, since clap reads
    // ENGRAM_* variables as fallbacks
    if std::fs::metadata(".env").is_ok() {
        dotenv::dotenv().ok();
    }

    let args = CliArgs::parse();
    let debug = args.debug;

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // With ENGRAM_LOG_DIR set, logs go to a daily-rolling JSON file instead
    // of stderr. The guard must outlive the server or buffered lines are lost.
    let _guard;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if let Ok(dir) = std::env::var("ENGRAM_LOG_DIR") {
        let appender = tracing_appender::rolling::daily(dir, "engram.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        _guard = guard;
        builder.json().with_writer(writer).init();
    } else {
        builder.init();
    }

    let config = config::get_config(args);
    config
        .srs
        .validate()
        .context("invalid scheduler configuration")?;

    let state = Arc::new(AppState::new(config.srs));
    let app = engram::create_app(state);

    info!("Listening on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
