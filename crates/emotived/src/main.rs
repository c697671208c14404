//! # emotived
//!
//! Emotion classification server binary — wires the inference pipeline into
//! the HTTP boundary and runs it.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use emotive_inference::{InferenceService, ModelRegistry};
use emotive_server::{ServerConfig, build_router};

/// Emotion classification server.
#[derive(Parser, Debug)]
#[command(name = "emotived", about = "Speech emotion classification server")]
struct Cli {
    /// Host to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind (0 for auto-assign).
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Path to the ONNX model artifact.
    #[arg(long, default_value = "model.onnx")]
    model_path: PathBuf,

    /// Directory for per-request staged uploads (defaults to the system
    /// temp directory).
    #[arg(long)]
    staging_dir: Option<PathBuf>,

    /// Load the model at startup instead of on first request; startup fails
    /// if the artifact is missing or corrupt.
    #[arg(long)]
    preload: bool,

    /// Minimum log level when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Initialize the global tracing subscriber with stderr output.
fn init_subscriber(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    // try_init is a no-op if a subscriber is already set
    let _ = subscriber.try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_subscriber(&args.log_level);

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        model_path: args.model_path,
        staging_dir: args.staging_dir.unwrap_or_else(std::env::temp_dir),
        ..ServerConfig::default()
    };

    let registry = Arc::new(ModelRegistry::onnx(config.model_path.clone()));

    if args.preload {
        let registry = registry.clone();
        tokio::task::spawn_blocking(move || registry.preload())
            .await
            .context("model preload task failed")?
            .context("failed to load emotion model at startup")?;
        info!("emotion model preloaded");
    }

    let service = Arc::new(InferenceService::new(registry));
    let router = build_router(service, &config);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local_addr = listener.local_addr().context("local addr")?;

    info!("emotived listening on http://{local_addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
        .context("server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["emotived"]);
        assert_eq!(cli.host, "127.0.0.1");
        assert_eq!(cli.port, 8080);
        assert_eq!(cli.model_path, PathBuf::from("model.onnx"));
        assert!(cli.staging_dir.is_none());
        assert!(!cli.preload);
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn cli_overrides() {
        let cli = Cli::parse_from([
            "emotived",
            "--host",
            "0.0.0.0",
            "--port",
            "9000",
            "--model-path",
            "/opt/models/emotion.onnx",
            "--preload",
        ]);
        assert_eq!(cli.host, "0.0.0.0");
        assert_eq!(cli.port, 9000);
        assert_eq!(cli.model_path, PathBuf::from("/opt/models/emotion.onnx"));
        assert!(cli.preload);
    }
}
