//! Tracing setup for the simulator.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Platform log directory, e.g. `~/.cache/terra/logs` on Linux.
pub fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "terra")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/terra"))
        .join("logs")
}

/// Installs a stderr layer and, when `to_file` is set, a non-blocking file
/// layer under `<log dir>/<session>/sim.log`.
///
/// `RUST_LOG` overrides the default `info` filter. The returned guard must
/// stay alive until the end of `main` or buffered file output is lost.
pub fn setup_logging(session_id: Option<&str>, to_file: bool) -> Result<Option<WorkerGuard>> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr = fmt::layer().with_writer(std::io::stderr).with_target(true);

    if !to_file {
        tracing_subscriber::registry()
            .with(filter())
            .with(stderr)
            .try_init()
            .context("failed to install tracing subscriber")?;
        return Ok(None);
    }

    let session = session_id.map_or_else(
        || format!("sim_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S")),
        str::to_owned,
    );
    let dir = log_dir().join(&session);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, "sim.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file = fmt::layer().with_writer(writer).with_ansi(false);

    tracing_subscriber::registry()
        .with(filter())
        .with(stderr)
        .with(file)
        .try_init()
        .context("failed to install tracing subscriber")?;

    tracing::info!(session = %session, log_file = %dir.join("sim.log").display(), "logging initialized");
    Ok(Some(guard))
}
