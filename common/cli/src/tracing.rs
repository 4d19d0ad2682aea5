use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use tracing::info;
use tracing_log::AsTrace;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Logs to stderr at the requested verbosity, `RUST_LOG` overrides it.
///
/// When a trace file is given everything is also written to it, without colors.
pub fn configure_tracing(trace: Option<PathBuf>, verbose: Verbosity<InfoLevel>) -> anyhow::Result<()> {
    let level: LevelFilter = verbose.log_level_filter().as_trace();

    let stderr_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(stderr_filter);

    let trace_layer = match &trace {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Creating trace log. file: {}", path.display()))?;

            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_filter(LevelFilter::TRACE),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(trace_layer)
        .try_init()
        .with_context(|| "Configuring tracing".to_string())?;

    if let Some(path) = trace {
        info!("Tracing to file. file: {}", path.display());
    }

    Ok(())
}
