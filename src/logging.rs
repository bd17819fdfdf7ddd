//! Logging/tracing initialization
//!
//! Output format and target come from [`LoggingConfig`]. File output goes
//! through a non-blocking `tracing-appender` writer whose guard must be held
//! for the lifetime of the process.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::{Layered, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::config::{LogFormat, LogTarget, LoggingConfig};

type FilteredRegistry = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

/// Install the global subscriber
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let (layers, guard) = build_layers(config);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}

fn build_layers(config: &LoggingConfig) -> (Vec<BoxedLayer>, Option<WorkerGuard>) {
    let mut layers = Vec::with_capacity(2);

    if matches!(config.target, LogTarget::Console | LogTarget::Both) {
        layers.push(format_layer(&config.format, std::io::stdout, true));
    }

    let guard = if matches!(config.target, LogTarget::File | LogTarget::Both) {
        let (writer, guard) = create_file_writer(config);
        layers.push(format_layer(&config.format, writer, false));
        Some(guard)
    } else {
        None
    };

    (layers, guard)
}

fn format_layer<W>(format: &LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_writer(writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(false)
            .with_ansi(ansi)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(ansi)
            .with_writer(writer)
            .boxed(),
    }
}

/// Create a file writer with optional daily rotation
fn create_file_writer(
    config: &LoggingConfig,
) -> (tracing_appender::non_blocking::NonBlocking, WorkerGuard) {
    if let Err(e) = std::fs::create_dir_all(&config.log_dir) {
        eprintln!(
            "Warning: Failed to create log directory {:?}: {}",
            config.log_dir, e
        );
    }

    let file_appender = if config.daily_rotation {
        tracing_appender::rolling::daily(&config.log_dir, &config.log_prefix)
    } else {
        tracing_appender::rolling::never(&config.log_dir, &config.log_prefix)
    };

    tracing_appender::non_blocking(file_appender)
}
