//! Logging initialization
//!
//! Console output is always enabled (pretty or JSON). File output with
//! rotation is added when `logging.file_enabled` is set; the returned guard
//! must be held until shutdown so buffered lines are flushed.

use crate::config::LoggingConfig;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Keeps the non-blocking file writer alive.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

fn env_filter(level: &str) -> EnvFilter {
    // RUST_LOG wins over the configured level.
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{level},envirobase={level},tower_http=info,sqlx=warn"
        ))
    })
}

fn rolling_appender(config: &LoggingConfig) -> rolling::RollingFileAppender {
    let dir = &config.file_directory;
    let prefix = &config.file_prefix;
    match config.file_rotation.as_str() {
        "hourly" => rolling::hourly(dir, prefix),
        "minutely" => rolling::minutely(dir, prefix),
        "never" => rolling::never(dir, format!("{prefix}.log")),
        _ => rolling::daily(dir, prefix),
    }
}

pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<LoggingGuard> {
    let console_layer = if config.json {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    let (file_layer, file_guard) = if config.file_enabled {
        std::fs::create_dir_all(&config.file_directory)?;
        let (writer, guard) = tracing_appender::non_blocking(rolling_appender(config));
        let layer = fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(writer)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}
