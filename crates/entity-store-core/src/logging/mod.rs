//! Global `tracing` subscriber initialization, modelled on
//! `graph::logging::init_logger`.

use clap::{Parser, ValueEnum};
use tracing_subscriber::{
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
    EnvFilter, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
    Compact,
}

#[derive(Debug, Clone, Parser)]
pub struct LoggingArgs {
    #[clap(long, env = "ENTITY_STORE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    #[clap(long, env = "ENTITY_STORE_LOG_FILTER", default_value = "info")]
    pub log_filter: String,

    #[clap(long, env = "ENTITY_STORE_LOG_FOLDER")]
    pub log_folder: Option<String>,
}

/// A guard that must be held for the process lifetime to keep the
/// non-blocking file appender (if configured) flushing.
pub struct LoggingGuard {
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Initializes the global `tracing` subscriber from `args`. Returns a guard
/// that must be kept alive for the duration of the process.
pub fn init_logger(args: &LoggingArgs) -> LoggingGuard {
    let env_filter = EnvFilter::try_new(&args.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let mut layers: Vec<BoxedLayer> = Vec::new();

    let stdout_layer: BoxedLayer = match args.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer().pretty().boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer().compact().boxed(),
    };
    layers.push(stdout_layer);

    let file_guard = if let Some(folder) = &args.log_folder {
        let appender = tracing_appender::rolling::daily(folder, "entity-store.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let file_layer: BoxedLayer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .json()
            .boxed();
        layers.push(file_layer);
        Some(guard)
    } else {
        None
    };

    let registry = tracing_subscriber::registry().with(env_filter).with(layers);

    if registry.try_init().is_err() {
        tracing::debug!("global tracing subscriber already initialized");
    }

    LoggingGuard {
        _file_guard: file_guard,
    }
}
