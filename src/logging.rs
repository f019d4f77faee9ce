use crate::config::CommonConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Build the process-wide tracing subscriber: a never-rotated file layer
/// under `log_dir`, plus a stdout layer when running outside JSON mode.
/// `process_name` picks the log file (`shard-a.log`, `gateway.log`, ...).
pub fn init_logging(process_name: &str, config: &CommonConfig) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::never(&config.log_dir, format!("{process_name}.log"));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if config.log_json {
        let file_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_writer(non_blocking)
            .with_ansi(false);
        registry.with(file_layer).init();
    } else {
        let file_layer = fmt::layer()
            .with_target(false)
            .with_writer(non_blocking)
            .with_ansi(false);
        let stdout_layer = fmt::layer().with_target(false).with_ansi(true);
        registry.with(file_layer).with(stdout_layer).init();
    }

    guard
}
