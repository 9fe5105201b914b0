//! Centralized logging setup with stdout and an optional log file

use std::path::Path;

use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
}

/// Split a log file path into the directory and file name the appender wants
fn appender_target(file: &str) -> (&Path, &str) {
    let path = Path::new(file);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or(file);
    (dir, name)
}

/// Initialize logging to stdout, plus `file` when given
///
/// Both outputs use the same level from the RUST_LOG environment variable,
/// defaulting to "info".
///
/// The file guard is forgotten to keep the appender alive for the program lifetime.
pub fn init_logging(file: Option<&str>) {
    let file_layer = file.map(|file| {
        let (dir, name) = appender_target(file);
        let file_appender = tracing_appender::rolling::never(dir, name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // Keep guard alive for the program lifetime
        std::mem::forget(guard);

        tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_filter(env_filter())
    });

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(env_filter()),
        )
        .with(file_layer)
        .init();
}
