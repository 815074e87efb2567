use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer};

/// Install the global subscriber. With `log_file` set, every event is also
/// appended to that file without ANSI colors.
pub fn init_tracing(log_file: Option<&Path>) {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());

    let stdout_layer = fmt::layer()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .compact();

    let file_layer = log_file.and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(
                fmt::layer()
                    .with_timer(fmt::time::UtcTime::rfc_3339())
                    .with_ansi(false)
                    .with_writer(Arc::new(file))
                    .boxed(),
            ),
            Err(e) => {
                eprintln!("Failed to open log file {}: {}", path.display(), e);
                None
            }
        }
    });

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::new(env_filter))
        .with(stdout_layer)
        .with(file_layer);

    let _ = tracing::subscriber::set_global_default(subscriber);
}
