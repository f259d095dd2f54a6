use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// Honors `RUST_LOG`; falls back to `info` for this crate and `warn` for
/// everything else. Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,insider_sync=info,web=info,cli=info"));

    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
