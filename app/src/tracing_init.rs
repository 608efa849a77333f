use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

/// Ensure tracing is initialized only once across the application
static TRACING: OnceLock<()> = OnceLock::new();

/// Filter from `RUST_LOG`, then `SC_LOG_LEVEL`, then `default`.
fn filter(default: &str) -> EnvFilter {
    std::env::var("RUST_LOG")
        .or_else(|_| std::env::var("SC_LOG_LEVEL"))
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new(default))
}

fn json_format() -> bool {
    std::env::var("SC_LOG_FORMAT")
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"))
}

/// Initialize tracing once, safe to call multiple times.
/// Logs go to stderr; stdout carries the generated document.
pub fn init_tracing_once(default_level: &str) {
    TRACING.get_or_init(|| {
        let fmt_json = json_format();
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter(default_level))
            .with_writer(std::io::stderr)
            .with_target(true);
        let _ = if fmt_json {
            builder.json().try_init()
        } else {
            builder.compact().try_init()
        };
        tracing::debug!("tracing initialized (json={})", fmt_json);
    });
}
