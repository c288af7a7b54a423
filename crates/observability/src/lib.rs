//! Process-wide tracing/logging setup shared by the API binary and tools.

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the process.
///
/// The filter comes from `RUST_LOG` (default `info`). Output is structured
/// JSON unless `LOG_FORMAT=pretty` is set, which is easier on the eyes during
/// local development. Safe to call multiple times; subsequent calls are
/// no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let pretty = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("pretty"));

    if pretty {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .with_target(false)
            .try_init();
    }
}
