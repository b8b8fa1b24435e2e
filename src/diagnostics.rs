use chrono::{DateTime, Utc};

/// Logs how long `scope` took since `started_at`.
///
/// Uses wall-clock time rather than `Instant`, which is unavailable on
/// `wasm32-unknown-unknown`.
#[inline]
pub fn log_perf(scope: &str, started_at: DateTime<Utc>, details: &str) {
    let elapsed_ms = (Utc::now() - started_at).num_milliseconds().max(0);
    if details.trim().is_empty() {
        tracing::debug!(target: "perf", scope, elapsed_ms, "timing");
    } else {
        tracing::debug!(target: "perf", scope, elapsed_ms, details, "timing");
    }
}

/// Installs the fmt subscriber on native builds; `RUST_LOG` sets the filter.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ramadan_companion=debug"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Browser builds keep the default dispatcher.
#[cfg(target_arch = "wasm32")]
pub fn init_logging() {}
