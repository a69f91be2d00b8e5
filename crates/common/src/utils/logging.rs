use std::io;
use tracing_subscriber::{fmt, EnvFilter};

const TEXT_FILTER: &str = "info,tower_http=info,axum=info";
/// Ingestion steps (upload, persist) log at debug.
const JSON_FILTER: &str = "info,service::item=debug,tower_http=info";

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Compact text logs on stdout. `RUST_LOG` overrides the filter.
pub fn init_logging_default() {
    let _ = fmt()
        .with_env_filter(filter_or(TEXT_FILTER))
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}

/// One JSON object per line. Event fields sit at the top level and the
/// enclosing span (e.g. `submit` with its `store`/`images` backends) is
/// attached as `span`, so request logs can be grouped by backend.
pub fn init_logging_json() {
    let _ = fmt()
        .with_env_filter(filter_or(JSON_FILTER))
        .json()
        .flatten_event(true)
        .with_current_span(true)
        .with_span_list(false)
        .with_target(true)
        .with_writer(io::stdout)
        .try_init();
}

/// JSON output when `LOG_FORMAT=json`, compact text otherwise.
pub fn init_logging_from_env() {
    let json = std::env::var("LOG_FORMAT").map(|v| v.eq_ignore_ascii_case("json")).unwrap_or(false);
    if json { init_logging_json() } else { init_logging_default() }
}
