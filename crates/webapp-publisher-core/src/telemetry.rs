//! Tracing initialisation for the `webapp-publisher` binary.
//!
//! Runs as a CI step, so the job log is the only place these lines end up.
//! Everything goes to stderr: stdout is reserved for the run summary the CLI
//! prints at the end, which callers may capture or parse separately from the
//! log stream.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber for a publish run.
///
/// `level` applies when `RUST_LOG` is unset (`--verbose` selects DEBUG).
/// With `json` set (`--json` / `PUBLISHER_JSON_LOGS`), each line is a flat
/// JSON object: event fields such as `event` and `stage` sit at the top
/// level, and the enclosing run span supplies `run_id` and `project`.
///
/// Only the first call takes effect.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if json {
        registry
            .with(layer.json().flatten_event(true).with_current_span(true))
            .try_init()
    } else {
        registry.with(layer).try_init()
    };
    // A subscriber installed earlier (tests, embedders) stays in place.
    installed.ok();
}
