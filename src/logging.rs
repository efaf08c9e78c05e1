// src/logging.rs
use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs the global tracing subscriber. Safe to call more than once.
///
/// The filter comes from `RUST_LOG` (default `info`); `LOG_FORMAT=json` switches
/// to one JSON object per line. Output goes to stderr so command output on
/// stdout stays clean.
pub fn init() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let json = std::env::var("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);

        let installed = if json {
            builder.json().try_init()
        } else {
            builder.try_init()
        };

        if let Err(e) = installed {
            eprintln!("[logging] subscriber already installed: {}", e);
        }
    });
}
