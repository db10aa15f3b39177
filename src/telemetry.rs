//! Logging setup.
//!
//! Filter comes from `LEGATO_LOG` (default `warn`); `LEGATO_LOG_FORMAT=json`
//! switches to JSON lines. Output always goes to stderr so stdout stays
//! clean for the dashboard.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "LEGATO_LOG";
pub const LOG_FORMAT_ENV: &str = "LEGATO_LOG_FORMAT";

pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // try_init: a second call (tests) must not panic
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
