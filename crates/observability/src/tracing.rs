//! Tracing/logging initialization.
//!
//! JSON lines by default (one object per event, with timestamps), or a
//! human-readable format for local runs. Filtering follows `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Output format of the process-wide subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl LogFormat {
    /// Read `LOG_FORMAT` (`json` | `pretty`); anything else is JSON.
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT").as_deref() {
            Ok("pretty") => Self::Pretty,
            _ => Self::Json,
        }
    }
}

/// Initialize tracing from the environment (`RUST_LOG`, default `info`; `LOG_FORMAT`).
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    init_with(filter, LogFormat::from_env());
}

/// Initialize tracing with an explicit filter and format.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_with(filter: EnvFilter, format: LogFormat) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    match format {
        LogFormat::Json => builder.json().try_init().is_ok(),
        LogFormat::Pretty => builder.pretty().try_init().is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_a_no_op() {
        init_with(EnvFilter::new("debug"), LogFormat::Json);
        assert!(!init_with(EnvFilter::new("info"), LogFormat::Pretty));
    }
}
