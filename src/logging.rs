//! Subscriber setup for the CLI. Library code only emits `tracing` events.

use tracing_subscriber::{fmt, EnvFilter};

use crate::core::methods::env;

/// Crate events at info, dependencies (tungstenite, tokio) at warn.
const DEFAULT_FILTER: &str = "warn,launchpad_wallet=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn from_flag(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("1") | Some("true") | Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Install a stderr subscriber. stdout is reserved for command output.
/// Honors `RUST_LOG`; a second call is a no-op.
pub fn init_logging() {
    let format = LogFormat::from_flag(std::env::var(env::LOG_JSON).ok().as_deref());
    init_logging_with(format);
}

pub fn init_logging_with(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = fmt::Subscriber::builder().with_env_filter(filter).with_writer(std::io::stderr);

    let _ = match format {
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
        LogFormat::Pretty => builder.compact().with_target(false).try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_flag() {
        assert_eq!(LogFormat::from_flag(None), LogFormat::Pretty);
        assert_eq!(LogFormat::from_flag(Some("0")), LogFormat::Pretty);
        assert_eq!(LogFormat::from_flag(Some("1")), LogFormat::Json);
        assert_eq!(LogFormat::from_flag(Some(" true ")), LogFormat::Json);
    }
}
