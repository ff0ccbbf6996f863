use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Overrides `--log-level` with full filter directives, e.g.
/// `ADBWIRE_LOG=adbwire_client::sync=trace`.
pub const LOG_ENV: &str = "ADBWIRE_LOG";

/// Crates whose events `--log-level` controls. Everything else stays at `warn`.
const ADBWIRE_TARGETS: [&str; 4] = [
    "adbwire",
    "adbwire_client",
    "adbwire_frame",
    "adbwire_transport",
];

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Filter directives for `level` scoped to the adbwire crates.
fn directives(level: LogLevel) -> String {
    let base = if level == LogLevel::Error { "error" } else { "warn" };
    let mut out = String::from(base);
    for target in ADBWIRE_TARGETS {
        out.push(',');
        out.push_str(target);
        out.push('=');
        out.push_str(level.as_str());
    }
    out
}

/// Pick the filter: `ADBWIRE_LOG` when set and valid, else `--log-level`.
///
/// The second value is the rejected `ADBWIRE_LOG` value and its parse error.
fn select_filter(env: Option<&str>, level: LogLevel) -> (EnvFilter, Option<String>) {
    if let Some(spec) = env.map(str::trim).filter(|spec| !spec.is_empty()) {
        match EnvFilter::try_new(spec) {
            Ok(filter) => return (filter, None),
            Err(err) => {
                let rejected = format!("{spec:?}: {err}");
                return (EnvFilter::new(directives(level)), Some(rejected));
            }
        }
    }
    (EnvFilter::new(directives(level)), None)
}

/// Install the stderr subscriber. Stdout is reserved for command output.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let env = std::env::var(LOG_ENV).ok();
    let (filter, rejected) = select_filter(env.as_deref(), level);

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }

    if let Some(rejected) = rejected {
        tracing::warn!(env = LOG_ENV, %rejected, "ignoring invalid log filter");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_applies_to_adbwire_crates_only() {
        assert_eq!(
            directives(LogLevel::Debug),
            "warn,adbwire=debug,adbwire_client=debug,adbwire_frame=debug,adbwire_transport=debug"
        );
        assert!(directives(LogLevel::Error).starts_with("error,"));
    }

    #[test]
    fn env_filter_overrides_level() {
        let (filter, rejected) = select_filter(Some("adbwire_client::sync=trace"), LogLevel::Warn);
        assert!(rejected.is_none());
        let rendered = filter.to_string();
        assert!(rendered.contains("adbwire_client::sync=trace"));
        assert!(!rendered.contains("adbwire_frame"));
    }

    #[test]
    fn blank_or_invalid_env_falls_back_to_level() {
        let (filter, rejected) = select_filter(Some("  "), LogLevel::Info);
        assert!(rejected.is_none());
        assert!(filter.to_string().contains("adbwire_client=info"));

        let (filter, rejected) = select_filter(Some("adbwire=loud"), LogLevel::Info);
        assert!(rejected.is_some_and(|msg| msg.contains("adbwire=loud")));
        assert!(filter.to_string().contains("adbwire_frame=info"));
    }
}
