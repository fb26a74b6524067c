use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a filter directive that overrides `--log-level`,
/// e.g. `SIMPLEMAC_LOG=simplemac_link=debug`.
pub const LOG_ENV: &str = "SIMPLEMAC_LOG";

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Compact,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Filter from the environment directive if it parses, else from `level`.
pub fn build_filter(level: LogLevel, env_directive: Option<&str>) -> EnvFilter {
    let fallback = || EnvFilter::default().add_directive(level.as_filter().into());
    match env_directive.map(str::trim).filter(|d| !d.is_empty()) {
        Some(directive) => EnvFilter::try_new(directive).unwrap_or_else(|_| fallback()),
        None => fallback(),
    }
}

/// Install the stderr subscriber. Per-frame accept/drop decisions log at debug.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let env_directive = std::env::var(LOG_ENV).ok();
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(build_filter(level, env_directive.as_deref()))
        .with_ansi(false)
        .with_target(matches!(level, LogLevel::Debug | LogLevel::Trace));

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Compact => {
            let _ = builder.compact().try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().flatten_event(true).try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_flag_sets_max_level() {
        let filter = build_filter(LogLevel::Warn, None);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn env_directive_overrides_flag() {
        let filter = build_filter(LogLevel::Error, Some("simplemac_link=trace"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn blank_or_invalid_env_directive_falls_back() {
        let blank = build_filter(LogLevel::Info, Some("   "));
        assert_eq!(blank.max_level_hint(), Some(LevelFilter::INFO));

        let invalid = build_filter(LogLevel::Info, Some("simplemac=notalevel"));
        assert_eq!(invalid.max_level_hint(), Some(LevelFilter::INFO));
    }
}
