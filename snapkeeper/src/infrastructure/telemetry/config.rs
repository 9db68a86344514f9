use serde::*;
use tracing::metadata::LevelFilter;
use tracing_subscriber::filter::Directive;

/// Logging configuration.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct TelemetryConfig {
    #[serde(default = "default_enabled")]
    pub enable: bool,
    /// Global filter level.
    #[serde(default = "Default::default")]
    pub max_level: LoggingLevel,
    /// Extra `EnvFilter` directives, e.g. `service_snapshot=debug`.
    #[serde(default = "Default::default")]
    pub level_filter: String,
    /// Environment variable to read directives from instead of `RUST_LOG`.
    #[serde(default = "Default::default")]
    pub level_filter_env: String,
    #[serde(default = "Default::default")]
    pub console: ConsoleConfig,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enable: default_enabled(),
            max_level: Default::default(),
            level_filter: Default::default(),
            level_filter_env: Default::default(),
            console: Default::default(),
        }
    }
}

#[derive(Default, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub enum LoggingLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
    Off,
}

impl From<LoggingLevel> for LevelFilter {
    fn from(val: LoggingLevel) -> Self {
        match val {
            LoggingLevel::Error => LevelFilter::ERROR,
            LoggingLevel::Warn => LevelFilter::WARN,
            LoggingLevel::Info => LevelFilter::INFO,
            LoggingLevel::Debug => LevelFilter::DEBUG,
            LoggingLevel::Trace => LevelFilter::TRACE,
            LoggingLevel::Off => LevelFilter::OFF,
        }
    }
}

impl From<LoggingLevel> for Directive {
    fn from(val: LoggingLevel) -> Self {
        let level: LevelFilter = val.into();
        level.into()
    }
}

/// Console output.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ConsoleConfig {
    #[serde(default = "default_enabled")]
    pub enable: bool,
    /// Print file, line, thread and target with every event.
    #[serde(default = "Default::default")]
    pub enable_debug_logging: bool,
    #[serde(default = "Default::default")]
    pub max_level: LoggingLevel,
    #[serde(default = "Default::default")]
    pub level_filter: String,
    #[serde(default = "Default::default")]
    pub level_filter_env: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enable: default_enabled(),
            enable_debug_logging: Default::default(),
            max_level: Default::default(),
            level_filter: Default::default(),
            level_filter_env: Default::default(),
        }
    }
}

fn default_enabled() -> bool {
    true
}
