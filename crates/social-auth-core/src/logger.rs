// Structured logger for the social-auth workspace.
//
// Leveled output with ANSI colors, level filtering, and a pluggable
// `LogHandler` so embedding applications can route log lines into their own
// logging backend instead of stderr/stdout.

use std::fmt;
use std::sync::Arc;

/// ANSI escape sequences used by the default output format.
pub mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const BRIGHT: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";

    pub mod fg {
        pub const RED: &str = "\x1b[31m";
        pub const YELLOW: &str = "\x1b[33m";
        pub const BLUE: &str = "\x1b[34m";
        pub const MAGENTA: &str = "\x1b[35m";
    }
}

/// Log levels, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl LogLevel {
    pub fn color(&self) -> &'static str {
        match self {
            LogLevel::Debug => ansi::fg::MAGENTA,
            LogLevel::Info => ansi::fg::BLUE,
            LogLevel::Warn => ansi::fg::YELLOW,
            LogLevel::Error => ansi::fg::RED,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for LogLevel {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "debug" => Self::Debug,
            "info" => Self::Info,
            "warn" | "warning" => Self::Warn,
            "error" => Self::Error,
            _ => Self::Warn,
        }
    }
}

/// Logger configuration.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Disable logging entirely.
    pub disabled: bool,
    /// Disable ANSI color output.
    pub disable_colors: bool,
    /// Minimum level to emit.
    pub level: LogLevel,
    /// Optional custom handler; overrides the default stderr/stdout output.
    pub custom_handler: Option<Arc<dyn LogHandler>>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            disable_colors: false,
            level: LogLevel::Warn,
            custom_handler: None,
        }
    }
}

/// User-provided logging backend.
pub trait LogHandler: Send + Sync + fmt::Debug {
    fn handle(&self, level: LogLevel, message: &str);
}

/// The logger used throughout the workspace.
///
/// Cheap to clone; share it via the filter or pass copies into adapters.
#[derive(Clone)]
pub struct AuthLogger {
    config: LoggerConfig,
}

impl fmt::Debug for AuthLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthLogger")
            .field("level", &self.config.level)
            .field("disabled", &self.config.disabled)
            .finish()
    }
}

impl AuthLogger {
    pub fn new(config: LoggerConfig) -> Self {
        Self { config }
    }

    pub fn level(&self) -> LogLevel {
        self.config.level
    }

    /// Whether a message at `level` would be emitted.
    pub fn should_publish(&self, level: LogLevel) -> bool {
        if self.config.disabled {
            return false;
        }
        level >= self.config.level
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        if !self.should_publish(level) {
            return;
        }

        if let Some(ref handler) = self.config.custom_handler {
            handler.handle(level, message);
            return;
        }

        let formatted = self.format_message(level, message);
        match level {
            LogLevel::Warn | LogLevel::Error => eprintln!("{formatted}"),
            _ => println!("{formatted}"),
        }
    }

    fn format_message(&self, level: LogLevel, message: &str) -> String {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        if self.config.disable_colors {
            format!("{} {} [social-auth]: {}", timestamp, level.as_str(), message)
        } else {
            format!(
                "{dim}{timestamp}{reset} {color}{level}{reset} {bright}[social-auth]:{reset} {message}",
                dim = ansi::DIM,
                reset = ansi::RESET,
                color = level.color(),
                level = level.as_str(),
                bright = ansi::BRIGHT,
            )
        }
    }
}

impl Default for AuthLogger {
    fn default() -> Self {
        Self::new(LoggerConfig::default())
    }
}
