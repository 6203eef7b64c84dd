/// Structured logging for the verification service.
///
/// Provides context-rich logging with station/worksheet identifiers,
/// timestamps, and severity levels. Supports both console output and
/// file-based logging for unattended batch runs. When no logger has been
/// initialized (e.g. in unit tests) every call is a no-op.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Log levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Parses a configuration string, defaulting to `Info` for anything
    /// unrecognized.
    pub fn from_config(value: &str) -> LogLevel {
        match value.to_ascii_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "warn" | "warning" => LogLevel::Warning,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Message sources
// ---------------------------------------------------------------------------

/// Which part of the batch a message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Forecast,
    Asos,
    Scoring,
    Report,
    System,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Forecast => write!(f, "FCST"),
            Source::Asos => write!(f, "ASOS"),
            Source::Scoring => write!(f, "SCORE"),
            Source::Report => write!(f, "REPORT"),
            Source::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

/// Global logger instance.
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to emit.
    min_level: LogLevel,
    /// Optional file path for logging.
    log_file: Option<String>,
}

impl Logger {
    /// Initialize the global logger.
    pub fn init(min_level: LogLevel, log_file: Option<String>) {
        let logger = Logger {
            min_level,
            log_file,
        };
        *LOGGER.lock().unwrap() = Some(logger);
    }

    fn log(&self, level: LogLevel, source: Source, id: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let id_part = id.map(|s| format!(" [{}]", s)).unwrap_or_default();
        let entry = format!("{} {} {}{}: {}", timestamp, level, source, id_part, message);

        match level {
            LogLevel::Error | LogLevel::Warning => eprintln!("{}", entry),
            LogLevel::Info | LogLevel::Debug => println!("{}", entry),
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public logging functions
// ---------------------------------------------------------------------------

/// Initialize the global logger.
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>) {
    Logger::init(min_level, log_file.map(String::from));
}

/// Log a general informational message.
pub fn info(source: Source, id: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Info, source, id, message);
    }
}

/// Log a warning message.
pub fn warn(source: Source, id: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Warning, source, id, message);
    }
}

/// Log an error message.
pub fn error(source: Source, id: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Error, source, id, message);
    }
}

/// Log a debug message.
pub fn debug(source: Source, id: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Debug, source, id, message);
    }
}

// ---------------------------------------------------------------------------
// Batch summary logging
// ---------------------------------------------------------------------------

/// Log a summary of a load operation.
pub fn log_load_summary(source: Source, total: usize, successful: usize, failed: usize) {
    let message = format!(
        "Load complete: {}/{} successful, {} failed",
        successful, total, failed
    );

    if failed == 0 {
        info(source, None, &message);
    } else if successful == 0 {
        error(source, None, &message);
    } else {
        warn(source, None, &message);
    }
}
