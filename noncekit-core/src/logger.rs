//! Bridge from the `log` facade to a host-supplied logger.
//!
//! The store logs through `log`. Applications that already install a `log`
//! (or `tracing` with `tracing-log`) subscriber need nothing from this module.
//! Hosts without one can implement [`Logger`] and pass it to [`set_logger`].
//!
//! ```
//! use std::sync::Arc;
//! use noncekit_core::logger::{set_logger, LogLevel, Logger};
//!
//! struct Stderr;
//!
//! impl Logger for Stderr {
//!     fn log(&self, level: LogLevel, message: String) {
//!         eprintln!("[{level:?}] {message}");
//!     }
//! }
//!
//! set_logger(Arc::new(Stderr));
//! ```

use std::sync::{Arc, OnceLock};

/// Receiver for the store's log records.
pub trait Logger: Sync + Send {
    /// Records `message` at `level`.
    fn log(&self, level: LogLevel, message: String);
}

/// Severity of a forwarded record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Per-token events (issue, consume).
    Trace,
    /// Sweeps and policy changes.
    Debug,
    /// Informational messages.
    Info,
    /// Degraded operation, such as an unreachable reclamation loop.
    Warn,
    /// Errors.
    Error,
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warn,
            log::Level::Info => Self::Info,
            log::Level::Debug => Self::Debug,
            log::Level::Trace => Self::Trace,
        }
    }
}

static LOGGER_INSTANCE: OnceLock<Arc<dyn Logger>> = OnceLock::new();

/// Forwards `log` records to the registered [`Logger`].
struct ForeignLogger;

impl log::Log for ForeignLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        if !is_forwarded(record.level(), record.module_path()) {
            return;
        }
        if let Some(logger) = LOGGER_INSTANCE.get() {
            logger.log(record.level().into(), record.args().to_string());
        }
    }

    fn flush(&self) {}
}

/// Debug and trace records are only forwarded from this crate.
fn is_forwarded(level: log::Level, module_path: Option<&str>) -> bool {
    let is_verbose = matches!(level, log::Level::Debug | log::Level::Trace);
    let is_ours = module_path.is_some_and(|path| path.starts_with("noncekit"));
    !is_verbose || is_ours
}

/// Registers `logger` and installs the bridge as the global `log` logger.
///
/// Only the first registration takes effect. If another `log` logger is
/// already installed the bridge is not, and records keep flowing there.
pub fn set_logger(logger: Arc<dyn Logger>) {
    static BRIDGE: ForeignLogger = ForeignLogger;

    if LOGGER_INSTANCE.set(logger).is_err() {
        log::warn!("noncekit logger already set");
        return;
    }
    if log::set_logger(&BRIDGE).is_ok() {
        log::set_max_level(log::LevelFilter::Trace);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        assert_eq!(LogLevel::from(log::Level::Warn), LogLevel::Warn);
        assert_eq!(LogLevel::from(log::Level::Trace), LogLevel::Trace);
    }

    #[test]
    fn test_verbose_records_filtered_by_module() {
        assert!(is_forwarded(log::Level::Debug, Some("noncekit_core::reaper")));
        assert!(!is_forwarded(log::Level::Debug, Some("hyper::proto")));
        assert!(!is_forwarded(log::Level::Trace, None));
        assert!(is_forwarded(log::Level::Warn, Some("hyper::proto")));
        assert!(is_forwarded(log::Level::Error, None));
    }
}
