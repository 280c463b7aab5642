//! Logging macros with `format!`-style messages.
//!
//! Fields go after a `;`:
//!
//! ```
//! use rust_log_facade::core::Field;
//! use rust_log_facade::{info, logger, warn};
//!
//! let log = logger!();
//!
//! info!(log, "server started");
//! info!(log, "listening on port {}", 8080; Field::string("proto", "http"));
//! warn!(log, "slow request"; Field::int("ms", 950), Field::string("path", "/"));
//! ```

/// Log at an explicit level.
///
/// ```
/// # use rust_log_facade::logger;
/// use rust_log_facade::core::{Field, Level};
/// use rust_log_facade::log;
///
/// let logger = logger!();
/// log!(logger, Level::Info, "Simple message");
/// log!(logger, Level::Error, "Error code: {}", 500; Field::bool("retry", false));
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $fmt:literal $(, $arg:expr)* ; $($field:expr),+ $(,)?) => {
        $logger.log($level, format!($fmt $(, $arg)*), &[$($field),+])
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+), &[])
    };
}

/// Log a debug-level message.
///
/// ```
/// # use rust_log_facade::logger;
/// use rust_log_facade::debug;
/// let logger = logger!();
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::Level::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::Level::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::Level::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// ```
/// # use rust_log_facade::logger;
/// use rust_log_facade::core::Field;
/// use rust_log_facade::error;
/// let logger = logger!();
/// let err = std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml");
/// error!(logger, "failed to load config"; Field::error(&err));
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::core::Level::Error, $($arg)+)
    };
}

/// A logger for the invoking module, or for an explicit package name.
///
/// The module path is the package identity used by the level registry, so
/// every logger built in one module shares one adjustable level.
#[macro_export]
macro_rules! logger {
    () => {
        $crate::facade::new(module_path!())
    };
    ($package:expr) => {
        $crate::facade::new($package)
    };
}
