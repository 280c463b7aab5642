//! # Rust Log Facade
//!
//! A structured logging facade: build a logger per module, write typed
//! fields, and get human-readable console lines plus an optional
//! Logstash-style JSON copy.
//!
//! ## Features
//!
//! - **Console encoder**: `LEVEL time key=value ...` lines, colored by
//!   severity in development mode
//! - **JSON encoder**: one object per line with `level`, `caller`,
//!   `@source_host` and an `@fields` namespace for user fields
//! - **Per-package levels**: every module gets a level that can be changed
//!   at runtime without rebuilding its loggers
//! - **Sinks**: stdout/stderr, files, memory, and a remote list sink
//!
//! ```
//! use rust_log_facade::prelude::*;
//! use rust_log_facade::{info, logger};
//!
//! facade::configure([ConfigOption::AppName("inventory".to_string())]);
//!
//! let log = logger!();
//! info!(log, "stock updated"; Field::int("sku", 1042), Field::uint("count", 7));
//!
//! facade::set_level_for_package(module_path!(), Level::Debug).unwrap();
//! ```

pub mod core;
pub mod encoders;
pub mod facade;
pub mod macros;
pub mod registry;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        Caller, Core, Encoder, EncoderConfig, Entry, Field, IoCore, Level, Logger, LoggerBuilder,
        LoggerError, LoggerMetrics, Mode, Result, SharedSink, Sink, Tee,
    };
    pub use crate::encoders::{ConsoleEncoder, JsonEncoder, LogstashEncoder};
    pub use crate::facade::{self, Config, ConfigOption, Facade};
    pub use crate::registry::{LevelHandle, Registry};
    pub use crate::sinks::{ConsoleSink, MemorySink};
}

pub use crate::core::{Field, Level, Logger, LoggerError, Mode, Result};
pub use facade::{Config, ConfigOption, Facade};
pub use registry::{LevelHandle, Registry};
