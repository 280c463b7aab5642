//! Logger handle: turns log calls into entries and hands them to a core

use super::entry::{Caller, Entry};
use super::error::{LoggerError, Result};
use super::field::Field;
use super::level::Level;
use super::log_core::Core;
use super::metrics::LoggerMetrics;
use super::sink::SharedSink;
use crate::sinks::ConsoleSink;
use chrono::{SecondsFormat, Utc};
use std::backtrace::Backtrace;
use std::panic::Location;
use std::sync::Arc;

/// A cheap-to-clone handle over a [`Core`]
///
/// `DPanic`, `Panic` and `Fatal` are severities only. The logger never
/// panics or exits the process on their behalf.
#[derive(Clone)]
pub struct Logger {
    core: Arc<dyn Core>,
    name: String,
    add_caller: bool,
    stack_level: Option<Level>,
    error_output: SharedSink,
    /// Shared with every logger derived through `with` or `named`
    metrics: Arc<LoggerMetrics>,
}

impl Logger {
    pub fn new(core: Box<dyn Core>) -> Self {
        LoggerBuilder::new(core).build()
    }

    pub fn builder(core: Box<dyn Core>) -> LoggerBuilder {
        LoggerBuilder::new(core)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.core.enabled(level)
    }

    /// Log at `level`, reporting write failures on the error output
    #[track_caller]
    pub fn log(&self, level: Level, message: impl AsRef<str>, fields: &[Field]) {
        if let Err(e) = self.try_log(level, message, fields) {
            self.report(&e);
        }
    }

    /// Log at `level` and hand any write failure back to the caller
    #[track_caller]
    pub fn try_log(&self, level: Level, message: impl AsRef<str>, fields: &[Field]) -> Result<()> {
        if !self.core.enabled(level) {
            self.metrics.record_filtered();
            return Ok(());
        }

        let entry = self.entry(level, message.as_ref(), Location::caller());
        match self.core.write(&entry, fields) {
            Ok(()) => {
                self.metrics.record_written();
                Ok(())
            }
            Err(e) => {
                self.metrics.record_failed();
                Err(e)
            }
        }
    }

    #[track_caller]
    pub fn debug(&self, message: impl AsRef<str>, fields: &[Field]) {
        self.log(Level::Debug, message, fields);
    }

    #[track_caller]
    pub fn info(&self, message: impl AsRef<str>, fields: &[Field]) {
        self.log(Level::Info, message, fields);
    }

    #[track_caller]
    pub fn warn(&self, message: impl AsRef<str>, fields: &[Field]) {
        self.log(Level::Warn, message, fields);
    }

    #[track_caller]
    pub fn error(&self, message: impl AsRef<str>, fields: &[Field]) {
        self.log(Level::Error, message, fields);
    }

    #[track_caller]
    pub fn dpanic(&self, message: impl AsRef<str>, fields: &[Field]) {
        self.log(Level::DPanic, message, fields);
    }

    #[track_caller]
    pub fn panic(&self, message: impl AsRef<str>, fields: &[Field]) {
        self.log(Level::Panic, message, fields);
    }

    #[track_caller]
    pub fn fatal(&self, message: impl AsRef<str>, fields: &[Field]) {
        self.log(Level::Fatal, message, fields);
    }

    /// A child logger whose every entry carries `fields`
    #[must_use]
    pub fn with(&self, fields: &[Field]) -> Logger {
        if fields.is_empty() {
            return self.clone();
        }
        Logger {
            core: Arc::from(self.core.with(fields)),
            ..self.clone()
        }
    }

    /// A child logger with `name` appended to this logger's name, dot separated
    #[must_use]
    pub fn named(&self, name: &str) -> Logger {
        if name.is_empty() {
            return self.clone();
        }
        let name = if self.name.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.name, name)
        };
        Logger {
            name,
            ..self.clone()
        }
    }

    pub fn sync(&self) -> Result<()> {
        self.core.sync()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    fn entry(&self, level: Level, message: &str, location: &Location<'_>) -> Entry {
        let mut entry = Entry::new(level, message).with_name(self.name.as_str());
        if self.add_caller {
            entry = entry.with_caller(Caller::from_location(location));
        }
        if self.stack_level.is_some_and(|threshold| level >= threshold) {
            entry = entry.with_stack(Backtrace::force_capture().to_string());
        }
        entry
    }

    fn report(&self, err: &LoggerError) {
        let line = format!(
            "[LOGGER ERROR] {} write error: {}\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            err
        );
        // Nowhere left to report a failure of the error output itself.
        let _ = self.error_output.write(line.as_bytes());
        let _ = self.error_output.sync();
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("add_caller", &self.add_caller)
            .field("stack_level", &self.stack_level)
            .field("error_output", &self.error_output.name())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Logger`]
///
/// # Example
///
/// ```
/// use rust_log_facade::core::{IoCore, Level, LoggerBuilder};
/// use rust_log_facade::encoders::JsonEncoder;
/// use rust_log_facade::core::EncoderConfig;
/// use rust_log_facade::sinks::MemorySink;
/// use std::sync::Arc;
///
/// let sink = Arc::new(MemorySink::new());
/// let core = IoCore::new(
///     Box::new(JsonEncoder::new(EncoderConfig::json().shared())),
///     sink.clone(),
///     Arc::new(Level::Info),
/// );
/// let logger = LoggerBuilder::new(Box::new(core))
///     .name("billing")
///     .add_caller(true)
///     .add_stacktrace(Level::Panic)
///     .build();
///
/// logger.info("charged", &[]);
/// assert_eq!(sink.lines().len(), 1);
/// ```
pub struct LoggerBuilder {
    core: Box<dyn Core>,
    name: String,
    add_caller: bool,
    stack_level: Option<Level>,
    error_output: Option<SharedSink>,
}

impl LoggerBuilder {
    pub fn new(core: Box<dyn Core>) -> Self {
        Self {
            core,
            name: String::new(),
            add_caller: false,
            stack_level: None,
            error_output: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn add_caller(mut self, enabled: bool) -> Self {
        self.add_caller = enabled;
        self
    }

    /// Capture a stack trace for entries at or above `level`
    #[must_use]
    pub fn add_stacktrace(mut self, level: Level) -> Self {
        self.stack_level = Some(level);
        self
    }

    /// Where write failures are reported; stderr when unset
    #[must_use]
    pub fn error_output(mut self, sink: SharedSink) -> Self {
        self.error_output = Some(sink);
        self
    }

    pub fn build(self) -> Logger {
        Logger {
            core: Arc::from(self.core),
            name: self.name,
            add_caller: self.add_caller,
            stack_level: self.stack_level,
            error_output: self
                .error_output
                .unwrap_or_else(|| Arc::new(ConsoleSink::stderr())),
            metrics: Arc::new(LoggerMetrics::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encoder_config::EncoderConfig;
    use crate::core::log_core::IoCore;
    use crate::core::mode::Mode;
    use crate::core::sink::Sink;
    use crate::encoders::ConsoleEncoder;
    use crate::sinks::MemorySink;
    use std::io;

    struct Refusing;

    impl Sink for Refusing {
        fn write(&self, _bytes: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn name(&self) -> &str {
            "refusing"
        }
    }

    fn core_into(sink: SharedSink, level: Level) -> Box<dyn Core> {
        let config = EncoderConfig::production_console()
            .with_time_key("")
            .with_name_key("logger")
            .shared();
        Box::new(IoCore::new(
            Box::new(ConsoleEncoder::new(config, Mode::Production)),
            sink,
            Arc::new(level),
        ))
    }

    #[test]
    fn test_levels_gate_and_count() {
        let sink = Arc::new(MemorySink::new());
        let logger = Logger::new(core_into(sink.clone(), Level::Warn));

        logger.debug("hidden", &[]);
        logger.info("hidden", &[]);
        logger.warn("shown", &[]);
        logger.fatal("also shown", &[]);

        let lines = sink.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("WARN "));
        assert!(lines[1].starts_with("FATAL "));
        assert_eq!(logger.metrics().written_count(), 2);
        assert_eq!(logger.metrics().filtered_count(), 2);
        assert!(!logger.enabled(Level::Info));
    }

    #[test]
    fn test_caller_points_at_call_site() {
        let sink = Arc::new(MemorySink::new());
        let logger = Logger::builder(core_into(sink.clone(), Level::Debug))
            .add_caller(true)
            .build();

        let line = line!() + 1;
        logger.info("here", &[]);

        let out = sink.contents();
        assert!(
            out.contains(&format!("caller=core/logger.rs:{}", line)),
            "unexpected caller in {out}"
        );
    }

    #[test]
    fn test_stacktrace_only_at_threshold() {
        let sink = Arc::new(MemorySink::new());
        let logger = Logger::builder(core_into(sink.clone(), Level::Debug))
            .add_stacktrace(Level::Error)
            .build();

        logger.warn("no stack", &[]);
        logger.error("with stack", &[]);

        let out = sink.contents();
        let (first, rest) = out.split_once('\n').expect("two entries");
        assert!(!first.contains("stacktrace="));
        assert!(rest.contains("stacktrace="));
    }

    #[test]
    fn test_with_and_named() {
        let sink = Arc::new(MemorySink::new());
        let root = Logger::builder(core_into(sink.clone(), Level::Debug))
            .name("app")
            .build();
        let child = root.named("db").with(&[Field::string("table", "users")]);

        child.info("query", &[Field::int("rows", 3)]);
        root.info("plain", &[]);

        let lines = sink.lines();
        assert!(lines[0].contains("logger=app.db"));
        assert!(lines[0].contains("rows=3 table=users"));
        assert!(lines[1].contains("logger=app "));
        assert!(!lines[1].contains("table="));
        assert_eq!(root.metrics().written_count(), 2);
        assert_eq!(child.name(), "app.db");
    }

    #[test]
    fn test_named_without_parent_name() {
        let logger = Logger::new(core_into(Arc::new(MemorySink::new()), Level::Info));
        assert_eq!(logger.named("jobs").name(), "jobs");
        assert_eq!(logger.named("").name(), "");
    }

    #[test]
    fn test_write_failure_goes_to_error_output() {
        let errors = Arc::new(MemorySink::new());
        let logger = Logger::builder(core_into(Arc::new(Refusing), Level::Debug))
            .error_output(errors.clone())
            .build();

        logger.error("lost", &[]);

        let report = errors.contents();
        assert!(report.starts_with("[LOGGER ERROR] "));
        assert!(report.contains("write error:"));
        assert!(report.contains("disk full"));
        assert_eq!(logger.metrics().failed_count(), 1);
    }

    #[test]
    fn test_try_log_returns_error() {
        let errors = Arc::new(MemorySink::new());
        let logger = Logger::builder(core_into(Arc::new(Refusing), Level::Debug))
            .error_output(errors.clone())
            .build();

        let err = logger
            .try_log(Level::Info, "lost", &[])
            .expect_err("sink refuses");
        assert!(matches!(err, LoggerError::SinkWrite { .. }));
        assert!(errors.contents().is_empty());
    }

    #[test]
    fn test_severe_levels_do_not_panic() {
        let sink = Arc::new(MemorySink::new());
        let logger = Logger::new(core_into(sink.clone(), Level::Debug));
        logger.dpanic("d", &[]);
        logger.panic("p", &[]);
        logger.fatal("f", &[]);
        assert_eq!(sink.lines().len(), 3);
    }
}
