//! Encoder configuration: structural keys, value formatters and presets
//!
//! A key set to the empty string omits that element from the output.
//! Every formatter is a serde-friendly enum with a `Custom` escape hatch
//! holding a plain function, which is skipped by serde.

use super::color::{capital_color_label, lowercase_color_label};
use super::encoder::PrimitiveArrayEncoder;
use super::entry::Caller;
use super::level::Level;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// How a level is rendered
#[derive(Clone, Copy, Default, Serialize, Deserialize)]
pub enum LevelEncoding {
    /// `INFO`
    #[default]
    Capital,
    /// `INFO` wrapped in the level's color
    CapitalColor,
    /// `info`
    Lowercase,
    /// `info` wrapped in the level's color
    LowercaseColor,
    #[serde(skip)]
    Custom(fn(Level, &mut dyn PrimitiveArrayEncoder)),
}

impl LevelEncoding {
    pub fn encode(&self, level: Level, enc: &mut dyn PrimitiveArrayEncoder) {
        match self {
            LevelEncoding::Capital => enc.append_string(level.capital_str()),
            LevelEncoding::CapitalColor => enc.append_string(capital_color_label(level)),
            LevelEncoding::Lowercase => enc.append_string(level.as_str()),
            LevelEncoding::LowercaseColor => enc.append_string(lowercase_color_label(level)),
            LevelEncoding::Custom(f) => f(level, enc),
        }
    }
}

impl fmt::Debug for LevelEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelEncoding::Capital => f.write_str("Capital"),
            LevelEncoding::CapitalColor => f.write_str("CapitalColor"),
            LevelEncoding::Lowercase => f.write_str("Lowercase"),
            LevelEncoding::LowercaseColor => f.write_str("LowercaseColor"),
            LevelEncoding::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// How timestamps are rendered
#[derive(Clone, Default, Serialize, Deserialize)]
pub enum TimeEncoding {
    /// `2020-03-22T13:42:12.000Z`
    #[default]
    Iso8601,
    /// `2020-03-22T13:42:12.000000Z`
    Iso8601Micros,
    /// `2020-03-22T13:42:12.000000008+00:00`
    Rfc3339,
    /// Floating-point seconds since the Unix epoch
    Epoch,
    /// Floating-point milliseconds since the Unix epoch
    EpochMillis,
    /// Integer nanoseconds since the Unix epoch
    EpochNanos,
    /// Any strftime layout
    Layout(String),
    #[serde(skip)]
    Custom(fn(DateTime<Utc>, &mut dyn PrimitiveArrayEncoder)),
}

impl TimeEncoding {
    pub fn encode(&self, time: DateTime<Utc>, enc: &mut dyn PrimitiveArrayEncoder) {
        match self {
            TimeEncoding::Iso8601 => {
                enc.append_string(&time.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
            }
            TimeEncoding::Iso8601Micros => {
                enc.append_string(&time.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string())
            }
            TimeEncoding::Rfc3339 => enc.append_string(&time.to_rfc3339()),
            TimeEncoding::Epoch => enc.append_float(unix_nanos(time) as f64 / 1e9),
            TimeEncoding::EpochMillis => enc.append_float(unix_nanos(time) as f64 / 1e6),
            TimeEncoding::EpochNanos => enc.append_int(unix_nanos(time)),
            TimeEncoding::Layout(layout) => enc.append_string(&time.format(layout).to_string()),
            TimeEncoding::Custom(f) => f(time, enc),
        }
    }
}

fn unix_nanos(time: DateTime<Utc>) -> i64 {
    time.timestamp_nanos_opt()
        .unwrap_or_else(|| time.timestamp().saturating_mul(1_000_000_000))
}

impl fmt::Debug for TimeEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeEncoding::Iso8601 => f.write_str("Iso8601"),
            TimeEncoding::Iso8601Micros => f.write_str("Iso8601Micros"),
            TimeEncoding::Rfc3339 => f.write_str("Rfc3339"),
            TimeEncoding::Epoch => f.write_str("Epoch"),
            TimeEncoding::EpochMillis => f.write_str("EpochMillis"),
            TimeEncoding::EpochNanos => f.write_str("EpochNanos"),
            TimeEncoding::Layout(layout) => f.debug_tuple("Layout").field(layout).finish(),
            TimeEncoding::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// How durations are rendered
#[derive(Clone, Copy, Default, Serialize, Deserialize)]
pub enum DurationEncoding {
    /// Floating-point seconds
    #[default]
    Seconds,
    /// Floating-point milliseconds
    Millis,
    /// Integer nanoseconds
    Nanos,
    /// Human-readable, e.g. `1.5s` or `2m3s`
    String,
    #[serde(skip)]
    Custom(fn(Duration, &mut dyn PrimitiveArrayEncoder)),
}

impl DurationEncoding {
    pub fn encode(&self, duration: Duration, enc: &mut dyn PrimitiveArrayEncoder) {
        match self {
            DurationEncoding::Seconds => enc.append_float(duration.as_secs_f64()),
            DurationEncoding::Millis => enc.append_float(duration.as_nanos() as f64 / 1e6),
            DurationEncoding::Nanos => {
                enc.append_int(i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX))
            }
            DurationEncoding::String => enc.append_string(&format_duration(duration)),
            DurationEncoding::Custom(f) => f(duration, enc),
        }
    }
}

impl fmt::Debug for DurationEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationEncoding::Seconds => f.write_str("Seconds"),
            DurationEncoding::Millis => f.write_str("Millis"),
            DurationEncoding::Nanos => f.write_str("Nanos"),
            DurationEncoding::String => f.write_str("String"),
            DurationEncoding::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// `1h2m3.5s`, `250ms`, `1.5µs`, `0s`
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < 1_000 {
        return format!("{}ns", nanos);
    }
    if nanos < 1_000_000 {
        return format!("{}µs", nanos as f64 / 1e3);
    }
    if nanos < 1_000_000_000 {
        return format!("{}ms", nanos as f64 / 1e6);
    }

    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = (total_secs % 60) as f64 + f64::from(duration.subsec_nanos()) / 1e9;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    out.push_str(&format!("{}s", seconds));
    out
}

/// How the call site is rendered
#[derive(Clone, Copy, Default, Serialize, Deserialize)]
pub enum CallerEncoding {
    /// Last directory and file: `pkg/foo.rs:18`
    #[default]
    Short,
    /// The whole path: `/src/app/pkg/foo.rs:18`
    Full,
    #[serde(skip)]
    Custom(fn(&Caller, &mut dyn PrimitiveArrayEncoder)),
}

impl CallerEncoding {
    pub fn encode(&self, caller: &Caller, enc: &mut dyn PrimitiveArrayEncoder) {
        match self {
            CallerEncoding::Short => enc.append_string(&caller.trimmed_path()),
            CallerEncoding::Full => enc.append_string(&caller.full_path()),
            CallerEncoding::Custom(f) => f(caller, enc),
        }
    }
}

impl fmt::Debug for CallerEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallerEncoding::Short => f.write_str("Short"),
            CallerEncoding::Full => f.write_str("Full"),
            CallerEncoding::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// How the logger name is rendered
#[derive(Clone, Copy, Default, Serialize, Deserialize)]
pub enum NameEncoding {
    #[default]
    Full,
    #[serde(skip)]
    Custom(fn(&str, &mut dyn PrimitiveArrayEncoder)),
}

impl NameEncoding {
    pub fn encode(&self, name: &str, enc: &mut dyn PrimitiveArrayEncoder) {
        match self {
            NameEncoding::Full => enc.append_string(name),
            NameEncoding::Custom(f) => f(name, enc),
        }
    }
}

impl fmt::Debug for NameEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameEncoding::Full => f.write_str("Full"),
            NameEncoding::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Keys and formatters shared by every encoder built from it
///
/// # Examples
///
/// ```
/// use rust_log_facade::core::{EncoderConfig, TimeEncoding};
///
/// let config = EncoderConfig::production_console()
///     .with_time_key("ts")
///     .with_time_encoding(TimeEncoding::EpochMillis);
/// assert_eq!(config.time_key, "ts");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub message_key: String,
    pub level_key: String,
    pub time_key: String,
    pub name_key: String,
    pub caller_key: String,
    pub stacktrace_key: String,
    /// Appended after every entry; `"\n"` when empty
    pub line_ending: String,
    pub encode_level: LevelEncoding,
    pub encode_time: TimeEncoding,
    pub encode_duration: DurationEncoding,
    pub encode_caller: CallerEncoding,
    /// Falls back to [`NameEncoding::Full`] when unset
    pub encode_name: Option<NameEncoding>,
}

impl EncoderConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Colored console output for local development
    #[must_use]
    pub fn development_console() -> Self {
        Self {
            message_key: "message".to_string(),
            level_key: "level".to_string(),
            time_key: String::new(),
            name_key: String::new(),
            caller_key: "caller".to_string(),
            stacktrace_key: "stacktrace".to_string(),
            line_ending: String::new(),
            encode_level: LevelEncoding::CapitalColor,
            encode_time: TimeEncoding::Iso8601,
            encode_duration: DurationEncoding::Seconds,
            encode_caller: CallerEncoding::Short,
            encode_name: None,
        }
    }

    /// Same keys as [`EncoderConfig::development_console`], without color
    #[must_use]
    pub fn production_console() -> Self {
        Self {
            encode_level: LevelEncoding::Capital,
            ..Self::development_console()
        }
    }

    /// Keys understood by Logstash-style JSON collectors
    #[must_use]
    pub fn json() -> Self {
        Self {
            message_key: "@message".to_string(),
            level_key: "level".to_string(),
            time_key: "@timestamp".to_string(),
            name_key: String::new(),
            caller_key: "caller".to_string(),
            stacktrace_key: "stacktrace".to_string(),
            line_ending: String::new(),
            encode_level: LevelEncoding::Capital,
            encode_time: TimeEncoding::Iso8601,
            encode_duration: DurationEncoding::Seconds,
            encode_caller: CallerEncoding::Short,
            encode_name: None,
        }
    }

    #[must_use]
    pub fn with_message_key(mut self, key: impl Into<String>) -> Self {
        self.message_key = key.into();
        self
    }

    #[must_use]
    pub fn with_level_key(mut self, key: impl Into<String>) -> Self {
        self.level_key = key.into();
        self
    }

    #[must_use]
    pub fn with_time_key(mut self, key: impl Into<String>) -> Self {
        self.time_key = key.into();
        self
    }

    #[must_use]
    pub fn with_name_key(mut self, key: impl Into<String>) -> Self {
        self.name_key = key.into();
        self
    }

    #[must_use]
    pub fn with_caller_key(mut self, key: impl Into<String>) -> Self {
        self.caller_key = key.into();
        self
    }

    #[must_use]
    pub fn with_stacktrace_key(mut self, key: impl Into<String>) -> Self {
        self.stacktrace_key = key.into();
        self
    }

    #[must_use]
    pub fn with_line_ending(mut self, ending: impl Into<String>) -> Self {
        self.line_ending = ending.into();
        self
    }

    #[must_use]
    pub fn with_level_encoding(mut self, encoding: LevelEncoding) -> Self {
        self.encode_level = encoding;
        self
    }

    #[must_use]
    pub fn with_time_encoding(mut self, encoding: TimeEncoding) -> Self {
        self.encode_time = encoding;
        self
    }

    #[must_use]
    pub fn with_duration_encoding(mut self, encoding: DurationEncoding) -> Self {
        self.encode_duration = encoding;
        self
    }

    #[must_use]
    pub fn with_caller_encoding(mut self, encoding: CallerEncoding) -> Self {
        self.encode_caller = encoding;
        self
    }

    #[must_use]
    pub fn with_name_encoding(mut self, encoding: NameEncoding) -> Self {
        self.encode_name = Some(encoding);
        self
    }

    /// Wrap this config in an Arc for sharing across encoders
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// The configured line ending, or `"\n"`
    pub fn line_ending(&self) -> &str {
        if self.line_ending.is_empty() {
            "\n"
        } else {
            &self.line_ending
        }
    }

    pub fn name_encoding(&self) -> NameEncoding {
        self.encode_name.unwrap_or_default()
    }
}
