//! Process-wide configuration and logger construction
//!
//! A [`Facade`] owns the settings every new logger is built from plus the
//! per-package level [`Registry`]. Most programs use the lazily created global
//! instance through [`configure`] and [`new`] (or the `logger!` macro):
//!
//! ```
//! use rust_log_facade::core::{Level, Mode};
//! use rust_log_facade::facade::{self, ConfigOption};
//!
//! facade::configure([
//!     ConfigOption::AppName("shop".to_string()),
//!     ConfigOption::Mode(Mode::Production),
//!     ConfigOption::Level(Level::Debug),
//! ]);
//!
//! let log = facade::new(module_path!());
//! log.info("started", &[]);
//! ```
//!
//! Reconfiguration is meant for startup. Loggers already built keep the sinks
//! and mode they were created with; only their package level stays live.

use crate::core::encoder_config::EncoderConfig;
use crate::core::error::{LoggerError, Result};
use crate::core::field::Field;
use crate::core::level::{Level, LevelEnabler};
use crate::core::log_core::{Core, IoCore, Tee};
use crate::core::logger::{Logger, LoggerBuilder};
use crate::core::mode::Mode;
use crate::core::sink::SharedSink;
use crate::encoders::{ConsoleEncoder, LogstashEncoder};
use crate::registry::Registry;
use crate::sinks::ConsoleSink;
use parking_lot::RwLock;
use std::sync::{Arc, LazyLock};

pub const ENV_MODE: &str = "LOG_MODE";
pub const ENV_LEVEL: &str = "LOG_LEVEL";
pub const ENV_APP_NAME: &str = "LOG_APP_NAME";

static DEVELOPMENT_CONSOLE: LazyLock<Arc<EncoderConfig>> =
    LazyLock::new(|| EncoderConfig::development_console().shared());
static PRODUCTION_CONSOLE: LazyLock<Arc<EncoderConfig>> =
    LazyLock::new(|| EncoderConfig::production_console().shared());
static JSON: LazyLock<Arc<EncoderConfig>> = LazyLock::new(|| EncoderConfig::json().shared());

static HOSTNAME: LazyLock<String> = LazyLock::new(|| {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string())
});

static GLOBAL: LazyLock<Facade> = LazyLock::new(|| Facade::new(Config::default()));

/// This machine's hostname, or `unknown` when it cannot be read
pub fn hostname() -> &'static str {
    &HOSTNAME
}

/// Settings applied to every logger built afterwards
#[derive(Clone)]
pub struct Config {
    pub mode: Mode,
    pub console_sink: SharedSink,
    /// When set, every entry is also written here as JSON
    pub json_sink: Option<SharedSink>,
    /// Added as an `application` field when non-empty
    pub app_name: String,
    /// Level of packages registered from now on
    pub level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Development,
            console_sink: Arc::new(ConsoleSink::stdout()),
            json_sink: None,
            app_name: String::new(),
            level: Level::Info,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("mode", &self.mode)
            .field("console_sink", &self.console_sink.name())
            .field("json_sink", &self.json_sink.as_ref().map(|sink| sink.name()))
            .field("app_name", &self.app_name)
            .field("level", &self.level)
            .finish()
    }
}

/// One setting change; later options win over earlier ones
#[derive(Clone)]
pub enum ConfigOption {
    AppName(String),
    ConsoleWriter(SharedSink),
    JsonWriter(SharedSink),
    Mode(Mode),
    Level(Level),
}

impl std::fmt::Debug for ConfigOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigOption::AppName(name) => f.debug_tuple("AppName").field(name).finish(),
            ConfigOption::ConsoleWriter(sink) => {
                f.debug_tuple("ConsoleWriter").field(&sink.name()).finish()
            }
            ConfigOption::JsonWriter(sink) => f.debug_tuple("JsonWriter").field(&sink.name()).finish(),
            ConfigOption::Mode(mode) => f.debug_tuple("Mode").field(mode).finish(),
            ConfigOption::Level(level) => f.debug_tuple("Level").field(level).finish(),
        }
    }
}

impl Config {
    pub fn apply(&mut self, option: ConfigOption) {
        match option {
            ConfigOption::AppName(name) => self.app_name = name,
            ConfigOption::ConsoleWriter(sink) => self.console_sink = sink,
            ConfigOption::JsonWriter(sink) => self.json_sink = Some(sink),
            ConfigOption::Mode(mode) => self.mode = mode,
            ConfigOption::Level(level) => self.level = level,
        }
    }

    #[must_use]
    pub fn with(mut self, option: ConfigOption) -> Self {
        self.apply(option);
        self
    }

    /// Defaults overridden by `LOG_MODE`, `LOG_LEVEL` and `LOG_APP_NAME`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        for option in options_from_env()? {
            config.apply(option);
        }
        Ok(config)
    }

    /// Console encoder settings for the configured mode
    pub fn console_encoder_config(&self) -> Arc<EncoderConfig> {
        match self.mode {
            Mode::Production => Arc::clone(&PRODUCTION_CONSOLE),
            Mode::Development | Mode::Unset => Arc::clone(&DEVELOPMENT_CONSOLE),
        }
    }
}

/// Options read from the process environment; unset variables are skipped
pub fn options_from_env() -> Result<Vec<ConfigOption>> {
    options_from_lookup(|key| std::env::var(key).ok())
}

fn options_from_lookup<F>(lookup: F) -> Result<Vec<ConfigOption>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut options = Vec::new();

    if let Some(value) = lookup(ENV_MODE) {
        let mode = value
            .parse::<Mode>()
            .map_err(|e| LoggerError::config(ENV_MODE, e))?;
        options.push(ConfigOption::Mode(mode));
    }

    if let Some(value) = lookup(ENV_LEVEL) {
        let level = value
            .parse::<Level>()
            .map_err(|e| LoggerError::config(ENV_LEVEL, e))?;
        options.push(ConfigOption::Level(level));
    }

    if let Some(name) = lookup(ENV_APP_NAME) {
        options.push(ConfigOption::AppName(name));
    }

    Ok(options)
}

/// Settings plus the level registry; builds loggers from both
pub struct Facade {
    config: RwLock<Config>,
    registry: Registry,
}

impl Facade {
    pub fn new(config: Config) -> Self {
        let registry = Registry::new(config.level);
        Self {
            config: RwLock::new(config),
            registry,
        }
    }

    /// Apply `options` in order, then make the resulting level the
    /// registry's default for packages registered from now on
    pub fn configure<I>(&self, options: I)
    where
        I: IntoIterator<Item = ConfigOption>,
    {
        let mut config = self.config.write();
        for option in options {
            config.apply(option);
        }
        self.registry.set_default_level(config.level);
    }

    /// Snapshot of the current settings
    pub fn config(&self) -> Config {
        self.config.read().clone()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Build a logger whose level is controlled by `package`'s registry entry
    pub fn logger(&self, package: &str) -> Logger {
        let level: Arc<dyn LevelEnabler> = Arc::new(self.registry.get(package));
        let config = self.config();

        let console = ConsoleEncoder::new(config.console_encoder_config(), config.mode);
        let mut core: Box<dyn Core> = Box::new(IoCore::new(
            Box::new(console),
            Arc::clone(&config.console_sink),
            Arc::clone(&level),
        ));

        if let Some(json_sink) = &config.json_sink {
            let json = LogstashEncoder::new(Arc::clone(&JSON));
            core = Box::new(Tee::new(vec![
                core,
                Box::new(IoCore::new(Box::new(json), Arc::clone(json_sink), level)),
            ]));
        }

        let mut context = vec![
            Field::string("@source_host", hostname()),
            Field::namespace("@fields"),
        ];
        if !config.app_name.is_empty() {
            context.push(Field::string("application", config.app_name));
        }

        LoggerBuilder::new(core)
            .add_caller(true)
            .add_stacktrace(Level::Panic)
            .build()
            .with(&context)
    }

    /// Change the level of every logger built for `package`
    pub fn set_level_for_package(&self, package: &str, level: Level) -> Result<()> {
        self.registry.set(package, level)
    }

    /// Every package a logger has been built for
    pub fn packages(&self) -> Vec<String> {
        self.registry.packages()
    }
}

impl Default for Facade {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl std::fmt::Debug for Facade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Facade")
            .field("config", &*self.config.read())
            .field("registry", &self.registry)
            .finish()
    }
}

/// The process-wide facade
pub fn global() -> &'static Facade {
    &GLOBAL
}

pub fn configure<I>(options: I)
where
    I: IntoIterator<Item = ConfigOption>,
{
    global().configure(options);
}

/// A logger for `package` built from the global settings
pub fn new(package: &str) -> Logger {
    global().logger(package)
}

pub fn set_level_for_package(package: &str, level: Level) -> Result<()> {
    global().set_level_for_package(package, level)
}

pub fn packages() -> Vec<String> {
    global().packages()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::color::{Color, RESET};
    use crate::sinks::MemorySink;
    use serde_json::Value;
    use std::collections::HashMap;

    fn facade_with(console: Arc<MemorySink>, mode: Mode) -> Facade {
        let facade = Facade::default();
        facade.configure([
            ConfigOption::ConsoleWriter(console),
            ConfigOption::Mode(mode),
        ]);
        facade
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.mode, Mode::Development);
        assert_eq!(config.console_sink.name(), "stdout");
        assert!(config.json_sink.is_none());
        assert!(config.app_name.is_empty());
        assert_eq!(config.level, Level::Info);
    }

    #[test]
    fn test_later_options_win() {
        let config = Config::default()
            .with(ConfigOption::AppName("first".into()))
            .with(ConfigOption::AppName("second".into()))
            .with(ConfigOption::Level(Level::Warn));
        assert_eq!(config.app_name, "second");
        assert_eq!(config.level, Level::Warn);
    }

    #[test]
    fn test_options_from_lookup() {
        let env: HashMap<&str, &str> = [
            (ENV_MODE, "production"),
            (ENV_LEVEL, "debug"),
            (ENV_APP_NAME, "shop"),
        ]
        .into_iter()
        .collect();
        let options =
            options_from_lookup(|key| env.get(key).map(|v| v.to_string())).expect("valid env");

        let mut config = Config::default();
        for option in options {
            config.apply(option);
        }
        assert_eq!(config.mode, Mode::Production);
        assert_eq!(config.level, Level::Debug);
        assert_eq!(config.app_name, "shop");
    }

    #[test]
    fn test_invalid_env_level_is_rejected() {
        let err = options_from_lookup(|key| (key == ENV_LEVEL).then(|| "loud".to_string()))
            .expect_err("bad level");
        assert!(matches!(err, LoggerError::InvalidConfiguration { ref component, .. } if component == ENV_LEVEL));
        assert!(options_from_lookup(|_| None).expect("empty env").is_empty());
    }

    #[test]
    fn test_production_console_line() {
        let console = Arc::new(MemorySink::new());
        let facade = facade_with(console.clone(), Mode::Production);
        facade.configure([ConfigOption::AppName("bol.kit".into())]);

        let log = facade.logger("shop::orders");
        log.info("order placed", &[Field::int("items", 3)]);

        let line = console.contents();
        assert!(line.starts_with("INFO "));
        assert!(line.contains(" caller=facade.rs:") || line.contains(" caller=src/facade.rs:"));
        assert!(line.contains(" message=order placed items=3 "));
        assert!(line.ends_with(&format!(
            " @source_host={} application=bol.kit\n",
            hostname()
        )));
        assert!(!line.contains('\x1b'));
    }

    #[test]
    fn test_development_console_is_colored() {
        let console = Arc::new(MemorySink::new());
        let facade = facade_with(console.clone(), Mode::Development);
        facade.logger("shop").warn("careful", &[]);

        let line = console.contents();
        let yellow = format!("\x1b[{}m", Color::Yellow.code());
        assert!(line.starts_with(&format!("{}WARN{}", yellow, RESET)));
        assert!(line.contains(&format!("{}message{}=careful", yellow, RESET)));
    }

    #[test]
    fn test_json_sink_receives_enriched_copy() {
        let console = Arc::new(MemorySink::new());
        let json = Arc::new(MemorySink::new());
        let facade = facade_with(console.clone(), Mode::Production);
        facade.configure([
            ConfigOption::JsonWriter(json.clone()),
            ConfigOption::AppName("bol.kit".into()),
        ]);

        facade
            .logger("shop")
            .error("payment failed", &[Field::string("user", "ann")]);

        assert_eq!(console.lines().len(), 1);
        let value: Value = serde_json::from_str(&json.lines()[0]).expect("valid json");
        assert_eq!(value["level"], "ERROR");
        assert_eq!(value["@message"], "payment failed");
        assert_eq!(value["@source_host"], hostname());
        assert_eq!(value["@fields"]["application"], "bol.kit");
        assert_eq!(value["@fields"]["level"], "error");
        assert_eq!(value["@fields"]["user"], "ann");
        assert!(value["@fields"]["caller"]
            .as_str()
            .expect("caller string")
            .contains("facade.rs:"));
    }

    #[test]
    fn test_package_levels() {
        let console = Arc::new(MemorySink::new());
        let facade = facade_with(console.clone(), Mode::Production);

        assert!(facade
            .set_level_for_package("shop::db", Level::Debug)
            .is_err());

        let db = facade.logger("shop::db");
        let web = facade.logger("shop::web");
        db.debug("hidden", &[]);
        assert!(console.contents().is_empty());

        facade
            .set_level_for_package("shop::db", Level::Debug)
            .expect("registered");
        db.debug("visible", &[]);
        web.debug("still hidden", &[]);
        assert_eq!(console.lines().len(), 1);

        let mut packages = facade.packages();
        packages.sort();
        assert_eq!(packages, vec!["shop::db", "shop::web"]);
    }

    #[test]
    fn test_configure_level_applies_to_new_packages() {
        let console = Arc::new(MemorySink::new());
        let facade = facade_with(console.clone(), Mode::Production);
        let before = facade.logger("before");

        facade.configure([ConfigOption::Level(Level::Error)]);
        let after = facade.logger("after");

        before.info("kept", &[]);
        after.info("dropped", &[]);
        assert_eq!(console.lines().len(), 1);
        assert_eq!(facade.registry().default_level(), Level::Error);
    }

    #[test]
    fn test_hostname_is_never_empty() {
        assert!(!hostname().is_empty());
    }
}
