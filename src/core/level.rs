//! Log level definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug = 0,
    #[default]
    Info = 1,
    Warn = 2,
    Error = 3,
    /// Development panic: treated like `Panic` while developing, like `Error` otherwise
    DPanic = 4,
    Panic = 5,
    Fatal = 6,
}

impl Level {
    pub const ALL: [Level; 7] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::DPanic,
        Level::Panic,
        Level::Fatal,
    ];

    /// Lowercase name, as used by the JSON `level` field
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::DPanic => "dpanic",
            Level::Panic => "panic",
            Level::Fatal => "fatal",
        }
    }

    /// Uppercase name, as rendered at the head of a console line
    pub const fn capital_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::DPanic => "DPANIC",
            Level::Panic => "PANIC",
            Level::Fatal => "FATAL",
        }
    }

    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Level::Debug),
            1 => Some(Level::Info),
            2 => Some(Level::Warn),
            3 => Some(Level::Error),
            4 => Some(Level::DPanic),
            5 => Some(Level::Panic),
            6 => Some(Level::Fatal),
            _ => None,
        }
    }

    /// Whether an entry at `level` passes a threshold of `self`
    #[inline]
    pub fn enabled(self, level: Level) -> bool {
        level >= self
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEBUG" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARN" | "WARNING" => Ok(Level::Warn),
            "ERROR" => Ok(Level::Error),
            "DPANIC" => Ok(Level::DPanic),
            "PANIC" => Ok(Level::Panic),
            "FATAL" => Ok(Level::Fatal),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

/// Decides whether entries at a given level should be logged
pub trait LevelEnabler: Send + Sync {
    fn enabled(&self, level: Level) -> bool;
}

impl LevelEnabler for Level {
    #[inline]
    fn enabled(&self, level: Level) -> bool {
        Level::enabled(*self, level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Error < Level::DPanic);
        assert!(Level::Panic < Level::Fatal);
        assert_eq!(Level::default(), Level::Info);
    }

    #[test]
    fn test_enabled_threshold() {
        assert!(Level::Info.enabled(Level::Info));
        assert!(Level::Info.enabled(Level::Error));
        assert!(!Level::Info.enabled(Level::Debug));
        assert!(LevelEnabler::enabled(&Level::Warn, Level::Fatal));
    }

    #[test]
    fn test_u8_mapping() {
        for level in Level::ALL {
            assert_eq!(Level::from_u8(level.as_u8()), Some(level));
        }
        assert_eq!(Level::from_u8(42), None);
    }

    #[test]
    fn test_strings() {
        assert_eq!(Level::DPanic.as_str(), "dpanic");
        assert_eq!(Level::DPanic.capital_str(), "DPANIC");
        assert_eq!(Level::Warn.to_string(), "warn");
        assert_eq!("warning".parse::<Level>(), Ok(Level::Warn));
        assert_eq!("Info".parse::<Level>(), Ok(Level::Info));
        assert!("verbose".parse::<Level>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Level::Error).expect("serialize");
        assert_eq!(json, "\"error\"");
        let level: Level = serde_json::from_str("\"dpanic\"").expect("deserialize");
        assert_eq!(level, Level::DPanic);
    }
}
