//! Presentation mode for console output

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How console loggers render their output.
///
/// Only `Development` enables ANSI colors. The mode never changes which
/// fields are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Unset,
    Development,
    Production,
}

impl Mode {
    #[inline]
    pub fn is_development(self) -> bool {
        self == Mode::Development
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Mode::Unset => "unset",
            Mode::Development => "development",
            Mode::Production => "production",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" | "unset" | "none" => Ok(Mode::Unset),
            "dev" | "development" => Ok(Mode::Development),
            "pro" | "prod" | "production" => Ok(Mode::Production),
            _ => Err(format!("Invalid mode: '{}'", s)),
        }
    }
}
