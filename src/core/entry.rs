//! Log entry snapshot and call-site information

use super::level::Level;
use chrono::{DateTime, Utc};
use std::fmt;
use std::panic::Location;

/// Where a log call was made
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    pub defined: bool,
    pub file: String,
    pub line: u32,
    pub function: String,
}

impl Caller {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            defined: true,
            file: file.into(),
            line,
            function: String::new(),
        }
    }

    pub fn undefined() -> Self {
        Self::default()
    }

    pub fn from_location(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }

    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = function.into();
        self
    }

    /// `file:line`, or `undefined`
    pub fn full_path(&self) -> String {
        if !self.defined {
            return "undefined".to_string();
        }
        format!("{}:{}", self.file, self.line)
    }

    /// Keeps only the last directory and the file name: `pkg/file.rs:18`
    pub fn trimmed_path(&self) -> String {
        if !self.defined {
            return "undefined".to_string();
        }
        let file = self.file.replace('\\', "/");
        let trimmed = match file.rfind('/') {
            Some(last) => match file[..last].rfind('/') {
                Some(prev) => &file[prev + 1..],
                None => file.as_str(),
            },
            None => file.as_str(),
        };
        format!("{}:{}", trimmed, self.line)
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

/// One log call, minus its fields
#[derive(Debug, Clone)]
pub struct Entry {
    pub level: Level,
    pub time: DateTime<Utc>,
    pub logger_name: String,
    pub message: String,
    pub caller: Caller,
    pub stack: String,
}

impl Entry {
    pub fn new(level: Level, message: impl AsRef<str>) -> Self {
        Self {
            level,
            time: Utc::now(),
            logger_name: String::new(),
            message: message.as_ref().to_string(),
            caller: Caller::undefined(),
            stack: String::new(),
        }
    }

    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.logger_name = name.into();
        self
    }

    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = caller;
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = stack.into();
        self
    }
}
