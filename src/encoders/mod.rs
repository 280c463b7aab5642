//! Entry encoders

pub mod console;
pub mod json;
pub mod logstash;

pub use console::{recolor, ConsoleEncoder};
pub use json::JsonEncoder;
pub use logstash::LogstashEncoder;
