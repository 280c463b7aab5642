//! Core logging types and traits

pub mod buffer;
pub mod color;
pub mod encoder;
pub mod encoder_config;
pub mod entry;
pub mod error;
pub mod field;
pub mod level;
pub mod log_core;
pub mod logger;
pub mod metrics;
pub mod mode;
pub mod pool;
pub mod sink;

pub use buffer::{Buffer, BufferPool};
pub use color::Color;
pub use encoder::{
    ArrayEncoder, ArrayMarshaler, Encoder, ObjectEncoder, ObjectMarshaler, PrimitiveArrayEncoder,
};
pub use encoder_config::{
    CallerEncoding, DurationEncoding, EncoderConfig, LevelEncoding, NameEncoding, TimeEncoding,
};
pub use entry::{Caller, Entry};
pub use error::{LoggerError, Result};
pub use field::{Field, FieldValue};
pub use level::{Level, LevelEnabler};
pub use log_core::{Core, IoCore, Tee};
pub use logger::{Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use mode::Mode;
pub use pool::{Pool, Recycle};
pub use sink::{SharedSink, Sink, WriterSink};
