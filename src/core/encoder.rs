//! Encoder contracts
//!
//! Fields add themselves to an [`ObjectEncoder`]; nested values go through
//! [`ObjectMarshaler`] and [`ArrayMarshaler`]. Level, time, duration and
//! caller formatters only ever see a [`PrimitiveArrayEncoder`], so one
//! formatter works for every output format.

use super::buffer::Buffer;
use super::entry::Entry;
use super::error::Result;
use super::field::Field;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Sink for single primitive values
pub trait PrimitiveArrayEncoder {
    fn append_bool(&mut self, value: bool);
    fn append_int(&mut self, value: i64);
    fn append_uint(&mut self, value: u64);
    fn append_float(&mut self, value: f64);
    fn append_string(&mut self, value: &str);
    fn append_byte_string(&mut self, value: &[u8]);
}

/// Element-by-element encoder for nested arrays
pub trait ArrayEncoder: PrimitiveArrayEncoder {
    fn append_duration(&mut self, value: Duration);
    fn append_time(&mut self, value: DateTime<Utc>);
    fn append_object(&mut self, value: &dyn ObjectMarshaler) -> Result<()>;
    fn append_array(&mut self, value: &dyn ArrayMarshaler) -> Result<()>;
    fn append_reflected(&mut self, value: &serde_json::Value) -> Result<()>;
}

/// Key/value encoder; every entry encoder is one
pub trait ObjectEncoder {
    fn add_string(&mut self, key: &str, value: &str);
    fn add_bool(&mut self, key: &str, value: bool);
    fn add_int(&mut self, key: &str, value: i64);
    fn add_uint(&mut self, key: &str, value: u64);
    fn add_float(&mut self, key: &str, value: f64);
    fn add_duration(&mut self, key: &str, value: Duration);
    fn add_time(&mut self, key: &str, value: DateTime<Utc>);
    fn add_binary(&mut self, key: &str, value: &[u8]);
    fn add_byte_string(&mut self, key: &str, value: &[u8]);
    fn add_object(&mut self, key: &str, value: &dyn ObjectMarshaler) -> Result<()>;
    fn add_array(&mut self, key: &str, value: &dyn ArrayMarshaler) -> Result<()>;
    fn add_reflected(&mut self, key: &str, value: &serde_json::Value) -> Result<()>;

    /// Nest every following key under `key`
    fn open_namespace(&mut self, key: &str);
}

/// A value that knows how to encode itself as an object
pub trait ObjectMarshaler: Send + Sync {
    fn marshal_object(&self, enc: &mut dyn ObjectEncoder) -> Result<()>;
}

/// A value that knows how to encode itself as an array
pub trait ArrayMarshaler: Send + Sync {
    fn marshal_array(&self, enc: &mut dyn ArrayEncoder) -> Result<()>;
}

/// Renders complete entries
///
/// Context added through the [`ObjectEncoder`] methods is kept by the
/// encoder and written with every entry it encodes afterwards.
pub trait Encoder: ObjectEncoder + Send + Sync {
    /// Copy of this encoder, context included
    fn clone_encoder(&self) -> Box<dyn Encoder>;

    /// Render `entry` and `fields` into a fresh buffer
    fn encode_entry(&self, entry: &Entry, fields: &[Field]) -> Result<Buffer>;
}

impl ObjectMarshaler for Vec<Field> {
    fn marshal_object(&self, enc: &mut dyn ObjectEncoder) -> Result<()> {
        for field in self {
            field.add_to(enc);
        }
        Ok(())
    }
}

impl ArrayMarshaler for Vec<String> {
    fn marshal_array(&self, enc: &mut dyn ArrayEncoder) -> Result<()> {
        for value in self {
            enc.append_string(value);
        }
        Ok(())
    }
}

impl ArrayMarshaler for Vec<i64> {
    fn marshal_array(&self, enc: &mut dyn ArrayEncoder) -> Result<()> {
        for value in self {
            enc.append_int(*value);
        }
        Ok(())
    }
}

impl ArrayMarshaler for Vec<f64> {
    fn marshal_array(&self, enc: &mut dyn ArrayEncoder) -> Result<()> {
        for value in self {
            enc.append_float(*value);
        }
        Ok(())
    }
}

impl ArrayMarshaler for Vec<bool> {
    fn marshal_array(&self, enc: &mut dyn ArrayEncoder) -> Result<()> {
        for value in self {
            enc.append_bool(*value);
        }
        Ok(())
    }
}
