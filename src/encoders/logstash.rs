//! JSON encoder that enriches every entry for Logstash-style collectors

use super::json::JsonEncoder;
use crate::core::buffer::Buffer;
use crate::core::encoder::{ArrayMarshaler, Encoder, ObjectEncoder, ObjectMarshaler};
use crate::core::encoder_config::EncoderConfig;
use crate::core::entry::Entry;
use crate::core::error::Result;
use crate::core::field::Field;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Prepends a lowercase `level` field, and a `caller` field when the call
/// site is known, to the fields of every entry before delegating.
///
/// All other encoder operations pass straight through to the inner encoder.
pub struct LogstashEncoder {
    inner: Box<dyn Encoder>,
}

impl LogstashEncoder {
    /// Wrap a [`JsonEncoder`] built from `config`
    pub fn new(config: Arc<EncoderConfig>) -> Self {
        Self::wrap(Box::new(JsonEncoder::new(config)))
    }

    pub fn wrap(inner: Box<dyn Encoder>) -> Self {
        Self { inner }
    }

    fn enrich(entry: &Entry, fields: &[Field]) -> Vec<Field> {
        let mut all = Vec::with_capacity(fields.len() + 2);
        all.push(Field::string("level", entry.level.as_str()));
        if entry.caller.defined {
            all.push(Field::string("caller", entry.caller.full_path()));
        }
        all.extend_from_slice(fields);
        all
    }
}

impl std::fmt::Debug for LogstashEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogstashEncoder").finish_non_exhaustive()
    }
}

impl ObjectEncoder for LogstashEncoder {
    fn add_string(&mut self, key: &str, value: &str) {
        self.inner.add_string(key, value);
    }

    fn add_bool(&mut self, key: &str, value: bool) {
        self.inner.add_bool(key, value);
    }

    fn add_int(&mut self, key: &str, value: i64) {
        self.inner.add_int(key, value);
    }

    fn add_uint(&mut self, key: &str, value: u64) {
        self.inner.add_uint(key, value);
    }

    fn add_float(&mut self, key: &str, value: f64) {
        self.inner.add_float(key, value);
    }

    fn add_duration(&mut self, key: &str, value: Duration) {
        self.inner.add_duration(key, value);
    }

    fn add_time(&mut self, key: &str, value: DateTime<Utc>) {
        self.inner.add_time(key, value);
    }

    fn add_binary(&mut self, key: &str, value: &[u8]) {
        self.inner.add_binary(key, value);
    }

    fn add_byte_string(&mut self, key: &str, value: &[u8]) {
        self.inner.add_byte_string(key, value);
    }

    fn add_object(&mut self, key: &str, value: &dyn ObjectMarshaler) -> Result<()> {
        self.inner.add_object(key, value)
    }

    fn add_array(&mut self, key: &str, value: &dyn ArrayMarshaler) -> Result<()> {
        self.inner.add_array(key, value)
    }

    fn add_reflected(&mut self, key: &str, value: &serde_json::Value) -> Result<()> {
        self.inner.add_reflected(key, value)
    }

    fn open_namespace(&mut self, key: &str) {
        self.inner.open_namespace(key);
    }
}

impl Encoder for LogstashEncoder {
    fn clone_encoder(&self) -> Box<dyn Encoder> {
        Box::new(Self::wrap(self.inner.clone_encoder()))
    }

    fn encode_entry(&self, entry: &Entry, fields: &[Field]) -> Result<Buffer> {
        self.inner.encode_entry(entry, &Self::enrich(entry, fields))
    }
}
