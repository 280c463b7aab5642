//! Line-delimited JSON encoder

use crate::core::buffer::{self, Buffer};
use crate::core::encoder::{
    ArrayEncoder, ArrayMarshaler, Encoder, ObjectEncoder, ObjectMarshaler, PrimitiveArrayEncoder,
};
use crate::core::encoder_config::EncoderConfig;
use crate::core::entry::Entry;
use crate::core::error::{LoggerError, Result};
use crate::core::field::Field;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Writes each entry as one JSON object per line
///
/// Key order is level, time, name, caller, message, then any context added
/// to the encoder, then the entry's own fields. Namespaces opened along the
/// way are closed before the stacktrace is written.
#[derive(Debug)]
pub struct JsonEncoder {
    config: Arc<EncoderConfig>,
    buf: Buffer,
    open_namespaces: usize,
}

impl JsonEncoder {
    pub fn new(config: Arc<EncoderConfig>) -> Self {
        Self {
            config,
            buf: buffer::get(),
            open_namespaces: 0,
        }
    }

    pub fn config(&self) -> &Arc<EncoderConfig> {
        &self.config
    }

    fn clone_empty(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            buf: buffer::get(),
            open_namespaces: self.open_namespaces,
        }
    }

    fn separate(&mut self) {
        match self.buf.last() {
            None | Some(b'{' | b'[' | b':' | b',' | b' ') => {}
            Some(_) => self.buf.append_byte(b','),
        }
    }

    fn quoted(&mut self, value: &str) {
        // Writing into a Buffer cannot fail.
        let _ = serde_json::to_writer(&mut self.buf, value);
    }

    fn add_key(&mut self, key: &str) {
        self.separate();
        self.quoted(key);
        self.buf.append_byte(b':');
    }

    fn close_open_namespaces(&mut self) {
        for _ in 0..self.open_namespaces {
            self.buf.append_byte(b'}');
        }
        self.open_namespaces = 0;
    }

    fn nested_object(&mut self, value: &dyn ObjectMarshaler) -> Result<()> {
        self.buf.append_byte(b'{');
        let outer = std::mem::take(&mut self.open_namespaces);
        let result = value.marshal_object(self);
        self.close_open_namespaces();
        self.open_namespaces = outer;
        self.buf.append_byte(b'}');
        result
    }

    fn nested_array(&mut self, value: &dyn ArrayMarshaler) -> Result<()> {
        self.buf.append_byte(b'[');
        let result = value.marshal_array(self);
        self.buf.append_byte(b']');
        result
    }
}

impl Clone for JsonEncoder {
    fn clone(&self) -> Self {
        let mut clone = self.clone_empty();
        clone.buf.append_bytes(self.buf.as_bytes());
        clone
    }
}

impl PrimitiveArrayEncoder for JsonEncoder {
    fn append_bool(&mut self, value: bool) {
        self.separate();
        self.buf.append_bool(value);
    }

    fn append_int(&mut self, value: i64) {
        self.separate();
        self.buf.append_int(value);
    }

    fn append_uint(&mut self, value: u64) {
        self.separate();
        self.buf.append_uint(value);
    }

    fn append_float(&mut self, value: f64) {
        self.separate();
        if value.is_nan() {
            self.buf.append_str("\"NaN\"");
        } else if value.is_infinite() {
            self.buf
                .append_str(if value > 0.0 { "\"+Inf\"" } else { "\"-Inf\"" });
        } else {
            self.buf.append_float(value);
        }
    }

    fn append_string(&mut self, value: &str) {
        self.separate();
        self.quoted(value);
    }

    fn append_byte_string(&mut self, value: &[u8]) {
        self.separate();
        self.quoted(&String::from_utf8_lossy(value));
    }
}

impl ArrayEncoder for JsonEncoder {
    fn append_duration(&mut self, value: Duration) {
        let config = Arc::clone(&self.config);
        config.encode_duration.encode(value, self);
    }

    fn append_time(&mut self, value: DateTime<Utc>) {
        let config = Arc::clone(&self.config);
        config.encode_time.encode(value, self);
    }

    fn append_object(&mut self, value: &dyn ObjectMarshaler) -> Result<()> {
        self.separate();
        self.nested_object(value)
    }

    fn append_array(&mut self, value: &dyn ArrayMarshaler) -> Result<()> {
        self.separate();
        self.nested_array(value)
    }

    fn append_reflected(&mut self, value: &serde_json::Value) -> Result<()> {
        self.separate();
        serde_json::to_writer(&mut self.buf, value).map_err(LoggerError::from)
    }
}

impl ObjectEncoder for JsonEncoder {
    fn add_string(&mut self, key: &str, value: &str) {
        self.add_key(key);
        self.append_string(value);
    }

    fn add_bool(&mut self, key: &str, value: bool) {
        self.add_key(key);
        self.append_bool(value);
    }

    fn add_int(&mut self, key: &str, value: i64) {
        self.add_key(key);
        self.append_int(value);
    }

    fn add_uint(&mut self, key: &str, value: u64) {
        self.add_key(key);
        self.append_uint(value);
    }

    fn add_float(&mut self, key: &str, value: f64) {
        self.add_key(key);
        self.append_float(value);
    }

    fn add_duration(&mut self, key: &str, value: Duration) {
        self.add_key(key);
        self.append_duration(value);
    }

    fn add_time(&mut self, key: &str, value: DateTime<Utc>) {
        self.add_key(key);
        self.append_time(value);
    }

    fn add_binary(&mut self, key: &str, value: &[u8]) {
        self.add_key(key);
        self.append_string(&STANDARD.encode(value));
    }

    fn add_byte_string(&mut self, key: &str, value: &[u8]) {
        self.add_key(key);
        self.append_byte_string(value);
    }

    fn add_object(&mut self, key: &str, value: &dyn ObjectMarshaler) -> Result<()> {
        self.add_key(key);
        self.nested_object(value)
    }

    fn add_array(&mut self, key: &str, value: &dyn ArrayMarshaler) -> Result<()> {
        self.add_key(key);
        self.nested_array(value)
    }

    fn add_reflected(&mut self, key: &str, value: &serde_json::Value) -> Result<()> {
        self.add_key(key);
        self.append_reflected(value)
    }

    fn open_namespace(&mut self, key: &str) {
        self.add_key(key);
        self.buf.append_byte(b'{');
        self.open_namespaces += 1;
    }
}

impl Encoder for JsonEncoder {
    fn clone_encoder(&self) -> Box<dyn Encoder> {
        Box::new(self.clone())
    }

    fn encode_entry(&self, entry: &Entry, fields: &[Field]) -> Result<Buffer> {
        let config = Arc::clone(&self.config);
        let mut line = self.clone_empty();
        line.buf.append_byte(b'{');

        if !config.level_key.is_empty() {
            line.add_key(&config.level_key);
            let mark = line.buf.len();
            config.encode_level.encode(entry.level, &mut line);
            if line.buf.len() == mark {
                line.append_string(entry.level.as_str());
            }
        }

        if !config.time_key.is_empty() {
            line.add_time(&config.time_key, entry.time);
        }

        if !entry.logger_name.is_empty() && !config.name_key.is_empty() {
            line.add_key(&config.name_key);
            let mark = line.buf.len();
            config.name_encoding().encode(&entry.logger_name, &mut line);
            if line.buf.len() == mark {
                line.append_string(&entry.logger_name);
            }
        }

        if entry.caller.defined && !config.caller_key.is_empty() {
            line.add_key(&config.caller_key);
            let mark = line.buf.len();
            config.encode_caller.encode(&entry.caller, &mut line);
            if line.buf.len() == mark {
                line.append_string(&entry.caller.full_path());
            }
        }

        if !config.message_key.is_empty() {
            line.add_string(&config.message_key, &entry.message);
        }

        if !self.buf.is_empty() {
            line.separate();
            line.buf.append_bytes(self.buf.as_bytes());
        }

        for field in fields {
            field.add_to(&mut line);
        }
        line.close_open_namespaces();

        if !entry.stack.is_empty() && !config.stacktrace_key.is_empty() {
            line.add_string(&config.stacktrace_key, &entry.stack);
        }

        line.buf.append_byte(b'}');
        line.buf.append_str(config.line_ending());

        Ok(std::mem::take(&mut line.buf))
    }
}
