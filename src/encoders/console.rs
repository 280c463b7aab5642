//! Human-readable console encoder
//!
//! Renders one entry per line:
//!
//! ```text
//! INFO 2020-03-22T13:42:12.000Z caller=foo.rs:18 message=hello errcount=230
//! ```
//!
//! In development mode every key is wrapped in the entry level's color.
//! Context added with [`ObjectEncoder`] methods (for example through
//! `Logger::with`) is rendered once, at the encoder's own level, and
//! recolored to the entry level when an entry is encoded.

use crate::core::buffer::{self, Buffer};
use crate::core::color::{color_bytes_for_level, color_for, ESC};
use crate::core::encoder::{
    ArrayEncoder, ArrayMarshaler, Encoder, ObjectEncoder, ObjectMarshaler, PrimitiveArrayEncoder,
};
use crate::core::encoder_config::EncoderConfig;
use crate::core::entry::Entry;
use crate::core::error::{LoggerError, Result};
use crate::core::field::Field;
use crate::core::level::Level;
use crate::core::mode::Mode;
use crate::core::pool::{Pool, Recycle};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

const ENCODER_POOL_CAPACITY: usize = 64;

static ENCODER_POOL: LazyLock<Pool<ConsoleEncoder>> =
    LazyLock::new(|| Pool::new(ENCODER_POOL_CAPACITY, ConsoleEncoder::blank));

static DEFAULT_CONFIG: LazyLock<Arc<EncoderConfig>> =
    LazyLock::new(|| Arc::new(EncoderConfig::default()));

/// Patch every color-start sequence in `bytes` to the color of `level`
///
/// Scans for `ESC [`; when the following byte is not `'0'` the two digits
/// after `[` are overwritten in place. Reset sequences (`ESC[0m`) and the
/// length of `bytes` are left untouched.
pub fn recolor(bytes: &mut [u8], level: Level) {
    let (tens, ones) = color_bytes_for_level(level);
    let len = bytes.len();
    let mut i = 0;
    while i < len {
        if bytes[i] == ESC && i + 1 < len && bytes[i + 1] == b'[' {
            if i + 3 < len && bytes[i + 2] != b'0' {
                bytes[i + 2] = tens;
                bytes[i + 3] = ones;
                i += 4;
                continue;
            }
            i += 2;
            continue;
        }
        i += 1;
    }
}

/// Console encoder
///
/// Instances come from a process-wide pool. [`ConsoleEncoder::release`]
/// resets an instance and hands it back.
#[derive(Debug)]
pub struct ConsoleEncoder {
    config: Option<Arc<EncoderConfig>>,
    buf: Option<Buffer>,
    level: Level,
    mode: Mode,
}

impl Recycle for ConsoleEncoder {
    fn recycle(&mut self) {
        self.config = None;
        self.buf = None;
        self.mode = Mode::Unset;
        self.level = Level::default();
    }
}

impl ConsoleEncoder {
    fn blank() -> Self {
        Self {
            config: None,
            buf: None,
            level: Level::default(),
            mode: Mode::Unset,
        }
    }

    /// Take a configured encoder from the pool
    pub fn new(config: Arc<EncoderConfig>, mode: Mode) -> Self {
        let mut enc = Self::acquire();
        enc.config = Some(config);
        enc.mode = mode;
        enc.buf = Some(buffer::get());
        enc
    }

    /// Take an unconfigured encoder from the pool
    pub fn acquire() -> Self {
        ENCODER_POOL.get()
    }

    /// Reset this encoder and return it to the pool
    pub fn release(self) {
        ENCODER_POOL.put(self);
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn set_level(&mut self, level: Level) {
        self.level = level;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn config(&self) -> Option<&Arc<EncoderConfig>> {
        self.config.as_ref()
    }

    /// Context rendered so far, if a buffer is attached
    pub fn buffer(&self) -> Option<&Buffer> {
        self.buf.as_ref()
    }

    #[inline]
    fn devmode(&self) -> bool {
        self.mode.is_development()
    }

    fn shared_config(&self) -> Arc<EncoderConfig> {
        match &self.config {
            Some(config) => Arc::clone(config),
            None => Arc::clone(&DEFAULT_CONFIG),
        }
    }

    #[inline]
    fn buf_mut(&mut self) -> &mut Buffer {
        self.buf.get_or_insert_with(buffer::get)
    }

    /// Same config and mode at `level`, with an empty buffer
    fn clone_at(&self, level: Level) -> Self {
        let mut clone = Self::acquire();
        clone.config = self.config.clone();
        clone.level = level;
        clone.mode = self.mode;
        clone.buf = Some(buffer::get());
        clone
    }

    /// Append `bytes`, recolored to this encoder's level in development mode
    pub fn write(&mut self, bytes: &[u8]) {
        let devmode = self.devmode();
        let level = self.level;
        let buf = self.buf_mut();
        let start = buf.len();
        buf.append_bytes(bytes);
        if devmode {
            recolor(&mut buf.as_mut_bytes()[start..], level);
        }
    }

    fn add_key(&mut self, key: &str) {
        let color = self.devmode().then(|| color_for(self.level));
        let buf = self.buf_mut();
        buf.append_byte(b' ');
        match color {
            Some(color) => color.write_to(buf, key),
            None => buf.append_str(key),
        }
        buf.append_byte(b'=');
    }
}

impl Clone for ConsoleEncoder {
    fn clone(&self) -> Self {
        let mut clone = self.clone_at(self.level);
        if let Some(buf) = &self.buf {
            clone.buf_mut().append_bytes(buf.as_bytes());
        }
        clone
    }
}

impl PrimitiveArrayEncoder for Buffer {
    fn append_bool(&mut self, value: bool) {
        Buffer::append_bool(self, value);
    }

    fn append_int(&mut self, value: i64) {
        Buffer::append_int(self, value);
    }

    fn append_uint(&mut self, value: u64) {
        Buffer::append_uint(self, value);
    }

    fn append_float(&mut self, value: f64) {
        Buffer::append_float(self, value);
    }

    fn append_string(&mut self, value: &str) {
        self.append_single_line(value);
    }

    fn append_byte_string(&mut self, value: &[u8]) {
        self.append_str(&String::from_utf8_lossy(value));
    }
}

impl ObjectEncoder for ConsoleEncoder {
    fn add_string(&mut self, key: &str, value: &str) {
        self.add_key(key);
        self.buf_mut().append_single_line(value);
    }

    fn add_bool(&mut self, key: &str, value: bool) {
        self.add_key(key);
        self.buf_mut().append_bool(value);
    }

    fn add_int(&mut self, key: &str, value: i64) {
        self.add_key(key);
        self.buf_mut().append_int(value);
    }

    fn add_uint(&mut self, key: &str, value: u64) {
        self.add_key(key);
        self.buf_mut().append_uint(value);
    }

    fn add_float(&mut self, key: &str, value: f64) {
        self.add_key(key);
        self.buf_mut().append_float(value);
    }

    fn add_duration(&mut self, key: &str, value: Duration) {
        self.add_key(key);
        let config = self.shared_config();
        config.encode_duration.encode(value, self.buf_mut());
    }

    fn add_time(&mut self, key: &str, value: DateTime<Utc>) {
        self.add_key(key);
        let config = self.shared_config();
        config.encode_time.encode(value, self.buf_mut());
    }

    fn add_binary(&mut self, key: &str, value: &[u8]) {
        self.add_key(key);
        self.buf_mut().append_str(&STANDARD.encode(value));
    }

    fn add_byte_string(&mut self, key: &str, value: &[u8]) {
        self.add_key(key);
        PrimitiveArrayEncoder::append_byte_string(self.buf_mut(), value);
    }

    fn add_object(&mut self, key: &str, value: &dyn ObjectMarshaler) -> Result<()> {
        self.add_key(key);
        let config = self.shared_config();
        write_object(self.buf_mut(), &config, value)
    }

    fn add_array(&mut self, key: &str, value: &dyn ArrayMarshaler) -> Result<()> {
        self.add_key(key);
        let config = self.shared_config();
        write_array(self.buf_mut(), &config, value)
    }

    fn add_reflected(&mut self, key: &str, value: &serde_json::Value) -> Result<()> {
        self.add_key(key);
        write_reflected(self.buf_mut(), value)
    }

    /// Console lines are flat; namespaces add nothing
    fn open_namespace(&mut self, _key: &str) {}
}

impl Encoder for ConsoleEncoder {
    fn clone_encoder(&self) -> Box<dyn Encoder> {
        Box::new(self.clone())
    }

    fn encode_entry(&self, entry: &Entry, fields: &[Field]) -> Result<Buffer> {
        let config = self.shared_config();
        let mut line = self.clone_at(entry.level);

        {
            let buf = line.buf_mut();
            config.encode_level.encode(entry.level, buf);
            buf.append_byte(b' ');
            if !config.time_key.is_empty() {
                buf.append_str(&config.time_key);
                buf.append_byte(b'=');
            }
            config.encode_time.encode(entry.time, buf);
        }

        if !entry.logger_name.is_empty() && !config.name_key.is_empty() {
            line.add_key(&config.name_key);
            let buf = line.buf_mut();
            let mark = buf.len();
            config.name_encoding().encode(&entry.logger_name, buf);
            if buf.len() == mark {
                buf.append_single_line(&entry.logger_name);
            }
        }

        if entry.caller.defined && !config.caller_key.is_empty() {
            line.add_key(&config.caller_key);
            let buf = line.buf_mut();
            let mark = buf.len();
            config.encode_caller.encode(&entry.caller, buf);
            if buf.len() == mark {
                buf.append_str(&entry.caller.to_string());
            }
        }

        if !config.message_key.is_empty() {
            line.add_key(&config.message_key);
            line.buf_mut().append_single_line(&entry.message);
        }

        for field in fields {
            field.add_to(&mut line);
        }

        if let Some(context) = self.buf.as_ref().filter(|buf| !buf.is_empty()) {
            line.buf_mut().append_bytes(context.as_bytes());
        }

        if line.devmode() {
            recolor(line.buf_mut().as_mut_bytes(), entry.level);
        }

        if !entry.stack.is_empty() && !config.stacktrace_key.is_empty() {
            line.add_key(&config.stacktrace_key);
            line.buf_mut().append_str(&entry.stack);
        }

        line.buf_mut().append_str(config.line_ending());

        let out = line.buf.take().unwrap_or_default();
        line.release();
        Ok(out)
    }
}

fn write_object(buf: &mut Buffer, config: &EncoderConfig, value: &dyn ObjectMarshaler) -> Result<()> {
    buf.append_byte(b'{');
    let result = {
        let mut nested = ObjectWriter {
            buf: &mut *buf,
            config,
            first: true,
        };
        value.marshal_object(&mut nested)
    };
    buf.append_byte(b'}');
    result
}

fn write_array(buf: &mut Buffer, config: &EncoderConfig, value: &dyn ArrayMarshaler) -> Result<()> {
    buf.append_byte(b'[');
    let result = {
        let mut nested = ArrayWriter {
            buf: &mut *buf,
            config,
            first: true,
        };
        value.marshal_array(&mut nested)
    };
    buf.append_byte(b']');
    result
}

fn write_reflected(buf: &mut Buffer, value: &serde_json::Value) -> Result<()> {
    serde_json::to_writer(buf, value).map_err(LoggerError::from)
}

/// Renders nested objects as `{a=1 b=2}`
struct ObjectWriter<'a> {
    buf: &'a mut Buffer,
    config: &'a EncoderConfig,
    first: bool,
}

impl ObjectWriter<'_> {
    fn key(&mut self, key: &str) {
        if !self.first {
            self.buf.append_byte(b' ');
        }
        self.first = false;
        self.buf.append_str(key);
        self.buf.append_byte(b'=');
    }
}

impl ObjectEncoder for ObjectWriter<'_> {
    fn add_string(&mut self, key: &str, value: &str) {
        self.key(key);
        self.buf.append_single_line(value);
    }

    fn add_bool(&mut self, key: &str, value: bool) {
        self.key(key);
        self.buf.append_bool(value);
    }

    fn add_int(&mut self, key: &str, value: i64) {
        self.key(key);
        self.buf.append_int(value);
    }

    fn add_uint(&mut self, key: &str, value: u64) {
        self.key(key);
        self.buf.append_uint(value);
    }

    fn add_float(&mut self, key: &str, value: f64) {
        self.key(key);
        self.buf.append_float(value);
    }

    fn add_duration(&mut self, key: &str, value: Duration) {
        self.key(key);
        self.config.encode_duration.encode(value, self.buf);
    }

    fn add_time(&mut self, key: &str, value: DateTime<Utc>) {
        self.key(key);
        self.config.encode_time.encode(value, self.buf);
    }

    fn add_binary(&mut self, key: &str, value: &[u8]) {
        self.key(key);
        self.buf.append_str(&STANDARD.encode(value));
    }

    fn add_byte_string(&mut self, key: &str, value: &[u8]) {
        self.key(key);
        PrimitiveArrayEncoder::append_byte_string(&mut *self.buf, value);
    }

    fn add_object(&mut self, key: &str, value: &dyn ObjectMarshaler) -> Result<()> {
        self.key(key);
        write_object(self.buf, self.config, value)
    }

    fn add_array(&mut self, key: &str, value: &dyn ArrayMarshaler) -> Result<()> {
        self.key(key);
        write_array(self.buf, self.config, value)
    }

    fn add_reflected(&mut self, key: &str, value: &serde_json::Value) -> Result<()> {
        self.key(key);
        write_reflected(self.buf, value)
    }

    fn open_namespace(&mut self, _key: &str) {}
}

/// Renders nested arrays as `[1,2,3]`
struct ArrayWriter<'a> {
    buf: &'a mut Buffer,
    config: &'a EncoderConfig,
    first: bool,
}

impl ArrayWriter<'_> {
    fn separate(&mut self) {
        if !self.first {
            self.buf.append_byte(b',');
        }
        self.first = false;
    }
}

impl PrimitiveArrayEncoder for ArrayWriter<'_> {
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
        self.buf.append_float(value);
    }

    fn append_string(&mut self, value: &str) {
        self.separate();
        self.buf.append_single_line(value);
    }

    fn append_byte_string(&mut self, value: &[u8]) {
        self.separate();
        PrimitiveArrayEncoder::append_byte_string(&mut *self.buf, value);
    }
}

impl ArrayEncoder for ArrayWriter<'_> {
    fn append_duration(&mut self, value: Duration) {
        self.separate();
        self.config.encode_duration.encode(value, self.buf);
    }

    fn append_time(&mut self, value: DateTime<Utc>) {
        self.separate();
        self.config.encode_time.encode(value, self.buf);
    }

    fn append_object(&mut self, value: &dyn ObjectMarshaler) -> Result<()> {
        self.separate();
        write_object(self.buf, self.config, value)
    }

    fn append_array(&mut self, value: &dyn ArrayMarshaler) -> Result<()> {
        self.separate();
        write_array(self.buf, self.config, value)
    }

    fn append_reflected(&mut self, value: &serde_json::Value) -> Result<()> {
        self.separate();
        write_reflected(self.buf, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::color::Color;
    use crate::core::encoder_config::{LevelEncoding, TimeEncoding};
    use crate::core::entry::Caller;
    use chrono::TimeZone;

    fn a_config() -> Arc<EncoderConfig> {
        EncoderConfig::new()
            .with_message_key("message")
            .with_level_key("level")
            .with_level_encoding(LevelEncoding::Capital)
            .with_time_encoding(TimeEncoding::Iso8601)
            .with_caller_key("caller")
            .shared()
    }

    fn b_config() -> Arc<EncoderConfig> {
        EncoderConfig::new()
            .with_message_key("@msg")
            .with_level_key("lvl")
            .with_name_key("name_key")
            .with_level_encoding(LevelEncoding::Lowercase)
            .with_time_encoding(TimeEncoding::Epoch)
            .with_caller_key("trace")
            .shared()
    }

    fn c_config() -> Arc<EncoderConfig> {
        EncoderConfig::new()
            .with_message_key("message")
            .with_name_key("name_key")
            .with_level_encoding(LevelEncoding::Lowercase)
            .with_time_key("@timestamp")
            .with_time_encoding(TimeEncoding::EpochMillis)
            .with_caller_key("trace")
            .shared()
    }

    fn entry_at(level: Level, name: &str, message: &str, file: &str) -> Entry {
        let time = Utc
            .with_ymd_and_hms(2020, 3, 22, 13, 42, 12)
            .single()
            .expect("valid datetime")
            + chrono::Duration::nanoseconds(8);
        Entry::new(level, message)
            .with_time(time)
            .with_name(name)
            .with_caller(Caller::new(file, 18))
            .with_stack("callstack...")
    }

    fn info_entry() -> Entry {
        entry_at(Level::Info, "test_log", "hello world, this is a log", "foo.go")
    }

    fn bike_entry(level: Level) -> Entry {
        entry_at(level, "hello_loggr", "excellent day for a bike ride", "buzz.go")
    }

    fn encode(config: Arc<EncoderConfig>, mode: Mode, entry: &Entry, fields: &[Field]) -> String {
        let enc = ConsoleEncoder::new(config, mode);
        let out = enc.encode_entry(entry, fields).expect("encode entry");
        out.to_string_lossy()
    }

    fn app_fields() -> Vec<Field> {
        vec![Field::string("application", "bol.kit"), Field::int("errcount", 230)]
    }

    fn host_fields() -> Vec<Field> {
        vec![
            Field::string("@source_host", "xavier-910"),
            Field::int("errcount", 122),
        ]
    }

    #[test]
    fn test_info_development() {
        let got = encode(a_config(), Mode::Development, &info_entry(), &app_fields());
        assert_eq!(
            got,
            "INFO 2020-03-22T13:42:12.000Z \x1b[36mcaller\x1b[0m=foo.go:18 \x1b[36mmessage\x1b[0m=hello world, this is a log \x1b[36mapplication\x1b[0m=bol.kit \x1b[36merrcount\x1b[0m=230\n"
        );
    }

    #[test]
    fn test_info_production() {
        let got = encode(a_config(), Mode::Production, &info_entry(), &app_fields());
        assert_eq!(
            got,
            "INFO 2020-03-22T13:42:12.000Z caller=foo.go:18 message=hello world, this is a log application=bol.kit errcount=230\n"
        );
    }

    #[test]
    fn test_debug_production_with_name() {
        let got = encode(
            b_config(),
            Mode::Production,
            &bike_entry(Level::Debug),
            &host_fields(),
        );
        assert_eq!(
            got,
            "debug 1584884532 name_key=hello_loggr trace=buzz.go:18 @msg=excellent day for a bike ride @source_host=xavier-910 errcount=122\n"
        );
    }

    #[test]
    fn test_warn_development() {
        let got = encode(
            a_config(),
            Mode::Development,
            &bike_entry(Level::Warn),
            &host_fields(),
        );
        assert_eq!(
            got,
            "WARN 2020-03-22T13:42:12.000Z \x1b[33mcaller\x1b[0m=buzz.go:18 \x1b[33mmessage\x1b[0m=excellent day for a bike ride \x1b[33m@source_host\x1b[0m=xavier-910 \x1b[33merrcount\x1b[0m=122\n"
        );
    }

    #[test]
    fn test_error_development_keeps_time_key_plain() {
        let got = encode(
            c_config(),
            Mode::Development,
            &bike_entry(Level::Error),
            &host_fields(),
        );
        assert_eq!(
            got,
            "error @timestamp=1584884532000 \x1b[31mname_key\x1b[0m=hello_loggr \x1b[31mtrace\x1b[0m=buzz.go:18 \x1b[31mmessage\x1b[0m=excellent day for a bike ride \x1b[31m@source_host\x1b[0m=xavier-910 \x1b[31merrcount\x1b[0m=122\n"
        );
    }

    #[test]
    fn test_error_production() {
        let got = encode(
            c_config(),
            Mode::Production,
            &bike_entry(Level::Error),
            &host_fields(),
        );
        assert_eq!(
            got,
            "error @timestamp=1584884532000 name_key=hello_loggr trace=buzz.go:18 message=excellent day for a bike ride @source_host=xavier-910 errcount=122\n"
        );
    }

    #[test]
    fn test_write_recolors_in_development() {
        let cases = [
            (Level::Debug, Color::Cyan, "35"),
            (Level::Info, Color::Red, "36"),
            (Level::Warn, Color::Cyan, "33"),
            (Level::Error, Color::Cyan, "31"),
        ];
        for (level, original, code) in cases {
            let mut enc = ConsoleEncoder::new(a_config(), Mode::Development);
            enc.set_level(level);
            let input = format!(
                "{}=dev {}=core-app {}=los.12314",
                original.add("env"),
                original.add("app"),
                original.add("host")
            );
            enc.write(input.as_bytes());

            let want = format!(
                "\x1b[{c}menv\x1b[0m=dev \x1b[{c}mapp\x1b[0m=core-app \x1b[{c}mhost\x1b[0m=los.12314",
                c = code
            );
            let got = enc.buffer().expect("buffer attached").to_string_lossy();
            assert_eq!(got, want);
            enc.release();
        }
    }

    #[test]
    fn test_write_leaves_production_untouched() {
        let mut enc = ConsoleEncoder::new(a_config(), Mode::Production);
        let input = format!("{}=dev", Color::Cyan.add("env"));
        enc.write(input.as_bytes());
        assert_eq!(
            enc.buffer().expect("buffer attached").to_string_lossy(),
            input
        );
    }

    #[test]
    fn test_recolor_bounds() {
        let mut truncated = vec![ESC, b'[', b'3'];
        recolor(&mut truncated, Level::Debug);
        assert_eq!(truncated, vec![ESC, b'[', b'3']);

        let mut lone = vec![b'a', ESC];
        recolor(&mut lone, Level::Debug);
        assert_eq!(lone, vec![b'a', ESC]);

        let mut reset = RESET_BYTES.to_vec();
        recolor(&mut reset, Level::Warn);
        assert_eq!(reset, RESET_BYTES);
    }

    const RESET_BYTES: &[u8] = b"\x1b[0m";

    #[test]
    fn test_context_is_recolored_after_fields() {
        let mut enc = ConsoleEncoder::new(a_config(), Mode::Development);
        enc.add_string("env", "dev");
        let entry = bike_entry(Level::Error);
        let out = enc
            .encode_entry(&entry, &[Field::int("errcount", 1)])
            .expect("encode entry")
            .to_string_lossy();
        assert!(out.ends_with(
            "\x1b[31merrcount\x1b[0m=1 \x1b[31menv\x1b[0m=dev\n"
        ));
        // the parent keeps its own rendering
        assert_eq!(
            enc.buffer().expect("buffer attached").to_string_lossy(),
            " \x1b[36menv\x1b[0m=dev"
        );
    }

    #[test]
    fn test_stacktrace_and_line_ending() {
        let config = EncoderConfig::production_console()
            .with_line_ending("\r\n")
            .shared();
        let out = encode(config, Mode::Production, &info_entry(), &[]);
        assert_eq!(
            out,
            "INFO 2020-03-22T13:42:12.000Z caller=foo.go:18 message=hello world, this is a log stacktrace=callstack...\r\n"
        );
    }

    #[test]
    fn test_control_characters_stay_on_one_line() {
        let config = EncoderConfig::production_console()
            .with_name_key("logger")
            .shared();
        let entry = entry_at(Level::Warn, "svc\nFAKE", "User login\nERROR forged\r\tx", "foo.go")
            .with_stack("frame 0\nframe 1");
        let out = encode(
            config,
            Mode::Production,
            &entry,
            &[Field::string("user", "ann\nINFO forged")],
        );
        assert_eq!(
            out,
            "WARN 2020-03-22T13:42:12.000Z logger=svc\\nFAKE caller=foo.go:18 message=User login\\nERROR forged\\r\\tx user=ann\\nINFO forged stacktrace=frame 0\nframe 1\n"
        );
    }

    #[test]
    fn test_empty_keys_omit_segments() {
        let config = EncoderConfig::new().shared();
        let out = encode(config, Mode::Production, &info_entry(), &app_fields());
        assert_eq!(
            out,
            "INFO 2020-03-22T13:42:12.000Z application=bol.kit errcount=230\n"
        );
    }

    #[test]
    fn test_nested_values() {
        let fields = vec![
            Field::object(
                "req",
                vec![
                    Field::string("method", "GET"),
                    Field::array("ids", vec![1i64, 2, 3]),
                ],
            ),
            Field::binary("raw", b"hi".to_vec()),
            Field::any("tags", &["a", "b"]),
            Field::duration("took", Duration::from_millis(1500)),
            Field::namespace("ignored"),
            Field::bool("ok", true),
        ];
        let out = encode(a_config(), Mode::Production, &info_entry(), &fields);
        assert!(out.ends_with(
            " req={method=GET ids=[1,2,3]} raw=aGk= tags=[\"a\",\"b\"] took=1.5 ok=true\n"
        ));
    }

    #[test]
    fn test_clone_copies_context() {
        let mut enc = ConsoleEncoder::new(a_config(), Mode::Development);
        enc.add_string("message", "ik denk we hebben een kleine problem");
        let clone = enc.clone();
        assert_eq!(clone.level(), enc.level());
        assert_eq!(clone.mode(), Mode::Development);
        assert_eq!(
            clone.buffer().map(|b| b.to_string_lossy()),
            enc.buffer().map(|b| b.to_string_lossy())
        );
        assert!(Arc::ptr_eq(
            clone.config().expect("config"),
            enc.config().expect("config")
        ));
    }

    #[test]
    fn test_release_resets_state() {
        let mut enc = ConsoleEncoder::new(a_config(), Mode::Development);
        enc.set_level(Level::Fatal);
        enc.release();

        let reused = ConsoleEncoder::acquire();
        assert!(reused.buffer().is_none());
        assert!(reused.config().is_none());
        assert_eq!(reused.mode(), Mode::Unset);
        assert_eq!(reused.level(), Level::Info);
    }

    #[test]
    fn test_unconfigured_encoder_still_encodes() {
        let enc = ConsoleEncoder::acquire();
        let out = enc
            .encode_entry(&info_entry(), &[])
            .expect("encode entry")
            .to_string_lossy();
        assert_eq!(out, "INFO 2020-03-22T13:42:12.000Z\n");
    }
}
