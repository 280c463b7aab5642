//! Typed key/value fields attached to log calls

use super::encoder::{ArrayMarshaler, ObjectEncoder, ObjectMarshaler};
use super::error::LoggerError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Value type for structured logging fields
#[derive(Clone)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Duration(Duration),
    Time(DateTime<Utc>),
    /// Opaque bytes; text encoders render them as base64
    Binary(Vec<u8>),
    /// UTF-8 text held as bytes
    ByteString(Vec<u8>),
    Object(Arc<dyn ObjectMarshaler>),
    Array(Arc<dyn ArrayMarshaler>),
    Reflected(serde_json::Value),
    Namespace,
    Skip,
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => f.debug_tuple("String").field(s).finish(),
            FieldValue::Int(i) => f.debug_tuple("Int").field(i).finish(),
            FieldValue::Uint(u) => f.debug_tuple("Uint").field(u).finish(),
            FieldValue::Float(fl) => f.debug_tuple("Float").field(fl).finish(),
            FieldValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            FieldValue::Duration(d) => f.debug_tuple("Duration").field(d).finish(),
            FieldValue::Time(t) => f.debug_tuple("Time").field(t).finish(),
            FieldValue::Binary(b) => f.debug_tuple("Binary").field(&b.len()).finish(),
            FieldValue::ByteString(b) => f
                .debug_tuple("ByteString")
                .field(&String::from_utf8_lossy(b))
                .finish(),
            FieldValue::Object(_) => f.write_str("Object(..)"),
            FieldValue::Array(_) => f.write_str("Array(..)"),
            FieldValue::Reflected(v) => f.debug_tuple("Reflected").field(v).finish(),
            FieldValue::Namespace => f.write_str("Namespace"),
            FieldValue::Skip => f.write_str("Skip"),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<u64> for FieldValue {
    fn from(u: u64) -> Self {
        FieldValue::Uint(u)
    }
}

impl From<u32> for FieldValue {
    fn from(u: u32) -> Self {
        FieldValue::Uint(u as u64)
    }
}

impl From<usize> for FieldValue {
    fn from(u: usize) -> Self {
        FieldValue::Uint(u as u64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<Duration> for FieldValue {
    fn from(d: Duration) -> Self {
        FieldValue::Duration(d)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(t: DateTime<Utc>) -> Self {
        FieldValue::Time(t)
    }
}

/// One key/value pair attached to a log call
#[derive(Debug, Clone)]
pub struct Field {
    pub key: Cow<'static, str>,
    pub value: FieldValue,
}

impl Field {
    pub fn new(key: impl Into<Cow<'static, str>>, value: impl Into<FieldValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn string(key: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self {
        Self::new(key, FieldValue::String(value.into()))
    }

    pub fn int(key: impl Into<Cow<'static, str>>, value: i64) -> Self {
        Self::new(key, FieldValue::Int(value))
    }

    pub fn uint(key: impl Into<Cow<'static, str>>, value: u64) -> Self {
        Self::new(key, FieldValue::Uint(value))
    }

    pub fn float(key: impl Into<Cow<'static, str>>, value: f64) -> Self {
        Self::new(key, FieldValue::Float(value))
    }

    pub fn bool(key: impl Into<Cow<'static, str>>, value: bool) -> Self {
        Self::new(key, FieldValue::Bool(value))
    }

    pub fn duration(key: impl Into<Cow<'static, str>>, value: Duration) -> Self {
        Self::new(key, FieldValue::Duration(value))
    }

    pub fn time(key: impl Into<Cow<'static, str>>, value: DateTime<Utc>) -> Self {
        Self::new(key, FieldValue::Time(value))
    }

    pub fn binary(key: impl Into<Cow<'static, str>>, value: impl Into<Vec<u8>>) -> Self {
        Self::new(key, FieldValue::Binary(value.into()))
    }

    pub fn byte_string(key: impl Into<Cow<'static, str>>, value: impl Into<Vec<u8>>) -> Self {
        Self::new(key, FieldValue::ByteString(value.into()))
    }

    pub fn object<M>(key: impl Into<Cow<'static, str>>, value: M) -> Self
    where
        M: ObjectMarshaler + 'static,
    {
        Self::new(key, FieldValue::Object(Arc::new(value)))
    }

    pub fn array<M>(key: impl Into<Cow<'static, str>>, value: M) -> Self
    where
        M: ArrayMarshaler + 'static,
    {
        Self::new(key, FieldValue::Array(Arc::new(value)))
    }

    /// Serialize any value through serde
    ///
    /// A value that fails to serialize becomes a `<key>Error` string field.
    pub fn any<T: Serialize + ?Sized>(key: impl Into<Cow<'static, str>>, value: &T) -> Self {
        let key = key.into();
        match serde_json::to_value(value) {
            Ok(value) => Self::new(key, FieldValue::Reflected(value)),
            Err(err) => Self::string(format!("{}Error", key), err.to_string()),
        }
    }

    /// An `error` field holding the error's message
    pub fn error(err: &dyn std::error::Error) -> Self {
        Self::string("error", err.to_string())
    }

    /// Open a namespace: following fields nest under `key`
    pub fn namespace(key: impl Into<Cow<'static, str>>) -> Self {
        Self::new(key, FieldValue::Namespace)
    }

    /// A field that encodes to nothing
    pub fn skip() -> Self {
        Self::new("", FieldValue::Skip)
    }

    /// Add this field to `enc`
    ///
    /// Marshaling failures never abort the entry: they are recorded as a
    /// `<key>Error` string field next to whatever was already written.
    pub fn add_to<E: ObjectEncoder + ?Sized>(&self, enc: &mut E) {
        let key = self.key.as_ref();
        let result = match &self.value {
            FieldValue::String(s) => {
                enc.add_string(key, s);
                Ok(())
            }
            FieldValue::Int(i) => {
                enc.add_int(key, *i);
                Ok(())
            }
            FieldValue::Uint(u) => {
                enc.add_uint(key, *u);
                Ok(())
            }
            FieldValue::Float(f) => {
                enc.add_float(key, *f);
                Ok(())
            }
            FieldValue::Bool(b) => {
                enc.add_bool(key, *b);
                Ok(())
            }
            FieldValue::Duration(d) => {
                enc.add_duration(key, *d);
                Ok(())
            }
            FieldValue::Time(t) => {
                enc.add_time(key, *t);
                Ok(())
            }
            FieldValue::Binary(b) => {
                enc.add_binary(key, b);
                Ok(())
            }
            FieldValue::ByteString(b) => {
                enc.add_byte_string(key, b);
                Ok(())
            }
            FieldValue::Object(m) => enc.add_object(key, m.as_ref()),
            FieldValue::Array(m) => enc.add_array(key, m.as_ref()),
            FieldValue::Reflected(v) => enc.add_reflected(key, v),
            FieldValue::Namespace => {
                enc.open_namespace(key);
                Ok(())
            }
            FieldValue::Skip => Ok(()),
        };

        if let Err(err) = result {
            let message = match err {
                LoggerError::FieldEncoding { message, .. } => message,
                other => other.to_string(),
            };
            enc.add_string(&format!("{}Error", key), &message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Result;

    /// Records every call as `key:value`
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl ObjectEncoder for Recorder {
        fn add_string(&mut self, key: &str, value: &str) {
            self.calls.push(format!("{}:{}", key, value));
        }
        fn add_bool(&mut self, key: &str, value: bool) {
            self.calls.push(format!("{}:{}", key, value));
        }
        fn add_int(&mut self, key: &str, value: i64) {
            self.calls.push(format!("{}:{}", key, value));
        }
        fn add_uint(&mut self, key: &str, value: u64) {
            self.calls.push(format!("{}:{}", key, value));
        }
        fn add_float(&mut self, key: &str, value: f64) {
            self.calls.push(format!("{}:{}", key, value));
        }
        fn add_duration(&mut self, key: &str, value: Duration) {
            self.calls.push(format!("{}:{:?}", key, value));
        }
        fn add_time(&mut self, key: &str, value: DateTime<Utc>) {
            self.calls.push(format!("{}:{}", key, value.timestamp()));
        }
        fn add_binary(&mut self, key: &str, value: &[u8]) {
            self.calls.push(format!("{}:{} bytes", key, value.len()));
        }
        fn add_byte_string(&mut self, key: &str, value: &[u8]) {
            self.calls
                .push(format!("{}:{}", key, String::from_utf8_lossy(value)));
        }
        fn add_object(&mut self, key: &str, value: &dyn ObjectMarshaler) -> Result<()> {
            self.calls.push(format!("{}:{{", key));
            let result = value.marshal_object(self);
            self.calls.push("}".to_string());
            result
        }
        fn add_array(&mut self, key: &str, _value: &dyn ArrayMarshaler) -> Result<()> {
            self.calls.push(format!("{}:[]", key));
            Ok(())
        }
        fn add_reflected(&mut self, key: &str, value: &serde_json::Value) -> Result<()> {
            self.calls.push(format!("{}:{}", key, value));
            Ok(())
        }
        fn open_namespace(&mut self, key: &str) {
            self.calls.push(format!("ns:{}", key));
        }
    }

    struct Broken;

    impl ObjectMarshaler for Broken {
        fn marshal_object(&self, enc: &mut dyn ObjectEncoder) -> Result<()> {
            enc.add_string("partial", "yes");
            Err(LoggerError::field_encoding("payload", "cannot marshal"))
        }
    }

    #[test]
    fn test_add_to_dispatches_by_type() {
        let fields = vec![
            Field::new("app", "bol.kit"),
            Field::new("errcount", 230),
            Field::new("ratio", 0.5),
            Field::new("ok", true),
            Field::new("size", 12usize),
            Field::namespace("@fields"),
            Field::skip(),
        ];
        let mut rec = Recorder::default();
        for field in &fields {
            field.add_to(&mut rec);
        }
        assert_eq!(
            rec.calls,
            vec![
                "app:bol.kit",
                "errcount:230",
                "ratio:0.5",
                "ok:true",
                "size:12",
                "ns:@fields"
            ]
        );
    }

    #[test]
    fn test_nested_fields_object() {
        let field = Field::object("req", vec![Field::string("method", "GET")]);
        let mut rec = Recorder::default();
        field.add_to(&mut rec);
        assert_eq!(rec.calls, vec!["req:{", "method:GET", "}"]);
    }

    #[test]
    fn test_marshal_failure_becomes_error_field() {
        let field = Field::object("payload", Broken);
        let mut rec = Recorder::default();
        field.add_to(&mut rec);
        assert_eq!(
            rec.calls,
            vec!["payload:{", "partial:yes", "}", "payloadError:cannot marshal"]
        );
    }

    #[test]
    fn test_any_serializes_through_serde() {
        #[derive(Serialize)]
        struct Point {
            x: i32,
            y: i32,
        }

        let field = Field::any("point", &Point { x: 1, y: 2 });
        assert!(matches!(field.value, FieldValue::Reflected(_)));

        let mut rec = Recorder::default();
        field.add_to(&mut rec);
        assert_eq!(rec.calls, vec![r#"point:{"x":1,"y":2}"#]);
    }

    #[test]
    fn test_any_failure_becomes_error_field() {
        use std::collections::HashMap;

        // Non-string map keys cannot become JSON object keys.
        let mut bad = HashMap::new();
        bad.insert(vec![1u8], 1);
        let field = Field::any("lookup", &bad);
        assert_eq!(field.key, "lookupError");
        assert!(matches!(field.value, FieldValue::String(_)));
    }

    #[test]
    fn test_error_field() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let field = Field::error(&io_err);
        assert_eq!(field.key, "error");
        assert!(matches!(field.value, FieldValue::String(ref s) if s == "disk full"));
    }
}
