//! Pooled, growable byte buffers
//!
//! Encoders write every entry into a [`Buffer`]. Dropping a pooled buffer
//! hands its allocation back to the pool it came from, so steady-state
//! logging does not allocate per entry.

use super::pool::Pool;
use std::fmt;
use std::io;
use std::ops::Deref;
use std::sync::{Arc, LazyLock};

/// Initial capacity of a freshly allocated buffer
pub const DEFAULT_BUFFER_CAPACITY: usize = 1024;

/// Idle buffers retained by the process-wide pool
pub const DEFAULT_POOL_CAPACITY: usize = 256;

static BUFFER_POOL: LazyLock<BufferPool> =
    LazyLock::new(|| BufferPool::new(DEFAULT_POOL_CAPACITY));

/// Acquire a buffer from the process-wide pool
#[inline]
pub fn get() -> Buffer {
    BUFFER_POOL.get()
}

/// The process-wide buffer pool
pub fn global() -> &'static BufferPool {
    &BUFFER_POOL
}

/// A pool of reusable byte buffers
#[derive(Clone, Debug)]
pub struct BufferPool {
    inner: Arc<Pool<Vec<u8>>>,
}

impl BufferPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Pool::new(capacity, || {
                Vec::with_capacity(DEFAULT_BUFFER_CAPACITY)
            })),
        }
    }

    /// Acquire an empty buffer that returns here when dropped
    pub fn get(&self) -> Buffer {
        Buffer {
            bytes: self.inner.get(),
            pool: Some(Arc::clone(&self.inner)),
        }
    }

    /// Number of idle buffers waiting for reuse
    pub fn idle(&self) -> usize {
        self.inner.idle()
    }
}

/// A growable byte buffer, optionally tied to a [`BufferPool`]
pub struct Buffer {
    bytes: Vec<u8>,
    pool: Option<Arc<Pool<Vec<u8>>>>,
}

impl Buffer {
    /// Create a buffer that is not tied to any pool
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            pool: None,
        }
    }

    #[inline]
    pub fn append_byte(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    #[inline]
    pub fn append_str(&mut self, s: &str) {
        self.bytes.extend_from_slice(s.as_bytes());
    }

    /// Append `s` with newlines, carriage returns and tabs escaped, so the
    /// text stays on one line
    pub fn append_single_line(&mut self, s: &str) {
        for chunk in s.split_inclusive(['\n', '\r', '\t']) {
            let (text, escape) = match chunk.as_bytes().last() {
                Some(b'\n') => (&chunk[..chunk.len() - 1], "\\n"),
                Some(b'\r') => (&chunk[..chunk.len() - 1], "\\r"),
                Some(b'\t') => (&chunk[..chunk.len() - 1], "\\t"),
                _ => (chunk, ""),
            };
            self.append_str(text);
            self.append_str(escape);
        }
    }

    #[inline]
    pub fn append_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    pub fn append_int(&mut self, value: i64) {
        let _ = io::Write::write_fmt(&mut self.bytes, format_args!("{}", value));
    }

    pub fn append_uint(&mut self, value: u64) {
        let _ = io::Write::write_fmt(&mut self.bytes, format_args!("{}", value));
    }

    /// Shortest decimal form without exponent; infinities as `+Inf`/`-Inf`
    pub fn append_float(&mut self, value: f64) {
        if value.is_infinite() {
            self.append_str(if value > 0.0 { "+Inf" } else { "-Inf" });
        } else {
            let _ = io::Write::write_fmt(&mut self.bytes, format_args!("{}", value));
        }
    }

    pub fn append_bool(&mut self, value: bool) {
        self.append_str(if value { "true" } else { "false" });
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    #[inline]
    pub fn last(&self) -> Option<u8> {
        self.bytes.last().copied()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Lossy UTF-8 view, for tests and diagnostics
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    pub fn truncate(&mut self, len: usize) {
        self.bytes.truncate(len);
    }

    pub fn reset(&mut self) {
        self.bytes.clear();
    }

    pub fn is_pooled(&self) -> bool {
        self.pool.is_some()
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Buffer {
    fn clone(&self) -> Self {
        let mut copy = match &self.pool {
            Some(pool) => Buffer {
                bytes: pool.get(),
                pool: Some(Arc::clone(pool)),
            },
            None => Buffer::new(),
        };
        copy.append_bytes(&self.bytes);
        copy
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.put(std::mem::take(&mut self.bytes));
        }
    }
}

impl Deref for Buffer {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.bytes
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Write for Buffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append_str(s);
        Ok(())
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("bytes", &String::from_utf8_lossy(&self.bytes))
            .field("pooled", &self.pool.is_some())
            .finish()
    }
}
