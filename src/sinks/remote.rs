//! Remote list sink: pushes each encoded entry onto a Redis-style list
//!
//! The sink checks out one pooled connection per write, issues a single
//! `RPUSH key payload`, and always hands the connection back to the pool,
//! whether the command succeeded or not.

use crate::core::error::{LoggerError, Result};
use crate::core::sink::Sink;
use parking_lot::Mutex;
use std::io::{self, BufRead, BufReader, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Default I/O timeout for pooled TCP connections
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of idle connections kept for reuse
pub const DEFAULT_MAX_IDLE: usize = 4;

/// One connection able to push onto a remote list
pub trait Connection: Send {
    /// Append `payload` to the list at `key`, returning the new list length
    fn rpush(&mut self, key: &str, payload: &[u8]) -> Result<i64>;

    /// Whether the connection can go back into the pool
    fn is_reusable(&self) -> bool {
        true
    }
}

/// Source of connections
///
/// After [`ConnectionPool::close`], `get` must fail.
pub trait ConnectionPool: Send + Sync {
    type Conn: Connection;

    fn get(&self) -> Result<Self::Conn>;

    fn put(&self, conn: Self::Conn);

    fn close(&self) -> Result<()>;
}

/// Returns the connection to its pool when dropped
struct Checkout<'a, P: ConnectionPool> {
    pool: &'a P,
    conn: Option<P::Conn>,
}

impl<'a, P: ConnectionPool> Checkout<'a, P> {
    fn new(pool: &'a P) -> Result<Self> {
        let conn = pool.get()?;
        Ok(Self {
            pool,
            conn: Some(conn),
        })
    }

    fn conn(&mut self) -> Result<&mut P::Conn> {
        self.conn
            .as_mut()
            .ok_or_else(|| LoggerError::remote("connection already returned"))
    }
}

impl<P: ConnectionPool> Drop for Checkout<'_, P> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.put(conn);
        }
    }
}

/// Sink that pushes every entry onto the list named `key`
pub struct RemoteSink<P: ConnectionPool> {
    pool: P,
    key: String,
    name: String,
}

impl<P: ConnectionPool> RemoteSink<P> {
    pub fn new(key: impl Into<String>, pool: P) -> Self {
        let key = key.into();
        let name = format!("remote:{}", key);
        Self { pool, key, name }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// Close the underlying pool; later writes fail
    pub fn close(&self) -> Result<()> {
        self.pool.close()
    }

    fn push(&self, payload: &[u8]) -> Result<()> {
        let mut checkout = Checkout::new(&self.pool)?;
        checkout.conn()?.rpush(&self.key, payload)?;
        Ok(())
    }
}

impl<P: ConnectionPool> Sink for RemoteSink<P> {
    fn write(&self, bytes: &[u8]) -> io::Result<usize> {
        self.push(bytes).map_err(io::Error::other)?;
        Ok(bytes.len())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<P: ConnectionPool> std::fmt::Debug for RemoteSink<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSink")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Frame a command in the Redis serialization protocol
pub fn encode_command(args: &[&[u8]]) -> Vec<u8> {
    let body: usize = args.iter().map(|arg| arg.len() + 16).sum();
    let mut out = Vec::with_capacity(body + 16);
    out.extend_from_slice(format!("*{}\r\n", args.len()).as_bytes());
    for arg in args {
        out.extend_from_slice(format!("${}\r\n", arg.len()).as_bytes());
        out.extend_from_slice(arg);
        out.extend_from_slice(b"\r\n");
    }
    out
}

/// Interpret a single-line reply
fn parse_reply(line: &str) -> Result<i64> {
    let line = line.trim_end_matches(['\r', '\n']);
    match line.as_bytes().first() {
        Some(b':') => line[1..]
            .parse::<i64>()
            .map_err(|e| LoggerError::remote(format!("invalid integer reply {:?}: {}", line, e))),
        Some(b'+') => Ok(0),
        Some(b'-') => Err(LoggerError::remote(line[1..].to_string())),
        _ => Err(LoggerError::remote(format!("unexpected reply {:?}", line))),
    }
}

/// A plain TCP connection speaking RESP
pub struct TcpConnection {
    reader: BufReader<TcpStream>,
    broken: bool,
}

impl TcpConnection {
    pub fn connect(address: &str, timeout: Duration) -> Result<Self> {
        let stream = TcpStream::connect(address)?;

        // Set timeouts to prevent hanging
        stream.set_write_timeout(Some(timeout))?;
        stream.set_read_timeout(Some(timeout))?;

        // One small command per entry; don't wait for Nagle
        stream.set_nodelay(true)?;

        Ok(Self {
            reader: BufReader::new(stream),
            broken: false,
        })
    }

    fn round_trip(&mut self, command: &[u8]) -> Result<String> {
        self.reader.get_mut().write_all(command)?;
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(LoggerError::remote("connection closed by server"));
        }
        Ok(line)
    }
}

impl Connection for TcpConnection {
    fn rpush(&mut self, key: &str, payload: &[u8]) -> Result<i64> {
        let command = encode_command(&[b"RPUSH", key.as_bytes(), payload]);
        let line = match self.round_trip(&command) {
            Ok(line) => line,
            Err(err) => {
                self.broken = true;
                return Err(err);
            }
        };
        // Only a `-ERR` reply leaves the stream in sync.
        let reply = parse_reply(&line);
        if reply.is_err() && !line.starts_with('-') {
            self.broken = true;
        }
        reply
    }

    fn is_reusable(&self) -> bool {
        !self.broken
    }
}

impl std::fmt::Debug for TcpConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpConnection")
            .field("peer", &self.reader.get_ref().peer_addr().ok())
            .field("broken", &self.broken)
            .finish()
    }
}

/// Dials connections on demand and keeps a few idle ones for reuse
pub struct TcpConnectionPool {
    address: String,
    timeout: Duration,
    max_idle: usize,
    idle: Mutex<Vec<TcpConnection>>,
    closed: AtomicBool,
}

impl TcpConnectionPool {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            timeout: DEFAULT_TIMEOUT,
            max_idle: DEFAULT_MAX_IDLE,
            idle: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_idle(mut self, max_idle: usize) -> Self {
        self.max_idle = max_idle;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl ConnectionPool for TcpConnectionPool {
    type Conn = TcpConnection;

    fn get(&self) -> Result<TcpConnection> {
        if self.is_closed() {
            return Err(LoggerError::remote(format!(
                "connection pool for {} is closed",
                self.address
            )));
        }
        if let Some(conn) = self.idle.lock().pop() {
            return Ok(conn);
        }
        TcpConnection::connect(&self.address, self.timeout)
    }

    fn put(&self, conn: TcpConnection) {
        if self.is_closed() || !conn.is_reusable() {
            return;
        }
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(conn);
        }
    }

    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        self.idle.lock().clear();
        Ok(())
    }
}

impl std::fmt::Debug for TcpConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpConnectionPool")
            .field("address", &self.address)
            .field("timeout", &self.timeout)
            .field("max_idle", &self.max_idle)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
