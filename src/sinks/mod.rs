//! Sink implementations

pub mod console;
pub mod memory;

#[cfg(feature = "file")]
pub mod file;

#[cfg(feature = "remote")]
pub mod remote;

pub use console::ConsoleSink;
pub use memory::MemorySink;

#[cfg(feature = "file")]
pub use file::FileSink;

#[cfg(feature = "remote")]
pub use remote::{Connection, ConnectionPool, RemoteSink, TcpConnection, TcpConnectionPool};

pub use crate::core::sink::{SharedSink, Sink, WriterSink};
