//! Sink trait: the destination of encoded entries

use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// Receives fully encoded entries
///
/// Implementations must be safe to call from many threads; each call to
/// [`Sink::write`] carries exactly one encoded entry.
pub trait Sink: Send + Sync {
    fn write(&self, bytes: &[u8]) -> io::Result<usize>;

    /// Flush anything buffered
    fn sync(&self) -> io::Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}

pub type SharedSink = Arc<dyn Sink>;

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn write(&self, bytes: &[u8]) -> io::Result<usize> {
        (**self).write(bytes)
    }

    fn sync(&self) -> io::Result<()> {
        (**self).sync()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Adapts any [`Write`] into a [`Sink`], serializing writes with a lock
pub struct WriterSink<W> {
    name: String,
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(name: impl Into<String>, writer: W) -> Self {
        Self {
            name: name.into(),
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn write(&self, bytes: &[u8]) -> io::Result<usize> {
        self.writer.lock().write_all(bytes)?;
        Ok(bytes.len())
    }

    fn sync(&self) -> io::Result<()> {
        self.writer.lock().flush()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<W> std::fmt::Debug for WriterSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriterSink")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_sink_writes_whole_entries() {
        let sink = WriterSink::new("vec", Vec::new());
        assert_eq!(sink.write(b"one\n").expect("write"), 4);
        assert_eq!(sink.write(b"two\n").expect("write"), 4);
        sink.sync().expect("sync");
        assert_eq!(sink.name(), "vec");
        assert_eq!(sink.into_inner(), b"one\ntwo\n");
    }

    #[test]
    fn test_shared_sink_delegates() {
        let sink: SharedSink = Arc::new(WriterSink::new("shared", Vec::new()));
        let alias = Arc::clone(&sink);
        alias.write(b"x").expect("write");
        assert_eq!(Sink::name(&alias), "shared");
    }
}
