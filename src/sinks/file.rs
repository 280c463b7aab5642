//! Append-only file sink

use crate::core::error::Result;
use crate::core::sink::Sink;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Buffered writes to a file opened in append mode
///
/// Buffered bytes reach the file on [`Sink::sync`] and when the sink is
/// dropped.
pub struct FileSink {
    path: PathBuf,
    name: String,
    writer: Mutex<BufWriter<File>>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let name = format!("file:{}", path.display());

        Ok(Self {
            path,
            name,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
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

impl Drop for FileSink {
    fn drop(&mut self) {
        if let Err(e) = self.writer.get_mut().flush() {
            eprintln!("[LOGGER ERROR] Failed to flush {}: {}", self.name, e);
        }
    }
}

impl std::fmt::Debug for FileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSink")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
