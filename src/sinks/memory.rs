//! In-memory sink for capturing output

use crate::core::sink::Sink;
use parking_lot::Mutex;
use std::io;

/// Keeps every written byte in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    bytes: Mutex<Vec<u8>>,
    writes: Mutex<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    /// Non-empty lines, without their terminators
    pub fn lines(&self) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Number of `write` calls, one per entry
    pub fn write_count(&self) -> usize {
        *self.writes.lock()
    }

    pub fn clear(&self) {
        self.bytes.lock().clear();
        *self.writes.lock() = 0;
    }
}

impl Sink for MemorySink {
    fn write(&self, bytes: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(bytes);
        *self.writes.lock() += 1;
        Ok(bytes.len())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_and_clear() {
        let sink = MemorySink::new();
        sink.write(b"first\n").expect("write");
        sink.write(b"second\n\n").expect("write");

        assert_eq!(sink.lines(), vec!["first", "second"]);
        assert_eq!(sink.write_count(), 2);
        assert_eq!(sink.contents(), "first\nsecond\n\n");

        sink.clear();
        assert!(sink.contents().is_empty());
        assert_eq!(sink.write_count(), 0);
    }
}
