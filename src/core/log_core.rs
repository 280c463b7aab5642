//! Cores: the pairing of an encoder, a sink and a level gate

use super::encoder::Encoder;
use super::entry::Entry;
use super::error::{LoggerError, Result};
use super::field::Field;
use super::level::{Level, LevelEnabler};
use super::sink::SharedSink;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Where a logger hands its entries
pub trait Core: Send + Sync {
    fn enabled(&self, level: Level) -> bool;

    /// A child core whose encoder already carries `fields`
    fn with(&self, fields: &[Field]) -> Box<dyn Core>;

    /// Encode and deliver one entry; callers check [`Core::enabled`] first
    fn write(&self, entry: &Entry, fields: &[Field]) -> Result<()>;

    fn sync(&self) -> Result<()>;
}

/// Encodes entries and writes each one to a single sink
pub struct IoCore {
    encoder: Box<dyn Encoder>,
    sink: SharedSink,
    enabler: Arc<dyn LevelEnabler>,
}

impl IoCore {
    pub fn new(encoder: Box<dyn Encoder>, sink: SharedSink, enabler: Arc<dyn LevelEnabler>) -> Self {
        Self {
            encoder,
            sink,
            enabler,
        }
    }

    pub fn sink(&self) -> &SharedSink {
        &self.sink
    }
}

impl std::fmt::Debug for IoCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IoCore")
            .field("sink", &self.sink.name())
            .finish_non_exhaustive()
    }
}

impl Core for IoCore {
    fn enabled(&self, level: Level) -> bool {
        self.enabler.enabled(level)
    }

    fn with(&self, fields: &[Field]) -> Box<dyn Core> {
        let mut encoder = self.encoder.clone_encoder();
        for field in fields {
            field.add_to(encoder.as_mut());
        }
        Box::new(IoCore {
            encoder,
            sink: Arc::clone(&self.sink),
            enabler: Arc::clone(&self.enabler),
        })
    }

    fn write(&self, entry: &Entry, fields: &[Field]) -> Result<()> {
        let buf = self.encoder.encode_entry(entry, fields)?;
        self.sink
            .write(buf.as_bytes())
            .map_err(|e| LoggerError::sink_write(self.sink.name(), e))?;
        if entry.level > Level::Error {
            // Flush so nothing is lost if the process goes down right after.
            let _ = self.sink.sync();
        }
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        self.sink
            .sync()
            .map_err(|e| LoggerError::sink_write(self.sink.name(), e))
    }
}

/// Fans one entry out to several cores
///
/// Every enabled core is attempted, even when an earlier one returns an
/// error or panics. Failures are collected into a single error.
pub struct Tee {
    cores: Vec<Box<dyn Core>>,
}

impl Tee {
    pub fn new(cores: Vec<Box<dyn Core>>) -> Self {
        Self { cores }
    }

    pub fn len(&self) -> usize {
        self.cores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }

    fn each<F>(&self, op: &str, mut f: F) -> Result<()>
    where
        F: FnMut(&dyn Core) -> Result<()>,
    {
        let mut errors = Vec::new();
        for (idx, core) in self.cores.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| f(core.as_ref()))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => errors.push(e),
                Err(panic_info) => {
                    let panic_msg = panic_message(panic_info.as_ref());
                    eprintln!("[LOGGER CRITICAL] Core #{} panicked during {}: {}", idx, op, panic_msg);
                    errors.push(LoggerError::other(format!(
                        "core #{} panicked during {}: {}",
                        idx, op, panic_msg
                    )));
                }
            }
        }
        LoggerError::combine(errors).map_or(Ok(()), Err)
    }
}

impl Core for Tee {
    fn enabled(&self, level: Level) -> bool {
        self.cores.iter().any(|core| core.enabled(level))
    }

    fn with(&self, fields: &[Field]) -> Box<dyn Core> {
        Box::new(Tee::new(
            self.cores.iter().map(|core| core.with(fields)).collect(),
        ))
    }

    fn write(&self, entry: &Entry, fields: &[Field]) -> Result<()> {
        self.each("write", |core| {
            if core.enabled(entry.level) {
                core.write(entry, fields)
            } else {
                Ok(())
            }
        })
    }

    fn sync(&self) -> Result<()> {
        self.each("sync", |core| core.sync())
    }
}

pub(crate) fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
