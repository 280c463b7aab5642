//! Per-package level registry
//!
//! Each package identity owns one [`LevelHandle`], created on first lookup at
//! the registry's default level and kept for the life of the process. Level
//! reads and writes on a handle are atomic and never touch the registry lock;
//! only inserting a new package does.

use crate::core::error::{LoggerError, Result};
use crate::core::level::{Level, LevelEnabler};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// A shared, atomically adjustable minimum level
///
/// Clones refer to the same level.
#[derive(Clone)]
pub struct LevelHandle(Arc<AtomicU8>);

impl LevelHandle {
    pub fn new(level: Level) -> Self {
        Self(Arc::new(AtomicU8::new(level.as_u8())))
    }

    #[inline]
    pub fn level(&self) -> Level {
        Level::from_u8(self.0.load(Ordering::Acquire)).unwrap_or_default()
    }

    #[inline]
    pub fn set_level(&self, level: Level) {
        self.0.store(level.as_u8(), Ordering::Release);
    }

    /// Whether two handles share the same level
    pub fn same_as(&self, other: &LevelHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl LevelEnabler for LevelHandle {
    #[inline]
    fn enabled(&self, level: Level) -> bool {
        self.level().enabled(level)
    }
}

impl std::fmt::Debug for LevelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("LevelHandle").field(&self.level()).finish()
    }
}

#[derive(Debug)]
pub struct Registry {
    levels: Mutex<HashMap<String, LevelHandle>>,
    default_level: AtomicU8,
}

impl Registry {
    pub fn new(default_level: Level) -> Self {
        Self {
            levels: Mutex::new(HashMap::new()),
            default_level: AtomicU8::new(default_level.as_u8()),
        }
    }

    /// Get or create the handle for `package`
    pub fn get(&self, package: &str) -> LevelHandle {
        let mut levels = self.levels.lock();
        if let Some(handle) = levels.get(package) {
            return handle.clone();
        }
        let handle = LevelHandle::new(self.default_level());
        levels.insert(package.to_string(), handle.clone());
        handle
    }

    /// Change the level of an already registered package
    ///
    /// Fails with [`LoggerError::NotRegistered`] and leaves the registry
    /// untouched when `package` has never been looked up.
    pub fn set(&self, package: &str, level: Level) -> Result<()> {
        let levels = self.levels.lock();
        match levels.get(package) {
            Some(handle) => {
                handle.set_level(level);
                Ok(())
            }
            None => Err(LoggerError::not_registered(package)),
        }
    }

    /// Level for packages registered from now on; existing handles keep theirs
    pub fn set_default_level(&self, level: Level) {
        self.default_level.store(level.as_u8(), Ordering::Release);
    }

    pub fn default_level(&self) -> Level {
        Level::from_u8(self.default_level.load(Ordering::Acquire)).unwrap_or_default()
    }

    /// Snapshot of every registered package, in no particular order
    pub fn packages(&self) -> Vec<String> {
        self.levels.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.levels.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Level::Info)
    }
}
