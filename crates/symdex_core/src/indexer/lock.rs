//! Named reader/writer locks.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// One reader/writer lock per name, created on first use.
///
/// Locks are handed out as `Arc`s so the guard outlives the map lock;
/// callers hold `lock.read()` or `lock.write()` for the duration of a
/// facade call. Locks are never removed, so a name always maps to the
/// same lock.
#[derive(Debug, Default)]
pub(crate) struct NamedRwLock {
    locks: Mutex<HashMap<String, Arc<RwLock<()>>>>,
}

impl NamedRwLock {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the lock for `name`.
    pub(crate) fn get(&self, name: &str) -> Arc<RwLock<()>> {
        let mut locks = self.locks.lock();
        Arc::clone(locks.entry(name.to_string()).or_default())
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.lock().len()
    }
}
