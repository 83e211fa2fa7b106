//! Key-value stores mounted on the state-machine context.

use core::fmt::Debug;
use std::collections::BTreeMap;

use auto_impl::auto_impl;
use parking_lot::RwLock;

/// The name under which a [`KvStore`] is mounted on a [`crate::StateContext`].
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, derive_more::Display)]
pub struct StoreKey(&'static str);

impl StoreKey {
    /// Creates a new store key with the given name.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the name of the store.
    pub const fn name(&self) -> &'static str {
        self.0
    }
}

/// A byte-keyed store reachable through the state-machine context.
///
/// Writes go through a shared reference: the state-machine framework hands out the same store
/// to every context of a block and tracks writes itself.
#[auto_impl(&, Box, Arc)]
pub trait KvStore: Debug + Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &[u8], value: Vec<u8>);

    /// Removes the value stored under `key`.
    fn delete(&self, key: &[u8]);

    /// Returns `true` if a value is stored under `key`.
    fn has(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }
}

/// An in-memory [`KvStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &[u8], value: Vec<u8>) {
        self.entries.write().insert(key.to_vec(), value);
    }

    fn delete(&self, key: &[u8]) {
        self.entries.write().remove(key);
    }

    fn has(&self, key: &[u8]) -> bool {
        self.entries.read().contains_key(key)
    }
}
