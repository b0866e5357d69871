use std::sync::Arc;

use parking_lot::RwLock;

use super::HashRing;
use crate::Result;

/// Shared handle to a [`HashRing`].
///
/// Membership changes take the write side for the whole mutate-and-rebuild
/// step; lookups take the read side, so nobody sees a half-rebuilt ring.
/// Only the owner of membership should hold a `RingGuard`; everyone else
/// gets a [`RingReader`].
#[derive(Debug, Clone, Default)]
pub struct RingGuard {
    inner: Arc<RwLock<HashRing>>,
}

impl RingGuard {
    pub fn new(ring: HashRing) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ring)),
        }
    }

    /// Provides read access to the ring
    pub fn blocking_read<R>(
        &self,
        f: impl FnOnce(&HashRing) -> R,
    ) -> R {
        let guard = self.inner.read();
        f(&guard)
    }

    /// Provides write access to the ring
    pub fn blocking_write<R>(
        &self,
        f: impl FnOnce(&mut HashRing) -> R,
    ) -> R {
        let mut guard = self.inner.write();
        f(&mut guard)
    }

    /// Lookup-only view of the same ring
    pub fn reader(&self) -> RingReader {
        RingReader {
            inner: self.inner.clone(),
        }
    }
}

/// Read-only view of a ring owned by a [`RingGuard`].
#[derive(Debug, Clone, Default)]
pub struct RingReader {
    inner: Arc<RwLock<HashRing>>,
}

impl From<RingGuard> for RingReader {
    fn from(guard: RingGuard) -> Self {
        Self { inner: guard.inner }
    }
}

impl RingReader {
    /// Provides read access to the ring
    pub fn blocking_read<R>(
        &self,
        f: impl FnOnce(&HashRing) -> R,
    ) -> R {
        let guard = self.inner.read();
        f(&guard)
    }

    pub fn get_node(
        &self,
        key: impl AsRef<[u8]>,
    ) -> Result<String> {
        self.blocking_read(|ring| ring.get_node(key).map(str::to_string))
    }

    pub fn hash_key(
        &self,
        key: impl AsRef<[u8]>,
    ) -> u32 {
        self.blocking_read(|ring| ring.hash_key(key))
    }

    pub fn len(&self) -> usize {
        self.blocking_read(HashRing::len)
    }

    pub fn is_empty(&self) -> bool {
        self.blocking_read(HashRing::is_empty)
    }
}
