//! Transition-scoped write overlay.

use crate::domain::KvStoreError;
use crate::ports::outbound::{BatchOperation, KeyValueStore};
use std::collections::BTreeMap;

/// Buffers writes of one transition over a backing store.
///
/// Reads see the buffered writes. Nothing reaches the backing store until
/// [`CachedStore::commit`], which flushes everything in one
/// `atomic_batch_write`. Dropping the overlay discards the transition.
pub struct CachedStore<'a, S: KeyValueStore + ?Sized> {
    inner: &'a mut S,
    // `None` marks a pending delete.
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<'a, S: KeyValueStore + ?Sized> CachedStore<'a, S> {
    /// Wrap a backing store.
    pub fn new(inner: &'a mut S) -> Self {
        Self {
            inner,
            writes: BTreeMap::new(),
        }
    }

    /// Number of keys touched so far.
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Buffered writes as batch operations, in key order.
    pub fn operations(&self) -> Vec<BatchOperation> {
        self.writes
            .iter()
            .map(|(key, value)| match value {
                Some(value) => BatchOperation::put(key.clone(), value.clone()),
                None => BatchOperation::delete(key.clone()),
            })
            .collect()
    }

    /// Flush buffered writes to the backing store.
    pub fn commit(self) -> Result<(), KvStoreError> {
        if self.writes.is_empty() {
            return Ok(());
        }
        let operations = self.operations();
        self.inner.atomic_batch_write(operations)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for CachedStore<'_, S> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KvStoreError> {
        match self.writes.get(key) {
            Some(buffered) => Ok(buffered.clone()),
            None => self.inner.get(key),
        }
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KvStoreError> {
        self.writes.insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KvStoreError> {
        self.writes.insert(key.to_vec(), None);
        Ok(())
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KvStoreError> {
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    self.writes.insert(key, Some(value));
                }
                BatchOperation::Delete { key } => {
                    self.writes.insert(key, None);
                }
            }
        }
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KvStoreError> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.inner.prefix_scan(prefix)?.into_iter().collect();
        for (key, value) in self
            .writes
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
        {
            match value {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        Ok(merged.into_iter().collect())
    }
}
