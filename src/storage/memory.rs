use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use super::{entry_cost, KeyValueStore, StorageError, StorageResult};

#[derive(Debug, Default)]
struct MemoryInner {
    entries: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl MemoryInner {
    fn usage(&self) -> usize {
        self.entries
            .iter()
            .map(|(key, value)| entry_cost(key, value))
            .sum()
    }
}

/// In-process store with an optional byte budget.
///
/// Clones share the same entries, so a caller can keep a handle for
/// inspection after boxing one into the persistence engine. The handle is
/// single-threaded by construction, matching the tracker's ownership model.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        let store = Self::new();
        store.set_quota(Some(quota));
        store
    }

    /// Changes the byte budget; existing entries are kept even when they
    /// already exceed it.
    pub fn set_quota(&self, quota: Option<usize>) {
        self.inner.borrow_mut().quota = quota;
    }

    pub fn usage(&self) -> usize {
        self.inner.borrow().usage()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.inner.borrow().entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut inner = self.inner.borrow_mut();
        if let Some(quota) = inner.quota {
            let previous = inner
                .entries
                .get(key)
                .map(|old| entry_cost(key, old))
                .unwrap_or(0);
            let needed = inner.usage() - previous + entry_cost(key, value);
            if needed > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    available: quota,
                });
            }
        }
        inner.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.inner.borrow_mut().entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.inner.borrow().entries.keys().cloned().collect())
    }
}
