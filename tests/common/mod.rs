#![allow(dead_code)]

use std::cell::Cell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use contas_core::{
    config::TrackerConfig,
    domain::{Bill, BillStatus},
    persistence::PersistenceEngine,
    storage::{FileStore, KeyValueStore, MemoryStore, StorageError, StorageResult},
    Tracker,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// A fresh directory that outlives the calling test.
pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 12, 9, 30, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn bill(category: &str, amount: f64, day: u32) -> Bill {
    Bill::new(category, amount, date(2025, 3, day), BillStatus::Pending)
}

pub fn memory_engine() -> (PersistenceEngine, MemoryStore) {
    let store = MemoryStore::new();
    (PersistenceEngine::new(Box::new(store.clone())), store)
}

/// Tracker over a shared in-memory store; the returned handle sees every write.
pub fn memory_tracker() -> (Tracker, MemoryStore) {
    let (engine, store) = memory_engine();
    let tracker = Tracker::open_at(engine, TrackerConfig::default(), fixed_now());
    (tracker, store)
}

pub fn file_engine(root: PathBuf) -> PersistenceEngine {
    PersistenceEngine::new(Box::new(FileStore::new(root).expect("create file store")))
}

/// Memory store whose writes can be switched to fail with an IO error, the
/// way an unplugged disk or a revoked permission would.
#[derive(Clone, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: Rc<Cell<bool>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, failing: bool) {
        self.failing.set(failing);
    }

    fn check(&self) -> StorageResult<()> {
        if self.failing.get() {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "store is read-only",
            )));
        }
        Ok(())
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.check()?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.check()?;
        self.inner.remove(key)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        self.inner.keys()
    }
}

/// Tracker over a [`FlakyStore`] that starts out healthy.
pub fn flaky_tracker() -> (Tracker, FlakyStore) {
    let store = FlakyStore::new();
    let engine = PersistenceEngine::new(Box::new(store.clone()));
    let tracker = Tracker::open_at(engine, TrackerConfig::default(), fixed_now());
    (tracker, store)
}
