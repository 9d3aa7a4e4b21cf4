//! Key-value backing store. The service talks to the `Store` port instead of
//! the filesystem directly so core logic can be tested against an in-memory
//! fake.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

/// The four fixed slots the service persists under. `Templates` is reserved
/// for theme data and untouched by the core except for `clear_all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    CurrentInvoice,
    History,
    Templates,
    CompanyDetails,
}

impl StorageKey {
    pub const ALL: [StorageKey; 4] = [
        StorageKey::CurrentInvoice,
        StorageKey::History,
        StorageKey::Templates,
        StorageKey::CompanyDetails,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::CurrentInvoice => "invoice-current",
            StorageKey::History => "invoice-history",
            StorageKey::Templates => "invoice-templates",
            StorageKey::CompanyDetails => "company-details",
        }
    }
}

pub trait Store {
    /// `Ok(None)` when the slot has never been written.
    fn read(&self, key: StorageKey) -> io::Result<Option<String>>;
    fn write(&mut self, key: StorageKey, value: &str) -> io::Result<()>;
    /// Removing an absent slot is not an error.
    fn remove(&mut self, key: StorageKey) -> io::Result<()>;
}

/// One JSON file per key inside a data directory. The directory is created
/// lazily on first write.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: StorageKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }
}

impl Store for FileStore {
    fn read(&self, key: StorageKey) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&mut self, key: StorageKey, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)
    }

    fn remove(&mut self, key: StorageKey) -> io::Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// In-memory store used by unit tests and embedders.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: HashMap<StorageKey, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a slot with a raw value, bypassing the service. Lets tests plant
    /// corrupted JSON.
    pub fn seed(&mut self, key: StorageKey, value: &str) {
        self.slots.insert(key, value.to_string());
    }
}

impl Store for MemoryStore {
    fn read(&self, key: StorageKey) -> io::Result<Option<String>> {
        Ok(self.slots.get(&key).cloned())
    }

    fn write(&mut self, key: StorageKey, value: &str) -> io::Result<()> {
        self.slots.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: StorageKey) -> io::Result<()> {
        self.slots.remove(&key);
        Ok(())
    }
}
