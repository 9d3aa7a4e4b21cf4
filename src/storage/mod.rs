//! Persistence service for the current draft, the bounded history, and the
//! company-details template.
//!
//! Every operation returns a typed `Result` carrying the failure reason; no
//! storage fault ever panics or aborts the process. Callers that only need
//! the original degrade-to-default behavior (the CLI) map `Err` to
//! `None`/empty and log the diagnostic.

mod store;

pub use store::{FileStore, MemoryStore, StorageKey, Store};

use chrono::{DateTime, Utc};
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::clock::Clock;
use crate::error::{InvoiceError, Result};
use crate::model::{CompanyDetails, Invoice};

/// History keeps only this many snapshots; the oldest entry is evicted when
/// a new one is prepended.
pub const MAX_HISTORY: usize = 50;

/// Immutable invoice snapshot plus the moment it was saved. The invoice
/// fields flatten into the entry so the persisted shape matches a plain
/// invoice record with an extra `savedAt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub invoice: Invoice,
    #[serde(rename = "savedAt")]
    pub saved_at: DateTime<Utc>,
}

/// Portable snapshot of all persisted state, used by backup/restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DataBundle {
    pub current: Option<Invoice>,
    pub history: Vec<HistoryEntry>,
    pub company: Option<CompanyDetails>,
    pub exported_at: Option<DateTime<Utc>>,
}

/// Default data directory (XDG-style, with a `~/.invoice-studio` fallback).
pub fn default_data_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "invoice-studio") {
        return Ok(proj_dirs.data_dir().to_path_buf());
    }

    let home = std::env::var_os("HOME").map(PathBuf::from).ok_or_else(|| {
        InvoiceError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".invoice-studio"))
}

pub struct StorageService<S> {
    store: S,
}

impl<S: Store> StorageService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn read_json<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>> {
        let raw = self
            .store
            .read(key)
            .map_err(|e| InvoiceError::StorageRead {
                key: key.as_str(),
                reason: e.to_string(),
            })?;

        match raw {
            None => Ok(None),
            Some(s) => serde_json::from_str(&s)
                .map(Some)
                .map_err(|e| InvoiceError::StorageCorrupt {
                    key: key.as_str(),
                    reason: e.to_string(),
                }),
        }
    }

    fn write_json<T: Serialize>(&mut self, key: StorageKey, value: &T) -> Result<()> {
        let json = serde_json::to_string(value).map_err(|e| InvoiceError::StorageWrite {
            key: key.as_str(),
            reason: e.to_string(),
        })?;
        self.store
            .write(key, &json)
            .map_err(|e| InvoiceError::StorageWrite {
                key: key.as_str(),
                reason: e.to_string(),
            })
    }

    /// Overwrite the current-draft slot.
    pub fn save_current_invoice(&mut self, invoice: &Invoice) -> Result<()> {
        self.write_json(StorageKey::CurrentInvoice, invoice)
    }

    /// `Ok(None)` when no draft has been saved yet.
    pub fn load_current_invoice(&self) -> Result<Option<Invoice>> {
        self.read_json(StorageKey::CurrentInvoice)
    }

    /// Prepend a snapshot to history, evicting the oldest entry past
    /// [`MAX_HISTORY`]. An unreadable history slot is logged and replaced so
    /// a corrupted list never blocks new saves.
    pub fn add_to_history(&mut self, invoice: &Invoice, clock: &impl Clock) -> Result<()> {
        let mut history = match self.get_history() {
            Ok(h) => h,
            Err(e) => {
                warn!("discarding unreadable history: {e}");
                Vec::new()
            }
        };

        history.insert(
            0,
            HistoryEntry {
                invoice: invoice.clone(),
                saved_at: clock.now(),
            },
        );
        history.truncate(MAX_HISTORY);

        self.write_json(StorageKey::History, &history)
    }

    /// Full history, newest first. Empty when the slot is absent.
    pub fn get_history(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.read_json(StorageKey::History)?.unwrap_or_default())
    }

    /// First (most recently saved) entry with the given id.
    pub fn get_from_history(&self, id: &str) -> Result<Option<HistoryEntry>> {
        Ok(self.get_history()?.into_iter().find(|e| e.invoice.id == id))
    }

    /// Remove every entry with the given id, preserving the relative order of
    /// the rest. Deleting an id that is not present is not an error.
    pub fn delete_from_history(&mut self, id: &str) -> Result<()> {
        let mut history = self.get_history()?;
        history.retain(|e| e.invoice.id != id);
        self.write_json(StorageKey::History, &history)
    }

    pub fn save_company_details(&mut self, details: &CompanyDetails) -> Result<()> {
        self.write_json(StorageKey::CompanyDetails, details)
    }

    pub fn load_company_details(&self) -> Result<Option<CompanyDetails>> {
        self.read_json(StorageKey::CompanyDetails)
    }

    /// Erase all four slots.
    pub fn clear_all(&mut self) -> Result<()> {
        for key in StorageKey::ALL {
            self.store
                .remove(key)
                .map_err(|e| InvoiceError::StorageWrite {
                    key: key.as_str(),
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }

    /// Snapshot everything into a portable bundle. Unreadable slots degrade
    /// to absent/empty with a logged diagnostic rather than failing the
    /// whole export.
    pub fn export_data(&self, clock: &impl Clock) -> DataBundle {
        let current = self.load_current_invoice().unwrap_or_else(|e| {
            warn!("skipping unreadable draft in backup: {e}");
            None
        });
        let history = self.get_history().unwrap_or_else(|e| {
            warn!("skipping unreadable history in backup: {e}");
            Vec::new()
        });
        let company = self.load_company_details().unwrap_or_else(|e| {
            warn!("skipping unreadable company details in backup: {e}");
            None
        });

        DataBundle {
            current,
            history,
            company,
            exported_at: Some(clock.now()),
        }
    }

    /// Restore a bundle: draft first, then each history entry through
    /// [`add_to_history`](Self::add_to_history) (the cap applies
    /// incrementally), then company details. Best effort with no rollback:
    /// entries written before a failing write stay written.
    pub fn import_data(&mut self, bundle: &DataBundle, clock: &impl Clock) -> Result<()> {
        if let Some(current) = &bundle.current {
            self.save_current_invoice(current)?;
        }
        for entry in &bundle.history {
            self.add_to_history(&entry.invoice, clock)?;
        }
        if let Some(company) = &bundle.company {
            self.save_company_details(company)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{TimeZone, Utc};
    use std::io;

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap())
    }

    fn service() -> StorageService<MemoryStore> {
        StorageService::new(MemoryStore::new())
    }

    fn invoice(id: &str) -> Invoice {
        Invoice {
            id: id.to_string(),
            date: "2024-01-01".to_string(),
            bill_to: "Client".to_string(),
            project_total: 100.0,
            ..Default::default()
        }
    }

    #[test]
    fn draft_slot_round_trips() {
        let mut svc = service();
        assert_eq!(svc.load_current_invoice().unwrap(), None);

        let draft = invoice("INV-1");
        svc.save_current_invoice(&draft).unwrap();
        assert_eq!(svc.load_current_invoice().unwrap(), Some(draft));
    }

    #[test]
    fn corrupt_draft_reports_reason() {
        let mut store = MemoryStore::new();
        store.seed(StorageKey::CurrentInvoice, "{not json");
        let svc = StorageService::new(store);

        match svc.load_current_invoice() {
            Err(InvoiceError::StorageCorrupt { key, .. }) => {
                assert_eq!(key, "invoice-current");
            }
            other => panic!("expected StorageCorrupt, got {other:?}"),
        }
    }

    #[test]
    fn history_is_newest_first_and_capped_at_fifty() {
        let mut svc = service();
        for i in 0..51 {
            svc.add_to_history(&invoice(&format!("INV-{i:03}")), &clock())
                .unwrap();
        }

        let history = svc.get_history().unwrap();
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history[0].invoice.id, "INV-050");
        assert_eq!(history[49].invoice.id, "INV-001");
        assert!(!history.iter().any(|e| e.invoice.id == "INV-000"));
    }

    #[test]
    fn corrupt_history_is_replaced_on_next_save() {
        let mut store = MemoryStore::new();
        store.seed(StorageKey::History, "[[[");
        let mut svc = StorageService::new(store);

        svc.add_to_history(&invoice("INV-1"), &clock()).unwrap();
        let history = svc.get_history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].invoice.id, "INV-1");
    }

    #[test]
    fn delete_removes_only_matching_entries_in_order() {
        let mut svc = service();
        for id in ["A", "B", "A", "C"] {
            svc.add_to_history(&invoice(id), &clock()).unwrap();
        }

        svc.delete_from_history("A").unwrap();
        let ids: Vec<_> = svc
            .get_history()
            .unwrap()
            .into_iter()
            .map(|e| e.invoice.id)
            .collect();
        assert_eq!(ids, vec!["C", "B"]);

        // Deleting an unknown id is a no-op, not an error.
        svc.delete_from_history("missing").unwrap();
        assert_eq!(svc.get_history().unwrap().len(), 2);
    }

    #[test]
    fn get_from_history_returns_most_recent_match() {
        let mut svc = service();
        let mut first = invoice("A");
        first.project_total = 1.0;
        let mut second = invoice("A");
        second.project_total = 2.0;

        svc.add_to_history(&first, &clock()).unwrap();
        svc.add_to_history(&second, &clock()).unwrap();

        let found = svc.get_from_history("A").unwrap().unwrap();
        assert_eq!(found.invoice.project_total, 2.0);
        assert_eq!(svc.get_from_history("Z").unwrap(), None);
    }

    #[test]
    fn clear_all_erases_every_slot() {
        let mut svc = service();
        svc.save_current_invoice(&invoice("INV-1")).unwrap();
        svc.add_to_history(&invoice("INV-1"), &clock()).unwrap();
        svc.save_company_details(&CompanyDetails::default()).unwrap();

        svc.clear_all().unwrap();
        assert_eq!(svc.load_current_invoice().unwrap(), None);
        assert!(svc.get_history().unwrap().is_empty());
        assert_eq!(svc.load_company_details().unwrap(), None);
    }

    #[test]
    fn export_then_import_round_trips() {
        let mut svc = service();
        svc.save_current_invoice(&invoice("DRAFT")).unwrap();
        svc.add_to_history(&invoice("INV-1"), &clock()).unwrap();
        svc.add_to_history(&invoice("INV-2"), &clock()).unwrap();

        let bundle = svc.export_data(&clock());
        assert_eq!(bundle.current.as_ref().unwrap().id, "DRAFT");
        assert_eq!(bundle.history.len(), 2);
        assert!(bundle.exported_at.is_some());

        let mut fresh = service();
        fresh.import_data(&bundle, &clock()).unwrap();
        assert_eq!(fresh.load_current_invoice().unwrap().unwrap().id, "DRAFT");

        // Bundle history is replayed in order, so the last bundle entry ends
        // up newest.
        let ids: Vec<_> = fresh
            .get_history()
            .unwrap()
            .into_iter()
            .map(|e| e.invoice.id)
            .collect();
        assert_eq!(ids, vec!["INV-1", "INV-2"]);
    }

    #[test]
    fn import_applies_the_history_cap_incrementally() {
        // A hand-built bundle can exceed the cap; replay must still enforce it.
        let bundle = DataBundle {
            history: (0..60)
                .map(|i| HistoryEntry {
                    invoice: invoice(&format!("INV-{i:03}")),
                    saved_at: clock().now(),
                })
                .collect(),
            ..Default::default()
        };

        let mut fresh = service();
        fresh.import_data(&bundle, &clock()).unwrap();

        let history = fresh.get_history().unwrap();
        assert_eq!(history.len(), MAX_HISTORY);
        // Entries are replayed in bundle order, so the last one is newest.
        assert_eq!(history[0].invoice.id, "INV-059");
    }

    /// Store whose writes always fail, for the failure-path contract.
    struct BrokenStore;

    impl Store for BrokenStore {
        fn read(&self, _key: StorageKey) -> io::Result<Option<String>> {
            Ok(None)
        }

        fn write(&mut self, _key: StorageKey, _value: &str) -> io::Result<()> {
            Err(io::Error::other("quota exceeded"))
        }

        fn remove(&mut self, _key: StorageKey) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failures_surface_key_and_reason() {
        let mut svc = StorageService::new(BrokenStore);
        match svc.save_current_invoice(&invoice("INV-1")) {
            Err(InvoiceError::StorageWrite { key, reason }) => {
                assert_eq!(key, "invoice-current");
                assert!(reason.contains("quota exceeded"));
            }
            other => panic!("expected StorageWrite, got {other:?}"),
        }
    }

    /// Store with a budget of successful writes, failing every one after.
    struct FlakyStore {
        inner: MemoryStore,
        writes_left: usize,
    }

    impl Store for FlakyStore {
        fn read(&self, key: StorageKey) -> io::Result<Option<String>> {
            self.inner.read(key)
        }

        fn write(&mut self, key: StorageKey, value: &str) -> io::Result<()> {
            if self.writes_left == 0 {
                return Err(io::Error::other("disk full"));
            }
            self.writes_left -= 1;
            self.inner.write(key, value)
        }

        fn remove(&mut self, key: StorageKey) -> io::Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn import_aborts_on_first_write_failure_keeping_earlier_writes() {
        let bundle = DataBundle {
            current: Some(invoice("DRAFT")),
            history: ["H1", "H2", "H3"]
                .map(|id| HistoryEntry {
                    invoice: invoice(id),
                    saved_at: clock().now(),
                })
                .to_vec(),
            company: Some(CompanyDetails::default()),
            exported_at: Some(clock().now()),
        };

        // Budget covers the draft and the first two history entries; the
        // third entry's write fails and nothing after it is attempted.
        let mut svc = StorageService::new(FlakyStore {
            inner: MemoryStore::new(),
            writes_left: 3,
        });

        match svc.import_data(&bundle, &clock()) {
            Err(InvoiceError::StorageWrite { key, reason }) => {
                assert_eq!(key, "invoice-history");
                assert!(reason.contains("disk full"));
            }
            other => panic!("expected StorageWrite, got {other:?}"),
        }

        // No rollback: everything written before the failure stays.
        assert_eq!(svc.load_current_invoice().unwrap().unwrap().id, "DRAFT");
        let ids: Vec<_> = svc
            .get_history()
            .unwrap()
            .into_iter()
            .map(|e| e.invoice.id)
            .collect();
        assert_eq!(ids, vec!["H2", "H1"]);
        assert_eq!(svc.load_company_details().unwrap(), None);
    }

    #[test]
    fn history_entry_serializes_flat_with_saved_at() {
        let entry = HistoryEntry {
            invoice: invoice("INV-1"),
            saved_at: clock().now(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], "INV-1");
        assert_eq!(json["projectTotal"], 100.0);
        assert!(json["savedAt"].is_string());
    }
}
