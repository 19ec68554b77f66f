use crate::model::{PrinterRecord, ReplicaSnapshot};
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct StoreInner {
    records: HashMap<String, PrinterRecord>,
    // Millisecond timestamp of the last wholesale replacement. Diagnostics only.
    replaced_at: Option<i64>,
}

/// Authoritative in-memory replica of the printer records on the watch.
///
/// The handle is cheap to clone. Single writer (the replication channel),
/// many readers; readers always get a full copy, never a reference into the
/// shared map, so no reader ever observes a half-applied replacement.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full copy of the current record set. No remote call, no blocking
    /// beyond the read lock.
    pub fn snapshot(&self) -> ReplicaSnapshot {
        let inner = self.inner.read().expect("record store lock poisoned");
        ReplicaSnapshot::new(inner.records.values().cloned().collect())
    }

    /// Wholesale replacement: the remote set wins, nothing is merged.
    pub fn replace_all(&self, records: Vec<PrinterRecord>) {
        let mut inner = self.inner.write().expect("record store lock poisoned");
        inner.records = records
            .into_iter()
            .map(|r| (r.name().to_string(), r))
            .collect();
        inner.replaced_at = Some(chrono::Utc::now().timestamp_millis());
        debug!("RecordStore: replica replaced, {} records", inner.records.len());
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("record store lock poisoned").records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_is_isolated_from_later_writes() {
        let store = RecordStore::new();
        store.replace_all(vec![PrinterRecord::new("Ender", 1, true)]);

        let before = store.snapshot();
        store.replace_all(vec![
            PrinterRecord::new("Ender", 1, false),
            PrinterRecord::new("Prusa", 2, true),
        ]);

        // The copy taken earlier must not see the replacement.
        assert_eq!(before.len(), 1);
        assert_eq!(store.snapshot().len(), 2);
    }

    #[test]
    fn replace_all_is_wholesale() {
        let store = RecordStore::new();
        store.replace_all(vec![
            PrinterRecord::new("Ender", 1, true),
            PrinterRecord::new("Prusa", 2, false),
        ]);
        store.replace_all(vec![PrinterRecord::new("Voron", 1, true)]);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.records()[0].name(), "Voron");
    }

    #[test]
    fn empty_store_yields_empty_snapshot() {
        let store = RecordStore::new();
        assert!(store.is_empty());
        assert!(store.snapshot().is_empty());
    }
}
