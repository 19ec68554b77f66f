use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// A printer as replicated from the phone.
///
/// The phone owns the full attribute bag; the watch only interprets the
/// three fields it needs for display and selection. Everything else rides
/// along untouched in `attributes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrinterRecord {
    name: String,
    position: i64,
    default: bool,
    attributes: HashMap<String, serde_json::Value>,
}

impl PrinterRecord {
    pub fn new(name: impl Into<String>, position: i64, default: bool) -> Self {
        Self {
            name: name.into(),
            position,
            default,
            attributes: HashMap::new(),
        }
    }

    /// Attaches an opaque replicated attribute (hostname, camera id, ...).
    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Stable identity: display label and selection key in one.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn is_default(&self) -> bool {
        self.default
    }

    pub fn set_default(&mut self, default: bool) {
        self.default = default;
    }

    pub fn attributes(&self) -> &HashMap<String, serde_json::Value> {
        &self.attributes
    }

    /// Display ordering: position ascending, ties broken by name ascending
    /// (case-sensitive). Total, so a stable sort over it is deterministic.
    pub fn display_cmp(&self, other: &Self) -> Ordering {
        self.position
            .cmp(&other.position)
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// A full-replacement copy of the replicated printer set.
///
/// Read wholesale on every change notification; never diffed or patched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplicaSnapshot {
    records: Vec<PrinterRecord>,
}

impl ReplicaSnapshot {
    pub fn new(records: Vec<PrinterRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[PrinterRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<PrinterRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The record currently marked default, if any.
    pub fn default_record(&self) -> Option<&PrinterRecord> {
        self.records.iter().find(|r| r.is_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_wins_over_name() {
        let a = PrinterRecord::new("Zebra", 1, false);
        let b = PrinterRecord::new("Alpha", 2, false);
        assert_eq!(a.display_cmp(&b), Ordering::Less);
        assert_eq!(b.display_cmp(&a), Ordering::Greater);
    }

    #[test]
    fn equal_positions_fall_back_to_name() {
        let a = PrinterRecord::new("Ender", 1, false);
        let b = PrinterRecord::new("Prusa", 1, false);
        assert_eq!(a.display_cmp(&b), Ordering::Less);
        // Case-sensitive: uppercase sorts before lowercase.
        let upper = PrinterRecord::new("Zebra", 1, false);
        let lower = PrinterRecord::new("alpha", 1, false);
        assert_eq!(upper.display_cmp(&lower), Ordering::Less);
    }

    #[test]
    fn sort_is_deterministic_across_repeats() {
        let mut records = vec![
            PrinterRecord::new("Prusa", 2, false),
            PrinterRecord::new("Ender", 1, true),
            PrinterRecord::new("Anycubic", 2, false),
        ];
        records.sort_by(|a, b| a.display_cmp(b));
        let first: Vec<String> = records.iter().map(|r| r.name().to_string()).collect();
        assert_eq!(first, vec!["Ender", "Anycubic", "Prusa"]);

        // Re-sorting the already-sorted input must not reorder anything.
        records.sort_by(|a, b| a.display_cmp(b));
        let second: Vec<String> = records.iter().map(|r| r.name().to_string()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn default_record_lookup() {
        let snapshot = ReplicaSnapshot::new(vec![
            PrinterRecord::new("Ender", 1, false),
            PrinterRecord::new("Prusa", 2, true),
        ]);
        assert_eq!(snapshot.default_record().unwrap().name(), "Prusa");
        assert!(ReplicaSnapshot::default().default_record().is_none());
    }
}
