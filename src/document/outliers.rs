use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const HIGH_OVERLAP: &str = "high overlap";
pub const NMS_REMOVED_ROWS: &str = "nms removed rows";
pub const NMS_REMOVED_COLUMNS: &str = "nms removed columns";
pub const SKIPPED_TEXT: &str = "skipped text";
pub const LOW_IOB_TEXT: &str = "low iob text";
pub const LOWEST_IOB: &str = "lowest iob";
pub const CORNER_CLIP: &str = "corner clip";
pub const EXCESSIVE_ROWS: &str = "excessive rows";
pub const LARGE_TABLE_ASSUMPTION: &str = "large table assumption";
pub const UNCLASSIFIED_SPANNING_CELLS: &str = "unclassified spanning cells";
pub const UNKNOWN_LABELS: &str = "unknown labels";

/// Payload stored under one diagnostic key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutlierValue {
    Flag(bool),
    Count(usize),
    Ratio(f64),
    Text(String),
    Texts(Vec<String>),
}

/// Non-fatal diagnostics gathered while assembling one table.
///
/// Entries are only ever added or grown; nothing recorded is dropped before
/// the map is returned to the caller. Keys are kept in a `BTreeMap` so the
/// serialized output is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Outliers {
    entries: BTreeMap<String, OutlierValue>,
}

impl Outliers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, replacing a previous payload of the same key.
    pub fn record(&mut self, key: &str, value: OutlierValue) {
        self.entries.insert(key.to_string(), value);
    }

    /// Adds one to the counter under `key`.
    pub fn increment(&mut self, key: &str) {
        self.add(key, 1);
    }

    /// Adds `amount` to the counter under `key`, starting from zero.
    pub fn add(&mut self, key: &str, amount: usize) {
        let entry = self
            .entries
            .entry(key.to_string())
            .or_insert(OutlierValue::Count(0));
        match entry {
            OutlierValue::Count(count) => *count += amount,
            other => *other = OutlierValue::Count(amount),
        }
    }

    /// Appends `text` to the list under `key`.
    pub fn push_text(&mut self, key: &str, text: impl Into<String>) {
        let entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| OutlierValue::Texts(Vec::new()));
        match entry {
            OutlierValue::Texts(texts) => texts.push(text.into()),
            other => *other = OutlierValue::Texts(vec![text.into()]),
        }
    }

    /// Keeps the smallest ratio seen under `key`.
    pub fn record_min(&mut self, key: &str, value: f64) {
        match self.entries.get_mut(key) {
            Some(OutlierValue::Ratio(current)) => {
                if value < *current {
                    *current = value;
                }
            }
            _ => self.record(key, OutlierValue::Ratio(value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&OutlierValue> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the counter under `key`, or `0` when unset.
    pub fn count(&self, key: &str) -> usize {
        match self.entries.get(key) {
            Some(OutlierValue::Count(count)) => *count,
            _ => 0,
        }
    }

    /// Returns the text list under `key`, or an empty slice when unset.
    pub fn texts(&self, key: &str) -> &[String] {
        match self.entries.get(key) {
            Some(OutlierValue::Texts(texts)) => texts,
            _ => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OutlierValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_and_count() {
        let mut outliers = Outliers::new();
        assert_eq!(outliers.count(CORNER_CLIP), 0);
        outliers.increment(CORNER_CLIP);
        outliers.add(CORNER_CLIP, 2);
        assert_eq!(outliers.count(CORNER_CLIP), 3);
    }

    #[test]
    fn test_iter_is_sorted_by_key() {
        let mut outliers = Outliers::new();
        outliers.increment(SKIPPED_TEXT);
        outliers.increment(CORNER_CLIP);
        outliers.increment(HIGH_OVERLAP);
        let keys: Vec<&str> = outliers.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec![CORNER_CLIP, HIGH_OVERLAP, SKIPPED_TEXT]);
    }

    #[test]
    fn test_push_text_keeps_order() {
        let mut outliers = Outliers::new();
        outliers.push_text(SKIPPED_TEXT, "a");
        outliers.push_text(SKIPPED_TEXT, "b");
        assert_eq!(outliers.texts(SKIPPED_TEXT), ["a", "b"]);
    }

    #[test]
    fn test_record_min() {
        let mut outliers = Outliers::new();
        outliers.record_min(LOWEST_IOB, 0.4);
        outliers.record_min(LOWEST_IOB, 0.2);
        outliers.record_min(LOWEST_IOB, 0.3);
        assert_eq!(outliers.get(LOWEST_IOB), Some(&OutlierValue::Ratio(0.2)));
    }

    #[test]
    fn test_serializes_as_flat_map() {
        let mut outliers = Outliers::new();
        outliers.record(HIGH_OVERLAP, OutlierValue::Flag(true));
        outliers.increment(UNKNOWN_LABELS);
        let json = serde_json::to_string(&outliers).unwrap();
        assert_eq!(json, r#"{"high overlap":true,"unknown labels":1}"#);
    }
}
