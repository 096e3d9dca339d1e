use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A snapshot of the text as it was before a promotion or restoration
/// replaced it. Immutable once created; it leaves the log only through
/// [`HistoryLog::clear`] or [`HistoryLog::remove`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique, monotonically increasing per editor session.
    pub id: u64,
    pub text: String,
    pub captured_at: DateTime<Utc>,
}

/// Append-ordered log of prior text snapshots, most recent first.
///
/// Entries are only ever prepended or filtered out by id, never edited
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn push_front(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
    }

    /// Removes the entry with the given id. Returns whether one was found.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Largest id present, used to seed the id counter after rehydration.
    pub fn max_id(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.id).max()
    }
}
