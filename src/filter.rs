//! Entry filtering
//!
//! A read-only projection of the loaded entry list. The master list is never
//! touched; every change to the criteria recomputes the view from scratch.

use crate::entry::Entry;

/// Free-text search plus an exact semester match. Empty criteria match
/// everything; both criteria must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    /// Case-insensitive substring of the name or USN
    pub search: String,
    /// Exact semester value
    pub semester: String,
}

impl EntryFilter {
    pub fn new(search: impl Into<String>, semester: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            semester: semester.into(),
        }
    }

    /// Check whether an entry passes both criteria
    pub fn matches(&self, entry: &Entry) -> bool {
        self.matches_search(entry) && self.matches_semester(entry)
    }

    fn matches_search(&self, entry: &Entry) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        entry.name.to_lowercase().contains(&needle) || entry.usn.to_lowercase().contains(&needle)
    }

    fn matches_semester(&self, entry: &Entry) -> bool {
        self.semester.is_empty() || entry.semester == self.semester
    }

    /// Entries passing the filter, in master-list order
    pub fn apply<'a>(&self, entries: &'a [Entry]) -> Vec<&'a Entry> {
        entries.iter().filter(|e| self.matches(e)).collect()
    }

    /// Whether the search box holds anything worth clearing
    pub fn has_search(&self) -> bool {
        !self.search.trim().is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.semester.is_empty()
    }

    /// Reset the text criterion only
    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    /// Reset both criteria
    pub fn clear_all(&mut self) {
        self.search.clear();
        self.semester.clear();
    }
}
