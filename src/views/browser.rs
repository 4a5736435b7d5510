//! Entry Browser View
//!
//! Loads every entry once, then filters, deletes and exports against that
//! snapshot. Deletes trim the local list after the store confirms; the list
//! is never re-fetched or merged.

use chrono::{NaiveDate, Utc};
use std::path::{Path, PathBuf};

use crate::entry::Entry;
use crate::export::{entries_to_csv, write_export, ExportError};
use crate::filter::EntryFilter;
use crate::remote::{EntryStore, RemoteError};
use crate::views::confirm::{ConfirmChoice, ConfirmRequest, Confirmation};
use crate::views::notice::Notice;
use crate::views::table::render_entries;

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load entries";
pub const DELETED_MESSAGE: &str = "Entry deleted successfully!";
pub const DELETE_REJECTED_MESSAGE: &str = "Failed to delete entry. Please try again.";
pub const DELETE_ERROR_MESSAGE: &str =
    "An error occurred while deleting the entry. Please check your connection and try again.";
pub const DELETE_MISSING_MESSAGE: &str = "No loaded entry has that row.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loading,
    Loaded,
    Failed(Notice),
}

/// Where a delete currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePhase {
    Idle,
    Confirming,
    Deleting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The user backed out; nothing was sent
    Cancelled,
    /// The prompt was closed; nothing was sent
    Dismissed,
    /// The store removed the entry and the local list was trimmed
    Deleted(Notice),
    /// The store did not remove the entry; the local list is unchanged
    Failed(Notice),
}

/// Controller for the entries table
pub struct BrowserView<S> {
    store: S,
    entries: Vec<Entry>,
    filter: EntryFilter,
    load_state: LoadState,
    delete_phase: DeletePhase,
}

impl<S: EntryStore> BrowserView<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            entries: Vec::new(),
            filter: EntryFilter::default(),
            load_state: LoadState::NotLoaded,
            delete_phase: DeletePhase::Idle,
        }
    }

    /// Fetch all entries, replacing whatever was loaded before.
    ///
    /// Returns the number of entries loaded, or the notice to show.
    pub async fn load(&mut self) -> Result<usize, Notice> {
        self.load_state = LoadState::Loading;

        match self.store.fetch_entries().await {
            Ok(entries) => {
                self.entries = entries;
                self.load_state = LoadState::Loaded;
                Ok(self.entries.len())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Loading entries failed");
                let text = match e.server_message() {
                    Some(detail) => format!("{}: {}", LOAD_FAILED_MESSAGE, detail),
                    None => LOAD_FAILED_MESSAGE.to_string(),
                };
                let notice = Notice::error(text);
                self.load_state = LoadState::Failed(notice.clone());
                Err(notice)
            }
        }
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn delete_phase(&self) -> DeletePhase {
        self.delete_phase
    }

    /// Every loaded entry, unfiltered
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Number of loaded entries, regardless of the filter
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn filter(&self) -> &EntryFilter {
        &self.filter
    }

    /// Entries passing the current filter
    pub fn visible(&self) -> Vec<&Entry> {
        self.filter.apply(&self.entries)
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.search = search.into();
    }

    pub fn set_semester(&mut self, semester: impl Into<String>) {
        self.filter.semester = semester.into();
    }

    pub fn clear_search(&mut self) {
        self.filter.clear_search();
    }

    pub fn clear_all_filters(&mut self) {
        self.filter.clear_all();
    }

    /// Render the filtered table
    pub fn render(&self, twelve_hour: bool) -> String {
        render_entries(&self.visible(), twelve_hour)
    }

    /// Ask for confirmation, then delete the entry at `row`.
    ///
    /// Only a confirmed choice for a loaded row reaches the store. There is
    /// no retry; a failed delete leaves the list as it was.
    pub async fn delete(&mut self, row: u64, confirmation: &dyn Confirmation) -> DeleteOutcome {
        if !self.entries.iter().any(|e| e.row == row) {
            tracing::warn!(row, "Row not in the loaded entries");
            return DeleteOutcome::Failed(
                Notice::error(DELETE_MISSING_MESSAGE).titled("Delete Failed"),
            );
        }

        self.delete_phase = DeletePhase::Confirming;
        let choice = confirmation.confirm(&ConfirmRequest::delete_entry()).await;

        match choice {
            ConfirmChoice::Cancelled => {
                self.delete_phase = DeletePhase::Idle;
                return DeleteOutcome::Cancelled;
            }
            ConfirmChoice::Dismissed => {
                self.delete_phase = DeletePhase::Idle;
                return DeleteOutcome::Dismissed;
            }
            ConfirmChoice::Confirmed => {}
        }

        self.delete_phase = DeletePhase::Deleting;
        let result = self.store.delete_entry(row).await;
        self.delete_phase = DeletePhase::Idle;

        match result {
            Ok(()) => {
                self.entries.retain(|e| e.row != row);
                tracing::info!(row, remaining = self.entries.len(), "Entry removed");
                DeleteOutcome::Deleted(Notice::success(DELETED_MESSAGE).titled("Success"))
            }
            Err(e @ RemoteError::Rejected { .. }) => {
                tracing::warn!(row, error = %e, "Delete rejected");
                DeleteOutcome::Failed(Notice::error(DELETE_REJECTED_MESSAGE).titled("Delete Failed"))
            }
            Err(e) => {
                tracing::warn!(row, error = %e, "Delete failed");
                DeleteOutcome::Failed(Notice::error(DELETE_ERROR_MESSAGE).titled("Delete Failed"))
            }
        }
    }

    /// CSV of every loaded entry, ignoring the filter
    pub fn export_csv(&self) -> Option<String> {
        entries_to_csv(&self.entries)
    }

    /// Write the export into `dir`, named for today's UTC date
    pub fn export_to(&self, dir: &Path) -> Result<Option<PathBuf>, ExportError> {
        self.export_to_dated(dir, Utc::now().date_naive())
    }

    pub fn export_to_dated(
        &self,
        dir: &Path,
        date: NaiveDate,
    ) -> Result<Option<PathBuf>, ExportError> {
        write_export(dir, &self.entries, date)
    }
}
