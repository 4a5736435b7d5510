//! Entry Submission View
//!
//! Holds the entry form, sends it to the store, and keeps a short local
//! list of what was submitted in this session. The recent list is built
//! from the submitted form data only; it never learns the row the store
//! assigned.

use chrono::NaiveDateTime;
use std::collections::VecDeque;

use crate::datetime::{local_now, long_date, FormDefaults};
use crate::entry::NewEntry;
use crate::remote::{EntryStore, RemoteError};
use crate::views::notice::Notice;

pub const SUBMIT_LABEL: &str = "Entry Now!";
pub const SUBMITTING_LABEL: &str = "Submitting...";

pub const SUBMITTING_MESSAGE: &str = "Submitting entry...";
pub const SUBMITTED_MESSAGE: &str = "Entry submitted successfully!";
pub const RETRY_MESSAGE: &str = "Please try again.";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

/// Default number of recent entries kept
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// State of the submit control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Submitting,
}

impl SubmitState {
    /// Button caption for this state
    pub fn label(self) -> &'static str {
        match self {
            SubmitState::Idle => SUBMIT_LABEL,
            SubmitState::Submitting => SUBMITTING_LABEL,
        }
    }

    pub fn is_enabled(self) -> bool {
        self == SubmitState::Idle
    }
}

/// Puts the control back to idle however the submission ends
struct SubmitGuard<'a> {
    state: &'a mut SubmitState,
}

impl<'a> SubmitGuard<'a> {
    fn engage(state: &'a mut SubmitState) -> Self {
        *state = SubmitState::Submitting;
        Self { state }
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        *self.state = SubmitState::Idle;
    }
}

/// Most-recent-first list of this session's submissions
#[derive(Debug, Clone)]
pub struct RecentEntries {
    items: VecDeque<NewEntry>,
    limit: usize,
}

impl RecentEntries {
    pub fn new(limit: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// Add to the top, dropping the oldest beyond the limit
    pub fn push(&mut self, entry: NewEntry) {
        self.items.push_front(entry);
        self.items.truncate(self.limit);
    }

    pub fn iter(&self) -> impl Iterator<Item = &NewEntry> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn render(&self) -> String {
        if self.items.is_empty() {
            return "No recent entries.\n".to_string();
        }

        let mut out = String::new();
        for entry in &self.items {
            out.push_str(&format!("{} ({})\n", entry.name, entry.usn));
            out.push_str(&format!(
                "  {} - {} at {}\n",
                entry.semester, entry.entry_date, entry.entry_time
            ));
        }
        out
    }
}

impl Default for RecentEntries {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_LIMIT)
    }
}

/// Controller for the entry form
pub struct SubmissionView<S> {
    store: S,
    form: NewEntry,
    defaults: FormDefaults,
    submit_state: SubmitState,
    notice: Option<Notice>,
    recent: RecentEntries,
    clock: fn() -> NaiveDateTime,
}

impl<S: EntryStore> SubmissionView<S> {
    pub fn new(store: S, recent_limit: usize) -> Self {
        Self::with_clock(store, recent_limit, local_now)
    }

    /// Create a view reading the time from `clock`
    pub fn with_clock(store: S, recent_limit: usize, clock: fn() -> NaiveDateTime) -> Self {
        let defaults = FormDefaults::at(clock());
        Self {
            store,
            form: blank_form(&defaults),
            defaults,
            submit_state: SubmitState::Idle,
            notice: None,
            recent: RecentEntries::new(recent_limit),
            clock,
        }
    }

    pub fn form(&self) -> &NewEntry {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut NewEntry {
        &mut self.form
    }

    pub fn defaults(&self) -> &FormDefaults {
        &self.defaults
    }

    pub fn submit_state(&self) -> SubmitState {
        self.submit_state
    }

    /// The last message shown to the user
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn recent(&self) -> &RecentEntries {
        &self.recent
    }

    /// Today's date in long form, read fresh from the clock
    pub fn today(&self) -> String {
        long_date((self.clock)())
    }

    /// Clear the form and seed date and time from the clock
    pub fn reset_form(&mut self) {
        self.defaults = FormDefaults::at((self.clock)());
        self.form = blank_form(&self.defaults);
    }

    /// Send the current form to the store.
    ///
    /// Every outcome is reported as a notice; the submit control is idle
    /// again when this returns.
    pub async fn submit(&mut self) -> Notice {
        let entry = self.form.clone();
        let _guard = SubmitGuard::engage(&mut self.submit_state);
        self.notice = Some(Notice::info(SUBMITTING_MESSAGE));

        let notice = match self.store.submit_entry(&entry).await {
            Ok(()) => {
                tracing::info!(name = %entry.name, usn = %entry.usn, "Entry recorded");
                self.recent.push(entry);
                self.defaults = FormDefaults::at((self.clock)());
                self.form = blank_form(&self.defaults);
                Notice::success(SUBMITTED_MESSAGE)
            }
            Err(RemoteError::Rejected { message }) => {
                tracing::warn!(error = ?message, "Submission rejected");
                Notice::error(format!(
                    "Error: {}",
                    message.as_deref().unwrap_or(RETRY_MESSAGE)
                ))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Submission failed");
                Notice::error(NETWORK_ERROR_MESSAGE)
            }
        };

        self.notice = Some(notice.clone());
        notice
    }
}

fn blank_form(defaults: &FormDefaults) -> NewEntry {
    NewEntry::default()
        .date(defaults.date.clone())
        .time(defaults.time.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::testing::{FakeStore, Failure};
    use chrono::{NaiveDate, TimeDelta};
    use std::sync::atomic::{AtomicI64, Ordering};

    fn fixed_clock() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(9, 7, 0)
            .unwrap()
    }

    static TICKS: AtomicI64 = AtomicI64::new(0);

    /// Advances a day and a minute on every reading. Only one test uses it.
    fn ticking_clock() -> NaiveDateTime {
        let tick = TICKS.fetch_add(1, Ordering::SeqCst);
        fixed_clock() - TimeDelta::minutes(7) + TimeDelta::days(tick) + TimeDelta::minutes(tick)
    }

    fn view(store: FakeStore) -> SubmissionView<FakeStore> {
        SubmissionView::with_clock(store, DEFAULT_RECENT_LIMIT, fixed_clock)
    }

    fn fill(view: &mut SubmissionView<FakeStore>, name: &str) {
        let form = view.form_mut();
        form.name = name.to_string();
        form.usn = format!("USN-{}", name);
        form.semester = "5".to_string();
    }

    #[test]
    fn test_form_seeded_with_defaults() {
        let v = view(FakeStore::default());
        assert_eq!(v.form().entry_date, "2024-03-05");
        assert_eq!(v.form().entry_time, "09:07");
        assert_eq!(v.today(), "Tuesday, March 5, 2024");
        assert_eq!(v.submit_state(), SubmitState::Idle);
        assert_eq!(v.submit_state().label(), "Entry Now!");
        assert!(v.recent().is_empty());
    }

    #[tokio::test]
    async fn test_successful_submit_resets_form_and_records_recent() {
        let mut v =
            SubmissionView::with_clock(FakeStore::default(), DEFAULT_RECENT_LIMIT, ticking_clock);
        assert_eq!(v.form().entry_date, "2024-03-05");
        assert_eq!(v.form().entry_time, "09:00");
        fill(&mut v, "Asha");
        v.form_mut().entry_time = "14:00".to_string();

        let notice = v.submit().await;

        assert_eq!(notice, Notice::success("Entry submitted successfully!"));
        assert_eq!(v.store.submitted().len(), 1);
        assert_eq!(v.form().name, "");
        assert_eq!(v.form().entry_date, "2024-03-06");
        assert_eq!(v.form().entry_time, "09:01");
        assert_eq!(v.defaults().time, "09:01");

        let recent: Vec<&NewEntry> = v.recent().iter().collect();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].name, "Asha");
        assert_eq!(recent[0].entry_time, "14:00");
        assert!(v.submit_state().is_enabled());
    }

    #[tokio::test]
    async fn test_recent_list_capped_most_recent_first() {
        let mut v = view(FakeStore::default());

        for name in ["a", "b", "c", "d", "e", "f"] {
            fill(&mut v, name);
            v.submit().await;
        }

        let names: Vec<&str> = v.recent().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["f", "e", "d", "c", "b"]);
        assert_eq!(v.store.submitted().len(), 6);
    }

    #[tokio::test]
    async fn test_rejection_surfaces_server_message() {
        let store = FakeStore::failing(Failure::Rejected(Some("Duplicate entry".to_string())));
        let mut v = view(store);
        fill(&mut v, "Asha");

        let notice = v.submit().await;

        assert_eq!(notice, Notice::error("Error: Duplicate entry"));
        assert_eq!(v.form().name, "Asha");
        assert!(v.recent().is_empty());
        assert_eq!(v.submit_state(), SubmitState::Idle);
    }

    #[tokio::test]
    async fn test_rejection_without_message_is_generic() {
        let mut v = view(FakeStore::failing(Failure::Rejected(None)));
        fill(&mut v, "Asha");

        let notice = v.submit().await;
        assert_eq!(notice.text, "Error: Please try again.");
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let mut v = view(FakeStore::failing(Failure::Malformed));
        fill(&mut v, "Asha");

        let notice = v.submit().await;

        assert_eq!(notice, Notice::error("Network error. Please try again."));
        assert_eq!(v.notice(), Some(&notice));
        assert!(v.submit_state().is_enabled());
        assert!(v.recent().is_empty());
    }

    #[test]
    fn test_recent_render() {
        let mut recent = RecentEntries::new(2);
        assert_eq!(recent.render(), "No recent entries.\n");

        recent.push(NewEntry::new("Asha", "1XX21CS001", "5").date("2024-03-05").time("09:15"));
        assert_eq!(
            recent.render(),
            "Asha (1XX21CS001)\n  5 - 2024-03-05 at 09:15\n"
        );
    }
}
