//! Views
//!
//! The two screens of the lab entry client, as plain controllers:
//!
//! - **SubmissionView**: the entry form and the session's recent entries
//! - **BrowserView**: the loaded entry table with filtering, delete and export
//!
//! Controllers own their state and return `Notice`s; rendering to a terminal
//! (or anything else) is up to the caller.

pub mod browser;
pub mod confirm;
pub mod notice;
pub mod submission;
pub mod table;

pub use browser::{BrowserView, DeleteOutcome, DeletePhase, LoadState};
pub use confirm::{AlwaysConfirm, ConfirmChoice, ConfirmRequest, Confirmation, TerminalConfirm};
pub use notice::{Notice, NoticeLevel};
pub use submission::{RecentEntries, SubmissionView, SubmitState, DEFAULT_RECENT_LIMIT};
pub use table::render_entries;
