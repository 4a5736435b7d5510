//! # Lab Entry
//!
//! Client for recording and browsing lab attendance entries kept in a
//! spreadsheet behind a script endpoint.
//!
//! ## Modules
//!
//! - [`entry`]: Entry types as stored and as submitted
//! - [`datetime`]: Date/time normalization for display and form defaults
//! - [`filter`]: Search and semester filtering over a loaded list
//! - [`remote`]: The `EntryStore` seam and its HTTP implementation
//! - [`views`]: Submission and browser controllers
//! - [`export`]: CSV export
//! - [`bulk`]: CSV bulk submission
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use labentry::remote::{ScriptClient, ScriptConfig};
//! use labentry::views::{AlwaysConfirm, BrowserView};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ScriptClient::new(ScriptConfig::default())?;
//!     let mut browser = BrowserView::new(client);
//!
//!     if let Err(notice) = browser.load().await {
//!         eprintln!("{}", notice);
//!     }
//!
//!     browser.set_semester("5");
//!     print!("{}", browser.render(false));
//!
//!     let outcome = browser.delete(7, &AlwaysConfirm).await;
//!     println!("{:?}", outcome);
//!
//!     Ok(())
//! }
//! ```

pub mod bulk;
pub mod config;
pub mod datetime;
pub mod entry;
pub mod export;
pub mod filter;
pub mod logging;
pub mod remote;
pub mod views;

// Re-export top-level types for convenience
pub use entry::{Entry, NewEntry};

pub use datetime::{format_date, format_time, long_date, FormDefaults, ParsedDate, ParsedTime};

pub use filter::EntryFilter;

pub use remote::{EntryStore, RemoteError, ScriptClient, ScriptConfig};

pub use views::{
    BrowserView, ConfirmChoice, Confirmation, DeleteOutcome, Notice, NoticeLevel, SubmissionView,
};

pub use export::{entries_to_csv, export_file_name, ExportError};

pub use config::{Config, ConfigError, EndpointConfig, LoggingConfig, ViewsConfig};
