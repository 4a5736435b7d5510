//! Text rendering of entry lists

use crate::datetime::{format_date, format_time};
use crate::entry::Entry;

/// Shown instead of the table when there is nothing to list
pub const NO_ENTRIES_MESSAGE: &str = "No entries found.";

/// Render entries as a fixed-width table. Dates are normalized to
/// `DD/MM/YYYY`; times are shown as stored unless `twelve_hour` is set.
pub fn render_entries(entries: &[&Entry], twelve_hour: bool) -> String {
    if entries.is_empty() {
        return format!("{}\n", NO_ENTRIES_MESSAGE);
    }

    let mut out = format!(
        "{:<24} {:<14} {:<10} {:<12} {:<10} {}\n",
        "Name", "USN", "Semester", "Entry Date", "Entry Time", "Row"
    );
    out.push_str(&"-".repeat(78));
    out.push('\n');

    for entry in entries {
        let time = if twelve_hour {
            format_time(&entry.entry_time)
        } else {
            entry.entry_time.clone()
        };

        out.push_str(&format!(
            "{:<24} {:<14} {:<10} {:<12} {:<10} {}\n",
            entry.name,
            entry.usn,
            entry.semester,
            format_date(&entry.entry_date),
            time,
            entry.row
        ));
    }

    out
}
