//! CSV export of loaded entries
//!
//! Fields are wrapped in double quotes but quotes inside a field are written
//! as-is, so a value containing `"` produces a malformed row.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::entry::Entry;

pub const CSV_HEADER: &str = "Name,USN,Semester,Entry Date,Entry Time";

/// Format entries as CSV. Returns `None` when there is nothing to export.
pub fn entries_to_csv(entries: &[Entry]) -> Option<String> {
    if entries.is_empty() {
        return None;
    }

    let mut csv = String::from(CSV_HEADER);
    for entry in entries {
        csv.push('\n');
        csv.push_str(&format!(
            "\"{}\",\"{}\",\"{}\",\"{}\",\"{}\"",
            entry.name, entry.usn, entry.semester, entry.entry_date, entry.entry_time
        ));
    }

    Some(csv)
}

/// `entries_<YYYY-MM-DD>.csv`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("entries_{}.csv", date.format("%Y-%m-%d"))
}

/// Write the export into `dir`, named for `date`. Returns the written path,
/// or `None` if the list was empty and nothing was written.
pub fn write_export(
    dir: &Path,
    entries: &[Entry],
    date: NaiveDate,
) -> Result<Option<PathBuf>, ExportError> {
    let Some(csv) = entries_to_csv(entries) else {
        tracing::debug!("Nothing to export");
        return Ok(None);
    };

    let path = dir.join(export_file_name(date));
    std::fs::write(&path, csv).map_err(|e| ExportError::Write {
        path: path.clone(),
        error: e,
    })?;

    tracing::info!(path = ?path, count = entries.len(), "Exported entries");
    Ok(Some(path))
}

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write export file {path:?}: {error}")]
    Write {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entry(name: &str, usn: &str, semester: &str, date: &str, time: &str, row: u64) -> Entry {
        Entry {
            name: name.to_string(),
            usn: usn.to_string(),
            semester: semester.to_string(),
            entry_date: date.to_string(),
            entry_time: time.to_string(),
            row,
        }
    }

    #[test]
    fn test_single_entry_exact_output() {
        let entries = vec![entry("A", "1", "S1", "d1", "t1", 2)];
        assert_eq!(
            entries_to_csv(&entries).unwrap(),
            "Name,USN,Semester,Entry Date,Entry Time\n\"A\",\"1\",\"S1\",\"d1\",\"t1\""
        );
    }

    #[test]
    fn test_empty_list_is_noop() {
        assert_eq!(entries_to_csv(&[]), None);

        let dir = tempdir().unwrap();
        let written = write_export(dir.path(), &[], NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
            .unwrap();
        assert!(written.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_export_reads_back_as_csv() {
        let entries = vec![
            entry("Rao, Asha", "1XX21CS001", "5", "2024-03-05", "09:15", 2),
            entry("Ravi", "1XX21CS002", "5", "3/5/2024", "10:00", 3),
        ];
        let text = entries_to_csv(&entries).unwrap();

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), 5);

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][0], "Rao, Asha");
        assert_eq!(&records[1][3], "3/5/2024");
    }

    #[test]
    fn test_embedded_quotes_are_not_escaped() {
        let entries = vec![entry("Asha \"AR\" Rao", "1", "5", "d", "t", 2)];
        let text = entries_to_csv(&entries).unwrap();
        assert!(text.ends_with("\"Asha \"AR\" Rao\",\"1\",\"5\",\"d\",\"t\""));
    }

    #[test]
    fn test_write_export_names_file_by_date() {
        let dir = tempdir().unwrap();
        let entries = vec![entry("A", "1", "S1", "d1", "t1", 2)];

        let path = write_export(dir.path(), &entries, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
            .unwrap()
            .unwrap();

        assert_eq!(path.file_name().unwrap(), "entries_2024-03-05.csv");
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, entries_to_csv(&entries).unwrap());
    }

    #[test]
    fn test_write_export_missing_dir_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let entries = vec![entry("A", "1", "S1", "d1", "t1", 2)];

        let err = write_export(&missing, &entries, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
            .unwrap_err();
        assert!(matches!(err, ExportError::Write { .. }));
    }
}
