//! CSV bulk submission
//!
//! Reads a CSV of entries to submit one after another. Columns are matched
//! by header, ignoring case, spaces and underscores, so both `entryDate` and
//! `Entry Date` work. Unknown columns become extra form fields.

use std::path::Path;

use crate::datetime::FormDefaults;
use crate::entry::NewEntry;

/// Result of reading a bulk submission file
#[derive(Debug)]
pub struct BulkImport {
    pub entries: Vec<NewEntry>,
    pub rows_processed: usize,
    pub rows_failed: usize,
    pub errors: Vec<String>,
}

/// Known columns
#[derive(Debug, Clone, PartialEq, Eq)]
enum Column {
    Name,
    Usn,
    Semester,
    EntryDate,
    EntryTime,
    Extra(String),
}

impl Column {
    fn from_header(header: &str) -> Self {
        let key: String = header
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_lowercase();

        match key.as_str() {
            "name" => Column::Name,
            "usn" => Column::Usn,
            "semester" => Column::Semester,
            "entrydate" | "date" => Column::EntryDate,
            "entrytime" | "time" => Column::EntryTime,
            _ => Column::Extra(header.trim().to_string()),
        }
    }
}

/// Read entries from a CSV file. Empty date or time cells take the form
/// defaults.
pub fn read_submissions(path: &Path, defaults: &FormDefaults) -> Result<BulkImport, csv::Error> {
    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    read_from(reader, defaults)
}

fn read_from<R: std::io::Read>(
    mut reader: csv::Reader<R>,
    defaults: &FormDefaults,
) -> Result<BulkImport, csv::Error> {
    let columns: Vec<Column> = reader.headers()?.iter().map(Column::from_header).collect();

    let mut result = BulkImport {
        entries: Vec::new(),
        rows_processed: 0,
        rows_failed: 0,
        errors: Vec::new(),
    };

    for (idx, record) in reader.records().enumerate() {
        result.rows_processed += 1;
        let line = idx + 2;

        let record = match record {
            Ok(r) => r,
            Err(e) => {
                result.rows_failed += 1;
                result.errors.push(format!("Row {}: {}", line, e));
                continue;
            }
        };

        let mut entry = NewEntry::default();
        for (column, value) in columns.iter().zip(record.iter()) {
            match column {
                Column::Name => entry.name = value.to_string(),
                Column::Usn => entry.usn = value.to_string(),
                Column::Semester => entry.semester = value.to_string(),
                Column::EntryDate => entry.entry_date = value.to_string(),
                Column::EntryTime => entry.entry_time = value.to_string(),
                Column::Extra(key) => {
                    entry.extra.insert(key.clone(), value.to_string());
                }
            }
        }

        if entry.name.is_empty() && entry.usn.is_empty() {
            result.rows_failed += 1;
            result
                .errors
                .push(format!("Row {}: missing both name and USN", line));
            continue;
        }

        if entry.entry_date.is_empty() {
            entry.entry_date = defaults.date.clone();
        }
        if entry.entry_time.is_empty() {
            entry.entry_time = defaults.time.clone();
        }

        result.entries.push(entry);
    }

    tracing::debug!(
        rows = result.rows_processed,
        failed = result.rows_failed,
        "Read bulk submission file"
    );

    Ok(result)
}
