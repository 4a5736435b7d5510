//! Core data types for lab entries
//!
//! - `Entry`: one record as returned by the spreadsheet endpoint
//! - `NewEntry`: the client-known fields of a record before submission
//!
//! The endpoint is loose about types: cells may be missing, dates may come
//! back as timestamps and `row` may be a number or a numeric string. The
//! deserializers here absorb that so the rest of the crate sees plain strings.

use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A lab entry stored in the backing spreadsheet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default, deserialize_with = "loose_string")]
    pub name: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub usn: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub semester: String,
    /// Either `YYYY-MM-DD`, `M/D/YYYY` or an ISO timestamp
    #[serde(default, deserialize_with = "loose_string")]
    pub entry_date: String,
    /// `HH:MM`, 24-hour
    #[serde(default, deserialize_with = "loose_string")]
    pub entry_time: String,
    /// Spreadsheet row, assigned by the store. Sole key for deletion.
    #[serde(deserialize_with = "loose_row")]
    pub row: u64,
}

/// An entry as entered by the user, before the store assigns it a row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewEntry {
    pub name: String,
    pub usn: String,
    pub semester: String,
    pub entry_date: String,
    pub entry_time: String,
    /// Additional form fields passed through to the endpoint untouched
    pub extra: BTreeMap<String, String>,
}

impl NewEntry {
    /// Create a new entry with the given identity fields and empty date/time
    pub fn new(
        name: impl Into<String>,
        usn: impl Into<String>,
        semester: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            usn: usn.into(),
            semester: semester.into(),
            ..Default::default()
        }
    }

    /// Builder method: set the entry date
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.entry_date = date.into();
        self
    }

    /// Builder method: set the entry time
    pub fn time(mut self, time: impl Into<String>) -> Self {
        self.entry_time = time.into();
        self
    }

    /// Builder method: add an extra form field
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Form fields in submission order. Extra fields never shadow the
    /// named ones.
    pub fn form_fields(&self) -> Vec<(&str, &str)> {
        let mut fields = vec![
            ("name", self.name.as_str()),
            ("usn", self.usn.as_str()),
            ("semester", self.semester.as_str()),
            ("entryDate", self.entry_date.as_str()),
            ("entryTime", self.entry_time.as_str()),
        ];

        for (key, value) in &self.extra {
            if !fields.iter().any(|(k, _)| k == key) {
                fields.push((key.as_str(), value.as_str()));
            }
        }

        fields
    }
}

/// Decode entries one at a time, skipping any that cannot be read (most
/// often a record with no usable `row`).
pub fn decode_entries(values: Vec<serde_json::Value>) -> Vec<Entry> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(idx, value)| match Entry::deserialize(&value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(index = idx, error = %e, "Skipping unreadable entry");
                None
            }
        })
        .collect()
}

fn loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

fn loose_row<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match &value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .ok_or_else(|| de::Error::custom(format!("invalid row number: {}", n))),
        serde_json::Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid row number: {:?}", s))),
        other => Err(de::Error::custom(format!("invalid row number: {}", other))),
    }
}
