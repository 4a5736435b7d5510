//! Spreadsheet Script Endpoint Client
//!
//! HTTP client for the script endpoint that owns the entry spreadsheet.
//! The endpoint reports failures in-band (`result != "success"`), so bodies
//! are decoded regardless of the HTTP status.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::entry::{decode_entries, Entry, NewEntry};

/// Default endpoint used when nothing is configured
pub const DEFAULT_ENDPOINT_URL: &str = "https://script.google.com/macros/s/AKfycbzah8QmZIvl1l606SsZgfMsyddxGECOlAnq48yczgP3XPNrsU_DjXIPPunP0NsRzvPtPg/exec";

/// Where entries are persisted
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Fetch every stored entry
    async fn fetch_entries(&self) -> Result<Vec<Entry>, RemoteError>;

    /// Append a new entry
    async fn submit_entry(&self, entry: &NewEntry) -> Result<(), RemoteError>;

    /// Remove the entry stored at `row`
    async fn delete_entry(&self, row: u64) -> Result<(), RemoteError>;
}

/// Configuration for the script client
#[derive(Debug, Clone)]
pub struct ScriptConfig {
    /// Deployed script URL (the `/exec` endpoint)
    pub url: String,
    /// Request timeout in seconds. `None` waits indefinitely.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENDPOINT_URL.to_string(),
            request_timeout_secs: None,
        }
    }
}

/// Script endpoint client
pub struct ScriptClient {
    client: Client,
    config: ScriptConfig,
}

impl ScriptClient {
    /// Create a new client with the given configuration
    pub fn new(config: ScriptConfig) -> Result<Self, RemoteError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        let client = builder.build().map_err(RemoteError::Transport)?;

        Ok(Self { client, config })
    }

    /// Read the body as text and decode the result envelope
    async fn read_envelope(response: reqwest::Response) -> Result<ScriptResponse, RemoteError> {
        let status = response.status();
        let text = response.text().await.map_err(RemoteError::Transport)?;

        serde_json::from_str(&text).map_err(|e| {
            tracing::warn!(status = %status, error = %e, "Endpoint returned a non-JSON body");
            RemoteError::Decode(e)
        })
    }
}

#[async_trait]
impl EntryStore for ScriptClient {
    async fn fetch_entries(&self) -> Result<Vec<Entry>, RemoteError> {
        tracing::debug!(url = %self.config.url, "Fetching entries");

        let response = self
            .client
            .get(&self.config.url)
            .query(&[("action", "getEntries")])
            .send()
            .await
            .map_err(RemoteError::Transport)?;

        let envelope = Self::read_envelope(response).await?.into_result()?;
        let entries = decode_entries(envelope.entries.unwrap_or_default());

        tracing::info!(count = entries.len(), "Fetched entries");
        Ok(entries)
    }

    async fn submit_entry(&self, entry: &NewEntry) -> Result<(), RemoteError> {
        tracing::debug!(usn = %entry.usn, "Submitting entry");

        let response = self
            .client
            .post(&self.config.url)
            .form(&entry.form_fields())
            .send()
            .await
            .map_err(RemoteError::Transport)?;

        Self::read_envelope(response).await?.into_result()?;

        tracing::info!(usn = %entry.usn, "Entry submitted");
        Ok(())
    }

    async fn delete_entry(&self, row: u64) -> Result<(), RemoteError> {
        tracing::debug!(row, "Deleting entry");

        let row_text = row.to_string();
        let response = self
            .client
            .post(&self.config.url)
            .form(&[("action", "deleteEntry"), ("row", row_text.as_str())])
            .send()
            .await
            .map_err(RemoteError::Transport)?;

        Self::read_envelope(response).await?.into_result()?;

        tracing::info!(row, "Entry deleted");
        Ok(())
    }
}

// ============================================
// Response envelope
// ============================================

#[derive(Debug, Deserialize)]
struct ScriptResponse {
    #[serde(default)]
    result: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    entries: Option<Vec<serde_json::Value>>,
}

impl ScriptResponse {
    fn into_result(self) -> Result<Self, RemoteError> {
        if self.result == "success" {
            Ok(self)
        } else {
            Err(RemoteError::Rejected {
                message: self.error.filter(|m| !m.is_empty()),
            })
        }
    }
}

// ============================================
// Errors
// ============================================

/// Errors that can occur when talking to the script endpoint
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The endpoint answered but reported a failure
    #[error("Endpoint rejected the request: {}", .message.as_deref().unwrap_or("no detail"))]
    Rejected { message: Option<String> },

    /// Connection, TLS or timeout failure
    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The body was not the expected JSON
    #[error("Malformed response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl RemoteError {
    /// Server-supplied detail, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            RemoteError::Rejected { message } => message.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Form, Query},
        routing::get,
        Router,
    };
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

    /// Serve a stand-in for the script endpoint on a random local port
    async fn spawn_endpoint(get_body: &'static str, post_body: &'static str) -> (String, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let seen_get = Arc::clone(&seen);
        let seen_post = Arc::clone(&seen);

        let app = Router::new().route(
            "/exec",
            get(move |Query(params): Query<HashMap<String, String>>| {
                let seen = Arc::clone(&seen_get);
                async move {
                    seen.lock().unwrap().push(params);
                    get_body
                }
            })
            .post(move |Form(params): Form<HashMap<String, String>>| {
                let seen = Arc::clone(&seen_post);
                async move {
                    seen.lock().unwrap().push(params);
                    post_body
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/exec", addr), seen)
    }

    fn client_for(url: String) -> ScriptClient {
        ScriptClient::new(ScriptConfig {
            url,
            request_timeout_secs: Some(5),
        })
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = ScriptConfig::default();
        assert_eq!(config.url, DEFAULT_ENDPOINT_URL);
        assert!(config.request_timeout_secs.is_none());
    }

    #[tokio::test]
    async fn test_fetch_entries() {
        let body = r#"{"result":"success","entries":[
            {"name":"Asha","usn":"1XX21CS001","semester":"5","entryDate":"2024-03-05","entryTime":"09:15","row":2},
            {"name":"Ravi","usn":"1XX21CS002","semester":"5","entryDate":"3/5/2024","entryTime":"10:00","row":3}
        ]}"#;
        let (url, seen) = spawn_endpoint(body, "{}").await;

        let entries = client_for(url).fetch_entries().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].row, 3);

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].get("action").map(String::as_str), Some("getEntries"));
    }

    #[tokio::test]
    async fn test_fetch_keeps_rows_around_an_unreadable_entry() {
        let body = r#"{"result":"success","entries":[
            {"name":"Asha","usn":"1XX21CS001","row":2},
            {"name":"Ravi","usn":"1XX21CS002"},
            {"name":"Meera","usn":"1XX22EC010","row":"4"}
        ]}"#;
        let (url, _) = spawn_endpoint(body, "{}").await;

        let entries = client_for(url).fetch_entries().await.unwrap();
        let rows: Vec<u64> = entries.iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![2, 4]);
    }

    #[tokio::test]
    async fn test_fetch_success_without_entries_is_empty() {
        let (url, _) = spawn_endpoint(r#"{"result":"success"}"#, "{}").await;
        let entries = client_for(url).fetch_entries().await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_rejected() {
        let (url, _) = spawn_endpoint(r#"{"result":"error"}"#, "{}").await;
        let err = client_for(url).fetch_entries().await.unwrap_err();
        assert!(matches!(err, RemoteError::Rejected { message: None }));
        assert_eq!(err.server_message(), None);
    }

    #[tokio::test]
    async fn test_submit_sends_form_fields() {
        let (url, seen) = spawn_endpoint("{}", r#"{"result":"success"}"#).await;

        let entry = NewEntry::new("Asha", "1XX21CS001", "5")
            .date("2024-03-05")
            .time("09:15")
            .field("lab", "Networks");
        client_for(url).submit_entry(&entry).await.unwrap();

        let seen = seen.lock().unwrap();
        let form = &seen[0];
        assert_eq!(form.get("name").map(String::as_str), Some("Asha"));
        assert_eq!(form.get("entryDate").map(String::as_str), Some("2024-03-05"));
        assert_eq!(form.get("entryTime").map(String::as_str), Some("09:15"));
        assert_eq!(form.get("lab").map(String::as_str), Some("Networks"));
    }

    #[tokio::test]
    async fn test_submit_rejected_carries_server_message() {
        let (url, _) =
            spawn_endpoint("{}", r#"{"result":"error","error":"Sheet is locked"}"#).await;

        let err = client_for(url)
            .submit_entry(&NewEntry::new("A", "1", "S1"))
            .await
            .unwrap_err();
        assert_eq!(err.server_message(), Some("Sheet is locked"));
    }

    #[tokio::test]
    async fn test_delete_sends_action_and_row() {
        let (url, seen) = spawn_endpoint("{}", r#"{"result":"success"}"#).await;

        client_for(url).delete_entry(42).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].get("action").map(String::as_str), Some("deleteEntry"));
        assert_eq!(seen[0].get("row").map(String::as_str), Some("42"));
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let (url, _) = spawn_endpoint("<html>Moved</html>", "{}").await;
        let err = client_for(url).fetch_entries().await.unwrap_err();
        assert!(matches!(err, RemoteError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(format!("http://{}/exec", addr))
            .delete_entry(1)
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Transport(_)));
    }
}
