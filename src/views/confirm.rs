//! Confirmation prompts
//!
//! A confirmation is a single awaitable request. Whatever renders it (a
//! modal, a terminal prompt, a test double) only has to say which way the
//! user went.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::Mutex;

/// How a confirmation request was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmChoice {
    /// The user picked the negative button
    Cancelled,
    /// The prompt was closed without a choice
    Dismissed,
    /// The user picked the affirmative button
    Confirmed,
}

impl ConfirmChoice {
    /// Map a dialog result: button index 0 is cancel, 1 is confirm, -1 means
    /// the dialog was dismissed.
    pub fn from_index(index: i32) -> Self {
        match index {
            1 => ConfirmChoice::Confirmed,
            -1 => ConfirmChoice::Dismissed,
            _ => ConfirmChoice::Cancelled,
        }
    }

    pub fn is_confirmed(self) -> bool {
        self == ConfirmChoice::Confirmed
    }
}

/// What to ask the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub title: String,
    pub message: String,
    pub cancel_label: String,
    pub confirm_label: String,
}

impl ConfirmRequest {
    /// The prompt shown before deleting an entry
    pub fn delete_entry() -> Self {
        Self {
            title: "Confirm Delete".to_string(),
            message: "Are you sure you want to delete this entry? This action cannot be undone."
                .to_string(),
            cancel_label: "Cancel".to_string(),
            confirm_label: "Delete".to_string(),
        }
    }
}

/// Something that can put a question to the user
#[async_trait]
pub trait Confirmation: Send + Sync {
    async fn confirm(&self, request: &ConfirmRequest) -> ConfirmChoice;
}

/// Confirms everything without asking (`--yes`)
pub struct AlwaysConfirm;

#[async_trait]
impl Confirmation for AlwaysConfirm {
    async fn confirm(&self, _request: &ConfirmRequest) -> ConfirmChoice {
        ConfirmChoice::Confirmed
    }
}

/// Line-based prompt. `y`/`yes` confirms, end of input dismisses, anything
/// else cancels.
pub struct TerminalConfirm<R> {
    input: Mutex<R>,
}

impl TerminalConfirm<tokio::io::BufReader<tokio::io::Stdin>> {
    /// Prompt on stderr, read the answer from stdin
    pub fn stdin() -> Self {
        Self::new(tokio::io::BufReader::new(tokio::io::stdin()))
    }
}

impl<R> TerminalConfirm<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(input: R) -> Self {
        Self {
            input: Mutex::new(input),
        }
    }
}

#[async_trait]
impl<R> Confirmation for TerminalConfirm<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn confirm(&self, request: &ConfirmRequest) -> ConfirmChoice {
        eprintln!("{}", request.title);
        eprint!(
            "{} [{}: y / {}: N] ",
            request.message, request.confirm_label, request.cancel_label
        );

        let mut line = String::new();
        let mut input = self.input.lock().await;
        match input.read_line(&mut line).await {
            Ok(0) => ConfirmChoice::Dismissed,
            Ok(_) => match line.trim().to_lowercase().as_str() {
                "y" | "yes" => ConfirmChoice::Confirmed,
                _ => ConfirmChoice::Cancelled,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Could not read confirmation");
                ConfirmChoice::Dismissed
            }
        }
    }
}
