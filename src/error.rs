//! Error types for mailman operations.

use thiserror::Error;

/// Errors that can occur while inlining or sending mail.
///
/// Malformed CSS is never an error; it is skipped and reported through
/// [`Diagnostics`](crate::inline::Diagnostics).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Input too large: {len} bytes exceeds the limit of {limit}")]
    InputTooLarge { len: usize, limit: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Failed to render view {view}: {message}")]
    Render { view: String, message: String },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Cannot build message: {0}")]
    Build(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Queue error: {0}")]
    Queue(String),
}

pub type Result<T> = std::result::Result<T, Error>;
