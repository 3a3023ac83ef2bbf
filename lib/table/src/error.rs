use thiserror::Error;

/// Errors from the remote table service.
///
/// A transport or server fault is always an `Err`, so callers can tell
/// "the table is empty" apart from "the fetch failed."
#[derive(Debug, Error)]
pub enum TableError {
    /// Non-2xx response from the data service.
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    /// Connection / transport failure.
    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body was not the JSON we expected.
    #[error("decode: {0}")]
    Decode(String),

    /// In-process store failure (lock poisoning, bad patch shape).
    #[error("store: {0}")]
    Store(String),
}
