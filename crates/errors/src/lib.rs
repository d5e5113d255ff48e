#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for the obae download subsystem
//!
//! This crate provides fine-grained error types organized by failure class:
//! transport, local storage, browser automation, archive decoding,
//! configuration and user input. All error types implement Clone so attempt
//! results can be logged and returned without losing the original.

use std::borrow::Cow;

use thiserror::Error;

pub mod archive;
pub mod browser;
pub mod config;
pub mod input;
pub mod network;
pub mod storage;

// Re-export all error types at the root
pub use archive::ArchiveError;
pub use browser::BrowserError;
pub use config::ConfigError;
pub use input::InputError;
pub use network::NetworkError;
pub use storage::StorageError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("input error: {0}")]
    Input(#[from] InputError),
}

impl Error {
    /// Create a storage error for an I/O failure on a known path
    pub fn io_with_path(err: &std::io::Error, path: impl AsRef<std::path::Path>) -> Self {
        Self::Storage(StorageError::from_io_with_path(err, path.as_ref()))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.into())
    }
}

/// Result type alias for obae operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information without
/// requiring heavyweight envelopes.
pub trait UserFacingError {
    /// Short message suitable for direct display.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether moving on to another source is likely to succeed.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable error code for structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Network(err) => err.user_message(),
            Error::Storage(err) => err.user_message(),
            Error::Browser(err) => err.user_message(),
            Error::Archive(err) => err.user_message(),
            Error::Input(err) => err.user_message(),
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Network(err) => err.user_hint(),
            Error::Storage(err) => err.user_hint(),
            Error::Browser(err) => err.user_hint(),
            Error::Archive(err) => err.user_hint(),
            Error::Config(err) => err.user_hint(),
            Error::Input(err) => err.user_hint(),
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Error::Network(err) => err.is_retryable(),
            Error::Storage(err) => err.is_retryable(),
            Error::Browser(err) => err.is_retryable(),
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Network(err) => err.user_code(),
            Error::Storage(err) => err.user_code(),
            Error::Browser(err) => err.user_code(),
            Error::Archive(err) => err.user_code(),
            Error::Config(err) => err.user_code(),
            Error::Input(err) => err.user_code(),
        }
    }
}
