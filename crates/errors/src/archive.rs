//! Archive decoding error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ArchiveError {
    #[error("failed to open archive {path}: {message}")]
    OpenFailed { path: String, message: String },

    #[error("corrupt archive {path}: {message}")]
    Corrupt { path: String, message: String },

    #[error("failed to read entry {entry}: {message}")]
    EntryReadFailed { entry: String, message: String },

    #[error("extraction task failed: {message}")]
    TaskFailed { message: String },
}

impl UserFacingError for ArchiveError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Corrupt { .. } | Self::EntryReadFailed { .. } => {
                Some("The downloaded beatmap is damaged; request it again.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::OpenFailed { .. } => "archive.open_failed",
            Self::Corrupt { .. } => "archive.corrupt",
            Self::EntryReadFailed { .. } => "archive.entry_read_failed",
            Self::TaskFailed { .. } => "archive.task_failed",
        };
        Some(code)
    }
}
