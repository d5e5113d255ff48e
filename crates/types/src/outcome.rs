//! Results produced by download attempts and whole orchestration runs

use std::path::PathBuf;
use std::time::Duration;

use obae_errors::{Error, UserFacingError};

use crate::ExtractedImage;

/// Archive written to the working directory by a successful attempt
///
/// Ownership of the file moves with this value: whoever holds it is
/// responsible for deleting the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedArchive {
    pub path: PathBuf,
    /// File stem of the saved archive, used as the display name
    pub name: String,
}

impl DownloadedArchive {
    /// Build from a saved path, deriving the display name from its stem
    #[must_use]
    pub fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name }
    }
}

/// Outcome of one attempt against one source
pub type AttemptOutcome = Result<DownloadedArchive, Error>;

/// One entry of the orchestrator's per-attempt log
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    /// `official` or the mirror name
    pub source: String,
    pub url: String,
    pub elapsed: Duration,
    /// `None` on success, otherwise the classified failure
    pub failure: Option<String>,
}

impl AttemptRecord {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

/// Terminal outcome of a full orchestration run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrchestrationResult {
    /// Download and extraction completed; `images` may be empty
    Success {
        name: String,
        images: Vec<ExtractedImage>,
    },
    /// Short message suitable for direct display
    Failure { message: String },
}

impl OrchestrationResult {
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    /// Failure carrying the classified message of `err`
    #[must_use]
    pub fn from_error(err: &Error) -> Self {
        Self::failure(err.user_message().into_owned())
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Extracted images on success
    #[must_use]
    pub fn images(&self) -> Option<&[ExtractedImage]> {
        match self {
            Self::Success { images, .. } => Some(images),
            Self::Failure { .. } => None,
        }
    }

    /// Failure message, if any
    #[must_use]
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Failure { message } => Some(message),
            Self::Success { .. } => None,
        }
    }
}
