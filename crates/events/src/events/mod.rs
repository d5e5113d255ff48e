use serde::{Deserialize, Serialize};

use crate::EventSource;
use obae_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether another source might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod browser;
pub mod download;
pub mod extraction;
pub mod general;
pub mod orchestration;

pub use browser::*;
pub use download::*;
pub use extraction::*;
pub use general::*;
pub use orchestration::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, debug)
    General(GeneralEvent),

    /// Single HTTP downloads
    Download(DownloadEvent),

    /// Headless browser automation
    Browser(BrowserEvent),

    /// Archive artwork extraction
    Extraction(ExtractionEvent),

    /// Orchestration runs and per-source attempts
    Orchestration(OrchestrationEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Download(_) => EventSource::DOWNLOAD,
            Self::Browser(_) => EventSource::BROWSER,
            Self::Extraction(_) => EventSource::EXTRACTION,
            Self::Orchestration(_) => EventSource::ORCHESTRATION,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::Error { .. })
            | Self::Download(DownloadEvent::Failed { .. })
            | Self::Browser(BrowserEvent::Failed { .. })
            | Self::Extraction(ExtractionEvent::Failed { .. })
            | Self::Orchestration(OrchestrationEvent::Failed { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. })
            | Self::Orchestration(OrchestrationEvent::AttemptFailed { .. }) => Level::WARN,

            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Browser(BrowserEvent::Navigated { .. } | BrowserEvent::TriggerClicked { .. })
            | Self::Download(DownloadEvent::Started { .. }) => Level::DEBUG,

            _ => Level::INFO,
        }
    }
}
