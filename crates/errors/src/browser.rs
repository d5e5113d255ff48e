//! Browser automation error types
//!
//! These cover both the automation environment (the browser failing to start
//! or talk to us) and the authentication signals we read off the official
//! beatmap page.

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum BrowserError {
    #[error(
        "failed to launch headless browser: {message}. Install Chromium or Google Chrome, \
         or set browser.executable to a Chromium binary"
    )]
    LaunchFailed { message: String },

    #[error("browser protocol error: {message}")]
    Protocol { message: String },

    #[error("browser connection closed")]
    Disconnected,

    #[error("beatmap not found")]
    PageNotFound { url: String },

    #[error("navigation to {url} failed: {message}")]
    NavigationFailed { url: String, message: String },

    #[error("unable to find download button, check cookie value")]
    TriggerNotFound { selector: String },

    #[error("no download URL matching {pattern} was requested after clicking download")]
    DownloadUrlNotDiscovered { pattern: String },
}

impl UserFacingError for BrowserError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::LaunchFailed { .. } => {
                Some("Set OBAE_CHROMIUM to the browser path if it lives outside PATH.")
            }
            Self::Protocol { .. } | Self::Disconnected => {
                Some("The headless browser stopped responding; check the browser installation.")
            }
            Self::TriggerNotFound { .. } | Self::DownloadUrlNotDiscovered { .. } => {
                Some("The session cookie is likely expired; copy a fresh osu_session value.")
            }
            Self::PageNotFound { .. } => Some("Double-check the beatmap set ID."),
            Self::NavigationFailed { .. } => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::NavigationFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::LaunchFailed { .. } => "browser.launch_failed",
            Self::Protocol { .. } => "browser.protocol",
            Self::Disconnected => "browser.disconnected",
            Self::PageNotFound { .. } => "browser.page_not_found",
            Self::NavigationFailed { .. } => "browser.navigation_failed",
            Self::TriggerNotFound { .. } => "browser.trigger_not_found",
            Self::DownloadUrlNotDiscovered { .. } => "browser.download_url_not_discovered",
        };
        Some(code)
    }
}
