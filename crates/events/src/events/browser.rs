use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Headless browser session events for the official source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BrowserEvent {
    /// Browser process started and connected
    Launched,

    /// Page navigation finished
    Navigated { url: String, status: Option<u16> },

    /// Download trigger clicked
    TriggerClicked { selector: String },

    /// Signed download URL recovered from outgoing requests
    DownloadUrlDiscovered {
        url: String,
        observed_requests: usize,
    },

    /// Browser released
    Closed,

    /// A browser step failed
    Failed { step: String, failure: FailureContext },
}
