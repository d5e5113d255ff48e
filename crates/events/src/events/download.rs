use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FailureContext;

/// Single-file HTTP download events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DownloadEvent {
    /// Response headers received, body streaming begins
    Started {
        url: String,
        total_bytes: Option<u64>,
    },

    /// Body fully written and the file committed
    Completed {
        url: String,
        path: PathBuf,
        bytes_downloaded: u64,
    },

    /// Request or write failed
    Failed {
        url: String,
        failure: FailureContext,
    },
}
