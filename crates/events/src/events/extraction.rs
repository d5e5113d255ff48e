use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FailureContext;

/// Archive artwork extraction events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExtractionEvent {
    Started {
        archive: PathBuf,
    },

    Completed {
        archive: PathBuf,
        entries: usize,
        images: usize,
    },

    Failed {
        archive: PathBuf,
        failure: FailureContext,
    },
}
