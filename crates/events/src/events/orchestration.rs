use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::FailureContext;

/// Which source family an orchestration run is using
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Official,
    Mirrors,
}

/// Lifecycle of one orchestration run and its individual attempts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OrchestrationEvent {
    Started {
        beatmap_id: String,
        strategy: Strategy,
        attempts_planned: usize,
    },

    AttemptStarted {
        source: String,
        url: String,
        attempt: usize,
        timeout: Duration,
    },

    AttemptSucceeded {
        source: String,
        url: String,
        elapsed: Duration,
    },

    /// Attempt failed; for mirrors the run moves on to the next one
    AttemptFailed {
        source: String,
        url: String,
        elapsed: Duration,
        failure: FailureContext,
    },

    Completed {
        beatmap_id: String,
        name: String,
        images: usize,
    },

    Failed {
        beatmap_id: String,
        message: String,
    },
}
