//! Structured logging integration for events
//!
//! Converts domain events into tracing records with structured fields so the
//! subscriber decides formatting (human or JSON) and filtering.

use obae_events::{
    AppEvent, BrowserEvent, DownloadEvent, EventMessage, ExtractionEvent, GeneralEvent,
    OrchestrationEvent,
};
use tracing::{debug, error, info, warn};

/// Log an event at its level with structured fields
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    match &message.event {
        AppEvent::General(event) => match event {
            GeneralEvent::Warning { message, context } => {
                warn!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    context = ?context,
                    "{message}"
                );
            }
            GeneralEvent::Error { message, details } => {
                error!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    details = ?details,
                    "{message}"
                );
            }
            GeneralEvent::DebugLog { message, context } => {
                debug!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    context = ?context,
                    "{message}"
                );
            }
        },

        AppEvent::Download(event) => match event {
            DownloadEvent::Started { url, total_bytes } => {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    url = %url,
                    total_bytes = ?total_bytes,
                    "Download started"
                );
            }
            DownloadEvent::Completed {
                url,
                path,
                bytes_downloaded,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    url = %url,
                    path = %path.display(),
                    bytes_downloaded = bytes_downloaded,
                    "Download completed"
                );
            }
            DownloadEvent::Failed { url, failure } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    url = %url,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Download failed"
                );
            }
        },

        AppEvent::Browser(event) => match event {
            BrowserEvent::Launched => {
                info!(source = meta.source.as_str(), "Headless browser launched");
            }
            BrowserEvent::Navigated { url, status } => {
                debug!(
                    source = meta.source.as_str(),
                    url = %url,
                    status = ?status,
                    "Page loaded"
                );
            }
            BrowserEvent::TriggerClicked { selector } => {
                debug!(
                    source = meta.source.as_str(),
                    selector = %selector,
                    "Download trigger clicked"
                );
            }
            BrowserEvent::DownloadUrlDiscovered {
                url,
                observed_requests,
            } => {
                info!(
                    source = meta.source.as_str(),
                    url = %url,
                    observed_requests = observed_requests,
                    "Download URL discovered"
                );
            }
            BrowserEvent::Closed => {
                debug!(source = meta.source.as_str(), "Headless browser closed");
            }
            BrowserEvent::Failed { step, failure } => {
                error!(
                    source = meta.source.as_str(),
                    step = %step,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Browser step failed"
                );
            }
        },

        AppEvent::Extraction(event) => match event {
            ExtractionEvent::Started { archive } => {
                debug!(
                    source = meta.source.as_str(),
                    archive = %archive.display(),
                    "Extraction started"
                );
            }
            ExtractionEvent::Completed {
                archive,
                entries,
                images,
            } => {
                info!(
                    source = meta.source.as_str(),
                    archive = %archive.display(),
                    entries = entries,
                    images = images,
                    "Extraction completed"
                );
            }
            ExtractionEvent::Failed { archive, failure } => {
                error!(
                    source = meta.source.as_str(),
                    archive = %archive.display(),
                    code = ?failure.code,
                    message = %failure.message,
                    "Extraction failed"
                );
            }
        },

        AppEvent::Orchestration(event) => match event {
            OrchestrationEvent::Started {
                beatmap_id,
                strategy,
                attempts_planned,
            } => {
                info!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    beatmap_id = %beatmap_id,
                    strategy = ?strategy,
                    attempts_planned = attempts_planned,
                    "Download run started"
                );
            }
            OrchestrationEvent::AttemptStarted {
                source,
                url,
                attempt,
                timeout,
            } => {
                info!(
                    correlation = ?meta.correlation_id,
                    attempt_source = %source,
                    url = %url,
                    attempt = attempt,
                    timeout_ms = timeout.as_millis(),
                    "Attempt started"
                );
            }
            OrchestrationEvent::AttemptSucceeded {
                source,
                url,
                elapsed,
            } => {
                info!(
                    correlation = ?meta.correlation_id,
                    attempt_source = %source,
                    url = %url,
                    elapsed_ms = elapsed.as_millis(),
                    "Attempt succeeded"
                );
            }
            OrchestrationEvent::AttemptFailed {
                source,
                url,
                elapsed,
                failure,
            } => {
                warn!(
                    correlation = ?meta.correlation_id,
                    attempt_source = %source,
                    url = %url,
                    elapsed_ms = elapsed.as_millis(),
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    "Attempt failed"
                );
            }
            OrchestrationEvent::Completed {
                beatmap_id,
                name,
                images,
            } => {
                info!(
                    correlation = ?meta.correlation_id,
                    beatmap_id = %beatmap_id,
                    name = %name,
                    images = images,
                    "Download run completed"
                );
            }
            OrchestrationEvent::Failed {
                beatmap_id,
                message,
            } => {
                error!(
                    correlation = ?meta.correlation_id,
                    beatmap_id = %beatmap_id,
                    message = %message,
                    "Download run failed"
                );
            }
        },
    }
}
