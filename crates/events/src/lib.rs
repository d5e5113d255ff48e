#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in obae
//!
//! Library crates never log or print directly. They emit domain events
//! through an [`EventEmitter`]; the application decides how to render them
//! (tracing records, JSON lines, nothing at all).
//!
//! ## Architecture
//!
//! - **Domain-driven events**: grouped by functional domain (Download, Browser, etc.)
//! - **Unified `EventEmitter` trait**: one API for all emissions
//! - **Metadata envelope**: every event travels with an [`EventMeta`]

pub mod meta;
pub use meta::{EventLevel, EventMeta, EventSource};

pub mod events;
pub use events::{
    AppEvent, BrowserEvent, DownloadEvent, ExtractionEvent, FailureContext, GeneralEvent,
    OrchestrationEvent, Strategy,
};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Event plus the metadata it was emitted with
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    #[must_use]
    pub fn new(meta: EventMeta, event: AppEvent) -> Self {
        Self { meta, event }
    }
}

/// Type alias for the event sender
pub type EventSender = UnboundedSender<EventMessage>;

/// Type alias for the event receiver
pub type EventReceiver = UnboundedReceiver<EventMessage>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events throughout obae
///
/// Implemented for a raw `EventSender` and for any context struct that
/// holds an optional one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Correlation identifier stamped onto every emitted event, if any
    fn correlation_id(&self) -> Option<&str> {
        None
    }

    /// Adjust metadata before the event leaves this emitter
    fn enrich_event_meta(&self, _event: &AppEvent, meta: &mut EventMeta) {
        if meta.correlation_id.is_none() {
            if let Some(id) = self.correlation_id() {
                meta.correlation_id = Some(id.to_string());
            }
        }
    }

    /// Emit an event with explicit metadata
    fn emit_with_meta(&self, meta: EventMeta, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Receiver may already be gone; emission is best effort
            let _ = sender.send(EventMessage::new(meta, event));
        }
    }

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        let mut meta = EventMeta::new(event.log_level(), event.event_source());
        self.enrich_event_meta(&event, &mut meta);
        self.emit_with_meta(meta, event);
    }

    /// Emit a debug log event
    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    /// Emit an error event
    fn emit_error(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::error(message)));
    }

    /// Emit a download started event
    fn emit_download_started(&self, url: impl Into<String>, total_bytes: Option<u64>) {
        self.emit(AppEvent::Download(DownloadEvent::Started {
            url: url.into(),
            total_bytes,
        }));
    }

    /// Emit a download completed event
    fn emit_download_completed(
        &self,
        url: impl Into<String>,
        path: std::path::PathBuf,
        bytes_downloaded: u64,
    ) {
        self.emit(AppEvent::Download(DownloadEvent::Completed {
            url: url.into(),
            path,
            bytes_downloaded,
        }));
    }

    /// Emit a download failed event classified from `error`
    fn emit_download_failed<E>(&self, url: impl Into<String>, error: &E)
    where
        E: obae_errors::UserFacingError + ?Sized,
    {
        self.emit(AppEvent::Download(DownloadEvent::Failed {
            url: url.into(),
            failure: FailureContext::from_error(error),
        }));
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}
