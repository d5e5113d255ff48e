//! Integration tests for events

use obae_events::*;
use obae_errors::{Error, NetworkError};
use std::time::Duration;

#[tokio::test]
async fn emitter_helpers_reach_the_receiver() {
    let (tx, mut rx) = channel();

    tx.emit_error("test error");
    tx.emit_debug("test debug");

    let first = rx.recv().await.unwrap();
    assert!(matches!(
        first.event,
        AppEvent::General(GeneralEvent::Error { .. })
    ));
    assert_eq!(first.meta.level, EventLevel::Error);
    assert_eq!(first.meta.source, EventSource::GENERAL);

    let second = rx.recv().await.unwrap();
    assert!(matches!(
        second.event,
        AppEvent::General(GeneralEvent::DebugLog { .. })
    ));
    assert_eq!(second.meta.level, EventLevel::Debug);
}

#[tokio::test]
async fn dropped_receiver_does_not_panic() {
    let (tx, rx) = channel();
    drop(rx);

    tx.emit_warning("ignored");
}

#[test]
fn attempt_failure_is_a_warning_and_run_failure_is_an_error() {
    let attempt = AppEvent::Orchestration(OrchestrationEvent::AttemptFailed {
        source: "nerinyan".into(),
        url: "https://api.nerinyan.moe/d/1".into(),
        elapsed: Duration::from_millis(5),
        failure: FailureContext::new(None::<String>, "boom", None::<String>, true),
    });
    assert_eq!(attempt.log_level(), tracing::Level::WARN);
    assert_eq!(attempt.event_source(), EventSource::ORCHESTRATION);

    let run = AppEvent::Orchestration(OrchestrationEvent::Failed {
        beatmap_id: "1".into(),
        message: "All configured mirrors failed to provide the beatmap".into(),
    });
    assert_eq!(run.log_level(), tracing::Level::ERROR);
}

#[test]
fn failure_context_carries_error_code_and_retryability() {
    let err: Error = NetworkError::NotFound {
        url: "https://osu.direct/api/d/1".into(),
    }
    .into();
    let ctx = FailureContext::from_error(&err);
    assert_eq!(ctx.code.as_deref(), Some("network.not_found"));
    assert!(ctx.message.contains("osu.direct"));
    assert!(ctx.retryable);
}

struct Correlated {
    tx: EventSender,
}

impl EventEmitter for Correlated {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }

    fn correlation_id(&self) -> Option<&str> {
        Some("123456")
    }
}

#[tokio::test]
async fn correlation_id_is_stamped_on_emitted_events() {
    let (tx, mut rx) = channel();
    let emitter = Correlated { tx };

    emitter.emit(AppEvent::Browser(BrowserEvent::Closed));

    let message = rx.recv().await.unwrap();
    assert_eq!(message.meta.correlation_id.as_deref(), Some("123456"));
    assert_eq!(message.meta.source, EventSource::BROWSER);
}

#[test]
fn app_event_serializes_with_domain_tag() {
    let event = AppEvent::Extraction(ExtractionEvent::Started {
        archive: "a.zip".into(),
    });
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["domain"], "extraction");
    assert_eq!(json["event"]["type"], "Started");
}
