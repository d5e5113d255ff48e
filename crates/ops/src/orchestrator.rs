//! Source selection, mirror fallback and extraction for one beatmap

use crate::sources::{ImageExtractor, MirrorFetcher, OfficialSource};
use obae_config::{Config, MirrorsConfig, OfficialConfig};
use obae_errors::{Error, NetworkError, StorageError, UserFacingError};
use obae_events::{
    AppEvent, EventEmitter, EventMeta, EventSender, FailureContext, GeneralEvent,
    OrchestrationEvent, Strategy,
};
use obae_types::{
    AttemptRecord, BeatmapId, DownloadedArchive, MirrorSource, OrchestrationResult,
    SessionCredential,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Shown when the working directory cannot be prepared
pub const WORKING_DIR_FAILED: &str = "Unable to create working directory before downloading beatmap";

/// Shown when no mirror produced the archive
pub const ALL_MIRRORS_FAILED: &str = "All configured mirrors failed to provide the beatmap";

/// Source label used for the official attempt in logs and events
pub const OFFICIAL_SOURCE: &str = "official";

/// Drives one download-and-extract run per call
///
/// Holds only read-only configuration and shared components, so a single
/// instance can serve concurrent runs from different tasks.
#[derive(Clone)]
pub struct DownloadOrchestrator {
    official: Arc<dyn OfficialSource>,
    mirrors: Arc<dyn MirrorFetcher>,
    extractor: Arc<dyn ImageExtractor>,
    official_config: OfficialConfig,
    mirrors_config: MirrorsConfig,
    events: Option<EventSender>,
}

impl DownloadOrchestrator {
    #[must_use]
    pub fn new(
        official: Arc<dyn OfficialSource>,
        mirrors: Arc<dyn MirrorFetcher>,
        extractor: Arc<dyn ImageExtractor>,
        config: &Config,
    ) -> Self {
        Self {
            official,
            mirrors,
            extractor,
            official_config: config.official.clone(),
            mirrors_config: config.mirrors.clone(),
            events: None,
        }
    }

    #[must_use]
    pub fn with_events(mut self, tx: EventSender) -> Self {
        self.events = Some(tx);
        self
    }

    /// Download the archive for `id` and extract its artwork
    ///
    /// With a credential, exactly one attempt is made against the official
    /// source. Without one, mirrors are tried in `mirror_order`, one at a
    /// time, each bounded by `per_mirror_timeout`. Never panics and never
    /// returns an error: every failure is folded into
    /// [`OrchestrationResult::Failure`].
    pub async fn orchestrate(
        &self,
        id: &BeatmapId,
        working_dir: &Path,
        credential: Option<&SessionCredential>,
        mirror_order: &[MirrorSource],
        per_mirror_timeout: Duration,
    ) -> OrchestrationResult {
        self.orchestrate_with_log(id, working_dir, credential, mirror_order, per_mirror_timeout)
            .await
            .0
    }

    /// Same as [`DownloadOrchestrator::orchestrate`], also returning the
    /// per-attempt log
    pub async fn orchestrate_with_log(
        &self,
        id: &BeatmapId,
        working_dir: &Path,
        credential: Option<&SessionCredential>,
        mirror_order: &[MirrorSource],
        per_mirror_timeout: Duration,
    ) -> (OrchestrationResult, Vec<AttemptRecord>) {
        let (strategy, attempts_planned) = match credential {
            Some(_) => (Strategy::Official, 1),
            None => (Strategy::Mirrors, mirror_order.len()),
        };
        self.emit_for(
            id,
            OrchestrationEvent::Started {
                beatmap_id: id.to_string(),
                strategy,
                attempts_planned,
            },
        );

        let mut log = Vec::new();
        let result = self
            .run(id, working_dir, credential, mirror_order, per_mirror_timeout, &mut log)
            .await;

        match &result {
            OrchestrationResult::Success { name, images } => self.emit_for(
                id,
                OrchestrationEvent::Completed {
                    beatmap_id: id.to_string(),
                    name: name.clone(),
                    images: images.len(),
                },
            ),
            OrchestrationResult::Failure { message } => self.emit_for(
                id,
                OrchestrationEvent::Failed {
                    beatmap_id: id.to_string(),
                    message: message.clone(),
                },
            ),
        }
        (result, log)
    }

    async fn run(
        &self,
        id: &BeatmapId,
        working_dir: &Path,
        credential: Option<&SessionCredential>,
        mirror_order: &[MirrorSource],
        per_mirror_timeout: Duration,
        log: &mut Vec<AttemptRecord>,
    ) -> OrchestrationResult {
        if let Err(e) = tokio::fs::create_dir_all(working_dir).await {
            let err = StorageError::create_dir(&e, working_dir);
            tracing::debug!(path = %working_dir.display(), error = %err, "working dir unavailable");
            self.emit_app_for(
                id,
                AppEvent::General(GeneralEvent::Error {
                    message: WORKING_DIR_FAILED.to_string(),
                    details: Some(err.user_message().into_owned()),
                }),
            );
            return OrchestrationResult::failure(WORKING_DIR_FAILED);
        }

        let archive = match credential {
            Some(credential) => match self.official_attempt(id, credential, working_dir, log).await
            {
                Ok(archive) => archive,
                Err(e) if self.official_config.fallback_to_mirrors => {
                    tracing::debug!(error = %e, "official source failed, falling back to mirrors");
                    match self
                        .mirror_attempts(id, working_dir, mirror_order, per_mirror_timeout, log)
                        .await
                    {
                        Some(archive) => archive,
                        None => return OrchestrationResult::failure(ALL_MIRRORS_FAILED),
                    }
                }
                Err(e) => return OrchestrationResult::from_error(&e),
            },
            None => match self
                .mirror_attempts(id, working_dir, mirror_order, per_mirror_timeout, log)
                .await
            {
                Some(archive) => archive,
                None => return OrchestrationResult::failure(ALL_MIRRORS_FAILED),
            },
        };

        match self.extractor.extract_images(&archive.path).await {
            Ok(images) => OrchestrationResult::Success {
                name: archive.name,
                images,
            },
            Err(e) => OrchestrationResult::from_error(&e),
        }
    }

    async fn official_attempt(
        &self,
        id: &BeatmapId,
        credential: &SessionCredential,
        working_dir: &Path,
        log: &mut Vec<AttemptRecord>,
    ) -> Result<DownloadedArchive, Error> {
        let url = self.official_config.page_url(id);
        let timeout = self.official_config.timeout();

        let started = self.attempt_started(id, OFFICIAL_SOURCE, &url, 1, timeout);
        let outcome = tokio::time::timeout(
            timeout,
            self.official
                .fetch_authenticated(&url, credential, working_dir),
        )
        .await
        .unwrap_or_else(|_| Err(timeout_error(&url, timeout)));

        self.attempt_finished(id, OFFICIAL_SOURCE, url, started, &outcome, log);
        outcome
    }

    /// Try each mirror in order until one succeeds
    async fn mirror_attempts(
        &self,
        id: &BeatmapId,
        working_dir: &Path,
        mirror_order: &[MirrorSource],
        per_mirror_timeout: Duration,
        log: &mut Vec<AttemptRecord>,
    ) -> Option<DownloadedArchive> {
        for (index, mirror) in mirror_order.iter().copied().enumerate() {
            let url = self.mirrors_config.url_for(mirror, id);
            let started =
                self.attempt_started(id, mirror.as_str(), &url, index + 1, per_mirror_timeout);

            // Each attempt gets a fresh budget
            let deadline = started + per_mirror_timeout;
            let outcome = tokio::time::timeout_at(
                deadline,
                self.mirrors.fetch_anonymous(&url, working_dir, deadline),
            )
            .await
            .unwrap_or_else(|_| Err(timeout_error(&url, per_mirror_timeout)));

            self.attempt_finished(id, mirror.as_str(), url, started, &outcome, log);
            if let Ok(archive) = outcome {
                return Some(archive);
            }
        }
        None
    }

    fn attempt_started(
        &self,
        id: &BeatmapId,
        source: &str,
        url: &str,
        attempt: usize,
        timeout: Duration,
    ) -> Instant {
        tracing::debug!(source, url, attempt, "download attempt started");
        self.emit_for(
            id,
            OrchestrationEvent::AttemptStarted {
                source: source.to_string(),
                url: url.to_string(),
                attempt,
                timeout,
            },
        );
        Instant::now()
    }

    fn attempt_finished(
        &self,
        id: &BeatmapId,
        source: &str,
        url: String,
        started: Instant,
        outcome: &Result<DownloadedArchive, Error>,
        log: &mut Vec<AttemptRecord>,
    ) {
        let elapsed = started.elapsed();
        let failure = match outcome {
            Ok(_) => {
                self.emit_for(
                    id,
                    OrchestrationEvent::AttemptSucceeded {
                        source: source.to_string(),
                        url: url.clone(),
                        elapsed,
                    },
                );
                None
            }
            Err(e) => {
                self.emit_for(
                    id,
                    OrchestrationEvent::AttemptFailed {
                        source: source.to_string(),
                        url: url.clone(),
                        elapsed,
                        failure: FailureContext::from_error(e),
                    },
                );
                Some(e.user_message().into_owned())
            }
        };
        log.push(AttemptRecord {
            source: source.to_string(),
            url,
            elapsed,
            failure,
        });
    }

    fn emit_for(&self, id: &BeatmapId, event: OrchestrationEvent) {
        self.emit_app_for(id, AppEvent::Orchestration(event));
    }

    fn emit_app_for(&self, id: &BeatmapId, event: AppEvent) {
        let meta = EventMeta::new(event.log_level(), event.event_source())
            .with_correlation_id(id.as_str());
        self.emit_with_meta(meta, event);
    }
}

impl EventEmitter for DownloadOrchestrator {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }
}

fn timeout_error(url: &str, timeout: Duration) -> Error {
    NetworkError::Timeout {
        url: url.to_string(),
        timeout_ms: timeout.as_millis(),
    }
    .into()
}
