//! Anonymous downloads from third-party mirrors

use crate::client::{ensure_success, NetClient};
use crate::filename::derive_filename;
use crate::writer::stream_to_file;
use obae_errors::{Error, NetworkError};
use obae_events::{EventEmitter, EventSender};
use obae_types::{AttemptOutcome, DownloadedArchive};
use std::path::Path;
use tokio::time::Instant;
use url::Url;

/// Name used when neither the response nor the URL provides one
pub const DEFAULT_MIRROR_FILENAME: &str = "beatmap.osz";

/// Fetches an archive from a mirror URL without credentials
#[derive(Clone)]
pub struct MirrorClient {
    client: NetClient,
    events: Option<EventSender>,
}

impl MirrorClient {
    #[must_use]
    pub fn new(client: NetClient) -> Self {
        Self {
            client,
            events: None,
        }
    }

    #[must_use]
    pub fn with_events(mut self, tx: EventSender) -> Self {
        self.events = Some(tx);
        self
    }

    /// Download `url` into `working_dir`, giving up at `deadline`
    ///
    /// Exceeding the deadline at any point (connect, headers, body) yields
    /// `NetworkError::Timeout` and removes any partial file.
    pub async fn fetch_anonymous(
        &self,
        url: &str,
        working_dir: &Path,
        deadline: Instant,
    ) -> AttemptOutcome {
        let budget = deadline.saturating_duration_since(Instant::now());
        match tokio::time::timeout_at(deadline, self.fetch(url, working_dir)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(NetworkError::Timeout {
                url: url.to_string(),
                timeout_ms: budget.as_millis(),
            }
            .into()),
        }
    }

    async fn fetch(&self, url: &str, working_dir: &Path) -> Result<DownloadedArchive, Error> {
        let response = ensure_success(self.client.get(url).await?, url)?;
        // Named after the requested URL, not wherever redirects ended up
        let request_url = Url::parse(url).ok();
        let name = derive_filename(
            response.headers(),
            request_url.as_ref(),
            DEFAULT_MIRROR_FILENAME,
        );
        let (path, _) = stream_to_file(response, working_dir, &name, self).await?;
        Ok(DownloadedArchive::from_path(path))
    }
}

impl EventEmitter for MirrorClient {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }
}
