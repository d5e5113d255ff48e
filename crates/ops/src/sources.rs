//! Seams between the orchestrator and the components it drives

use async_trait::async_trait;
use obae_archive::ArchiveExtractor;
use obae_errors::Error;
use obae_net::MirrorClient;
use obae_session::SessionDownloader;
use obae_types::{AttemptOutcome, ExtractedImage, SessionCredential};
use std::path::Path;
use tokio::time::Instant;

/// The credentialed official source
#[async_trait]
pub trait OfficialSource: Send + Sync {
    async fn fetch_authenticated(
        &self,
        page_url: &str,
        credential: &SessionCredential,
        working_dir: &Path,
    ) -> AttemptOutcome;
}

/// Anonymous downloads from a mirror URL
#[async_trait]
pub trait MirrorFetcher: Send + Sync {
    async fn fetch_anonymous(&self, url: &str, working_dir: &Path, deadline: Instant)
        -> AttemptOutcome;
}

/// Turns a downloaded archive into images, consuming the file
#[async_trait]
pub trait ImageExtractor: Send + Sync {
    async fn extract_images(&self, archive: &Path) -> Result<Vec<ExtractedImage>, Error>;
}

#[async_trait]
impl OfficialSource for SessionDownloader {
    async fn fetch_authenticated(
        &self,
        page_url: &str,
        credential: &SessionCredential,
        working_dir: &Path,
    ) -> AttemptOutcome {
        SessionDownloader::fetch_authenticated(self, page_url, credential, working_dir).await
    }
}

#[async_trait]
impl MirrorFetcher for MirrorClient {
    async fn fetch_anonymous(
        &self,
        url: &str,
        working_dir: &Path,
        deadline: Instant,
    ) -> AttemptOutcome {
        MirrorClient::fetch_anonymous(self, url, working_dir, deadline).await
    }
}

#[async_trait]
impl ImageExtractor for ArchiveExtractor {
    async fn extract_images(&self, archive: &Path) -> Result<Vec<ExtractedImage>, Error> {
        ArchiveExtractor::extract_images(self, archive).await
    }
}
