//! Operations context for dependency injection

use crate::orchestrator::DownloadOrchestrator;
use obae_archive::ArchiveExtractor;
use obae_browser::{BrowserLauncher, ChromiumLauncher};
use obae_config::Config;
use obae_errors::Error;
use obae_events::{EventEmitter, EventSender};
use obae_net::{MirrorClient, NetClient, NetConfig};
use obae_session::SessionDownloader;
use obae_types::{BeatmapId, OrchestrationResult, SessionCredential};
use std::sync::Arc;

/// Operations context providing access to all system components
pub struct OpsCtx {
    /// Orchestrator wired to the production sources
    pub orchestrator: DownloadOrchestrator,
    /// Event sender for diagnostics
    pub tx: Option<EventSender>,
    /// System configuration
    pub config: Config,
}

impl OpsCtx {
    /// Run one orchestration using the configured working directory and
    /// mirror settings
    pub async fn download(
        &self,
        id: &BeatmapId,
        credential: Option<&SessionCredential>,
    ) -> OrchestrationResult {
        let working_dir = self.config.general.working_dir();
        self.emit_debug(format!(
            "downloading {id} into {}",
            working_dir.display()
        ));
        self.orchestrator
            .orchestrate(
                id,
                &working_dir,
                credential,
                &self.config.mirrors.order,
                self.config.mirrors.per_mirror_timeout(),
            )
            .await
    }
}

impl EventEmitter for OpsCtx {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

/// Builder for operations context
#[derive(Default)]
pub struct OpsContextBuilder {
    config: Option<Config>,
    tx: Option<EventSender>,
    net: Option<NetClient>,
    launcher: Option<Arc<dyn BrowserLauncher>>,
}

impl OpsContextBuilder {
    /// Create new context builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set configuration
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Set network client
    #[must_use]
    pub fn with_net(mut self, net: NetClient) -> Self {
        self.net = Some(net);
        self
    }

    /// Replace the Chromium launcher
    #[must_use]
    pub fn with_launcher(mut self, launcher: Arc<dyn BrowserLauncher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    /// Build the context
    ///
    /// Components left unset are created from the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn build(self) -> Result<OpsCtx, Error> {
        let config = self.config.unwrap_or_default();
        let net = match self.net {
            Some(net) => net,
            None => NetClient::new(NetConfig::from(&config.network))?,
        };
        let launcher = self
            .launcher
            .unwrap_or_else(|| Arc::new(ChromiumLauncher::new(config.browser.clone())));

        let mut session = SessionDownloader::new(launcher, net.clone(), config.official.clone());
        let mut mirrors = MirrorClient::new(net);
        let mut extractor = ArchiveExtractor::new();
        if let Some(tx) = &self.tx {
            session = session.with_events(tx.clone());
            mirrors = mirrors.with_events(tx.clone());
            extractor = extractor.with_events(tx.clone());
        }

        let mut orchestrator = DownloadOrchestrator::new(
            Arc::new(session),
            Arc::new(mirrors),
            Arc::new(extractor),
            &config,
        );
        if let Some(tx) = &self.tx {
            orchestrator = orchestrator.with_events(tx.clone());
        }

        Ok(OpsCtx {
            orchestrator,
            tx: self.tx,
            config,
        })
    }
}
