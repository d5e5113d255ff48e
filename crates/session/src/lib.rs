#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Credentialed downloads from the official beatmap site
//!
//! The official site only serves archives to a logged-in browser and hands
//! out a short-lived signed URL on a separate host when the download button
//! is clicked. [`SessionDownloader`] drives a headless browser to recover
//! that URL, then fetches the archive over plain HTTP.

use obae_browser::{with_browser, BrowserLauncher, BrowserPage, Cookie, SameSite};
use obae_config::OfficialConfig;
use obae_errors::{BrowserError, Error};
use obae_events::{AppEvent, BrowserEvent, EventEmitter, EventSender, FailureContext};
use obae_net::{derive_filename, ensure_success, stream_to_file, NetClient};
use obae_types::{AttemptOutcome, DownloadedArchive, SessionCredential};
use std::path::Path;
use std::sync::Arc;
use tokio::time::Instant;

/// Downloads archives through an authenticated browser session
pub struct SessionDownloader {
    launcher: Arc<dyn BrowserLauncher>,
    client: NetClient,
    config: OfficialConfig,
    events: Option<EventSender>,
}

impl SessionDownloader {
    #[must_use]
    pub fn new(
        launcher: Arc<dyn BrowserLauncher>,
        client: NetClient,
        config: OfficialConfig,
    ) -> Self {
        Self {
            launcher,
            client,
            config,
            events: None,
        }
    }

    #[must_use]
    pub fn with_events(mut self, tx: EventSender) -> Self {
        self.events = Some(tx);
        self
    }

    /// Download the archive behind `page_url` using `credential`
    ///
    /// The browser is released before the archive itself is fetched.
    pub async fn fetch_authenticated(
        &self,
        page_url: &str,
        credential: &SessionCredential,
        working_dir: &Path,
    ) -> AttemptOutcome {
        let download_url = match self.discover_download_url(page_url, credential).await {
            Ok(url) => url,
            Err(e) => {
                self.emit(AppEvent::Browser(BrowserEvent::Failed {
                    step: "discover download url".to_string(),
                    failure: FailureContext::from_error(&e),
                }));
                return Err(e);
            }
        };

        tracing::debug!(page_url, "fetching discovered archive url");
        let response = ensure_success(self.client.get(&download_url).await?, &download_url)?;
        let name = derive_filename(response.headers(), None, &self.config.default_filename);
        let (path, _) = stream_to_file(response, working_dir, &name, self).await?;
        Ok(DownloadedArchive::from_path(path))
    }

    async fn discover_download_url(
        &self,
        page_url: &str,
        credential: &SessionCredential,
    ) -> Result<String, Error> {
        let cookie = self.session_cookie(credential);

        let result = with_browser(self.launcher.as_ref(), |browser| async move {
            self.emit(AppEvent::Browser(BrowserEvent::Launched));

            let page = browser.new_page(std::slice::from_ref(&cookie)).await?;

            let navigation = page.navigate(page_url).await?;
            self.emit(AppEvent::Browser(BrowserEvent::Navigated {
                url: navigation.url.clone(),
                status: navigation.status,
            }));
            if navigation.status == Some(404) {
                return Err(BrowserError::PageNotFound {
                    url: page_url.to_string(),
                }
                .into());
            }

            let selector = &self.config.trigger_selector;
            if !page.has_element(selector).await? || !page.click(selector).await? {
                return Err(BrowserError::TriggerNotFound {
                    selector: selector.clone(),
                }
                .into());
            }
            self.emit(AppEvent::Browser(BrowserEvent::TriggerClicked {
                selector: selector.clone(),
            }));

            let url = self.await_download_request(page.as_ref()).await?;
            self.emit(AppEvent::Browser(BrowserEvent::DownloadUrlDiscovered {
                url: url.clone(),
                observed_requests: page.observed_requests().len(),
            }));
            Ok(url)
        })
        .await;

        if let Err(e) = &result {
            tracing::debug!(page_url, error = %e, "download url discovery failed");
        }
        if !matches!(result, Err(Error::Browser(BrowserError::LaunchFailed { .. }))) {
            self.emit(AppEvent::Browser(BrowserEvent::Closed));
        }
        result
    }

    /// Poll the page's request log for the signed archive URL
    async fn await_download_request(&self, page: &dyn BrowserPage) -> Result<String, Error> {
        let pattern = &self.config.redirect_host;
        let deadline = Instant::now() + self.config.discovery_timeout();
        let mut ticker = tokio::time::interval(self.config.poll_interval());

        loop {
            ticker.tick().await;
            let requests = page.observed_requests();
            if let Some(url) = find_download_request(&requests, pattern) {
                tracing::debug!(observed = requests.len(), "download request observed");
                return Ok(url);
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::DownloadUrlNotDiscovered {
                    pattern: pattern.clone(),
                }
                .into());
            }
        }
    }

    fn session_cookie(&self, credential: &SessionCredential) -> Cookie {
        Cookie {
            name: self.config.cookie_name.clone(),
            value: credential.expose().to_string(),
            domain: self.config.cookie_domain.clone(),
            path: self.config.cookie_path.clone(),
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
        }
    }
}

impl EventEmitter for SessionDownloader {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }
}

/// First request whose URL contains `pattern`
#[must_use]
pub fn find_download_request(requests: &[String], pattern: &str) -> Option<String> {
    requests.iter().find(|url| url.contains(pattern)).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_matching_request_wins() {
        let requests = vec![
            "https://osu.ppy.sh/assets/app.js".to_string(),
            "https://osumirror.idle.host/d/1?sig=a".to_string(),
            "https://osumirror.idle.host/d/1?sig=b".to_string(),
        ];
        assert_eq!(
            find_download_request(&requests, "osumirror.idle.host").as_deref(),
            Some("https://osumirror.idle.host/d/1?sig=a")
        );
        assert_eq!(find_download_request(&requests, "nowhere"), None);
    }
}
