#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Headless browser capability for obae
//!
//! The official source only hands out archives to a logged-in browser, so
//! the session downloader needs something that can load a page with a
//! cookie, click an element and report which URLs the page requested. This
//! crate defines that capability as a set of traits and provides a Chromium
//! implementation speaking the DevTools protocol.

mod chromium;

pub use chromium::{ChromiumBrowser, ChromiumLauncher, ChromiumPage};

use async_trait::async_trait;
use obae_errors::Error;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

/// `SameSite` attribute of an injected cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

/// Cookie placed into a fresh browser context before navigation
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
}

impl std::fmt::Debug for Cookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cookie")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .field("domain", &self.domain)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Result of loading a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub url: String,
    /// HTTP status of the main document, when the browser reported one
    pub status: Option<u16>,
}

/// Starts browser instances
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Start a browser and connect to it
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, Error>;
}

/// A running browser
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Open a page in a new isolated context seeded with `cookies`
    async fn new_page(&self, cookies: &[Cookie]) -> Result<Box<dyn BrowserPage>, Error>;

    /// Shut the browser down; later calls are no-ops
    async fn close(&self) -> Result<(), Error>;
}

/// One tab
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Load `url` and wait for the load event
    async fn navigate(&self, url: &str) -> Result<Navigation, Error>;

    /// Whether an element matches `selector`
    async fn has_element(&self, selector: &str) -> Result<bool, Error>;

    /// Click the first element matching `selector`; `false` if there is none
    async fn click(&self, selector: &str) -> Result<bool, Error>;

    /// Every request URL the page has issued so far, in order
    fn observed_requests(&self) -> Vec<String>;
}

/// Launch a browser, run `f` with it, and close it whatever `f` returns
///
/// If the future is dropped before completion the browser is not closed
/// gracefully, but implementations kill their process on drop.
///
/// # Errors
///
/// Returns the launch error, or whatever `f` returns. Close failures are
/// logged and do not override the result of `f`.
pub async fn with_browser<L, F, Fut, T>(launcher: &L, f: F) -> Result<T, Error>
where
    L: BrowserLauncher + ?Sized,
    F: FnOnce(Arc<dyn BrowserSession>) -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let browser: Arc<dyn BrowserSession> = Arc::from(launcher.launch().await?);
    let result = f(Arc::clone(&browser)).await;
    if let Err(e) = browser.close().await {
        tracing::debug!(error = %e, "closing browser failed");
    }
    result
}
