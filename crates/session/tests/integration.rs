//! Integration tests for the session downloader using a scripted browser

use async_trait::async_trait;
use httpmock::prelude::*;
use obae_browser::{BrowserLauncher, BrowserPage, BrowserSession, Cookie, Navigation};
use obae_config::OfficialConfig;
use obae_errors::{BrowserError, Error, UserFacingError};
use obae_net::NetClient;
use obae_session::SessionDownloader;
use obae_types::SessionCredential;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

/// What the fake page does
#[derive(Clone, Default)]
struct Script {
    fail_launch: bool,
    status: Option<u16>,
    has_trigger: bool,
    after_click: Vec<String>,
}

#[derive(Default)]
struct Record {
    cookies: Mutex<Vec<Cookie>>,
    navigated: Mutex<Vec<String>>,
    closed: AtomicBool,
}

struct FakeLauncher {
    script: Script,
    record: Arc<Record>,
}

struct FakeBrowser {
    script: Script,
    record: Arc<Record>,
}

struct FakePage {
    script: Script,
    record: Arc<Record>,
    requests: Mutex<Vec<String>>,
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, Error> {
        if self.script.fail_launch {
            return Err(BrowserError::LaunchFailed {
                message: "chromium not installed".into(),
            }
            .into());
        }
        Ok(Box::new(FakeBrowser {
            script: self.script.clone(),
            record: Arc::clone(&self.record),
        }))
    }
}

#[async_trait]
impl BrowserSession for FakeBrowser {
    async fn new_page(&self, cookies: &[Cookie]) -> Result<Box<dyn BrowserPage>, Error> {
        self.record.cookies.lock().unwrap().extend_from_slice(cookies);
        Ok(Box::new(FakePage {
            script: self.script.clone(),
            record: Arc::clone(&self.record),
            requests: Mutex::new(vec!["https://osu.ppy.sh/assets/app.js".into()]),
        }))
    }

    async fn close(&self) -> Result<(), Error> {
        self.record.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl BrowserPage for FakePage {
    async fn navigate(&self, url: &str) -> Result<Navigation, Error> {
        self.record.navigated.lock().unwrap().push(url.to_string());
        Ok(Navigation {
            url: url.to_string(),
            status: self.script.status,
        })
    }

    async fn has_element(&self, _selector: &str) -> Result<bool, Error> {
        Ok(self.script.has_trigger)
    }

    async fn click(&self, _selector: &str) -> Result<bool, Error> {
        if !self.script.has_trigger {
            return Ok(false);
        }
        self.requests
            .lock()
            .unwrap()
            .extend(self.script.after_click.iter().cloned());
        Ok(true)
    }

    fn observed_requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn downloader(script: Script, config: OfficialConfig) -> (SessionDownloader, Arc<Record>) {
    let record = Arc::new(Record::default());
    let launcher = Arc::new(FakeLauncher {
        script,
        record: Arc::clone(&record),
    });
    (
        SessionDownloader::new(launcher, NetClient::with_defaults().unwrap(), config),
        record,
    )
}

fn config_for(server: &MockServer) -> OfficialConfig {
    OfficialConfig {
        redirect_host: format!("127.0.0.1:{}", server.port()),
        discovery_timeout_ms: 300,
        poll_interval_ms: 20,
        ..OfficialConfig::default()
    }
}

fn credential() -> SessionCredential {
    SessionCredential::new("cookie-value").unwrap()
}

const PAGE: &str = "https://osu.ppy.sh/beatmapsets/371128";

#[tokio::test]
async fn test_discovered_url_is_downloaded() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/d/371128");
        then.status(200)
            .header("content-disposition", "attachment; filename=\"371128 A - B.osz\"")
            .body("archive-bytes");
    });

    let script = Script {
        has_trigger: true,
        status: Some(200),
        after_click: vec![server.url("/d/371128?s=signature")],
        ..Script::default()
    };
    let (downloader, record) = downloader(script, config_for(&server));
    let temp = tempdir().unwrap();

    let archive = downloader
        .fetch_authenticated(PAGE, &credential(), temp.path())
        .await
        .unwrap();

    mock.assert();
    assert_eq!(archive.name, "371128 A - B");
    assert_eq!(std::fs::read(&archive.path).unwrap(), b"archive-bytes");
    assert!(record.closed.load(Ordering::SeqCst));
    assert_eq!(*record.navigated.lock().unwrap(), vec![PAGE.to_string()]);

    let cookies = record.cookies.lock().unwrap();
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].name, "osu_session");
    assert_eq!(cookies[0].domain, ".ppy.sh");
    assert_eq!(cookies[0].path, "/");
    assert_eq!(cookies[0].value, "cookie-value");
    assert!(cookies[0].secure && cookies[0].http_only);
}

#[tokio::test]
async fn test_default_official_filename() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/d/9");
        then.status(200).body("zip");
    });

    let script = Script {
        has_trigger: true,
        after_click: vec![server.url("/d/9")],
        ..Script::default()
    };
    let (downloader, _) = downloader(script, config_for(&server));
    let temp = tempdir().unwrap();

    let archive = downloader
        .fetch_authenticated(PAGE, &credential(), temp.path())
        .await
        .unwrap();
    assert_eq!(archive.path, temp.path().join("beatmap.zip"));
    assert_eq!(archive.name, "beatmap");
}

#[tokio::test]
async fn test_missing_page_is_not_found() {
    let server = MockServer::start();
    let script = Script {
        status: Some(404),
        has_trigger: true,
        ..Script::default()
    };
    let (downloader, record) = downloader(script, config_for(&server));
    let temp = tempdir().unwrap();

    let err = downloader
        .fetch_authenticated(PAGE, &credential(), temp.path())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Browser(BrowserError::PageNotFound { .. })));
    assert_eq!(err.user_message(), "beatmap not found");
    assert!(record.closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_missing_trigger_means_bad_cookie() {
    let server = MockServer::start();
    let (downloader, record) = downloader(Script::default(), config_for(&server));
    let temp = tempdir().unwrap();

    let err = downloader
        .fetch_authenticated(PAGE, &credential(), temp.path())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Browser(BrowserError::TriggerNotFound { .. })
    ));
    assert!(err.user_message().contains("check cookie value"));
    assert!(record.closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_no_signed_url_within_window() {
    let server = MockServer::start();
    let script = Script {
        has_trigger: true,
        after_click: vec!["https://osu.ppy.sh/home/notifications".into()],
        ..Script::default()
    };
    let (downloader, record) = downloader(script, config_for(&server));
    let temp = tempdir().unwrap();

    let started = std::time::Instant::now();
    let err = downloader
        .fetch_authenticated(PAGE, &credential(), temp.path())
        .await
        .unwrap_err();
    assert!(started.elapsed() >= std::time::Duration::from_millis(300));
    assert!(matches!(
        err,
        Error::Browser(BrowserError::DownloadUrlNotDiscovered { .. })
    ));
    assert!(record.closed.load(Ordering::SeqCst));
    assert!(std::fs::read_dir(temp.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn test_launch_failure_is_environment_error() {
    let script = Script {
        fail_launch: true,
        ..Script::default()
    };
    let (downloader, record) = downloader(script, OfficialConfig::default());
    let temp = tempdir().unwrap();

    let err = downloader
        .fetch_authenticated(PAGE, &credential(), temp.path())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Browser(BrowserError::LaunchFailed { .. })
    ));
    assert!(err.user_hint().is_some());
    assert!(err.user_message().contains("Install Chromium or Google Chrome"));
    assert!(!record.closed.load(Ordering::SeqCst));
}
