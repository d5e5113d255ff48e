//! Starting and stopping the Chromium process

use obae_config::BrowserConfig;
use obae_errors::{BrowserError, Error};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};

/// Binary names tried on `PATH` when no executable is configured
const CANDIDATES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
];

const DEVTOOLS_PREFIX: &str = "DevTools listening on ";

const EXIT_GRACE: Duration = Duration::from_secs(2);

/// A running Chromium with its throwaway profile
///
/// The child is spawned with `kill_on_drop`, so dropping this value without
/// calling [`ChromiumProcess::shutdown`] still terminates the browser.
pub(crate) struct ChromiumProcess {
    child: Child,
    ws_url: String,
    executable: PathBuf,
    _profile: TempDir,
}

impl ChromiumProcess {
    pub(crate) async fn spawn(config: &BrowserConfig) -> Result<Self, Error> {
        let executable = resolve_executable(config)?;
        let profile = TempDir::with_prefix("obae-chromium-").map_err(|e| {
            BrowserError::LaunchFailed {
                message: format!("creating browser profile directory: {e}"),
            }
        })?;

        let mut child = Command::new(&executable)
            .args(launch_args(config, profile.path()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BrowserError::LaunchFailed {
                message: format!("{}: {e}", executable.display()),
            })?;

        let stderr = child.stderr.take().ok_or_else(|| BrowserError::LaunchFailed {
            message: "browser stderr unavailable".to_string(),
        })?;
        let mut lines = BufReader::new(stderr).lines();

        let ws_url = tokio::time::timeout(config.launch_timeout(), async {
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(url) = parse_devtools_line(&line) {
                    return Some(url.to_string());
                }
                tracing::trace!(target: "obae::chromium", "{line}");
            }
            None
        })
        .await
        .map_err(|_| BrowserError::LaunchFailed {
            message: format!(
                "no DevTools endpoint within {}s",
                config.launch_timeout().as_secs()
            ),
        })?
        .ok_or_else(|| BrowserError::LaunchFailed {
            message: "browser exited before exposing a DevTools endpoint".to_string(),
        })?;

        // Keep the pipe drained so the browser never blocks on stderr
        tokio::spawn(async move {
            while let Ok(Some(line)) = lines.next_line().await {
                tracing::trace!(target: "obae::chromium", "{line}");
            }
        });

        Ok(Self {
            child,
            ws_url,
            executable,
            _profile: profile,
        })
    }

    pub(crate) fn ws_url(&self) -> &str {
        &self.ws_url
    }

    pub(crate) fn executable(&self) -> &Path {
        &self.executable
    }

    /// Wait briefly for a clean exit, then kill
    pub(crate) async fn shutdown(mut self) {
        if tokio::time::timeout(EXIT_GRACE, self.child.wait())
            .await
            .is_err()
        {
            let _ = self.child.kill().await;
        }
    }
}

fn resolve_executable(config: &BrowserConfig) -> Result<PathBuf, Error> {
    if let Some(path) = &config.executable {
        return Ok(path.clone());
    }

    let search = std::env::var_os("PATH").unwrap_or_default();
    std::env::split_paths(&search)
        .flat_map(|dir| CANDIDATES.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| {
            BrowserError::LaunchFailed {
                message: format!("none of {} found on PATH", CANDIDATES.join(", ")),
            }
            .into()
        })
}

pub(crate) fn launch_args(config: &BrowserConfig, profile: &Path) -> Vec<String> {
    let mut args = Vec::new();
    if config.headless {
        args.push("--headless=new".to_string());
    }
    args.extend(
        [
            "--remote-debugging-port=0",
            "--no-first-run",
            "--no-default-browser-check",
            "--disable-gpu",
            "--disable-extensions",
            "--disable-background-networking",
            "--mute-audio",
        ]
        .map(String::from),
    );
    args.push(format!("--user-data-dir={}", profile.display()));
    args.extend(config.extra_args.iter().cloned());
    args.push("about:blank".to_string());
    args
}

/// Extract the browser WebSocket URL from a stderr line
pub(crate) fn parse_devtools_line(line: &str) -> Option<&str> {
    line.trim()
        .strip_prefix(DEVTOOLS_PREFIX)
        .map(str::trim)
        .filter(|url| url.starts_with("ws://") || url.starts_with("wss://"))
}
