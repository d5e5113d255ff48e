//! Chromium driven over the DevTools protocol

mod connection;
mod process;

use crate::{BrowserLauncher, BrowserPage, BrowserSession, Cookie, Navigation};
use async_trait::async_trait;
use connection::{CdpEvent, Connection};
use obae_config::BrowserConfig;
use obae_errors::{BrowserError, Error};
use process::ChromiumProcess;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Upper bound for a single page load
const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// `Browser.close` may never be answered because the socket goes away first
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Launches a local Chromium per session
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    config: BrowserConfig,
}

impl ChromiumLauncher {
    #[must_use]
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, Error> {
        let process = ChromiumProcess::spawn(&self.config).await?;
        let connection = tokio::time::timeout(
            self.config.launch_timeout(),
            Connection::connect(process.ws_url()),
        )
        .await
        .map_err(|_| BrowserError::LaunchFailed {
            message: "timed out connecting to DevTools".to_string(),
        })??;

        tracing::debug!(executable = %process.executable().display(), "chromium started");

        Ok(Box::new(ChromiumBrowser {
            connection: Arc::new(connection),
            process: tokio::sync::Mutex::new(Some(process)),
            contexts: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }))
    }
}

/// A connected Chromium instance
pub struct ChromiumBrowser {
    connection: Arc<Connection>,
    process: tokio::sync::Mutex<Option<ChromiumProcess>>,
    contexts: Mutex<Vec<String>>,
    closed: AtomicBool,
}

#[async_trait]
impl BrowserSession for ChromiumBrowser {
    async fn new_page(&self, cookies: &[Cookie]) -> Result<Box<dyn BrowserPage>, Error> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BrowserError::Disconnected.into());
        }
        let conn = &self.connection;

        let context = conn
            .call(
                "Target.createBrowserContext",
                json!({ "disposeOnDetach": true }),
                None,
            )
            .await?;
        let context_id = string_field(&context, "browserContextId")?;
        if let Ok(mut contexts) = self.contexts.lock() {
            contexts.push(context_id.clone());
        }

        if !cookies.is_empty() {
            conn.call(
                "Storage.setCookies",
                json!({ "cookies": cookies, "browserContextId": context_id }),
                None,
            )
            .await?;
        }

        let target = conn
            .call(
                "Target.createTarget",
                json!({ "url": "about:blank", "browserContextId": context_id }),
                None,
            )
            .await?;
        let target_id = string_field(&target, "targetId")?;

        let attached = conn
            .call(
                "Target.attachToTarget",
                json!({ "targetId": target_id, "flatten": true }),
                None,
            )
            .await?;
        let session_id = string_field(&attached, "sessionId")?;

        let (requests, events) = conn.register_session(&session_id)?;
        conn.call("Network.enable", json!({}), Some(&session_id))
            .await?;
        conn.call("Page.enable", json!({}), Some(&session_id)).await?;

        Ok(Box::new(ChromiumPage {
            connection: Arc::clone(conn),
            session_id,
            requests,
            events: tokio::sync::Mutex::new(events),
        }))
    }

    async fn close(&self) -> Result<(), Error> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let contexts = self
            .contexts
            .lock()
            .map(|mut c| std::mem::take(&mut *c))
            .unwrap_or_default();
        for context_id in contexts {
            let _ = self
                .connection
                .call(
                    "Target.disposeBrowserContext",
                    json!({ "browserContextId": context_id }),
                    None,
                )
                .await;
        }

        let _ = tokio::time::timeout(
            CLOSE_TIMEOUT,
            self.connection.call("Browser.close", json!({}), None),
        )
        .await;

        if let Some(process) = self.process.lock().await.take() {
            process.shutdown().await;
        }
        tracing::debug!("chromium closed");
        Ok(())
    }
}

/// A tab attached through a flattened target session
pub struct ChromiumPage {
    connection: Arc<Connection>,
    session_id: String,
    requests: Arc<Mutex<Vec<String>>>,
    events: tokio::sync::Mutex<mpsc::UnboundedReceiver<CdpEvent>>,
}

impl ChromiumPage {
    async fn call(&self, method: &str, params: Value) -> Result<Value, Error> {
        self.connection
            .call(method, params, Some(&self.session_id))
            .await
    }

    /// Evaluate an expression that yields a boolean
    async fn evaluate_bool(&self, expression: String) -> Result<bool, Error> {
        let reply = self
            .call(
                "Runtime.evaluate",
                json!({ "expression": expression, "returnByValue": true }),
            )
            .await?;
        if let Some(details) = reply.get("exceptionDetails") {
            return Err(BrowserError::Protocol {
                message: format!(
                    "script failed: {}",
                    details
                        .get("text")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown exception")
                ),
            }
            .into());
        }
        Ok(reply
            .pointer("/result/value")
            .and_then(Value::as_bool)
            .unwrap_or(false))
    }
}

#[async_trait]
impl BrowserPage for ChromiumPage {
    async fn navigate(&self, url: &str) -> Result<Navigation, Error> {
        let mut events = self.events.lock().await;
        while events.try_recv().is_ok() {}

        let reply = self.call("Page.navigate", json!({ "url": url })).await?;
        if let Some(error) = reply.get("errorText").and_then(Value::as_str) {
            return Err(BrowserError::NavigationFailed {
                url: url.to_string(),
                message: error.to_string(),
            }
            .into());
        }
        let loader_id = reply.get("loaderId").and_then(Value::as_str);

        let mut status = None;
        let wait = async {
            while let Some(event) = events.recv().await {
                match event.method.as_str() {
                    "Network.responseReceived" => {
                        if let Some(code) = document_status(&event.params, loader_id) {
                            status = Some(code);
                        }
                    }
                    "Page.loadEventFired" => return Ok(()),
                    _ => {}
                }
            }
            Err(Error::from(BrowserError::Disconnected))
        };

        tokio::time::timeout(NAVIGATION_TIMEOUT, wait)
            .await
            .map_err(|_| BrowserError::NavigationFailed {
                url: url.to_string(),
                message: "timed out waiting for the page to load".to_string(),
            })??;

        Ok(Navigation {
            url: url.to_string(),
            status,
        })
    }

    async fn has_element(&self, selector: &str) -> Result<bool, Error> {
        let selector = js_string(selector);
        self.evaluate_bool(format!("document.querySelector({selector}) !== null"))
            .await
    }

    async fn click(&self, selector: &str) -> Result<bool, Error> {
        let selector = js_string(selector);
        self.evaluate_bool(format!(
            "(() => {{ const el = document.querySelector({selector}); \
             if (!el) return false; el.click(); return true; }})()"
        ))
        .await
    }

    fn observed_requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

fn string_field(value: &Value, field: &str) -> Result<String, Error> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            BrowserError::Protocol {
                message: format!("reply is missing {field}"),
            }
            .into()
        })
}

/// Quote `s` as a JavaScript string literal
fn js_string(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

/// Status of the main document response for the current navigation
fn document_status(params: &Value, loader_id: Option<&str>) -> Option<u16> {
    if params.get("type").and_then(Value::as_str) != Some("Document") {
        return None;
    }
    if let Some(expected) = loader_id {
        if params.get("loaderId").and_then(Value::as_str) != Some(expected) {
            return None;
        }
    }
    params
        .pointer("/response/status")
        .and_then(Value::as_f64)
        .and_then(|s| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let code = s as u16;
            (100..600).contains(&code).then_some(code)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_string_escapes() {
        assert_eq!(js_string(r#"a[href="x"]"#), r#""a[href=\"x\"]""#);
    }

    #[test]
    fn test_document_status_filters_by_type_and_loader() {
        let doc = json!({
            "type": "Document",
            "loaderId": "L1",
            "response": { "status": 404 }
        });
        assert_eq!(document_status(&doc, Some("L1")), Some(404));
        assert_eq!(document_status(&doc, None), Some(404));
        assert_eq!(document_status(&doc, Some("L2")), None);

        let script = json!({
            "type": "Script",
            "loaderId": "L1",
            "response": { "status": 200 }
        });
        assert_eq!(document_status(&script, Some("L1")), None);
    }

    #[test]
    fn test_cookie_serializes_as_cookie_param() {
        let cookie = Cookie {
            name: "osu_session".into(),
            value: "v".into(),
            domain: ".ppy.sh".into(),
            path: "/".into(),
            secure: true,
            http_only: true,
            same_site: crate::SameSite::Lax,
        };
        let json = serde_json::to_value(&cookie).unwrap();
        assert_eq!(json["httpOnly"], true);
        assert_eq!(json["sameSite"], "Lax");
        assert_eq!(json["domain"], ".ppy.sh");
    }
}
