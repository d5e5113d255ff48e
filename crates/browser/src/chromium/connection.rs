//! DevTools protocol transport
//!
//! One WebSocket per browser. Commands are matched to responses by id;
//! events carrying a `sessionId` are routed to the page attached under that
//! session.

use futures::{SinkExt, StreamExt};
use obae_errors::{BrowserError, Error};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

const REQUEST_WILL_BE_SENT: &str = "Network.requestWillBeSent";

type Reply = Result<Value, String>;
type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<Reply>>>>;
type Routes = Arc<Mutex<HashMap<String, SessionRoute>>>;

/// Protocol event delivered to a page
#[derive(Debug, Clone)]
pub(crate) struct CdpEvent {
    pub method: String,
    pub params: Value,
}

/// Per-session sinks fed by the reader task
struct SessionRoute {
    requests: Arc<Mutex<Vec<String>>>,
    events: mpsc::UnboundedSender<CdpEvent>,
}

pub(crate) struct Connection {
    outgoing: mpsc::UnboundedSender<Message>,
    pending: Pending,
    routes: Routes,
    next_id: AtomicU64,
    tasks: Vec<JoinHandle<()>>,
}

impl Connection {
    pub(crate) async fn connect(ws_url: &str) -> Result<Self, Error> {
        let (stream, _) = connect_async(ws_url)
            .await
            .map_err(|e| BrowserError::LaunchFailed {
                message: format!("connecting to DevTools at {ws_url}: {e}"),
            })?;
        let (mut sink, mut source) = stream.split();

        let pending: Pending = Arc::default();
        let routes: Routes = Arc::default();
        let (outgoing, mut queue) = mpsc::unbounded_channel::<Message>();

        let writer = tokio::spawn(async move {
            while let Some(message) = queue.recv().await {
                if sink.send(message).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let reader = {
            let pending = Arc::clone(&pending);
            let routes = Arc::clone(&routes);
            tokio::spawn(async move {
                while let Some(message) = source.next().await {
                    match message {
                        Ok(Message::Text(text)) => dispatch(&text, &pending, &routes),
                        Ok(Message::Close(_)) | Err(_) => break,
                        Ok(_) => {}
                    }
                }
                // Wake every waiter with a closed channel
                if let Ok(mut waiting) = pending.lock() {
                    waiting.clear();
                }
                if let Ok(mut sessions) = routes.lock() {
                    sessions.clear();
                }
            })
        };

        Ok(Self {
            outgoing,
            pending,
            routes,
            next_id: AtomicU64::new(1),
            tasks: vec![writer, reader],
        })
    }

    /// Send a command and wait for its result
    pub(crate) async fn call(
        &self,
        method: &str,
        params: Value,
        session_id: Option<&str>,
    ) -> Result<Value, Error> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let frame = command_frame(id, method, params, session_id);

        let (tx, rx) = oneshot::channel();
        lock(&self.pending)?.insert(id, tx);
        if self.outgoing.send(Message::Text(frame.to_string())).is_err() {
            lock(&self.pending)?.remove(&id);
            return Err(BrowserError::Disconnected.into());
        }

        match rx.await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(message)) => Err(BrowserError::Protocol {
                message: format!("{method}: {message}"),
            }
            .into()),
            Err(_) => Err(BrowserError::Disconnected.into()),
        }
    }

    /// Start routing events for `session_id`
    pub(crate) fn register_session(
        &self,
        session_id: &str,
    ) -> Result<(Arc<Mutex<Vec<String>>>, mpsc::UnboundedReceiver<CdpEvent>), Error> {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let (events, rx) = mpsc::unbounded_channel();
        lock(&self.routes)?.insert(
            session_id.to_string(),
            SessionRoute {
                requests: Arc::clone(&requests),
                events,
            },
        );
        Ok((requests, rx))
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, Error> {
    mutex.lock().map_err(|_| {
        BrowserError::Protocol {
            message: "connection state lock poisoned".to_string(),
        }
        .into()
    })
}

fn command_frame(id: u64, method: &str, params: Value, session_id: Option<&str>) -> Value {
    let mut frame = json!({ "id": id, "method": method, "params": params });
    if let Some(session) = session_id {
        frame["sessionId"] = Value::String(session.to_string());
    }
    frame
}

/// Route one incoming frame to its waiter or session
fn dispatch(text: &str, pending: &Pending, routes: &Routes) {
    let Ok(frame) = serde_json::from_str::<Value>(text) else {
        tracing::trace!("ignoring non-JSON DevTools frame");
        return;
    };

    if let Some(id) = frame.get("id").and_then(Value::as_u64) {
        let waiter = pending.lock().ok().and_then(|mut p| p.remove(&id));
        if let Some(waiter) = waiter {
            let reply = match frame.get("error") {
                Some(error) => Err(error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown protocol error")
                    .to_string()),
                None => Ok(frame.get("result").cloned().unwrap_or(Value::Null)),
            };
            let _ = waiter.send(reply);
        }
        return;
    }

    let (Some(method), Some(session)) = (
        frame.get("method").and_then(Value::as_str),
        frame.get("sessionId").and_then(Value::as_str),
    ) else {
        return;
    };

    let Ok(sessions) = routes.lock() else {
        return;
    };
    let Some(route) = sessions.get(session) else {
        return;
    };

    let params = frame.get("params").cloned().unwrap_or(Value::Null);
    if method == REQUEST_WILL_BE_SENT {
        if let Some(url) = params.pointer("/request/url").and_then(Value::as_str) {
            if let Ok(mut requests) = route.requests.lock() {
                requests.push(url.to_string());
            }
        }
    }
    let _ = route.events.send(CdpEvent {
        method: method.to_string(),
        params,
    });
}
