//! Integration tests for net crate

use httpmock::prelude::*;
use obae_errors::{Error, NetworkError, UserFacingError};
use obae_events::{channel, AppEvent, DownloadEvent};
use obae_net::*;
use std::time::Duration;
use tempfile::tempdir;
use tokio::time::Instant;

fn client() -> MirrorClient {
    MirrorClient::new(NetClient::with_defaults().unwrap())
}

fn far_deadline() -> Instant {
    Instant::now() + Duration::from_secs(10)
}

fn dir_is_empty(path: &std::path::Path) -> bool {
    std::fs::read_dir(path).unwrap().next().is_none()
}

#[tokio::test]
async fn test_fetch_anonymous_uses_content_disposition() {
    let server = MockServer::start();
    let (tx, mut rx) = channel();

    let content = b"PK\x03\x04 not really a zip";
    let mock = server.mock(|when, then| {
        when.method(GET).path("/d/371128");
        then.status(200)
            .header(
                "content-disposition",
                "attachment; filename=\"371128 Artist - Title.osz\"",
            )
            .body(content);
    });

    let temp = tempdir().unwrap();
    let archive = client()
        .with_events(tx)
        .fetch_anonymous(&server.url("/d/371128"), temp.path(), far_deadline())
        .await
        .unwrap();

    mock.assert();
    assert_eq!(archive.name, "371128 Artist - Title");
    assert_eq!(archive.path, temp.path().join("371128 Artist - Title.osz"));
    assert_eq!(std::fs::read(&archive.path).unwrap(), content);

    let mut saw_start = false;
    let mut saw_complete = false;
    while let Ok(message) = rx.try_recv() {
        match message.event {
            AppEvent::Download(DownloadEvent::Started { .. }) => saw_start = true,
            AppEvent::Download(DownloadEvent::Completed {
                bytes_downloaded, ..
            }) => {
                assert_eq!(bytes_downloaded, content.len() as u64);
                saw_complete = true;
            }
            _ => {}
        }
    }
    assert!(saw_start);
    assert!(saw_complete);
}

#[tokio::test]
async fn test_name_falls_back_to_url_segment() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/b/42");
        then.status(200).body("data");
    });

    let temp = tempdir().unwrap();
    let archive = client()
        .fetch_anonymous(&server.url("/b/42"), temp.path(), far_deadline())
        .await
        .unwrap();

    assert_eq!(archive.path, temp.path().join("42.osz"));
    assert_eq!(archive.name, "42");
}

#[tokio::test]
async fn test_name_ignores_redirect_target() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/d/371128");
        then.status(302).header("location", "/files/other.bin");
    });
    server.mock(|when, then| {
        when.method(GET).path("/files/other.bin");
        then.status(200).body("data");
    });

    let temp = tempdir().unwrap();
    let archive = client()
        .fetch_anonymous(&server.url("/d/371128"), temp.path(), far_deadline())
        .await
        .unwrap();

    assert_eq!(archive.name, "371128");
    assert_eq!(archive.path, temp.path().join("371128.osz"));
    assert_eq!(std::fs::read(&archive.path).unwrap(), b"data");
}

#[tokio::test]
async fn test_status_classification() {
    let server = MockServer::start();
    for (status, path) in [(404, "/missing"), (429, "/busy"), (503, "/down")] {
        server.mock(|when, then| {
            when.method(GET).path(path);
            then.status(status);
        });
    }

    let temp = tempdir().unwrap();
    let c = client();

    let err = c
        .fetch_anonymous(&server.url("/missing"), temp.path(), far_deadline())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Network(NetworkError::NotFound { .. })));

    let err = c
        .fetch_anonymous(&server.url("/busy"), temp.path(), far_deadline())
        .await
        .unwrap_err();
    assert!(err.user_message().contains("rate-limited"));

    let err = c
        .fetch_anonymous(&server.url("/down"), temp.path(), far_deadline())
        .await
        .unwrap_err();
    assert!(err.user_message().contains("unavailable"));

    assert!(dir_is_empty(temp.path()));
}

#[tokio::test]
async fn test_deadline_exceeded_is_timeout_and_leaves_nothing() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/slow");
        then.status(200).delay(Duration::from_secs(3)).body("late");
    });

    let temp = tempdir().unwrap();
    let started = std::time::Instant::now();
    let err = client()
        .fetch_anonymous(
            &server.url("/slow"),
            temp.path(),
            Instant::now() + Duration::from_millis(200),
        )
        .await
        .unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(matches!(err, Error::Network(NetworkError::Timeout { .. })));
    assert!(dir_is_empty(temp.path()));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Bind then drop to get a port nothing listens on
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let temp = tempdir().unwrap();
    let err = client()
        .fetch_anonymous(
            &format!("http://127.0.0.1:{port}/d/1"),
            temp.path(),
            far_deadline(),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Network(NetworkError::ConnectionFailed(_) | NetworkError::DownloadFailed(_))
    ));
}

#[tokio::test]
async fn test_invalid_url_is_not_retryable() {
    let temp = tempdir().unwrap();
    let err = client()
        .fetch_anonymous("not a url", temp.path(), far_deadline())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Network(NetworkError::InvalidUrl(_))));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_missing_working_dir_is_storage_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/d/1");
        then.status(200).body("data");
    });

    let temp = tempdir().unwrap();
    let missing = temp.path().join("does-not-exist");
    let err = client()
        .fetch_anonymous(&server.url("/d/1"), &missing, far_deadline())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
}

#[tokio::test]
async fn test_rate_limit_carries_retry_after() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/d/9");
        then.status(429).header("retry-after", "120");
    });
    server.mock(|when, then| {
        when.method(GET).path("/d/10");
        then.status(429).header("retry-after", "Wed, 21 Oct 2026 07:28:00 GMT");
    });

    let temp = tempdir().unwrap();
    let err = client()
        .fetch_anonymous(&server.url("/d/9"), temp.path(), far_deadline())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Network(NetworkError::RateLimited {
            retry_after: Some(120),
            ..
        })
    ));

    let err = client()
        .fetch_anonymous(&server.url("/d/10"), temp.path(), far_deadline())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Network(NetworkError::RateLimited {
            retry_after: None,
            ..
        })
    ));
    assert!(dir_is_empty(temp.path()));
}

#[tokio::test]
async fn test_deadline_during_body_removes_partial_file() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // Headers and a first chunk arrive at once, the rest never does
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await;
        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\n\
                  content-type: application/octet-stream\r\n\
                  content-disposition: attachment; filename=\"7 Slow - Trickle.osz\"\r\n\
                  content-length: 1048576\r\n\r\n\
                  PK\x03\x04partial",
            )
            .await
            .unwrap();
        socket.flush().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let temp = tempdir().unwrap();
    let deadline = Instant::now() + Duration::from_millis(300);
    let err = client()
        .fetch_anonymous(&format!("http://{addr}/d/7"), temp.path(), deadline)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Network(NetworkError::Timeout { .. })));
    assert!(err.is_retryable());
    assert!(dir_is_empty(temp.path()));
    server.abort();
}

#[tokio::test]
async fn test_storage_failure_emits_download_failed() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/d/2");
        then.status(200).body("data");
    });

    let (tx, mut rx) = channel();
    let temp = tempdir().unwrap();
    let missing = temp.path().join("does-not-exist");
    let url = server.url("/d/2");
    let err = client()
        .with_events(tx)
        .fetch_anonymous(&url, &missing, far_deadline())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Storage(_)));

    let mut failed_url = None;
    while let Ok(message) = rx.try_recv() {
        if let AppEvent::Download(DownloadEvent::Failed { url, .. }) = message.event {
            failed_url = Some(url);
        }
    }
    assert_eq!(failed_url.as_deref(), Some(url.as_str()));
}
