//! Streaming a response body to disk

use futures::StreamExt;
use obae_errors::{Error, NetworkError, StorageError};
use obae_events::EventEmitter;
use reqwest::Response;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

/// RAII guard for an in-progress download - removes the file on drop
/// unless committed
#[derive(Debug)]
pub struct PartialFile {
    path: PathBuf,
    committed: bool,
}

impl PartialFile {
    /// Create `<dest>.part` for writing
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be created.
    pub async fn create(dest: &Path) -> Result<(Self, File), Error> {
        let mut name = dest.as_os_str().to_owned();
        name.push(".part");
        let path = PathBuf::from(name);
        let file = File::create(&path)
            .await
            .map_err(|e| Error::io_with_path(&e, &path))?;
        Ok((
            Self {
                path,
                committed: false,
            },
            file,
        ))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Move the finished file into place
    ///
    /// # Errors
    ///
    /// Returns a storage error if the rename fails; the partial file is
    /// still removed in that case.
    pub async fn commit(mut self, dest: &Path) -> Result<(), Error> {
        fs::rename(&self.path, dest)
            .await
            .map_err(|e| Error::io_with_path(&e, dest))?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.committed {
            // Best-effort cleanup - ignore errors
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Stream `response` into `dir/file_name`, returning the final path and size
///
/// Chunks are written as they arrive; nothing is buffered whole in memory.
/// Transport errors while reading the body become
/// `NetworkError::DownloadFailed`, write errors become `StorageError`.
///
/// # Errors
///
/// See above. On any error the partial file is removed and a
/// `DownloadEvent::Failed` is emitted.
pub async fn stream_to_file<E>(
    response: Response,
    dir: &Path,
    file_name: &str,
    emitter: &E,
) -> Result<(PathBuf, u64), Error>
where
    E: EventEmitter,
{
    let url = response.url().to_string();
    let dest = dir.join(file_name);
    emitter.emit_download_started(&url, response.content_length());

    match write_body(response, &url, &dest).await {
        Ok(written) => {
            tracing::debug!(url = %url, path = %dest.display(), bytes = written, "download written");
            emitter.emit_download_completed(&url, dest.clone(), written);
            Ok((dest, written))
        }
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "download failed");
            emitter.emit_download_failed(&url, &e);
            Err(e)
        }
    }
}

async fn write_body(response: Response, url: &str, dest: &Path) -> Result<u64, Error> {
    let (partial, mut file) = PartialFile::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| NetworkError::DownloadFailed(format!("{url}: {e}")))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| StorageError::write(&e, partial.path()))?;
        written += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|e| StorageError::write(&e, partial.path()))?;
    drop(file);
    partial.commit(dest).await?;
    Ok(written)
}
