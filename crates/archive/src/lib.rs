#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Artwork extraction from beatmap archives
//!
//! A beatmap archive (`.osz`) is a ZIP file. [`ArchiveExtractor`] reads the
//! image entries that make up the map's artwork into memory and deletes the
//! archive afterwards.

mod cleanup;
mod filter;

pub use filter::entry_is_artwork;

use cleanup::CleanupGuard;
use obae_errors::{ArchiveError, Error};
use obae_events::{AppEvent, EventEmitter, EventSender, ExtractionEvent, FailureContext};
use obae_types::{ExtractedImage, ImageFormat};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tokio::task;

/// Reads artwork out of downloaded archives
#[derive(Debug, Clone, Default)]
pub struct ArchiveExtractor {
    events: Option<EventSender>,
}

impl ArchiveExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_events(mut self, tx: EventSender) -> Self {
        self.events = Some(tx);
        self
    }

    /// Extract every artwork entry of `archive` into memory
    ///
    /// The archive file is consumed: it is deleted (together with any `.zip`
    /// copy made from it) whether extraction succeeds or not.
    ///
    /// # Errors
    ///
    /// Returns an `ArchiveError` if the file cannot be opened, is not a ZIP
    /// archive, or an entry fails to decompress. No partial image set is
    /// returned in that case.
    pub async fn extract_images(&self, archive: &Path) -> Result<Vec<ExtractedImage>, Error> {
        self.emit(AppEvent::Extraction(ExtractionEvent::Started {
            archive: archive.to_path_buf(),
        }));

        let path = archive.to_path_buf();
        let result = task::spawn_blocking(move || extract_blocking(&path))
            .await
            .map_err(|e| ArchiveError::TaskFailed {
                message: e.to_string(),
            })
            .map_err(Error::from)
            .and_then(|inner| inner);

        match result {
            Ok((images, entries)) => {
                self.emit(AppEvent::Extraction(ExtractionEvent::Completed {
                    archive: archive.to_path_buf(),
                    entries,
                    images: images.len(),
                }));
                Ok(images)
            }
            Err(e) => {
                self.emit(AppEvent::Extraction(ExtractionEvent::Failed {
                    archive: archive.to_path_buf(),
                    failure: FailureContext::from_error(&e),
                }));
                Err(e)
            }
        }
    }
}

impl EventEmitter for ArchiveExtractor {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }
}

/// Returns the images and the total number of entries seen
fn extract_blocking(archive: &Path) -> Result<(Vec<ExtractedImage>, usize), Error> {
    let mut guard = CleanupGuard::new(archive);
    let zip_path = prepare_zip_path(archive, &mut guard);

    let file = File::open(&zip_path).map_err(|e| ArchiveError::OpenFailed {
        path: zip_path.display().to_string(),
        message: e.to_string(),
    })?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| ArchiveError::Corrupt {
        path: zip_path.display().to_string(),
        message: e.to_string(),
    })?;

    let entries = zip.len();
    let mut images = Vec::new();
    for index in 0..entries {
        let mut entry = zip.by_index(index).map_err(|e| ArchiveError::Corrupt {
            path: zip_path.display().to_string(),
            message: e.to_string(),
        })?;
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().replace('\\', "/");
        if !entry_is_artwork(&name) {
            continue;
        }
        let Some(format) = ImageFormat::from_path(&name) else {
            continue;
        };

        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| ArchiveError::EntryReadFailed {
                entry: name.clone(),
                message: e.to_string(),
            })?;
        images.push(ExtractedImage {
            entry: name,
            format,
            bytes,
        });
    }

    tracing::debug!(
        archive = %archive.display(),
        entries,
        images = images.len(),
        "archive extracted"
    );
    Ok((images, entries))
}

/// Rename `.osz` to `.zip` when the target is free and return the path to open
fn prepare_zip_path(archive: &Path, guard: &mut CleanupGuard) -> PathBuf {
    let is_osz = archive
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("osz"));
    if !is_osz {
        return archive.to_path_buf();
    }

    let zip_path = archive.with_extension("zip");
    guard.also(&zip_path);
    if zip_path.exists() {
        return archive.to_path_buf();
    }
    match std::fs::rename(archive, &zip_path) {
        Ok(()) => zip_path,
        Err(e) => {
            tracing::debug!(error = %e, "rename to .zip failed, reading archive in place");
            archive.to_path_buf()
        }
    }
}
