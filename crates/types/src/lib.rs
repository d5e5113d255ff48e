#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the obae download subsystem
//!
//! This crate provides the domain types passed between the download
//! strategies, the archive extractor and the orchestrator: validated beatmap
//! identifiers, mirror sources, session credentials and result types.

pub mod artwork;
pub mod credential;
pub mod id;
pub mod mirror;
pub mod outcome;

// Re-export commonly used types
pub use artwork::{ExtractedImage, ImageFormat};
pub use credential::SessionCredential;
pub use id::{BeatmapId, IdPolicy};
pub use mirror::MirrorSource;
pub use outcome::{AttemptOutcome, AttemptRecord, DownloadedArchive, OrchestrationResult};
