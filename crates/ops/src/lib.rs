#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! High-level orchestration for obae
//!
//! This crate sits between the CLI and the specialized crates. It decides
//! which source to use for a beatmap, walks the mirror list with a deadline
//! per attempt, and hands the downloaded archive to the extractor.

mod context;
mod orchestrator;
mod sources;

pub use context::{OpsContextBuilder, OpsCtx};
pub use orchestrator::{
    DownloadOrchestrator, ALL_MIRRORS_FAILED, OFFICIAL_SOURCE, WORKING_DIR_FAILED,
};
pub use sources::{ImageExtractor, MirrorFetcher, OfficialSource};
