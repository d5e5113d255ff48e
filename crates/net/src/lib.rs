#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for obae
//!
//! This crate owns the pooled HTTP client, the streamed-to-disk writer shared
//! by every download strategy, file name derivation, and the anonymous
//! [`MirrorClient`].

mod client;
pub mod filename;
mod mirror;
mod writer;

pub use client::{ensure_success, NetClient, NetConfig};
pub use filename::derive_filename;
pub use mirror::{MirrorClient, DEFAULT_MIRROR_FILENAME};
pub use writer::{stream_to_file, PartialFile};
