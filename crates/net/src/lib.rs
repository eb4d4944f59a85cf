#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Mirror package downloader (component 3)
//!
//! Resolves an engine version to a mirror URL, streams it into the
//! package cache under single-flight-by-version semantics, and reports
//! progress/completion/failure via the shared event bus.

pub mod downloader;
pub mod mirror;
pub mod task;

pub use downloader::MirrorDownloader;
pub use mirror::{base_url, package_url};
pub use task::{DownloadStatus, DownloadTask};
