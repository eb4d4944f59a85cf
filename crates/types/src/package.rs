//! Cached engine package metadata

use crate::mirror::MirrorId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// A cached `apache-<engine>-<version>-bin.tar.gz`, identified solely by version.
///
/// Invariant: if `local_path` is `Some`, the file exists on disk and its
/// SHA-256 equals `sha256`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub version: String,
    pub filename: String,
    pub size: u64,
    pub sha256: String,
    pub local_path: Option<PathBuf>,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub mirror_urls: HashMap<MirrorId, String>,
}

impl Package {
    /// Derives the canonical on-disk filename for an engine package.
    #[must_use]
    pub fn filename_for(engine: &str, version: &str) -> String {
        format!("apache-{engine}-{version}-bin.tar.gz")
    }

    /// Parses `version` out of a canonical filename, returning `None` if the
    /// name does not match the `apache-<engine>-<version>-bin.tar.gz` pattern.
    #[must_use]
    pub fn parse_version_from_filename(engine: &str, filename: &str) -> Option<String> {
        let prefix = format!("apache-{engine}-");
        let suffix = "-bin.tar.gz";
        filename
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(suffix))
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}
