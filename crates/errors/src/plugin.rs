//! Plugin catalog and delivery error kinds

use crate::ErrorKind;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum PluginError {
    #[error("no artifact alias known for plugin {name}")]
    UnknownPlugin { name: String },

    #[error("plugin jar not found for {artifact}-{version}")]
    JarNotFound { artifact: String, version: String },

    #[error("failed to download plugin {name}: {message}")]
    DownloadFailed { name: String, message: String },
}

impl ErrorKind for PluginError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::DownloadFailed { .. })
    }
}
