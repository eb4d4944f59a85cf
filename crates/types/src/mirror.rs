//! Mirror identity for the package download pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

/// A known mirror base, extensible at the match site in `fleet-net`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MirrorId {
    Aliyun,
    Apache,
    Huaweicloud,
}

impl MirrorId {
    /// The mirror recommended by default when a caller does not pick one.
    #[must_use]
    pub const fn recommended() -> Self {
        Self::Aliyun
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aliyun => "aliyun",
            Self::Apache => "apache",
            Self::Huaweicloud => "huaweicloud",
        }
    }
}

impl fmt::Display for MirrorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MirrorId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aliyun" => Ok(Self::Aliyun),
            "apache" => Ok(Self::Apache),
            "huaweicloud" => Ok(Self::Huaweicloud),
            other => Err(format!("unknown mirror: {other}")),
        }
    }
}
