//! Mirror base URLs and package URL construction (§6.4)

use fleet_types::{MirrorId, Package};

#[must_use]
pub fn base_url(mirror: MirrorId, engine: &str) -> String {
    match mirror {
        MirrorId::Aliyun => format!("https://mirrors.aliyun.com/apache/{engine}"),
        MirrorId::Apache => format!("https://archive.apache.org/dist/{engine}"),
        MirrorId::Huaweicloud => format!("https://mirrors.huaweicloud.com/apache/{engine}"),
    }
}

/// Builds `<base>/<version>/apache-<engine>-<version>-bin.tar.gz`.
#[must_use]
pub fn package_url(mirror: MirrorId, engine: &str, version: &str) -> String {
    format!(
        "{}/{version}/{}",
        base_url(mirror, engine),
        Package::filename_for(engine, version)
    )
}
