//! Checkpoint storage `plugin-config` block templates (§4.8 `configure_checkpoint`)

use fleet_types::{CheckpointConfig, CheckpointStorageType};

/// Renders the `plugin-config` block children for `cfg`'s storage type.
/// Validation of required fields happens at request time
/// (`fleet_orchestrator::validate`); this assumes `cfg` is well-formed.
#[must_use]
pub fn render(cfg: &CheckpointConfig) -> Vec<String> {
    let Some(storage_type) = cfg.storage_type else {
        return Vec::new();
    };
    let namespace = cfg.namespace.as_deref().unwrap_or_default();

    match storage_type {
        CheckpointStorageType::LocalFile => vec![
            "type: LOCAL_FILE".to_string(),
            format!("namespace: {namespace}"),
        ],
        CheckpointStorageType::Hdfs => vec![
            "type: HDFS".to_string(),
            format!("namespace: {namespace}"),
            format!(
                "fs.defaultFS: hdfs://{}:{}",
                cfg.hdfs_namenode_host.as_deref().unwrap_or_default(),
                cfg.hdfs_namenode_port.unwrap_or_default(),
            ),
        ],
        CheckpointStorageType::Oss | CheckpointStorageType::S3 => vec![
            format!("type: {}", if storage_type == CheckpointStorageType::Oss { "OSS" } else { "S3" }),
            format!("namespace: {namespace}"),
            format!("s3.endpoint: {}", cfg.storage_endpoint.as_deref().unwrap_or_default()),
            format!("s3.access-key: {}", cfg.storage_access_key.as_deref().unwrap_or_default()),
            format!("s3.secret-key: {}", cfg.storage_secret_key.as_deref().unwrap_or_default()),
            format!("s3.bucket: {}", cfg.storage_bucket.as_deref().unwrap_or_default()),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nothing_when_storage_type_is_unset() {
        assert!(render(&CheckpointConfig::default()).is_empty());
    }

    #[test]
    fn renders_local_file_block() {
        let cfg = CheckpointConfig {
            storage_type: Some(CheckpointStorageType::LocalFile),
            namespace: Some("/tmp/checkpoints".to_string()),
            ..CheckpointConfig::default()
        };
        let lines = render(&cfg);
        assert!(lines.contains(&"type: LOCAL_FILE".to_string()));
        assert!(lines.iter().any(|l| l.contains("/tmp/checkpoints")));
    }
}
