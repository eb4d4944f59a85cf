//! Installation request validation (§4.6 step 1, §7 checkpoint/JVM rules)

use fleet_errors::InstallError;
use fleet_types::{
    CheckpointConfig, CheckpointStorageType, DeploymentMode, EngineVersion, InstallationRequest,
    JvmConfig, NodeRole,
};

const MIN_HEAP_GB: u32 = 1;

/// Validates version syntax, mode/role/address consistency, checkpoint
/// storage fields, and heap sizes.
///
/// # Errors
/// Returns `InstallError::InvalidRequest` describing the first
/// violation found.
pub fn validate(req: &InstallationRequest) -> Result<(), InstallError> {
    if req.host_id.trim().is_empty() {
        return Err(InstallError::InvalidRequest {
            message: "host_id must not be empty".to_string(),
        });
    }

    EngineVersion::parse(&req.version).map_err(|e| InstallError::InvalidRequest {
        message: format!("invalid version {}: {e}", req.version),
    })?;

    if req.deployment_mode == DeploymentMode::Separated
        && req.node_role == NodeRole::Master
        && req.master_addrs.is_empty()
    {
        return Err(InstallError::InvalidRequest {
            message: "separated deployment with master role requires at least one master address"
                .to_string(),
        });
    }

    if req.node_role == NodeRole::Worker && req.worker_addrs.is_empty() && req.master_addrs.is_empty() {
        return Err(InstallError::InvalidRequest {
            message: "worker role requires at least one master or worker address to join"
                .to_string(),
        });
    }

    validate_checkpoint(&req.checkpoint)?;
    validate_jvm(&req.jvm)?;

    Ok(())
}

fn validate_checkpoint(cfg: &CheckpointConfig) -> Result<(), InstallError> {
    let Some(storage_type) = cfg.storage_type else {
        return Ok(());
    };

    let missing = |field: &str| InstallError::InvalidRequest {
        message: format!("checkpoint storage {storage_type:?} requires {field}"),
    };

    if cfg.namespace.as_deref().unwrap_or_default().is_empty() {
        return Err(missing("namespace"));
    }

    match storage_type {
        CheckpointStorageType::LocalFile => {}
        CheckpointStorageType::Hdfs => {
            if cfg.hdfs_namenode_host.as_deref().unwrap_or_default().is_empty() {
                return Err(missing("hdfs_namenode_host"));
            }
            if cfg.hdfs_namenode_port.unwrap_or(0) == 0 {
                return Err(missing("a non-zero hdfs_namenode_port"));
            }
        }
        CheckpointStorageType::Oss | CheckpointStorageType::S3 => {
            if cfg.storage_endpoint.as_deref().unwrap_or_default().is_empty() {
                return Err(missing("storage_endpoint"));
            }
            if cfg.storage_access_key.as_deref().unwrap_or_default().is_empty() {
                return Err(missing("storage_access_key"));
            }
            if cfg.storage_secret_key.as_deref().unwrap_or_default().is_empty() {
                return Err(missing("storage_secret_key"));
            }
            if cfg.storage_bucket.as_deref().unwrap_or_default().is_empty() {
                return Err(missing("storage_bucket"));
            }
        }
    }

    Ok(())
}

fn validate_jvm(jvm: &JvmConfig) -> Result<(), InstallError> {
    for (label, heap) in [("hybrid", jvm.hybrid), ("master", jvm.master), ("worker", jvm.worker)] {
        if let Some(gb) = heap {
            if gb < MIN_HEAP_GB {
                return Err(InstallError::InvalidRequest {
                    message: format!("jvm.{label} heap must be at least {MIN_HEAP_GB}g, got {gb}g"),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_types::{CheckpointConfig, ConnectorsConfig, InstallMode, JvmConfig};

    fn base_request() -> InstallationRequest {
        InstallationRequest {
            host_id: "host-1".to_string(),
            cluster_id: "cluster-1".to_string(),
            version: "2.3.12".to_string(),
            install_mode: InstallMode::Online,
            mirror: None,
            package_path: None,
            expected_checksum: None,
            deployment_mode: DeploymentMode::Hybrid,
            node_role: NodeRole::Master,
            master_addrs: vec!["10.0.0.1".to_string()],
            worker_addrs: vec![],
            cluster_port: 5801,
            worker_port: None,
            http_port: 8080,
            dynamic_slot: None,
            jvm: JvmConfig::default(),
            checkpoint: CheckpointConfig::default(),
            connectors: ConnectorsConfig::default(),
        }
    }

    #[test]
    fn accepts_a_well_formed_request() {
        assert!(validate(&base_request()).is_ok());
    }

    #[test]
    fn rejects_invalid_version() {
        let mut req = base_request();
        req.version = "not-a-version".to_string();
        assert!(validate(&req).is_err());
    }

    #[test]
    fn rejects_separated_master_without_addresses() {
        let mut req = base_request();
        req.deployment_mode = DeploymentMode::Separated;
        req.master_addrs.clear();
        assert!(validate(&req).is_err());
    }

    #[test]
    fn rejects_s3_checkpoint_missing_bucket() {
        let mut req = base_request();
        req.checkpoint = CheckpointConfig {
            storage_type: Some(CheckpointStorageType::S3),
            namespace: Some("ns".to_string()),
            storage_endpoint: Some("https://s3.example.com".to_string()),
            storage_access_key: Some("key".to_string()),
            storage_secret_key: Some("secret".to_string()),
            storage_bucket: None,
            ..CheckpointConfig::default()
        };
        assert!(validate(&req).is_err());
    }

    #[test]
    fn accepts_local_file_checkpoint_with_namespace_only() {
        let mut req = base_request();
        req.checkpoint = CheckpointConfig {
            storage_type: Some(CheckpointStorageType::LocalFile),
            namespace: Some("ns".to_string()),
            ..CheckpointConfig::default()
        };
        assert!(validate(&req).is_ok());
    }

    #[test]
    fn rejects_sub_gigabyte_heap() {
        let mut req = base_request();
        req.jvm.hybrid = Some(0);
        assert!(validate(&req).is_err());
    }
}
