//! Parses the `install` command's flat `string -> string` parameter map
//! (produced by `InstallationRequest::to_param_map`) back into a
//! structured form the executor can work with.

use fleet_errors::InstallError;
use fleet_types::{
    CheckpointConfig, CheckpointStorageType, DeploymentMode, InstallMode, InstallStep, JvmConfig,
    NodeRole,
};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct InstallParams {
    pub cluster_id: String,
    pub version: String,
    pub install_mode: InstallMode,
    pub package_path: Option<String>,
    pub deployment_mode: DeploymentMode,
    pub node_role: NodeRole,
    pub master_addrs: Vec<String>,
    pub worker_addrs: Vec<String>,
    pub cluster_port: u16,
    pub http_port: u16,
    pub dynamic_slot: Option<u32>,
    pub jvm: JvmConfig,
    pub checkpoint: CheckpointConfig,
    pub connectors_install: bool,
    pub connectors_selected: Vec<String>,
    pub resume_from_step: Option<InstallStep>,
    pub expected_checksum: Option<String>,
}

fn required<'a>(map: &'a HashMap<String, String>, key: &str) -> Result<&'a str, InstallError> {
    map.get(key).map(String::as_str).ok_or_else(|| InstallError::InvalidRequest {
        message: format!("missing required install parameter `{key}`"),
    })
}

fn parse_list(map: &HashMap<String, String>, key: &str) -> Vec<String> {
    map.get(key)
        .map(|v| v.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect())
        .unwrap_or_default()
}

impl InstallParams {
    /// # Errors
    /// Returns `InstallError::InvalidRequest` if a required field is
    /// missing or fails to parse.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, InstallError> {
        let bad = |key: &str, raw: &str| InstallError::InvalidRequest {
            message: format!("invalid install parameter `{key}`: {raw}"),
        };

        let install_mode = match required(map, "install_mode")? {
            "online" => InstallMode::Online,
            "offline" => InstallMode::Offline,
            other => return Err(bad("install_mode", other)),
        };
        let deployment_mode = match required(map, "deployment_mode")? {
            "hybrid" => DeploymentMode::Hybrid,
            "separated" => DeploymentMode::Separated,
            other => return Err(bad("deployment_mode", other)),
        };
        let node_role = match required(map, "node_role")? {
            "master" => NodeRole::Master,
            "worker" => NodeRole::Worker,
            other => return Err(bad("node_role", other)),
        };
        let cluster_port = required(map, "cluster_port")?
            .parse()
            .map_err(|_| bad("cluster_port", required(map, "cluster_port").unwrap_or_default()))?;
        let http_port = required(map, "http_port")?
            .parse()
            .map_err(|_| bad("http_port", required(map, "http_port").unwrap_or_default()))?;
        let dynamic_slot = map.get("dynamic_slot").map(|v| v.parse()).transpose().map_err(|_| {
            bad("dynamic_slot", map.get("dynamic_slot").map(String::as_str).unwrap_or_default())
        })?;

        let storage_type = match map.get("checkpoint_storage_type").map(String::as_str) {
            None => None,
            Some("LOCAL_FILE") => Some(CheckpointStorageType::LocalFile),
            Some("HDFS") => Some(CheckpointStorageType::Hdfs),
            Some("OSS") => Some(CheckpointStorageType::Oss),
            Some("S3") => Some(CheckpointStorageType::S3),
            Some(other) => return Err(bad("checkpoint_storage_type", other)),
        };

        let resume_from_step = map
            .get("resume_from_step")
            .map(|v| InstallStep::from_name(v).ok_or_else(|| bad("resume_from_step", v)))
            .transpose()?;

        Ok(Self {
            cluster_id: required(map, "cluster_id")?.to_string(),
            version: required(map, "version")?.to_string(),
            install_mode,
            package_path: map.get("package_path").cloned(),
            deployment_mode,
            node_role,
            master_addrs: parse_list(map, "master_addrs"),
            worker_addrs: parse_list(map, "worker_addrs"),
            cluster_port,
            http_port,
            dynamic_slot,
            jvm: JvmConfig {
                hybrid: map.get("jvm_hybrid").and_then(|v| v.parse().ok()),
                master: map.get("jvm_master").and_then(|v| v.parse().ok()),
                worker: map.get("jvm_worker").and_then(|v| v.parse().ok()),
            },
            checkpoint: CheckpointConfig {
                storage_type,
                namespace: map.get("checkpoint_namespace").cloned(),
                hdfs_namenode_host: map.get("checkpoint_hdfs_namenode_host").cloned(),
                hdfs_namenode_port: map
                    .get("checkpoint_hdfs_namenode_port")
                    .and_then(|v| v.parse().ok()),
                storage_endpoint: map.get("checkpoint_storage_endpoint").cloned(),
                storage_access_key: map.get("checkpoint_storage_access_key").cloned(),
                storage_secret_key: map.get("checkpoint_storage_secret_key").cloned(),
                storage_bucket: map.get("checkpoint_storage_bucket").cloned(),
            },
            connectors_install: map.get("connectors_install").is_some_and(|v| v == "true"),
            connectors_selected: parse_list(map, "connectors_selected"),
            resume_from_step,
            expected_checksum: map.get("expected_checksum").cloned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> HashMap<String, String> {
        let mut m = HashMap::new();
        m.insert("cluster_id".into(), "cluster-1".into());
        m.insert("version".into(), "2.3.12".into());
        m.insert("install_mode".into(), "online".into());
        m.insert("deployment_mode".into(), "hybrid".into());
        m.insert("node_role".into(), "master".into());
        m.insert("master_addrs".into(), "10.0.0.1,10.0.0.2".into());
        m.insert("worker_addrs".into(), String::new());
        m.insert("cluster_port".into(), "5801".into());
        m.insert("http_port".into(), "8080".into());
        m.insert("connectors_install".into(), "true".into());
        m.insert("connectors_selected".into(), "mysql-cdc,kafka".into());
        m
    }

    #[test]
    fn parses_a_well_formed_map() {
        let params = InstallParams::from_map(&sample_map()).unwrap();
        assert_eq!(params.master_addrs, vec!["10.0.0.1", "10.0.0.2"]);
        assert!(params.worker_addrs.is_empty());
        assert_eq!(params.connectors_selected, vec!["mysql-cdc", "kafka"]);
        assert_eq!(params.cluster_port, 5801);
    }

    #[test]
    fn rejects_missing_required_field() {
        let mut map = sample_map();
        map.remove("version");
        assert!(InstallParams::from_map(&map).is_err());
    }

    #[test]
    fn rejects_unparseable_port() {
        let mut map = sample_map();
        map.insert("cluster_port".into(), "not-a-number".into());
        assert!(InstallParams::from_map(&map).is_err());
    }

    #[test]
    fn parses_s3_checkpoint_fields() {
        let mut map = sample_map();
        map.insert("checkpoint_storage_type".into(), "S3".into());
        map.insert("checkpoint_namespace".into(), "ns".into());
        map.insert("checkpoint_storage_endpoint".into(), "https://s3.example.com".into());
        map.insert("checkpoint_storage_access_key".into(), "key".into());
        map.insert("checkpoint_storage_secret_key".into(), "secret".into());
        map.insert("checkpoint_storage_bucket".into(), "bucket".into());

        let params = InstallParams::from_map(&map).unwrap();
        assert_eq!(params.checkpoint.storage_bucket.as_deref(), Some("bucket"));
        assert_eq!(params.checkpoint.storage_endpoint.as_deref(), Some("https://s3.example.com"));
    }
}
