//! What a precheck run validates against, supplied by the orchestrator
//! before installing to a host.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct PrecheckConfig {
    pub min_memory_mb: u64,
    pub min_cpu_cores: usize,
    pub min_disk_mb: u64,
    pub required_ports: Vec<u16>,
    pub min_runtime_major_version: Option<u32>,
    pub install_dir: PathBuf,
    pub liveness_processes: Vec<String>,
    pub liveness_urls: Vec<String>,
}

impl Default for PrecheckConfig {
    fn default() -> Self {
        Self {
            min_memory_mb: 2048,
            min_cpu_cores: 2,
            min_disk_mb: 10_240,
            required_ports: Vec::new(),
            min_runtime_major_version: Some(8),
            install_dir: PathBuf::from("/opt/seatunnel"),
            liveness_processes: Vec::new(),
            liveness_urls: Vec::new(),
        }
    }
}
