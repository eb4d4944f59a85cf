//! Runs all configured checks and rolls them up into a [`PrecheckResult`]

use crate::checks::{
    check_cpu, check_directory_writability, check_disk, check_liveness, check_memory,
    check_ports, check_runtime_version,
};
use crate::config::PrecheckConfig;
use fleet_events::{EventEmitter, EventSender, PrecheckEvent};
use fleet_types::PrecheckResult;
use sysinfo::{Disks, System};

/// Check names a [`PrecheckResult`] always reports exactly one item for.
pub const CHECK_NAMES: &[&str] = &[
    "memory",
    "cpu",
    "disk",
    "ports",
    "runtime_version",
    "directory_writability",
    "liveness",
];

/// Runs every configured check against the local host and emits a
/// [`PrecheckEvent::Completed`] summarizing the outcome.
pub async fn run_checks(host_id: &str, config: &PrecheckConfig, events: &EventSender) -> PrecheckResult {
    let mut sys = System::new_all();
    sys.refresh_all();
    let disks = Disks::new_with_refreshed_list();

    let items = vec![
        check_memory(config, &sys),
        check_cpu(config, &sys),
        check_disk(config, &disks),
        check_ports(config).await,
        check_runtime_version(config).await,
        check_directory_writability(config).await,
        check_liveness(config, &sys).await,
    ];

    let result = PrecheckResult::from_items(items);
    events.emit_precheck(PrecheckEvent::Completed {
        host_id: host_id.to_string(),
        overall_status: format!("{:?}", result.overall_status).to_lowercase(),
    });
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_one_item_per_check_name() {
        let (tx, _rx) = fleet_events::channel();
        let dir = tempfile::tempdir().unwrap();
        let config = PrecheckConfig {
            install_dir: dir.path().to_path_buf(),
            min_memory_mb: 0,
            min_cpu_cores: 0,
            min_disk_mb: 0,
            min_runtime_major_version: None,
            ..PrecheckConfig::default()
        };

        let result = run_checks("host-1", &config, &tx).await;
        assert_eq!(result.items.len(), CHECK_NAMES.len());
        for name in CHECK_NAMES {
            assert!(result.items.iter().any(|i| i.name == *name));
        }
    }

    #[tokio::test]
    async fn overall_status_is_worst_of_items() {
        let (tx, _rx) = fleet_events::channel();
        let dir = tempfile::tempdir().unwrap();
        let config = PrecheckConfig {
            install_dir: dir.path().to_path_buf(),
            min_memory_mb: u64::MAX,
            min_runtime_major_version: None,
            ..PrecheckConfig::default()
        };

        let result = run_checks("host-1", &config, &tx).await;
        assert_eq!(result.overall_status, fleet_types::PrecheckStatus::Failed);
    }
}
