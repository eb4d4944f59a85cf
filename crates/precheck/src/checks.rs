//! Individual check implementations (§"Precheck Engine")

use crate::config::PrecheckConfig;
use fleet_types::{java_major_version, PrecheckItem, PrecheckStatus};
use std::net::SocketAddr;
use sysinfo::System;
use tokio::net::TcpListener;

#[must_use]
pub fn check_memory(config: &PrecheckConfig, sys: &System) -> PrecheckItem {
    let total_mb = sys.total_memory() / (1024 * 1024);
    let status = if total_mb >= config.min_memory_mb {
        PrecheckStatus::Passed
    } else {
        PrecheckStatus::Failed
    };
    PrecheckItem {
        name: "memory".to_string(),
        status,
        message: format!("{total_mb} MiB total, {} MiB required", config.min_memory_mb),
        details: None,
    }
}

#[must_use]
pub fn check_cpu(config: &PrecheckConfig, sys: &System) -> PrecheckItem {
    let cores = sys.cpus().len();
    let status = if cores >= config.min_cpu_cores {
        PrecheckStatus::Passed
    } else {
        PrecheckStatus::Warning
    };
    PrecheckItem {
        name: "cpu".to_string(),
        status,
        message: format!("{cores} cores available, {} required", config.min_cpu_cores),
        details: None,
    }
}

#[must_use]
pub fn check_disk(config: &PrecheckConfig, disks: &sysinfo::Disks) -> PrecheckItem {
    let available_mb = disks
        .iter()
        .map(|d| d.available_space() / (1024 * 1024))
        .max()
        .unwrap_or(0);
    let status = if available_mb >= config.min_disk_mb {
        PrecheckStatus::Passed
    } else if available_mb > 0 {
        PrecheckStatus::Warning
    } else {
        PrecheckStatus::Failed
    };
    PrecheckItem {
        name: "disk".to_string(),
        status,
        message: format!(
            "{available_mb} MiB available on the largest volume, {} MiB required",
            config.min_disk_mb
        ),
        details: None,
    }
}

/// Tries binding each required port on all interfaces; a port that is
/// free to bind is considered passing (it will be available for the
/// engine process to claim at startup).
pub async fn check_ports(config: &PrecheckConfig) -> PrecheckItem {
    if config.required_ports.is_empty() {
        return PrecheckItem {
            name: "ports".to_string(),
            status: PrecheckStatus::Passed,
            message: "no ports configured".to_string(),
            details: None,
        };
    }

    let mut busy = Vec::new();
    for &port in &config.required_ports {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        match TcpListener::bind(addr).await {
            Ok(listener) => drop(listener),
            Err(_) => busy.push(port),
        }
    }

    if busy.is_empty() {
        PrecheckItem {
            name: "ports".to_string(),
            status: PrecheckStatus::Passed,
            message: format!("{} ports free", config.required_ports.len()),
            details: None,
        }
    } else {
        PrecheckItem {
            name: "ports".to_string(),
            status: PrecheckStatus::Failed,
            message: format!("{} port(s) already in use", busy.len()),
            details: Some(format!("{busy:?}")),
        }
    }
}

/// Runs `java -version` and checks its major version against the
/// configured minimum, if any. Skipped (reported `passed`, noted in
/// the message) when no minimum is configured.
pub async fn check_runtime_version(config: &PrecheckConfig) -> PrecheckItem {
    let Some(min_major) = config.min_runtime_major_version else {
        return PrecheckItem {
            name: "runtime_version".to_string(),
            status: PrecheckStatus::Passed,
            message: "no runtime version requirement configured".to_string(),
            details: None,
        };
    };

    let output = tokio::process::Command::new("java")
        .arg("-version")
        .output()
        .await;

    let Ok(output) = output else {
        return PrecheckItem {
            name: "runtime_version".to_string(),
            status: PrecheckStatus::Failed,
            message: "java runtime not found on PATH".to_string(),
            details: None,
        };
    };

    // `java -version` writes to stderr.
    let raw = String::from_utf8_lossy(&output.stderr);
    let version_str = raw
        .lines()
        .next()
        .and_then(|line| line.split('"').nth(1))
        .unwrap_or_default();

    match java_major_version(version_str) {
        Ok(major) if major >= min_major => PrecheckItem {
            name: "runtime_version".to_string(),
            status: PrecheckStatus::Passed,
            message: format!("java {major} detected, {min_major}+ required"),
            details: None,
        },
        Ok(major) => PrecheckItem {
            name: "runtime_version".to_string(),
            status: PrecheckStatus::Failed,
            message: format!("java {major} detected, {min_major}+ required"),
            details: None,
        },
        Err(_) => PrecheckItem {
            name: "runtime_version".to_string(),
            status: PrecheckStatus::Warning,
            message: format!("could not parse java version from {version_str:?}"),
            details: None,
        },
    }
}

/// Creates and removes a marker file inside `install_dir` to confirm
/// it exists (creating it if absent) and is writable.
pub async fn check_directory_writability(config: &PrecheckConfig) -> PrecheckItem {
    if let Err(e) = tokio::fs::create_dir_all(&config.install_dir).await {
        return PrecheckItem {
            name: "directory_writability".to_string(),
            status: PrecheckStatus::Failed,
            message: format!("cannot create {}: {e}", config.install_dir.display()),
            details: None,
        };
    }

    let marker = config.install_dir.join(".fleetd-precheck");
    match tokio::fs::write(&marker, b"ok").await {
        Ok(()) => {
            let _ = tokio::fs::remove_file(&marker).await;
            PrecheckItem {
                name: "directory_writability".to_string(),
                status: PrecheckStatus::Passed,
                message: format!("{} is writable", config.install_dir.display()),
                details: None,
            }
        }
        Err(e) => PrecheckItem {
            name: "directory_writability".to_string(),
            status: PrecheckStatus::Failed,
            message: format!("{} is not writable: {e}", config.install_dir.display()),
            details: None,
        },
    }
}

/// Confirms configured process names are currently running and
/// configured `host:port` liveness targets accept a TCP connection.
pub async fn check_liveness(config: &PrecheckConfig, sys: &System) -> PrecheckItem {
    if config.liveness_processes.is_empty() && config.liveness_urls.is_empty() {
        return PrecheckItem {
            name: "liveness".to_string(),
            status: PrecheckStatus::Passed,
            message: "no liveness targets configured".to_string(),
            details: None,
        };
    }

    let mut missing_processes = Vec::new();
    for name in &config.liveness_processes {
        let running = sys
            .processes_by_exact_name(std::ffi::OsStr::new(name))
            .next()
            .is_some();
        if !running {
            missing_processes.push(name.clone());
        }
    }

    let mut unreachable = Vec::new();
    for target in &config.liveness_urls {
        if tokio::net::TcpStream::connect(target).await.is_err() {
            unreachable.push(target.clone());
        }
    }

    if missing_processes.is_empty() && unreachable.is_empty() {
        PrecheckItem {
            name: "liveness".to_string(),
            status: PrecheckStatus::Passed,
            message: "all configured processes and endpoints are live".to_string(),
            details: None,
        }
    } else {
        PrecheckItem {
            name: "liveness".to_string(),
            status: PrecheckStatus::Warning,
            message: format!(
                "{} missing process(es), {} unreachable endpoint(s)",
                missing_processes.len(),
                unreachable.len()
            ),
            details: Some(format!("{missing_processes:?} / {unreachable:?}")),
        }
    }
}
