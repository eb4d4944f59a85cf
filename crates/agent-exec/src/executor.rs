//! Agent-side installation step executor (§4.8)
//!
//! Runs the nine-step state machine driven by a single `install`
//! command's parameters, reporting progress through a callback rather
//! than owning the wire — `apps/agent` wraps each callback invocation
//! into a `[step] message` [`fleet_types::CommandResponse`].
//!
//! Every step is idempotent, per §4.6's retry contract: `verify` only
//! reads, `extract` overwrites a clean `install_dir`, configuration
//! edits always replace rather than append, and plugin installs
//! overwrite existing jars.

use crate::alias::resolve_artifact_id;
use crate::checkpoint_template;
use crate::params::InstallParams;
use crate::registrar::ClusterRegistrar;
use crate::yaml_edit::{from_lines, replace_block_children, set_jvm_flag, set_scalar, to_lines};
use fleet_archive::{digests_match, sha256_file};
use fleet_cache::PackageCache;
use fleet_errors::{Error, InstallError};
use fleet_net::MirrorDownloader;
use fleet_types::{DeploymentMode, InstallStep, MirrorId};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

const HYBRID_CLUSTER_CONFIG: &str = "config/hazelcast.yaml";
const MASTER_CLUSTER_CONFIG: &str = "config/hazelcast-master.yaml";
const WORKER_CLUSTER_CONFIG: &str = "config/hazelcast-worker.yaml";
const CLIENT_CONFIG: &str = "config/hazelcast-client.yaml";
const ENGINE_CONFIG: &str = "config/seatunnel.yaml";
const HYBRID_JVM_OPTIONS: &str = "config/jvm_options";
const MASTER_JVM_OPTIONS: &str = "config/jvm_master_options";
const WORKER_JVM_OPTIONS: &str = "config/jvm_worker_options";

/// Progress callback invoked before and after each step; `progress` is
/// 0 at the step's start and 100 at its end.
pub type ProgressFn = dyn Fn(InstallStep, u8, String) + Send + Sync;

struct RunContext<'a> {
    params: &'a InstallParams,
    package_path: Option<PathBuf>,
}

pub struct StepExecutor {
    engine: String,
    install_dir: PathBuf,
    cache: Arc<PackageCache>,
    downloader: Arc<MirrorDownloader>,
    registrar: Arc<dyn ClusterRegistrar>,
}

impl StepExecutor {
    #[must_use]
    pub fn new(
        engine: impl Into<String>,
        install_dir: impl Into<PathBuf>,
        cache: Arc<PackageCache>,
        downloader: Arc<MirrorDownloader>,
        registrar: Arc<dyn ClusterRegistrar>,
    ) -> Self {
        Self {
            engine: engine.into(),
            install_dir: install_dir.into(),
            cache,
            downloader,
            registrar,
        }
    }

    /// Runs every step from `params.resume_from_step` (or `download` if
    /// unset) through `complete`, invoking `on_progress` around each.
    ///
    /// # Errors
    /// Returns the first step's error; later steps are not attempted.
    pub async fn run(&self, params: &InstallParams, on_progress: &ProgressFn) -> Result<(), Error> {
        let mut ctx = RunContext {
            params,
            package_path: None,
        };
        let start = params.resume_from_step.map_or(0, InstallStep::index);

        for step in InstallStep::ORDER.into_iter().skip(start) {
            on_progress(step, 0, "starting".to_string());
            self.run_step(step, &mut ctx).await?;
            on_progress(step, 100, "done".to_string());
        }
        Ok(())
    }

    async fn run_step(&self, step: InstallStep, ctx: &mut RunContext<'_>) -> Result<(), Error> {
        match step {
            InstallStep::Download => self.step_download(ctx).await,
            InstallStep::Verify => self.step_verify(ctx).await,
            InstallStep::Extract => self.step_extract(ctx).await,
            InstallStep::ConfigureCluster => self.step_configure_cluster(ctx).await,
            InstallStep::ConfigureCheckpoint => self.step_configure_checkpoint(ctx).await,
            InstallStep::ConfigureRuntime => self.step_configure_runtime(ctx).await,
            InstallStep::InstallPlugins => self.step_install_plugins(ctx).await,
            InstallStep::RegisterCluster => self.step_register_cluster(ctx).await,
            InstallStep::Complete => Ok(()),
        }
    }

    async fn step_download(&self, ctx: &mut RunContext<'_>) -> Result<(), Error> {
        if let Some(path) = &ctx.params.package_path {
            let path = PathBuf::from(path);
            fs::metadata(&path)
                .await
                .map_err(|_| InstallError::PackageNotFound {
                    version: ctx.params.version.clone(),
                })?;
            ctx.package_path = Some(path);
            return Ok(());
        }

        if self.cache.contains(&ctx.params.version).await {
            ctx.package_path = Some(self.cache.path_for(&ctx.params.version));
            return Ok(());
        }

        let task = self
            .downloader
            .download(&ctx.params.version, MirrorId::recommended())
            .await?;
        if task.status != fleet_net::DownloadStatus::Completed {
            return Err(InstallError::Remote {
                message: format!("agent-side mirror download for {} ended as {:?}", ctx.params.version, task.status),
            }
            .into());
        }
        ctx.package_path = Some(self.cache.path_for(&ctx.params.version));
        Ok(())
    }

    async fn step_verify(&self, ctx: &RunContext<'_>) -> Result<(), Error> {
        let Some(expected) = &ctx.params.expected_checksum else {
            return Ok(());
        };
        let path = ctx.package_path.as_ref().ok_or_else(|| InstallError::PackageNotFound {
            version: ctx.params.version.clone(),
        })?;
        let actual = sha256_file(path).await?;
        if !digests_match(&actual, expected) {
            return Err(InstallError::IntegrityFailed {
                message: format!("checksum mismatch: expected {expected}, got {actual}"),
            }
            .into());
        }
        Ok(())
    }

    async fn step_extract(&self, ctx: &RunContext<'_>) -> Result<(), Error> {
        let path = ctx.package_path.as_ref().ok_or_else(|| InstallError::PackageNotFound {
            version: ctx.params.version.clone(),
        })?;
        fleet_archive::extract_tar_gz(path, &self.install_dir).await?;
        Ok(())
    }

    async fn step_configure_cluster(&self, ctx: &RunContext<'_>) -> Result<(), Error> {
        let p = ctx.params;
        let member_entries: Vec<String> = if p.master_addrs.is_empty() {
            vec![format!("- 127.0.0.1:{}", p.cluster_port)]
        } else {
            p.master_addrs.iter().map(|a| format!("- {a}:{}", p.cluster_port)).collect()
        };

        let cluster_files: &[&str] = match p.deployment_mode {
            DeploymentMode::Hybrid => &[HYBRID_CLUSTER_CONFIG],
            DeploymentMode::Separated => &[MASTER_CLUSTER_CONFIG, WORKER_CLUSTER_CONFIG],
        };
        for file in cluster_files {
            self.edit_config_file(file, |lines| {
                set_scalar(lines, "port", &p.cluster_port.to_string());
                replace_block_children(lines, "member-list", &member_entries);
            })
            .await?;
        }

        self.edit_config_file(CLIENT_CONFIG, |lines| {
            replace_block_children(lines, "cluster-members", &member_entries);
        })
        .await?;

        self.edit_config_file(ENGINE_CONFIG, |lines| {
            set_scalar(lines, "http.port", &p.http_port.to_string());
            if let Some(slot) = p.dynamic_slot {
                set_scalar(lines, "dynamic-slot", &slot.to_string());
            }
        })
        .await?;

        Ok(())
    }

    async fn step_configure_checkpoint(&self, ctx: &RunContext<'_>) -> Result<(), Error> {
        let children = checkpoint_template::render(&ctx.params.checkpoint);
        if children.is_empty() {
            return Ok(());
        }
        self.edit_config_file(ENGINE_CONFIG, |lines| {
            replace_block_children(lines, "plugin-config", &children);
        })
        .await
    }

    async fn step_configure_runtime(&self, ctx: &RunContext<'_>) -> Result<(), Error> {
        let p = ctx.params;
        match p.deployment_mode {
            DeploymentMode::Hybrid => {
                if let Some(gb) = p.jvm.hybrid {
                    self.edit_config_file(HYBRID_JVM_OPTIONS, |lines| {
                        set_jvm_flag(lines, "-Xms", &format!("{gb}g"));
                        set_jvm_flag(lines, "-Xmx", &format!("{gb}g"));
                    })
                    .await?;
                }
            }
            DeploymentMode::Separated => {
                if let Some(gb) = p.jvm.master {
                    self.edit_config_file(MASTER_JVM_OPTIONS, |lines| {
                        set_jvm_flag(lines, "-Xms", &format!("{gb}g"));
                        set_jvm_flag(lines, "-Xmx", &format!("{gb}g"));
                    })
                    .await?;
                }
                if let Some(gb) = p.jvm.worker {
                    self.edit_config_file(WORKER_JVM_OPTIONS, |lines| {
                        set_jvm_flag(lines, "-Xms", &format!("{gb}g"));
                        set_jvm_flag(lines, "-Xmx", &format!("{gb}g"));
                    })
                    .await?;
                }
            }
        }
        Ok(())
    }

    async fn step_install_plugins(&self, ctx: &RunContext<'_>) -> Result<(), Error> {
        if !ctx.params.connectors_install {
            return Ok(());
        }
        let connectors_dir = self.install_dir.join("connectors");
        fs::create_dir_all(&connectors_dir)
            .await
            .map_err(|e| Error::io_with_path(&e, &connectors_dir))?;

        for plugin in &ctx.params.connectors_selected {
            let artifact = resolve_artifact_id(plugin);
            let canonical = connectors_dir.join(format!("{artifact}-{}.jar", ctx.params.version));
            if fs::metadata(&canonical).await.is_ok() {
                continue;
            }

            let found = Self::find_matching_jar(&connectors_dir, plugin, &ctx.params.version).await?;
            if found.is_none() {
                return Err(InstallError::PluginArtifactNotFound {
                    plugin: plugin.clone(),
                }
                .into());
            }
        }
        Ok(())
    }

    async fn find_matching_jar(dir: &Path, plugin: &str, version: &str) -> Result<Option<PathBuf>, Error> {
        let mut entries = match fs::read_dir(dir).await {
            Ok(e) => e,
            Err(_) => return Ok(None),
        };
        let prefix = plugin;
        let suffix = format!("-{version}.jar");
        while let Some(entry) = entries.next_entry().await.map_err(|e| Error::io_with_path(&e, dir))? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(prefix) && name.ends_with(&suffix) {
                return Ok(Some(entry.path()));
            }
        }
        Ok(None)
    }

    async fn step_register_cluster(&self, ctx: &RunContext<'_>) -> Result<(), Error> {
        if ctx.params.cluster_id.trim().is_empty() {
            return Ok(());
        }
        self.registrar.register(&ctx.params.cluster_id, &self.engine).await;
        Ok(())
    }

    async fn edit_config_file(
        &self,
        relative: &str,
        edit: impl FnOnce(&mut Vec<String>),
    ) -> Result<(), Error> {
        let path = self.install_dir.join(relative);
        let original = fs::read_to_string(&path).await.map_err(|e| Error::io_with_path(&e, &path))?;

        let backup = path.with_extension(format!(
            "{}.bak",
            path.extension().and_then(|e| e.to_str()).unwrap_or_default()
        ));
        if fs::metadata(&backup).await.is_err() {
            fs::write(&backup, &original).await.map_err(|e| Error::io_with_path(&e, &backup))?;
        }

        let mut lines = to_lines(&original);
        edit(&mut lines);
        fs::write(&path, from_lines(&lines)).await.map_err(|e| Error::io_with_path(&e, &path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registrar::NoopClusterRegistrar;
    use fleet_types::{CheckpointConfig, InstallMode, JvmConfig, NodeRole};
    use tempfile::tempdir;

    fn params(overrides: impl FnOnce(&mut InstallParams)) -> InstallParams {
        let mut p = InstallParams {
            cluster_id: "cluster-1".to_string(),
            version: "2.3.12".to_string(),
            install_mode: InstallMode::Offline,
            package_path: None,
            deployment_mode: DeploymentMode::Hybrid,
            node_role: NodeRole::Master,
            master_addrs: vec!["10.0.0.1".to_string()],
            worker_addrs: vec![],
            cluster_port: 5801,
            http_port: 8080,
            dynamic_slot: Some(3),
            jvm: JvmConfig {
                hybrid: Some(3),
                master: None,
                worker: None,
            },
            checkpoint: CheckpointConfig::default(),
            connectors_install: false,
            connectors_selected: vec![],
            resume_from_step: None,
            expected_checksum: None,
        };
        overrides(&mut p);
        p
    }

    fn executor(install_dir: &Path) -> StepExecutor {
        let (events, mut rx) = fleet_events::channel();
        tokio::spawn(async move { while rx.recv().await.is_some() {} });
        StepExecutor::new(
            "seatunnel",
            install_dir,
            Arc::new(PackageCache::new("seatunnel", install_dir.join("cache"))),
            Arc::new(MirrorDownloader::new("seatunnel", install_dir.join("cache"), events)),
            Arc::new(NoopClusterRegistrar),
        )
    }

    async fn write_fixture_configs(install_dir: &Path) {
        fs::create_dir_all(install_dir.join("config")).await.unwrap();
        fs::write(
            install_dir.join(HYBRID_CLUSTER_CONFIG),
            "network:\n  port: 5801\n  member-list:\n    - 127.0.0.1:5801\n",
        )
        .await
        .unwrap();
        fs::write(
            install_dir.join(CLIENT_CONFIG),
            "cluster-client:\n  cluster-members:\n    - 127.0.0.1:5801\n",
        )
        .await
        .unwrap();
        fs::write(
            install_dir.join(ENGINE_CONFIG),
            "engine:\n  http.port: 8080\n  dynamic-slot: 0\ncheckpoint:\n  plugin-config:\n    type: LOCAL_FILE\n",
        )
        .await
        .unwrap();
        fs::write(install_dir.join(HYBRID_JVM_OPTIONS), "#-Xms2g\n#-Xmx2g\n").await.unwrap();
    }

    #[tokio::test]
    async fn configure_cluster_rewrites_member_list_and_port() {
        let dir = tempdir().unwrap();
        write_fixture_configs(dir.path()).await;
        let exec = executor(dir.path());

        let p = params(|_| {});
        let mut ctx = RunContext {
            params: &p,
            package_path: None,
        };
        exec.step_configure_cluster(&mut ctx).await.unwrap();

        let written = fs::read_to_string(dir.path().join(HYBRID_CLUSTER_CONFIG)).await.unwrap();
        assert!(written.contains("- 10.0.0.1:5801"));
        assert!(!written.contains("127.0.0.1"));
        assert!(fs::metadata(dir.path().join("config/hazelcast.bak")).await.is_ok());
    }

    #[tokio::test]
    async fn configure_runtime_sets_hybrid_heap() {
        let dir = tempdir().unwrap();
        write_fixture_configs(dir.path()).await;
        let exec = executor(dir.path());

        let p = params(|_| {});
        let mut ctx = RunContext {
            params: &p,
            package_path: None,
        };
        exec.step_configure_runtime(&mut ctx).await.unwrap();

        let written = fs::read_to_string(dir.path().join(HYBRID_JVM_OPTIONS)).await.unwrap();
        assert!(written.contains("-Xms3g"));
        assert!(written.contains("-Xmx3g"));
    }

    #[tokio::test]
    async fn verify_fails_on_checksum_mismatch() {
        let dir = tempdir().unwrap();
        let package = dir.path().join("pkg.tar.gz");
        fs::write(&package, b"payload").await.unwrap();
        let exec = executor(dir.path());

        let p = params(|p| p.expected_checksum = Some("deadbeef".to_string()));
        let ctx = RunContext {
            params: &p,
            package_path: Some(package),
        };
        let err = exec.step_verify(&ctx).await.unwrap_err();
        assert!(matches!(err, Error::Install(InstallError::IntegrityFailed { .. })));
    }

    #[tokio::test]
    async fn verify_skips_when_no_checksum_provided() {
        let dir = tempdir().unwrap();
        let package = dir.path().join("pkg.tar.gz");
        fs::write(&package, b"payload").await.unwrap();
        let exec = executor(dir.path());

        let p = params(|_| {});
        let ctx = RunContext {
            params: &p,
            package_path: Some(package),
        };
        assert!(exec.step_verify(&ctx).await.is_ok());
    }

    #[tokio::test]
    async fn install_plugins_fails_when_jar_absent() {
        let dir = tempdir().unwrap();
        let exec = executor(dir.path());

        let p = params(|p| {
            p.connectors_install = true;
            p.connectors_selected = vec!["mysql-cdc".to_string()];
        });
        let mut ctx = RunContext {
            params: &p,
            package_path: None,
        };
        let err = exec.step_install_plugins(&mut ctx).await.unwrap_err();
        assert!(matches!(err, Error::Install(InstallError::PluginArtifactNotFound { .. })));
    }

    #[tokio::test]
    async fn install_plugins_accepts_canonical_jar_name() {
        let dir = tempdir().unwrap();
        let connectors = dir.path().join("connectors");
        fs::create_dir_all(&connectors).await.unwrap();
        fs::write(connectors.join("connector-cdc-mysql-2.3.12.jar"), b"jar").await.unwrap();
        let exec = executor(dir.path());

        let p = params(|p| {
            p.connectors_install = true;
            p.connectors_selected = vec!["mysql-cdc".to_string()];
        });
        let mut ctx = RunContext {
            params: &p,
            package_path: None,
        };
        assert!(exec.step_install_plugins(&mut ctx).await.is_ok());
    }
}
