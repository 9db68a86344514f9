use std::time::Duration;

use serde::Deserialize;

use super::telemetry::TelemetryConfig;

#[derive(Clone, Deserialize, Debug)]
pub struct KeeperConfig {
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Cluster manifest read at start and written back on exit.
    #[serde(default = "KeeperConfig::default_manifest_path")]
    pub manifest_path: String,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

impl KeeperConfig {
    fn default_manifest_path() -> String {
        "cluster.yaml".to_string()
    }
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            telemetry: Default::default(),
            manifest_path: Self::default_manifest_path(),
            snapshot: Default::default(),
        }
    }
}

#[derive(Clone, Deserialize, Debug)]
pub struct SnapshotConfig {
    #[serde(default = "SnapshotConfig::default_wait_interval_ms")]
    pub wait_interval_ms: u64,
    #[serde(default = "SnapshotConfig::default_csi_snapshot_timeout_secs")]
    pub csi_snapshot_timeout_secs: u64,
    #[serde(default = "SnapshotConfig::default_await_snapshot_handle")]
    pub await_snapshot_handle: bool,
    #[serde(default = "SnapshotConfig::default_max_conflict_retries")]
    pub max_conflict_retries: usize,
    #[serde(default = "SnapshotConfig::default_conflict_backoff_ms")]
    pub conflict_backoff_ms: u64,
}

impl SnapshotConfig {
    fn default_wait_interval_ms() -> u64 {
        5_000
    }
    fn default_csi_snapshot_timeout_secs() -> u64 {
        10 * 60
    }
    fn default_await_snapshot_handle() -> bool {
        true
    }
    fn default_max_conflict_retries() -> usize {
        5
    }
    fn default_conflict_backoff_ms() -> u64 {
        10
    }

    pub fn wait_interval(&self) -> Duration {
        Duration::from_millis(self.wait_interval_ms)
    }

    pub fn csi_snapshot_timeout(&self) -> Duration {
        Duration::from_secs(self.csi_snapshot_timeout_secs)
    }

    pub fn conflict_backoff(&self) -> Duration {
        Duration::from_millis(self.conflict_backoff_ms)
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            wait_interval_ms: Self::default_wait_interval_ms(),
            csi_snapshot_timeout_secs: Self::default_csi_snapshot_timeout_secs(),
            await_snapshot_handle: Self::default_await_snapshot_handle(),
            max_conflict_retries: Self::default_max_conflict_retries(),
            conflict_backoff_ms: Self::default_conflict_backoff_ms(),
        }
    }
}

/// Layers `snapkeeper.yaml`, any yaml file passed as an argument, then
/// `SNAPKEEPER__*` environment variables.
pub fn build_config() -> anyhow::Result<config::Config> {
    let args: Vec<String> = std::env::args().collect();
    let mut config = config::Config::builder().add_source(
        config::File::with_name("snapkeeper")
            .required(false)
            .format(config::FileFormat::Yaml),
    );
    for arg in args {
        if arg.ends_with("yaml") || arg.ends_with("yml") {
            config = config.add_source(
                config::File::from(std::path::Path::new(arg.as_str()))
                    .format(config::FileFormat::Yaml)
                    .required(false),
            );
        }
    }
    config = config.add_source(
        config::Environment::with_prefix("SNAPKEEPER")
            .separator("__")
            .try_parsing(true),
    );
    Ok(config.build()?)
}
