mod infrastructure;

use chrono::Utc;
use colored::Colorize;
use tokio::sync::watch;
use tracing::{error, info};

use crate::infrastructure::{build_config, initialize_telemetry, KeeperConfig, ServiceProvider};

fn main() {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(x) => x,
        Err(e) => return eprintln!("{}: {}", "Cannot build runtime".red(), e),
    };
    runtime.block_on(async_run());
}

async fn async_run() {
    let config = match build_config().and_then(|c| Ok(c.try_deserialize::<KeeperConfig>()?)) {
        Ok(x) => x,
        Err(e) => {
            return eprintln!("{}: {}", "Cannot build config".red(), e);
        }
    };
    if let Err(e) = initialize_telemetry(&config.telemetry) {
        return eprintln!("{}: {}", "Cannot build logger".red(), e);
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let service_provider = match ServiceProvider::build(config, shutdown_rx).await {
        Ok(x) => x,
        Err(e) => {
            return eprintln!("{}: {}", "Cannot build Service Provider".red(), e);
        }
    };

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Stopping snapkeeper (ctrl-c handling).");
            let _ = shutdown_tx.send(true);
        }
    });

    let report = service_provider.backup_expiry_runner.run(Utc::now()).await;
    info!(
        "Expired {} backups, tore down {} volume snapshots",
        report.backups, report.snapshots
    );

    let manifest_path = &service_provider.config.manifest_path;
    if let Err(e) = service_provider.store.dump_manifest(manifest_path).await {
        error!("Cannot write manifest {manifest_path}: {e}");
    }
}
