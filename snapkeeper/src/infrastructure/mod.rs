mod config;
mod service;
mod service_provider;
mod telemetry;

#[rustfmt::skip]
pub use {
    config::{build_config, KeeperConfig},
    service_provider::ServiceProvider,
    telemetry::initialize_telemetry,
};
