use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;

use hrm_attendance::store::clock::SystemClock;
use hrm_attendance::store::kv::FileStore;
use hrm_attendance::{AttendanceStore, StoreOptions};

mod cli;
mod commands;
mod config;

use cli::Cli;
use config::Config;

#[actix_rt::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "hrm.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(data_dir = %config.data_dir.display(), "hrm starting...");

    let kv = FileStore::open(&config.data_dir)
        .with_context(|| format!("opening data directory {}", config.data_dir.display()))?;
    let store = AttendanceStore::open(
        Arc::new(kv),
        Arc::new(SystemClock),
        StoreOptions {
            latency: config.simulated_latency,
        },
    );

    commands::run(cli.command, &store, &config).await
}
