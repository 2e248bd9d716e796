pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod http;
pub mod services;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

use crate::cli::Command;
use crate::config::settings::AppConfig;
use crate::domain::SyncResponse;
use crate::services::server::{ServerService, build_state};
use crate::services::sync::SyncService;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::new();
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_sync() -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let service = sync_service(AppConfig::new())?;
        let result = service.sync_all().await?;
        report(&result)
    })
}

pub fn handle_sync_competitions() -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let service = sync_service(AppConfig::new())?;
        let result = service.sync_competitions().await;
        report(&result)
    })
}

fn sync_service(config: AppConfig) -> Result<SyncService> {
    Ok(build_state(config)?.sync)
}

fn report(result: &SyncResponse) -> Result<()> {
    info!("{}", result.message);
    if !result.success {
        anyhow::bail!(
            "{}: {}",
            result.message,
            result.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}
