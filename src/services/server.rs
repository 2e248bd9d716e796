use anyhow::Result;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::UpstreamClient;
use crate::api::handlers::AppState;
use crate::api::routes::create_router;
use crate::config::settings::AppConfig;
use crate::database;
use crate::services::sync::SyncService;

pub struct ServerService {
    port: u16,
    config: AppConfig,
}

impl ServerService {
    pub fn new(port: u16, config: AppConfig) -> Self {
        Self { port, config }
    }

    pub async fn run(&self) -> Result<()> {
        let state = Arc::new(build_state(self.config.clone())?);

        let app = create_router(state)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Open the store and the upstream client described by `config`.
pub fn build_state(config: AppConfig) -> Result<AppState> {
    info!("Using database {}", config.storage.database_path);
    let pool = database::open(&config.storage.database_path)?;
    let client = UpstreamClient::new(&config.upstream)?;
    info!("Syncing from {}", client.base_url());

    Ok(AppState {
        sync: SyncService::new(pool.clone(), client),
        pool,
        config,
    })
}
