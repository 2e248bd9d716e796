use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use serde::Deserialize;

use crate::config::settings::AppConfig;
use crate::database::DbConn;
use crate::services::sync::SyncService;

pub mod competitions;
pub mod sync;

pub struct AppState {
    pub pool: Pool<SqliteConnectionManager>,
    pub config: AppConfig,
    pub sync: SyncService,
}

#[derive(Deserialize)]
pub struct CompetitionListParams {
    pub only_nbpl: Option<String>,
}

impl CompetitionListParams {
    pub fn only_nbpl(&self) -> bool {
        matches!(self.only_nbpl.as_deref(), Some("true") | Some("1"))
    }
}

#[derive(Deserialize)]
pub struct StageListParams {
    pub competition_uuid: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub rank_type: Option<String>,
}

#[derive(Deserialize)]
pub struct StageParams {
    pub stage_uuid: Option<String>,
}

#[derive(Deserialize)]
pub struct TeamRankingParams {
    pub competition_uuid: Option<String>,
    /// Comma separated stage ids.
    pub stage_uuid: Option<String>,
}

impl TeamRankingParams {
    pub fn stage_ids(&self) -> Vec<String> {
        self.stage_uuid
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Deserialize)]
pub struct StatParams {
    pub competition_uuid: Option<String>,
    pub stage_uuid: Option<String>,
    /// Accepted for compatibility; stored stats are not split by model type.
    #[allow(dead_code)]
    pub model_type: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct SyncCompetitionBody {
    pub competition_name: Option<String>,
}

fn connection(state: &AppState) -> Result<DbConn, Response> {
    state
        .pool
        .get()
        .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, "DB Connection Error").into_response())
}

fn query_error(e: anyhow::Error) -> Response {
    log::error!("Query failed: {:#}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, format!("Query Error: {}", e)).into_response()
}

/// Integer query values are read the way the dashboard sends them, as text.
fn parse_int(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse().ok())
}
