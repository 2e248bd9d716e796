use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};
use log::info;
use serde_json::json;
use std::sync::Arc;

use super::{AppState, SyncCompetitionBody, connection, query_error};
use crate::api::models::DbSnapshot;
use crate::database;
use crate::domain::{SyncResponse, ValidationError};
use crate::services::queries;

pub async fn sync_competitions(State(state): State<Arc<AppState>>) -> Json<SyncResponse> {
    info!("Received request to sync all competitions");
    Json(state.sync.sync_competitions().await)
}

pub async fn sync_competition(
    State(state): State<Arc<AppState>>,
    Path(competition_id): Path<String>,
    body: Option<Json<SyncCompetitionBody>>,
) -> Json<SyncResponse> {
    let Json(body) = body.unwrap_or_default();
    info!(
        "Received request to sync competition {} ({:?})",
        competition_id, body.competition_name
    );

    let Some(name) = body.competition_name.filter(|n| !n.trim().is_empty()) else {
        return Json(SyncResponse::failed_with(
            "Invalid competition data",
            ValidationError::MissingFields("competition_name".to_string()),
        ));
    };

    Json(
        state
            .sync
            .sync_competition_with_related(&competition_id, &name)
            .await,
    )
}

pub async fn sync_competition_stages(
    State(state): State<Arc<AppState>>,
    Path(competition_id): Path<String>,
) -> Json<SyncResponse> {
    info!("Syncing stages for competition {}", competition_id);
    Json(state.sync.sync_stages(&competition_id).await)
}

pub async fn sync_competition_teams(
    State(state): State<Arc<AppState>>,
    Path(competition_id): Path<String>,
) -> Json<SyncResponse> {
    info!("Syncing teams for competition {}", competition_id);
    Json(state.sync.sync_teams_and_players(&competition_id).await)
}

pub async fn sync_stage_scores(
    State(state): State<Arc<AppState>>,
    Path(stage_id): Path<String>,
) -> Json<SyncResponse> {
    info!("Syncing scores for stage {}", stage_id);
    Json(state.sync.sync_scores(&stage_id, None).await)
}

pub async fn sync_stage_stats(
    State(state): State<Arc<AppState>>,
    Path(stage_id): Path<String>,
) -> Json<SyncResponse> {
    info!("Syncing scores and stats for stage {}", stage_id);
    Json(state.sync.sync_stage_stats(&stage_id).await)
}

pub async fn list_synced_competitions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut conn = match connection(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match queries::list_competition_records(&mut conn) {
        Ok(records) => Json(records).into_response(),
        Err(e) => query_error(e),
    }
}

pub async fn test_db(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot =
        database::get_connection(&state.pool).and_then(|mut conn| queries::snapshot(&mut conn));

    match snapshot {
        Ok(data) => Json(DbSnapshot {
            success: true,
            data,
        })
        .into_response(),
        Err(e) => {
            log::error!("Database test failed: {:#}", e);
            Json(json!({"success": false, "error": e.to_string()})).into_response()
        }
    }
}
