use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{
    AppState, CompetitionListParams, StageListParams, StageParams, StatParams, TeamRankingParams,
    connection, parse_int, query_error,
};
use crate::api::models::ListEnvelope;
use crate::services::queries;

pub async fn get_competitions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CompetitionListParams>,
) -> impl IntoResponse {
    let mut conn = match connection(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match queries::list_competitions(&mut conn, params.only_nbpl(), &state.config.display) {
        Ok(list) => Json(ListEnvelope::new(list)).into_response(),
        Err(e) => query_error(e),
    }
}

pub async fn get_stages(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StageListParams>,
) -> impl IntoResponse {
    let mut conn = match connection(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    let competition_id = params.competition_uuid.unwrap_or_default();
    match queries::list_stages(
        &mut conn,
        &competition_id,
        parse_int(params.kind.as_deref()),
        parse_int(params.rank_type.as_deref()),
        &state.config.display,
    ) {
        Ok(stages) => Json(stages).into_response(),
        Err(e) => query_error(e),
    }
}

pub async fn get_stage_scores(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StageParams>,
) -> impl IntoResponse {
    let mut conn = match connection(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    let stage_id = params.stage_uuid.unwrap_or_default();
    match queries::list_stage_scores(&mut conn, &stage_id) {
        Ok(scores) => Json(scores).into_response(),
        Err(e) => query_error(e),
    }
}

pub async fn get_team_rankings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TeamRankingParams>,
) -> impl IntoResponse {
    let mut conn = match connection(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    let competition_id = params.competition_uuid.clone().unwrap_or_default();
    match queries::team_rankings(&mut conn, &competition_id, &params.stage_ids()) {
        Ok(rankings) => Json(rankings).into_response(),
        Err(e) => query_error(e),
    }
}

pub async fn get_hero_stats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StatParams>,
) -> impl IntoResponse {
    let mut conn = match connection(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    let competition_id = params.competition_uuid.unwrap_or_default();
    let stage_id = params.stage_uuid.unwrap_or_default();
    match queries::hero_stats(&mut conn, &competition_id, &stage_id) {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => query_error(e),
    }
}

pub async fn get_weapon_stats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StatParams>,
) -> impl IntoResponse {
    let mut conn = match connection(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    let competition_id = params.competition_uuid.unwrap_or_default();
    let stage_id = params.stage_uuid.unwrap_or_default();
    match queries::weapon_stats(&mut conn, &competition_id, &stage_id) {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => query_error(e),
    }
}
