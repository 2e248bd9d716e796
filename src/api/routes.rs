use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::api::handlers::{
    AppState,
    competitions::{
        get_competitions, get_hero_stats, get_stage_scores, get_stages, get_team_rankings,
        get_weapon_stats,
    },
    sync::{
        list_synced_competitions, sync_competition, sync_competition_stages,
        sync_competition_teams, sync_competitions, sync_stage_scores, sync_stage_stats, test_db,
    },
};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/competition/list", get(get_competitions))
        .route("/api/competition/stage/list", get(get_stages))
        .route("/api/competition/rank/score", get(get_stage_scores))
        .route("/api/competition/rank/team/data", get(get_team_rankings))
        .route("/api/competition/rank/hero", get(get_hero_stats))
        .route("/api/competition/rank/weapon", get(get_weapon_stats))
        .route(
            "/api/sync/competitions",
            get(list_synced_competitions).post(sync_competitions),
        )
        .route("/api/sync/competitions/:id", post(sync_competition))
        .route("/api/sync/competitions/:id/stages", post(sync_competition_stages))
        .route("/api/sync/competitions/:id/teams", post(sync_competition_teams))
        .route("/api/sync/stages/:id/scores", post(sync_stage_scores))
        .route("/api/sync/stages/:id/stats", post(sync_stage_stats))
        .route("/api/sync/test-db", get(test_db))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::AppConfig;
    use crate::database::test_support::{seed_score_graph, temp_pool};
    use crate::services::sync::test_support::service_for;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;
    use wiremock::MockServer;

    fn test_app(server: &MockServer) -> (TempDir, Router, crate::database::DbPool) {
        let (dir, pool) = temp_pool();
        let state = AppState {
            pool: pool.clone(),
            config: AppConfig::default(),
            sync: service_for(server, pool.clone()),
        };
        (dir, create_router(Arc::new(state)), pool)
    }

    async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_competition_list_starts_empty() {
        let server = MockServer::start().await;
        let (_dir, app, _pool) = test_app(&server);

        let (status, body) = send(app, "GET", "/api/competition/list").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["list"], Value::Array(vec![]));
    }

    #[tokio::test]
    async fn test_team_sync_reports_missing_competition() {
        let server = MockServer::start().await;
        let (_dir, app, _pool) = test_app(&server);

        let (status, body) = send(app, "POST", "/api/sync/competitions/missing/teams").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Competition not found with ID: missing");
    }

    #[tokio::test]
    async fn test_competition_sync_requires_name() {
        let server = MockServer::start().await;
        let (_dir, app, _pool) = test_app(&server);

        let (_, body) = send(app, "POST", "/api/sync/competitions/c-1").await;

        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid competition data");
    }

    #[tokio::test]
    async fn test_db_snapshot_and_scores_are_served() {
        let server = MockServer::start().await;
        let (_dir, app, pool) = test_app(&server);
        seed_score_graph(&mut pool.get().unwrap(), "s-1", "t-1", 42.0, 7);

        let (status, body) = send(app.clone(), "GET", "/api/sync/test-db").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["scores"].as_array().unwrap().len(), 1);

        let (status, body) = send(app, "GET", "/api/competition/rank/score?stage_uuid=s-1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["points"], 42.0);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let server = MockServer::start().await;
        let (_dir, app, _pool) = test_app(&server);

        let (status, _) = send(app, "GET", "/api/nothing-here").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
