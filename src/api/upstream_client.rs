use anyhow::Result;
use log::info;
use serde_json::Value;

use crate::config::settings::UpstreamSettings;
use crate::http::{LoggingClient, QueryParams};

const COMPETITION_LIST_PATH: &str = "/nbpl/competition/list";
const STAGE_LIST_PATH: &str = "/nbpl/competition/stage/list";
const TEAM_LIST_PATH: &str = "/nbpl/competition/team/list";
const PLAYER_LIST_PATH: &str = "/nbpl/competition/team/player/list";
const SCORE_PATH: &str = "/nbpl/rank/score";
const HERO_STATS_PATH: &str = "/nbpl/rank/hero";
const WEAPON_STATS_PATH: &str = "/nbpl/rank/weapon";

/// Tournament center API client. Every call returns the raw JSON body;
/// envelope normalisation is left to the caller.
#[derive(Clone)]
pub struct UpstreamClient {
    http: LoggingClient,
    model_type: String,
    is_all: String,
}

impl UpstreamClient {
    pub fn new(settings: &UpstreamSettings) -> Result<Self> {
        Ok(Self {
            http: LoggingClient::new(settings)?,
            model_type: settings.model_type.to_string(),
            is_all: settings.is_all.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    pub async fn fetch_competitions(&self) -> Result<Value> {
        info!("Fetching competition list");
        let params: QueryParams = vec![
            ("only_nbpl", "0".to_string()),
            ("type", "1".to_string()),
            ("model_type", self.model_type.clone()),
        ];
        self.http.get_json(COMPETITION_LIST_PATH, &params).await
    }

    pub async fn fetch_stages(
        &self,
        competition_id: &str,
        kind: i64,
        rank_type: i64,
    ) -> Result<Value> {
        info!(
            "Fetching stages for competition {} (type={}, rank_type={})",
            competition_id, kind, rank_type
        );
        let params: QueryParams = vec![
            ("competition_uuid", competition_id.to_string()),
            ("type", kind.to_string()),
            ("rank_type", rank_type.to_string()),
            ("model_type", self.model_type.clone()),
            ("is_all", self.is_all.clone()),
        ];
        self.http.get_json(STAGE_LIST_PATH, &params).await
    }

    pub async fn fetch_teams(&self, competition_id: &str) -> Result<Value> {
        info!("Fetching teams for competition {}", competition_id);
        let params: QueryParams = vec![("competition_id", competition_id.to_string())];
        self.http.get_json(TEAM_LIST_PATH, &params).await
    }

    pub async fn fetch_team_players(&self, competition_id: &str, team_id: &str) -> Result<Value> {
        info!("Fetching players for team {}", team_id);
        let params: QueryParams = vec![
            ("competition_id", competition_id.to_string()),
            ("team_id", team_id.to_string()),
        ];
        self.http.get_json(PLAYER_LIST_PATH, &params).await
    }

    /// `kind` is the stage type; upstream treats a missing type as 1.
    pub async fn fetch_stage_scores(
        &self,
        stage_id: &str,
        competition_id: &str,
        kind: i64,
        rank_type: i64,
    ) -> Result<Value> {
        info!("Fetching scores for stage {}", stage_id);
        let params: QueryParams = vec![
            ("stage_uuid", stage_id.to_string()),
            ("competition_uuid", competition_id.to_string()),
            ("type", kind.to_string()),
            ("rank_type", rank_type.to_string()),
            ("model_type", self.model_type.clone()),
            ("is_all", self.is_all.clone()),
        ];
        self.http.get_json(SCORE_PATH, &params).await
    }

    pub async fn fetch_hero_stats(&self, competition_id: &str, stage_id: &str) -> Result<Value> {
        info!("Fetching hero stats for stage {}", stage_id);
        self.http
            .get_json(HERO_STATS_PATH, &self.stat_params(competition_id, stage_id))
            .await
    }

    pub async fn fetch_weapon_stats(&self, competition_id: &str, stage_id: &str) -> Result<Value> {
        info!("Fetching weapon stats for stage {}", stage_id);
        self.http
            .get_json(WEAPON_STATS_PATH, &self.stat_params(competition_id, stage_id))
            .await
    }

    fn stat_params(&self, competition_id: &str, stage_id: &str) -> QueryParams {
        vec![
            ("competition_uuid", competition_id.to_string()),
            ("stage_uuid", stage_id.to_string()),
            ("model_type", self.model_type.clone()),
        ]
    }
}
