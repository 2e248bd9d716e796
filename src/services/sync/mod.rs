//! Upstream-to-store synchronisation.
//!
//! Every operation reports through a [`SyncResponse`] instead of failing, so
//! a batch keeps going after one record goes wrong. Only [`SyncService::sync_all`]
//! returns an error, and only for store faults.

mod competitions;
mod scores;
mod stages;
mod stats;
mod teams;

use anyhow::Result;
use log::{error, info, warn};
use serde_json::json;

use crate::api::upstream_client::UpstreamClient;
use crate::database::{self, DbConn, DbPool, NewCompetition, Stage};
use crate::domain::SyncResponse;

#[derive(Clone)]
pub struct SyncService {
    pool: DbPool,
    client: UpstreamClient,
}

impl SyncService {
    pub fn new(pool: DbPool, client: UpstreamClient) -> Self {
        Self { pool, client }
    }

    fn conn(&self) -> Result<DbConn> {
        database::get_connection(&self.pool)
    }

    pub fn stages_for_competition(&self, competition_id: &str) -> Result<Vec<Stage>> {
        let mut conn = self.conn()?;
        database::stages::list_by_competition(&mut conn, competition_id)
    }

    /// Scores, then hero stats, then weapon stats for one stage. Stops at the
    /// first step that fails.
    pub async fn sync_stage_stats(&self, stage_id: &str) -> SyncResponse {
        let scores = self.sync_scores(stage_id, None).await;
        if !scores.success {
            return scores;
        }

        let heroes = self.sync_hero_stats(stage_id).await;
        if !heroes.success {
            return heroes;
        }

        self.sync_weapon_stats(stage_id).await
    }

    /// Upsert one competition by id and name, then pull everything under it.
    pub async fn sync_competition_with_related(&self, id: &str, name: &str) -> SyncResponse {
        info!("Syncing competition {} with related data", id);

        let competition = self.upsert_named_competition(id, name);
        if !competition.success {
            return competition;
        }

        let stages = self.sync_stages(id).await;
        let teams = self.sync_teams_and_players(id).await;

        match self.stages_for_competition(id) {
            Ok(stored) => {
                for stage in stored {
                    let result = self.sync_stage_stats(&stage.id).await;
                    if !result.success {
                        warn!("Stage {} stats: {}", stage.id, result.message);
                    }
                }
            }
            Err(e) => error!("Failed to list stages of {}: {:#}", id, e),
        }

        SyncResponse::ok("Competition and related data synced successfully").with_details(json!({
            "competition": competition,
            "stages": stages,
            "teams": teams,
        }))
    }

    /// An existing competition only gets its name replaced; a new one starts
    /// as type 0 with both dates set to now.
    fn upsert_named_competition(&self, id: &str, name: &str) -> SyncResponse {
        let write = || -> Result<database::Merged<database::Competition>> {
            let mut conn = self.conn()?;
            let new = match database::competitions::find_by_id(&mut conn, id)? {
                Some(existing) => NewCompetition {
                    id: existing.id,
                    name: name.to_string(),
                    description: existing.description,
                    start_date: None,
                    end_date: None,
                    kind: existing.kind,
                    nbpl: existing.nbpl,
                },
                None => NewCompetition {
                    id: id.to_string(),
                    name: name.to_string(),
                    description: String::new(),
                    start_date: None,
                    end_date: None,
                    kind: 0,
                    nbpl: false,
                },
            };
            database::competitions::merge_competition(&mut conn, &new)
        };

        match write() {
            Ok(merged) => SyncResponse::ok(format!("Competition {} {}", id, merged.action())),
            Err(e) => {
                error!("Failed to save competition {}: {:#}", id, e);
                SyncResponse::failed_with("Failed to sync competition", format!("{:#}", e))
            }
        }
    }

    /// Competitions, then stages and teams of every stored competition, then
    /// scores and stats of every stored stage.
    pub async fn sync_all(&self) -> Result<SyncResponse> {
        info!("=== Starting full sync ===");

        let competitions = self.sync_competitions().await;
        if !competitions.success {
            warn!("Competition sync: {}", competitions.message);
        }

        let stored = {
            let mut conn = self.conn()?;
            database::competitions::list_all(&mut conn)?
        };
        info!("Syncing {} stored competitions", stored.len());

        let mut stage_count = 0;
        for competition in &stored {
            let stages = self.sync_stages(&competition.id).await;
            if !stages.success {
                warn!("Stages of {}: {}", competition.id, stages.message);
            }

            let teams = self.sync_teams_and_players(&competition.id).await;
            if !teams.success {
                warn!("Teams of {}: {}", competition.id, teams.message);
            }

            for stage in self.stages_for_competition(&competition.id)? {
                stage_count += 1;
                for result in [
                    self.sync_scores(&stage.id, None).await,
                    self.sync_hero_stats(&stage.id).await,
                    self.sync_weapon_stats(&stage.id).await,
                ] {
                    if !result.success {
                        warn!("Stage {}: {}", stage.id, result.message);
                    }
                }
            }
        }

        info!("=== Full sync complete ===");
        Ok(SyncResponse::ok("Full sync completed").with_details(json!({
            "competitions": stored.len(),
            "stages": stage_count,
        })))
    }
}
