use anyhow::{Context, Result};
use log::{error, info, warn};
use serde_json::Value;

use super::SyncService;
use crate::api::parsers::{envelope, extract_list};
use crate::database::{DbConn, Merged, Player, Score, Stage, Team, players, scores, stages, teams};
use crate::domain::{SyncResponse, SyncTally, TeamScorePayload};

impl SyncService {
    /// With `team_data`, store that one team's score; without, fetch the
    /// stage's full score table and store every row.
    pub async fn sync_scores(&self, stage_id: &str, team_data: Option<&Value>) -> SyncResponse {
        let stage = match self.find_stage(stage_id) {
            Ok(Some(stage)) => stage,
            Ok(None) => return SyncResponse::failed_with("Stage not found", "Stage not found"),
            Err(e) => return SyncResponse::failed_with("Failed to sync scores", format!("{:#}", e)),
        };

        if let Some(data) = team_data {
            return self.sync_team_score(&stage, data);
        }

        info!("Syncing scores for stage {}", stage.id);
        let kind = if stage.kind == 0 { 1 } else { stage.kind };
        let body = match self
            .client
            .fetch_stage_scores(&stage.id, &stage.competition_id, kind, stage.rank_type)
            .await
        {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to fetch scores of stage {}: {:#}", stage.id, e);
                return SyncResponse::failed_with("Failed to sync scores", format!("{:#}", e));
            }
        };

        let records = match extract_list(&body, envelope::SCORE_LIST) {
            Ok(records) => records,
            Err(e) => return SyncResponse::failed_with("Invalid scores response structure", e),
        };
        if records.is_empty() {
            return SyncResponse::ok("No teams found to sync");
        }

        let mut tally = SyncTally::default();
        for record in &records {
            tally.record(self.sync_team_score(&stage, record).success);
        }

        SyncResponse::ok(format!(
            "Scores sync completed. Success: {}, Failures: {}",
            tally.succeeded, tally.failed
        ))
        .with_error(tally.failure_note("scores"))
    }

    pub(super) fn find_stage(&self, stage_id: &str) -> Result<Option<Stage>> {
        let mut conn = self.conn()?;
        stages::find_by_id(&mut conn, stage_id)
    }

    /// Store one team's row of a stage score table, creating the team and a
    /// default player first when they are not known yet.
    pub fn sync_team_score(&self, stage: &Stage, data: &Value) -> SyncResponse {
        let payload: TeamScorePayload = match serde_json::from_value(data.clone()) {
            Ok(payload) => payload,
            Err(e) => return SyncResponse::failed_with("Invalid score data", e),
        };
        let Some(team_id) = payload.team_uuid.clone() else {
            warn!("Skipping score without team_uuid in stage {}", stage.id);
            return SyncResponse::failed_with("Invalid score data", "Missing required fields: team_uuid");
        };

        let written = self
            .conn()
            .and_then(|mut conn| write_team_score(&mut conn, stage, &team_id, &payload));

        match written {
            Ok(merged) => SyncResponse::ok(format!(
                "Score for team {} {}",
                team_id,
                merged.action()
            )),
            Err(e) => {
                error!("Failed to save score of team {} in stage {}: {:#}", team_id, stage.id, e);
                SyncResponse::failed_with("Failed to sync team score", format!("{:#}", e))
            }
        }
    }
}

fn write_team_score(
    conn: &mut DbConn,
    stage: &Stage,
    team_id: &str,
    payload: &TeamScorePayload,
) -> Result<Merged<Score>> {
    let team = teams::ensure_team(conn, &payload.placeholder_team(team_id, &stage.competition_id))?;
    if team.was_created() {
        info!("Created placeholder team {}", team_id);
    }
    let team = team.into_inner();

    let player = resolve_player(conn, &team, payload.player_uuid.as_deref())?;
    let new = payload
        .to_new_score(&stage.id, &team.id, &player.id)
        .context("Failed to serialize match scores")?;

    scores::merge_score(conn, &new)
}

/// The named player when it is stored, otherwise the team's default player.
fn resolve_player(conn: &mut DbConn, team: &Team, player_id: Option<&str>) -> Result<Player> {
    if let Some(id) = player_id {
        if let Some(player) = players::find_by_id(conn, id)? {
            return Ok(player);
        }
        warn!("Player {} not found, using default player of {}", id, team.id);
    }

    Ok(players::ensure_default_player(conn, team)?.into_inner())
}
