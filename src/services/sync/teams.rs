use anyhow::Result;
use log::{error, info, warn};
use serde_json::Value;

use super::SyncService;
use crate::api::parsers::{envelope, extract_list};
use crate::database::{Merged, Team, competitions, players, teams};
use crate::domain::{PlayerPayload, SyncResponse, SyncTally, TeamPayload};

impl SyncService {
    /// Teams of a stored competition, each followed by its roster.
    pub async fn sync_teams_and_players(&self, competition_id: &str) -> SyncResponse {
        info!("Syncing teams for competition {}", competition_id);

        match self
            .conn()
            .and_then(|mut conn| competitions::find_by_id(&mut conn, competition_id))
        {
            Ok(Some(_)) => {}
            Ok(None) => {
                return SyncResponse::failed(format!(
                    "Competition not found with ID: {}",
                    competition_id
                ));
            }
            Err(e) => return SyncResponse::failed_with("Failed to sync teams", format!("{:#}", e)),
        }

        let body = match self.client.fetch_teams(competition_id).await {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to fetch teams of {}: {:#}", competition_id, e);
                return SyncResponse::failed_with("Failed to sync teams", format!("{:#}", e));
            }
        };

        let records = match extract_list(&body, envelope::TEAM_LIST) {
            Ok(records) => records,
            Err(e) => return SyncResponse::failed_with("Invalid teams response structure", e),
        };
        if records.is_empty() {
            return SyncResponse::failed("No teams found in response");
        }

        let mut tally = SyncTally::default();
        for record in &records {
            let team = match self.save_team(record, competition_id) {
                Ok(merged) => merged.into_inner(),
                Err(e) => {
                    warn!("Skipping team record: {:#}", e);
                    tally.record(false);
                    continue;
                }
            };

            let players = self.sync_players(&team).await;
            info!("Team {}: {} players synced", team.id, players);
            tally.record(true);
        }

        let message = format!(
            "Teams sync completed. Success: {}, Failures: {}",
            tally.succeeded, tally.failed
        );
        let response = if tally.succeeded > 0 {
            SyncResponse::ok(message)
        } else {
            SyncResponse::failed(message)
        };
        response.with_error(tally.failure_note("teams"))
    }

    fn save_team(&self, record: &Value, competition_id: &str) -> Result<Merged<Team>> {
        let payload: TeamPayload = serde_json::from_value(record.clone())?;
        let new = payload.to_new_team(competition_id)?;
        let mut conn = self.conn()?;
        teams::merge_team(&mut conn, &new)
    }

    /// Number of roster entries stored. Roster problems never fail the team.
    async fn sync_players(&self, team: &Team) -> usize {
        let body = match self
            .client
            .fetch_team_players(&team.competition_id, &team.id)
            .await
        {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to fetch players of team {}: {:#}", team.id, e);
                return 0;
            }
        };

        let records = match extract_list(&body, envelope::PLAYER_LIST) {
            Ok(records) => records,
            Err(e) => {
                warn!("No player list for team {}: {}", team.id, e);
                return 0;
            }
        };

        records
            .iter()
            .filter(|record| match self.save_player(record, team) {
                Ok(_) => true,
                Err(e) => {
                    warn!("Skipping player of team {}: {:#}", team.id, e);
                    false
                }
            })
            .count()
    }

    fn save_player(&self, record: &Value, team: &Team) -> Result<()> {
        let payload: PlayerPayload = serde_json::from_value(record.clone())?;
        let new = payload.to_new_player(&team.id, &team.competition_id)?;
        let mut conn = self.conn()?;
        players::merge_player(&mut conn, &new)?;
        Ok(())
    }
}
