use anyhow::Result;
use log::{error, info, warn};
use serde_json::Value;

use super::SyncService;
use crate::api::parsers::{envelope, extract_list};
use crate::database::{Merged, Stage, competitions, stages};
use crate::domain::{StagePayload, SyncResponse, SyncTally};

const STAGE_TYPES: [i64; 2] = [1, 2];
const RANK_TYPES: [i64; 4] = [0, 1, 2, 3];

impl SyncService {
    /// Pull the stages of every type / rank type combination, and for each
    /// stored stage its scores and hero / weapon stats.
    pub async fn sync_stages(&self, competition_id: &str) -> SyncResponse {
        info!("Syncing stages for competition {}", competition_id);

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
            Err(e) => return SyncResponse::failed_with("Failed to sync stages", format!("{:#}", e)),
        }

        let mut tally = SyncTally::default();
        for kind in STAGE_TYPES {
            for rank_type in RANK_TYPES {
                let Some(records) = self.fetch_stage_records(competition_id, kind, rank_type).await
                else {
                    continue;
                };

                for record in &records {
                    let synced = self.sync_stage_record(competition_id, kind, rank_type, record).await;
                    tally.record(synced);
                }
            }
        }

        info!(
            "Stages of {} synced: {} ok, {} failed",
            competition_id, tally.succeeded, tally.failed
        );
        SyncResponse::ok(format!(
            "Stages sync completed. Success: {}, Failures: {}",
            tally.succeeded, tally.failed
        ))
        .with_error(tally.failure_note("stages"))
    }

    /// `None` when this combination yields nothing usable.
    async fn fetch_stage_records(
        &self,
        competition_id: &str,
        kind: i64,
        rank_type: i64,
    ) -> Option<Vec<Value>> {
        let body = match self.client.fetch_stages(competition_id, kind, rank_type).await {
            Ok(body) => body,
            Err(e) => {
                error!(
                    "Failed to fetch stages (type={}, rank_type={}): {:#}",
                    kind, rank_type, e
                );
                return None;
            }
        };

        match extract_list(&body, envelope::STAGE_LIST) {
            Ok(records) => Some(records),
            Err(e) => {
                warn!(
                    "No stage data for type={} rank_type={}: {}",
                    kind, rank_type, e
                );
                None
            }
        }
    }

    async fn sync_stage_record(
        &self,
        competition_id: &str,
        kind: i64,
        rank_type: i64,
        record: &Value,
    ) -> bool {
        let payload: StagePayload = match serde_json::from_value(record.clone()) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Skipping malformed stage record: {}", e);
                return false;
            }
        };

        let stage = match self.save_stage(&payload, competition_id, kind, rank_type) {
            Ok(merged) => merged.into_inner(),
            Err(e) => {
                error!("Failed to save stage {:?}: {:#}", payload.stage_uuid, e);
                return false;
            }
        };

        match payload.embedded_scores() {
            Some(entries) => {
                for entry in entries {
                    let result = self.sync_scores(&stage.id, Some(entry)).await;
                    if !result.success {
                        warn!("Stage {} score: {}", stage.id, result.message);
                    }
                }
            }
            None => {
                let result = self.sync_scores(&stage.id, None).await;
                if !result.success {
                    warn!("Stage {} scores: {}", stage.id, result.message);
                }
            }
        }

        for result in [
            self.sync_hero_stats(&stage.id).await,
            self.sync_weapon_stats(&stage.id).await,
        ] {
            if !result.success {
                warn!("Stage {} stats: {}", stage.id, result.message);
            }
        }

        true
    }

    fn save_stage(
        &self,
        payload: &StagePayload,
        competition_id: &str,
        kind: i64,
        rank_type: i64,
    ) -> Result<Merged<Stage>> {
        let new = payload.to_new_stage(competition_id, kind, rank_type)?;
        let mut conn = self.conn()?;
        let merged = stages::merge_stage(&mut conn, &new)?;
        info!("Stage {} {}", new.id, merged.action());
        Ok(merged)
    }
}
