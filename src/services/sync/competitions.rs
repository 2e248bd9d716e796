use log::{error, info, warn};
use serde_json::Value;

use super::SyncService;
use crate::api::parsers::{envelope, extract_list};
use crate::database::competitions;
use crate::domain::{CompetitionPayload, SyncResponse, SyncTally};

impl SyncService {
    /// Validate and upsert one competition record.
    pub fn sync_single_competition(&self, payload: &Value) -> SyncResponse {
        let parsed: CompetitionPayload = match serde_json::from_value(payload.clone()) {
            Ok(parsed) => parsed,
            Err(e) => return SyncResponse::failed_with("Invalid competition data", e),
        };

        let new = match parsed.to_new_competition() {
            Ok(new) => new,
            Err(e) => {
                warn!("Skipping competition {:?}: {}", parsed.competition_uuid, e);
                return SyncResponse::failed_with("Invalid competition data", e);
            }
        };

        let merged = self
            .conn()
            .and_then(|mut conn| competitions::merge_competition(&mut conn, &new));

        match merged {
            Ok(merged) => {
                info!("Competition {} {}", new.id, merged.action());
                SyncResponse::ok(format!("Competition {} {}", new.name, merged.action()))
            }
            Err(e) => {
                error!("Failed to save competition {}: {:#}", new.id, e);
                SyncResponse::failed_with("Failed to sync competition", format!("{:#}", e))
            }
        }
    }

    pub async fn sync_competitions(&self) -> SyncResponse {
        info!("Syncing competitions");

        let body = match self.client.fetch_competitions().await {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to fetch competitions: {:#}", e);
                return SyncResponse::failed_with("Failed to sync competitions", format!("{:#}", e));
            }
        };

        let records = match extract_list(&body, envelope::COMPETITION_LIST) {
            Ok(records) => records,
            Err(e) => {
                error!("Unexpected competition list shape: {}", e);
                return SyncResponse::failed_with("Failed to sync competitions", e);
            }
        };

        let mut tally = SyncTally::default();
        for record in &records {
            let result = self.sync_single_competition(record);
            if !result.success {
                warn!("{}: {}", result.message, result.error.as_deref().unwrap_or_default());
            }
            tally.record(result.success);
        }

        info!(
            "Competitions synced: {} ok, {} failed",
            tally.succeeded, tally.failed
        );
        SyncResponse::ok(format!(
            "Competitions sync completed. Success: {}, Failures: {}",
            tally.succeeded, tally.failed
        ))
        .with_error(tally.failure_note("competitions"))
    }
}
