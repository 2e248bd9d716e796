use anyhow::Result;
use log::{error, info, warn};
use serde_json::Value;

use super::SyncService;
use crate::api::parsers::{EnvelopeError, check_status_code, envelope, extract_list};
use crate::config::translations::{translate_error, translate_hero_name, translate_weapon_name};
use crate::database::{Stage, stats};
use crate::domain::{HeroStatPayload, SyncResponse, SyncTally, WeaponStatPayload};

#[derive(Debug, Clone, Copy)]
enum StatKind {
    Hero,
    Weapon,
}

impl StatKind {
    fn label(self) -> &'static str {
        match self {
            StatKind::Hero => "hero stats",
            StatKind::Weapon => "weapon stats",
        }
    }
}

impl SyncService {
    pub async fn sync_hero_stats(&self, stage_id: &str) -> SyncResponse {
        self.sync_stat_table(stage_id, StatKind::Hero).await
    }

    pub async fn sync_weapon_stats(&self, stage_id: &str) -> SyncResponse {
        self.sync_stat_table(stage_id, StatKind::Weapon).await
    }

    async fn sync_stat_table(&self, stage_id: &str, kind: StatKind) -> SyncResponse {
        let stage = match self.find_stage(stage_id) {
            Ok(Some(stage)) => stage,
            Ok(None) => return SyncResponse::failed_with("Stage not found", "Stage not found"),
            Err(e) => {
                return SyncResponse::failed_with(
                    format!("Failed to sync {}", kind.label()),
                    format!("{:#}", e),
                );
            }
        };

        info!("Syncing {} for stage {}", kind.label(), stage.id);
        let fetched = match kind {
            StatKind::Hero => self.client.fetch_hero_stats(&stage.competition_id, &stage.id).await,
            StatKind::Weapon => {
                self.client
                    .fetch_weapon_stats(&stage.competition_id, &stage.id)
                    .await
            }
        };
        let body = match fetched {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to fetch {} of stage {}: {:#}", kind.label(), stage.id, e);
                return SyncResponse::failed_with(
                    format!("Failed to sync {}", kind.label()),
                    format!("{:#}", e),
                );
            }
        };

        let records = match stat_records(&body) {
            Ok(records) => records,
            Err(EnvelopeError::UpstreamCode { code, message }) => {
                let translated = translate_error(code, &message);
                warn!("Upstream rejected {} of stage {}: {}", kind.label(), stage.id, translated);
                return SyncResponse::failed_with(
                    translated,
                    EnvelopeError::UpstreamCode { code, message },
                );
            }
            Err(e) => {
                return SyncResponse::failed_with(
                    format!("Invalid {} response structure", kind.label()),
                    e,
                );
            }
        };

        let mut tally = SyncTally::default();
        for record in &records {
            match save_stat(self, &stage, record, kind) {
                Ok(()) => tally.record(true),
                Err(e) => {
                    warn!("Skipping {} record of stage {}: {:#}", kind.label(), stage.id, e);
                    tally.record(false);
                }
            }
        }

        SyncResponse::ok(format!(
            "{} sync completed. Success: {}, Failures: {}",
            capitalize(kind.label()),
            tally.succeeded,
            tally.failed
        ))
        .with_error(tally.failure_note(kind.label()))
    }
}

fn stat_records(body: &Value) -> Result<Vec<Value>, EnvelopeError> {
    check_status_code(body)?;
    extract_list(body, envelope::STAT_LIST)
}

fn save_stat(service: &SyncService, stage: &Stage, record: &Value, kind: StatKind) -> Result<()> {
    let mut conn = service.conn()?;

    match kind {
        StatKind::Hero => {
            let payload: HeroStatPayload = serde_json::from_value(record.clone())?;
            let Some(name) = payload.hero_name.as_deref() else {
                anyhow::bail!("Missing required fields: hero_name");
            };
            let new = payload.to_new_hero_stat(&stage.id, &translate_hero_name(name));
            stats::merge_hero_stat(&mut conn, &new)?;
        }
        StatKind::Weapon => {
            let payload: WeaponStatPayload = serde_json::from_value(record.clone())?;
            let Some(name) = payload.weapon_name.as_deref() else {
                anyhow::bail!("Missing required fields: weapon_name");
            };
            let new = payload.to_new_weapon_stat(&stage.id, &translate_weapon_name(name));
            stats::merge_weapon_stat(&mut conn, &new)?;
        }
    }

    Ok(())
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
