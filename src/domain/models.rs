use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::dates::parse_upstream_time;
use super::lenient::{flag, opt_f64, opt_i64, opt_string};
use crate::database::models::{
    NewCompetition, NewHeroStat, NewPlayer, NewScore, NewStage, NewTeam, NewWeaponStat,
};

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Missing required fields: {0}")]
    MissingFields(String),
    #[error("Invalid date format")]
    InvalidDate,
}

/// Called once a required field is known to be absent.
fn missing(fields: &[(&str, bool)]) -> ValidationError {
    let names: Vec<&str> = fields
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect();

    ValidationError::MissingFields(names.join(" "))
}

// --- Upstream payloads ---

/// Competition record from the upstream competition list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompetitionPayload {
    #[serde(default, deserialize_with = "opt_string")]
    pub competition_uuid: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub competition_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub competition_type: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "opt_i64")]
    pub kind: Option<i64>,
    #[serde(default)]
    pub start_time: Option<Value>,
    #[serde(default)]
    pub end_time: Option<Value>,
}

impl CompetitionPayload {
    pub fn to_new_competition(&self) -> Result<NewCompetition, ValidationError> {
        let (Some(id), Some(name)) = (&self.competition_uuid, &self.competition_name) else {
            return Err(missing(&[
                ("competition_uuid", self.competition_uuid.is_some()),
                ("competition_name", self.competition_name.is_some()),
            ]));
        };

        let start_date = parse_upstream_time(self.start_time.as_ref())?;
        let end_date = parse_upstream_time(self.end_time.as_ref())?;
        let kind = self.kind.unwrap_or(0);

        Ok(NewCompetition {
            id: id.clone(),
            name: name.clone(),
            description: self.competition_type.clone().unwrap_or_default(),
            start_date,
            end_date,
            kind,
            nbpl: kind == 1,
        })
    }
}

/// Stage record from the upstream stage list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StagePayload {
    #[serde(default, deserialize_with = "opt_string")]
    pub stage_uuid: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub stage_name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "opt_i64")]
    pub kind: Option<i64>,
    #[serde(default, deserialize_with = "opt_i64")]
    pub rank_type: Option<i64>,
    #[serde(default)]
    pub start_time: Option<Value>,
    #[serde(default)]
    pub end_time: Option<Value>,
    /// Some stage payloads embed their score table.
    #[serde(default)]
    pub rank_list: Option<Value>,
}

impl StagePayload {
    /// `kind` and `rank_type` fall back to the combination that was queried.
    pub fn to_new_stage(
        &self,
        competition_id: &str,
        queried_kind: i64,
        queried_rank_type: i64,
    ) -> Result<NewStage, ValidationError> {
        let (Some(id), Some(name)) = (&self.stage_uuid, &self.stage_name) else {
            return Err(missing(&[
                ("stage_uuid", self.stage_uuid.is_some()),
                ("stage_name", self.stage_name.is_some()),
            ]));
        };

        Ok(NewStage {
            id: id.clone(),
            name: name.clone(),
            kind: self.kind.unwrap_or(queried_kind),
            rank_type: self.rank_type.unwrap_or(queried_rank_type),
            start_date: parse_upstream_time(self.start_time.as_ref())?,
            end_date: parse_upstream_time(self.end_time.as_ref())?,
            competition_id: competition_id.to_string(),
        })
    }

    pub fn embedded_scores(&self) -> Option<&Vec<Value>> {
        self.rank_list.as_ref().and_then(Value::as_array)
    }
}

/// Team record; the team list uses `uuid`/`name`, older payloads `team_uuid`/`team_name`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamPayload {
    #[serde(default, deserialize_with = "opt_string")]
    pub uuid: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub team_uuid: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub team_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub team_logo_url: Option<String>,
    #[serde(default, deserialize_with = "opt_f64")]
    pub points: Option<f64>,
    #[serde(default, deserialize_with = "opt_i64")]
    pub rank: Option<i64>,
}

impl TeamPayload {
    pub fn id(&self) -> Option<&str> {
        self.uuid.as_deref().or(self.team_uuid.as_deref())
    }

    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.team_name.as_deref())
    }

    pub fn to_new_team(&self, competition_id: &str) -> Result<NewTeam, ValidationError> {
        let (Some(id), Some(name)) = (self.id(), self.display_name()) else {
            return Err(missing(&[
                ("uuid", self.id().is_some()),
                ("name", self.display_name().is_some()),
            ]));
        };

        Ok(NewTeam {
            id: id.to_string(),
            name: name.to_string(),
            logo: self.team_logo_url.clone(),
            points: self.points,
            rank: self.rank.filter(|r| *r != 0),
            competition_id: competition_id.to_string(),
        })
    }
}

/// Player record from a team roster
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerPayload {
    #[serde(default, deserialize_with = "opt_string")]
    pub uuid: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub avatar: Option<String>,
}

impl PlayerPayload {
    pub fn to_new_player(
        &self,
        team_id: &str,
        competition_id: &str,
    ) -> Result<NewPlayer, ValidationError> {
        let (Some(id), Some(name)) = (&self.uuid, &self.name) else {
            return Err(missing(&[
                ("uuid", self.uuid.is_some()),
                ("name", self.name.is_some()),
            ]));
        };

        Ok(NewPlayer {
            id: id.clone(),
            name: name.clone(),
            avatar: self.avatar.clone(),
            team_id: team_id.to_string(),
            competition_id: competition_id.to_string(),
        })
    }
}

/// One team's row of a stage score table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamScorePayload {
    #[serde(default, deserialize_with = "opt_string")]
    pub team_uuid: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub team_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub player_uuid: Option<String>,
    #[serde(default, deserialize_with = "opt_f64")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "opt_i64")]
    pub rank: Option<i64>,
    #[serde(default, deserialize_with = "opt_i64")]
    pub kill_times: Option<i64>,
    #[serde(default, deserialize_with = "opt_i64")]
    pub death_times: Option<i64>,
    #[serde(default, deserialize_with = "opt_i64")]
    pub assist_times: Option<i64>,
    #[serde(default)]
    pub match_score_list_v2: Option<Value>,
}

impl TeamScorePayload {
    /// Placeholder used when a score references a team that was never synced.
    pub fn placeholder_team(&self, team_id: &str, competition_id: &str) -> NewTeam {
        NewTeam {
            id: team_id.to_string(),
            name: self
                .team_name
                .clone()
                .unwrap_or_else(|| "Unknown Team".to_string()),
            logo: None,
            points: self.score,
            rank: self.rank.filter(|r| *r != 0),
            competition_id: competition_id.to_string(),
        }
    }

    /// Normalised per-match history; entries that are not objects are dropped.
    pub fn match_scores(&self) -> Vec<MatchScore> {
        self.match_score_list_v2
            .as_ref()
            .and_then(Value::as_array)
            .map(|matches| {
                matches
                    .iter()
                    .filter(|m| m.is_object())
                    .filter_map(|m| serde_json::from_value::<MatchScorePayload>(m.clone()).ok())
                    .map(MatchScore::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn to_new_score(
        &self,
        stage_id: &str,
        team_id: &str,
        player_id: &str,
    ) -> serde_json::Result<NewScore> {
        let match_scores = serde_json::to_string(&self.match_scores())?;

        Ok(NewScore {
            id: score_id(stage_id, team_id),
            points: self.score.unwrap_or(0.0),
            kills: self.kill_times.unwrap_or(0),
            deaths: self.death_times.unwrap_or(0),
            assists: self.assist_times.unwrap_or(0),
            match_scores,
            stage_id: stage_id.to_string(),
            team_id: team_id.to_string(),
            player_id: player_id.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct MatchScorePayload {
    #[serde(default, deserialize_with = "opt_i64")]
    game_number: Option<i64>,
    #[serde(default, deserialize_with = "opt_f64")]
    score: Option<f64>,
    #[serde(default, deserialize_with = "opt_i64")]
    rank: Option<i64>,
    #[serde(default, deserialize_with = "flag")]
    is_win: bool,
    #[serde(default, deserialize_with = "flag")]
    is_saidian: bool,
}

/// One game of a team's match history, as stored in `scores.match_scores`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchScore {
    pub game_number: i64,
    pub score: f64,
    pub rank: i64,
    pub is_win: bool,
    pub is_saidian: bool,
}

impl From<MatchScorePayload> for MatchScore {
    fn from(payload: MatchScorePayload) -> Self {
        Self {
            game_number: payload.game_number.unwrap_or(0),
            score: payload.score.unwrap_or(0.0),
            rank: payload.rank.unwrap_or(0),
            is_win: payload.is_win,
            is_saidian: payload.is_saidian,
        }
    }
}

/// Hero aggregate row of a stage
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeroStatPayload {
    #[serde(default, deserialize_with = "opt_string")]
    pub hero_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub hero_img: Option<String>,
    #[serde(default, deserialize_with = "opt_f64")]
    pub battle_amount: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    pub kill_times_avg: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    pub assist_avg: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    pub cure_avg: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    pub damage_avg: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    pub death_avg: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    pub total_live_time_avg: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    pub score_top1_battle_amount: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    pub rescue_times_avg: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    pub score_top1_rate: Option<f64>,
    #[serde(default, deserialize_with = "opt_i64")]
    pub rank: Option<i64>,
}

impl HeroStatPayload {
    /// `hero_name` must already be translated; it becomes part of the row id.
    pub fn to_new_hero_stat(&self, stage_id: &str, hero_name: &str) -> NewHeroStat {
        NewHeroStat {
            id: stat_id(stage_id, hero_name),
            stage_id: stage_id.to_string(),
            hero_name: hero_name.to_string(),
            hero_image: self.hero_img.clone(),
            battle_amount: self.battle_amount.unwrap_or(0.0),
            kill_times_avg: self.kill_times_avg.unwrap_or(0.0),
            assist_avg: self.assist_avg.unwrap_or(0.0),
            cure_avg: self.cure_avg.unwrap_or(0.0),
            damage_avg: self.damage_avg.unwrap_or(0.0),
            death_avg: self.death_avg.unwrap_or(0.0),
            total_live_time_avg: self.total_live_time_avg.unwrap_or(0.0),
            score_top1_battle_amount: self.score_top1_battle_amount.unwrap_or(0.0),
            rescue_times_avg: self.rescue_times_avg.unwrap_or(0.0),
            score_top1_rate: self.score_top1_rate.unwrap_or(0.0),
            rank: self.rank.unwrap_or(0),
        }
    }
}

/// Weapon aggregate row of a stage
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeaponStatPayload {
    #[serde(default, deserialize_with = "opt_string")]
    pub weapon_name: Option<String>,
    #[serde(default, deserialize_with = "opt_f64")]
    pub pick_rate: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    pub kill_rate: Option<f64>,
}

impl WeaponStatPayload {
    pub fn to_new_weapon_stat(&self, stage_id: &str, weapon_name: &str) -> NewWeaponStat {
        NewWeaponStat {
            id: stat_id(stage_id, weapon_name),
            stage_id: stage_id.to_string(),
            weapon_name: weapon_name.to_string(),
            pick_rate: self.pick_rate.unwrap_or(0.0),
            kill_rate: self.kill_rate.unwrap_or(0.0),
        }
    }
}

// --- Derived ids ---

pub fn score_id(stage_id: &str, team_id: &str) -> String {
    format!("{}-{}", stage_id, team_id)
}

pub fn stat_id(stage_id: &str, name: &str) -> String {
    format!("{}-{}", stage_id, name)
}

pub fn default_player_id(team_id: &str) -> String {
    format!("default-player-{}", team_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_competition_requires_id_and_name() {
        let payload: CompetitionPayload =
            serde_json::from_value(json!({"competition_name": "NBPL Spring"})).unwrap();

        assert_eq!(
            payload.to_new_competition(),
            Err(ValidationError::MissingFields("competition_uuid".to_string()))
        );

        let empty = CompetitionPayload::default();
        assert_eq!(
            empty.to_new_competition().unwrap_err().to_string(),
            "Missing required fields: competition_uuid competition_name"
        );
    }

    #[test]
    fn test_competition_type_one_is_nbpl() {
        let payload: CompetitionPayload = serde_json::from_value(json!({
            "competition_uuid": "c-1",
            "competition_name": "NBPL Spring",
            "competition_type": "league",
            "type": "1",
            "start_time": "2024-03-01 10:00:00"
        }))
        .unwrap();

        let competition = payload.to_new_competition().unwrap();
        assert_eq!(competition.kind, 1);
        assert!(competition.nbpl);
        assert_eq!(competition.description, "league");
        assert!(competition.start_date.is_some());
        assert_eq!(competition.end_date, None);
    }

    #[test]
    fn test_competition_with_bad_date_is_rejected() {
        let payload: CompetitionPayload = serde_json::from_value(json!({
            "competition_uuid": "c-1",
            "competition_name": "NBPL Spring",
            "end_time": "soon"
        }))
        .unwrap();

        assert_eq!(payload.to_new_competition(), Err(ValidationError::InvalidDate));
    }

    #[test]
    fn test_team_accepts_both_key_styles() {
        let list_style: TeamPayload =
            serde_json::from_value(json!({"uuid": "t-1", "name": "Tigers"})).unwrap();
        let score_style: TeamPayload = serde_json::from_value(
            json!({"team_uuid": "t-2", "team_name": "Lions", "points": "12", "rank": 0}),
        )
        .unwrap();

        assert_eq!(list_style.to_new_team("c-1").unwrap().id, "t-1");
        let lions = score_style.to_new_team("c-1").unwrap();
        assert_eq!(lions.name, "Lions");
        assert_eq!(lions.points, Some(12.0));
        assert_eq!(lions.rank, None);
    }

    #[test]
    fn test_match_history_is_normalised() {
        let payload: TeamScorePayload = serde_json::from_value(json!({
            "team_uuid": "t-1",
            "score": "25",
            "kill_times": 9,
            "match_score_list_v2": [
                {"game_number": 1, "score": 15, "rank": 1, "is_win": 1, "is_saidian": 0},
                {"game_number": "2", "score": null, "rank": 7},
                null
            ]
        }))
        .unwrap();

        let matches = payload.match_scores();
        assert_eq!(matches.len(), 2);
        assert!(matches[0].is_win);
        assert_eq!(matches[1].game_number, 2);
        assert_eq!(matches[1].score, 0.0);
        assert!(!matches[1].is_saidian);

        let score = payload.to_new_score("s-1", "t-1", "p-1").unwrap();
        assert_eq!(score.id, "s-1-t-1");
        assert_eq!(score.points, 25.0);
        assert_eq!(score.deaths, 0);
        assert!(score.match_scores.starts_with(r#"[{"gameNumber":1"#));
    }

    #[test]
    fn test_missing_match_history_is_empty_list() {
        let payload = TeamScorePayload::default();
        assert!(payload.match_scores().is_empty());
        assert_eq!(payload.to_new_score("s", "t", "p").unwrap().match_scores, "[]");
    }
}
