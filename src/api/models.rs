use serde::Serialize;

use crate::config::settings::DisplaySettings;
use crate::database::models::{Competition, HeroStat, Player, Stage, Team, WeaponStat};
use crate::domain::MatchScore;
use crate::domain::dates::to_display;

#[derive(Serialize)]
pub struct ListEnvelope<T> {
    pub data: ListData<T>,
}

#[derive(Serialize)]
pub struct ListData<T> {
    pub list: Vec<T>,
}

impl<T> ListEnvelope<T> {
    pub fn new(list: Vec<T>) -> Self {
        Self {
            data: ListData { list },
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(rename = "type")]
    pub kind: i64,
    pub nbpl: bool,
    pub stages: Vec<StageItem>,
    pub teams: Vec<TeamItem>,
}

impl CompetitionItem {
    pub fn new(
        competition: Competition,
        stages: Vec<StageItem>,
        teams: Vec<TeamItem>,
        display: &DisplaySettings,
    ) -> Self {
        Self {
            start_date: to_display(&competition.start_date, display),
            end_date: to_display(&competition.end_date, display),
            id: competition.id,
            name: competition.name,
            description: competition.description,
            kind: competition.kind,
            nbpl: competition.nbpl,
            stages,
            teams,
        }
    }
}

/// Stored competition as it is, for the sync dashboard.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(rename = "type")]
    pub kind: i64,
    pub nbpl: bool,
    pub created_at: Option<String>,
}

impl From<Competition> for CompetitionRecord {
    fn from(competition: Competition) -> Self {
        Self {
            id: competition.id,
            name: competition.name,
            description: competition.description,
            start_date: competition.start_date.to_rfc3339(),
            end_date: competition.end_date.to_rfc3339(),
            kind: competition.kind,
            nbpl: competition.nbpl,
            created_at: competition
                .created_at
                .map(|at| at.format("%Y-%m-%dT%H:%M:%S").to_string()),
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StageItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: i64,
    pub rank_type: i64,
    pub start_date: String,
    pub end_date: String,
    pub competition_id: String,
}

impl StageItem {
    pub fn new(stage: Stage, display: &DisplaySettings) -> Self {
        Self {
            start_date: to_display(&stage.start_date, display),
            end_date: to_display(&stage.end_date, display),
            id: stage.id,
            name: stage.name,
            kind: stage.kind,
            rank_type: stage.rank_type,
            competition_id: stage.competition_id,
        }
    }
}

/// Stage with everything recorded for it.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StageDetail {
    #[serde(flatten)]
    pub stage: StageItem,
    pub scores: Vec<ScoreItem>,
    pub hero_stats: Vec<HeroStatItem>,
    pub weapon_stats: Vec<WeaponStatItem>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TeamItem {
    pub id: String,
    pub name: String,
    pub logo: Option<String>,
    pub points: f64,
    pub rank: Option<i64>,
    pub competition_id: String,
}

impl From<Team> for TeamItem {
    fn from(team: Team) -> Self {
        Self {
            id: team.id,
            name: team.name,
            logo: team.logo,
            points: team.points,
            rank: team.rank,
            competition_id: team.competition_id,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PlayerItem {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub team_id: String,
}

impl From<Player> for PlayerItem {
    fn from(player: Player) -> Self {
        Self {
            id: player.id,
            name: player.name,
            avatar: player.avatar,
            team_id: player.team_id,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ScoreItem {
    pub id: String,
    pub points: f64,
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
    pub match_scores: Vec<MatchScore>,
    pub stage_id: String,
    pub team_id: String,
    pub player_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<PlayerItem>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TeamRankingItem {
    pub team: TeamItem,
    pub total_points: f64,
    pub total_kills: i64,
    pub matches: i64,
    pub rank: usize,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HeroStatItem {
    pub id: String,
    pub stage_id: String,
    pub hero_name: String,
    pub hero_image: Option<String>,
    pub battle_amount: f64,
    pub kill_times_avg: f64,
    pub assist_avg: f64,
    pub cure_avg: f64,
    pub damage_avg: f64,
    pub death_avg: f64,
    pub total_live_time_avg: f64,
    pub score_top1_battle_amount: f64,
    pub rescue_times_avg: f64,
    pub score_top1_rate: f64,
    pub rank: i64,
}

impl From<HeroStat> for HeroStatItem {
    fn from(stat: HeroStat) -> Self {
        Self {
            id: stat.id,
            stage_id: stat.stage_id,
            hero_name: stat.hero_name,
            hero_image: stat.hero_image,
            battle_amount: stat.battle_amount,
            kill_times_avg: stat.kill_times_avg,
            assist_avg: stat.assist_avg,
            cure_avg: stat.cure_avg,
            damage_avg: stat.damage_avg,
            death_avg: stat.death_avg,
            total_live_time_avg: stat.total_live_time_avg,
            score_top1_battle_amount: stat.score_top1_battle_amount,
            rescue_times_avg: stat.rescue_times_avg,
            score_top1_rate: stat.score_top1_rate,
            rank: stat.rank,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct WeaponStatItem {
    pub id: String,
    pub stage_id: String,
    pub weapon_name: String,
    pub pick_rate: f64,
    pub kill_rate: f64,
}

impl From<WeaponStat> for WeaponStatItem {
    fn from(stat: WeaponStat) -> Self {
        Self {
            id: stat.id,
            stage_id: stat.stage_id,
            weapon_name: stat.weapon_name,
            pick_rate: stat.pick_rate,
            kill_rate: stat.kill_rate,
        }
    }
}

// --- test-db snapshot ---

#[derive(Serialize, Debug)]
pub struct DbSnapshot {
    pub success: bool,
    pub data: SnapshotData,
}

#[derive(Serialize, Debug)]
pub struct SnapshotData {
    pub competitions: Vec<CompetitionSummary>,
    pub stages: Vec<StageSummary>,
    pub teams: Vec<TeamSummary>,
    pub scores: Vec<ScoreSummary>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionSummary {
    pub id: String,
    pub name: String,
    pub start_date: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StageSummary {
    pub id: String,
    pub name: String,
    pub competition_id: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub id: String,
    pub name: String,
    pub competition_id: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub id: String,
    pub points: f64,
    pub team_id: String,
}
