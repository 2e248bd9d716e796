use chrono::{DateTime, NaiveDateTime, Utc};

/// Result of a construct-then-merge write, telling create and update apart.
#[derive(Debug, Clone, PartialEq)]
pub enum Merged<T> {
    Created(T),
    Updated(T),
    /// Row was already present and left untouched.
    Existing(T),
}

impl<T> Merged<T> {
    pub fn into_inner(self) -> T {
        match self {
            Merged::Created(row) | Merged::Updated(row) | Merged::Existing(row) => row,
        }
    }

    pub fn row(&self) -> &T {
        match self {
            Merged::Created(row) | Merged::Updated(row) | Merged::Existing(row) => row,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Merged::Created(_))
    }

    pub fn action(&self) -> &'static str {
        match self {
            Merged::Created(_) => "created",
            Merged::Updated(_) => "updated",
            Merged::Existing(_) => "kept",
        }
    }
}

// --- Stored rows ---

#[derive(Debug, Clone, PartialEq)]
pub struct Competition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub kind: i64,
    pub nbpl: bool,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub id: String,
    pub name: String,
    pub kind: i64,
    pub rank_type: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub competition_id: String,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub logo: Option<String>,
    pub points: f64,
    pub rank: Option<i64>,
    pub competition_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub team_id: String,
    pub competition_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub id: String,
    pub points: f64,
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
    /// JSON array of `MatchScore`, kept opaque in the store.
    pub match_scores: String,
    pub stage_id: String,
    pub team_id: String,
    pub player_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeroStat {
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

#[derive(Debug, Clone, PartialEq)]
pub struct WeaponStat {
    pub id: String,
    pub stage_id: String,
    pub weapon_name: String,
    pub pick_rate: f64,
    pub kill_rate: f64,
}

// --- Values built from upstream payloads, merged by primary key ---

#[derive(Debug, Clone, PartialEq)]
pub struct NewCompetition {
    pub id: String,
    pub name: String,
    pub description: String,
    /// `None` keeps the stored date, or uses the insert time for a new row.
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub kind: i64,
    pub nbpl: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewStage {
    pub id: String,
    pub name: String,
    pub kind: i64,
    pub rank_type: i64,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub competition_id: String,
}

/// Team fields left as `None` keep their stored value on update.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTeam {
    pub id: String,
    pub name: String,
    pub logo: Option<String>,
    pub points: Option<f64>,
    pub rank: Option<i64>,
    pub competition_id: String,
}

pub type NewPlayer = Player;
pub type NewScore = Score;
pub type NewHeroStat = HeroStat;
pub type NewWeaponStat = WeaponStat;

// DTOs for joined queries
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreWithTeam {
    pub score: Score,
    pub team: Team,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreWithRelations {
    pub score: Score,
    pub team: Team,
    pub player: Player,
}
