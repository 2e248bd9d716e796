pub mod competitions;
pub mod connection;
pub mod models;
pub mod players;
pub mod scores;
pub mod setup;
pub mod stages;
pub mod stats;
pub mod teams;

pub use connection::{DbConn, DbPool, create_pool, get_connection};
pub use models::*;

/// Open the pool and make sure the schema exists.
pub fn open(database_path: &str) -> anyhow::Result<DbPool> {
    let pool = create_pool(database_path)?;
    let mut conn = get_connection(&pool)?;
    setup::init_database(&mut conn)?;
    Ok(pool)
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    use super::*;

    pub fn temp_pool() -> (TempDir, DbPool) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let pool = open(path.to_str().unwrap()).unwrap();
        (dir, pool)
    }

    pub fn new_competition(id: &str, kind: i64) -> NewCompetition {
        let start_date = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        NewCompetition {
            id: id.to_string(),
            name: format!("Competition {}", id),
            description: String::new(),
            start_date: Some(start_date),
            end_date: Some(start_date + chrono::Duration::days(14)),
            kind,
            nbpl: kind == 1,
        }
    }

    pub fn new_stage(id: &str, competition_id: &str, kind: i64, rank_type: i64) -> NewStage {
        let start_date = Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap();
        NewStage {
            id: id.to_string(),
            name: format!("Stage {}", id),
            kind,
            rank_type,
            start_date: Some(start_date),
            end_date: Some(start_date),
            competition_id: competition_id.to_string(),
        }
    }

    pub fn new_team(id: &str, competition_id: &str) -> NewTeam {
        NewTeam {
            id: id.to_string(),
            name: format!("Team {}", id),
            logo: None,
            points: None,
            rank: None,
            competition_id: competition_id.to_string(),
        }
    }

    pub fn seed_competition(conn: &mut DbConn, id: &str) -> Competition {
        competitions::merge_competition(conn, &new_competition(id, 1))
            .unwrap()
            .into_inner()
    }

    /// Competition `c-1`, the stage, the team and its default player, then one
    /// score row for them. Returns the merged score value.
    pub fn seed_score_graph(
        conn: &mut DbConn,
        stage_id: &str,
        team_id: &str,
        points: f64,
        kills: i64,
    ) -> NewScore {
        seed_competition(conn, "c-1");
        stages::merge_stage(conn, &new_stage(stage_id, "c-1", 1, 0)).unwrap();
        let team = teams::ensure_team(conn, &new_team(team_id, "c-1"))
            .unwrap()
            .into_inner();
        let player = players::ensure_default_player(conn, &team)
            .unwrap()
            .into_inner();

        let score = NewScore {
            id: crate::domain::score_id(stage_id, team_id),
            points,
            kills,
            deaths: 0,
            assists: 0,
            match_scores: "[]".to_string(),
            stage_id: stage_id.to_string(),
            team_id: team_id.to_string(),
            player_id: player.id,
        };
        scores::merge_score(conn, &score).unwrap();
        score
    }
}
