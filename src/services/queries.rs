//! Read side of the REST API. Nothing here writes to the store.

use anyhow::Result;
use log::{info, warn};

use crate::api::models::{
    CompetitionItem, CompetitionRecord, CompetitionSummary, HeroStatItem, PlayerItem, ScoreItem,
    ScoreSummary, SnapshotData, StageDetail, StageItem, StageSummary, TeamItem, TeamRankingItem,
    TeamSummary, WeaponStatItem,
};
use crate::config::settings::DisplaySettings;
use crate::database::{DbConn, Score, competitions, scores, stages, stats, teams};
use crate::domain::{MatchScore, aggregate_team_rankings};

const SNAPSHOT_SIZE: usize = 5;

/// Competitions newest first, each with its stages and teams.
pub fn list_competitions(
    conn: &mut DbConn,
    only_nbpl: bool,
    display: &DisplaySettings,
) -> Result<Vec<CompetitionItem>> {
    let rows = competitions::list(conn, only_nbpl, None)?;
    info!("Found {} competitions (only_nbpl={})", rows.len(), only_nbpl);

    rows.into_iter()
        .map(|competition| {
            let stages = stages::list_by_competition(conn, &competition.id)?
                .into_iter()
                .map(|stage| StageItem::new(stage, display))
                .collect();
            let teams = teams::list_by_competition(conn, &competition.id)?
                .into_iter()
                .map(TeamItem::from)
                .collect();
            Ok(CompetitionItem::new(competition, stages, teams, display))
        })
        .collect()
}

pub fn list_competition_records(conn: &mut DbConn) -> Result<Vec<CompetitionRecord>> {
    Ok(competitions::list_all(conn)?
        .into_iter()
        .map(CompetitionRecord::from)
        .collect())
}

/// Stages of a competition, narrowed by type and rank type when given.
pub fn list_stages(
    conn: &mut DbConn,
    competition_id: &str,
    kind: Option<i64>,
    rank_type: Option<i64>,
    display: &DisplaySettings,
) -> Result<Vec<StageDetail>> {
    let rows = match (kind, rank_type) {
        (Some(kind), Some(rank_type)) => {
            stages::list_filtered(conn, competition_id, kind, rank_type)?
        }
        _ => {
            let mut rows = stages::list_by_competition(conn, competition_id)?;
            rows.retain(|stage| {
                kind.is_none_or(|k| stage.kind == k)
                    && rank_type.is_none_or(|r| stage.rank_type == r)
            });
            rows
        }
    };

    rows.into_iter()
        .map(|stage| {
            let scores = scores::list_by_stage(conn, &stage.id)?
                .into_iter()
                .map(|score| score_item(score, None, None))
                .collect();
            let hero_stats = stats::list_hero_stats(conn, competition_id, &stage.id)?
                .into_iter()
                .map(HeroStatItem::from)
                .collect();
            let weapon_stats = stats::list_weapon_stats(conn, competition_id, &stage.id)?
                .into_iter()
                .map(WeaponStatItem::from)
                .collect();

            Ok(StageDetail {
                stage: StageItem::new(stage, display),
                scores,
                hero_stats,
                weapon_stats,
            })
        })
        .collect()
}

/// Scores of a stage with their team and player.
pub fn list_stage_scores(conn: &mut DbConn, stage_id: &str) -> Result<Vec<ScoreItem>> {
    Ok(scores::list_with_relations_by_stage(conn, stage_id)?
        .into_iter()
        .map(|row| score_item(row.score, Some(row.team.into()), Some(row.player.into())))
        .collect())
}

/// Team standings over `stage_ids`; with no stage ids, over every stored
/// stage of the competition.
pub fn team_rankings(
    conn: &mut DbConn,
    competition_id: &str,
    stage_ids: &[String],
) -> Result<Vec<TeamRankingItem>> {
    let stage_ids = if stage_ids.is_empty() {
        stages::list_by_competition(conn, competition_id)?
            .into_iter()
            .map(|stage| stage.id)
            .collect()
    } else {
        stage_ids.to_vec()
    };

    let rows = scores::list_with_team_by_stages(conn, &stage_ids)?;
    Ok(aggregate_team_rankings(&rows)
        .into_iter()
        .map(|ranking| TeamRankingItem {
            team: ranking.team.into(),
            total_points: ranking.total_points,
            total_kills: ranking.total_kills,
            matches: ranking.matches,
            rank: ranking.rank,
        })
        .collect())
}

pub fn hero_stats(
    conn: &mut DbConn,
    competition_id: &str,
    stage_id: &str,
) -> Result<Vec<HeroStatItem>> {
    Ok(stats::list_hero_stats(conn, competition_id, stage_id)?
        .into_iter()
        .map(HeroStatItem::from)
        .collect())
}

pub fn weapon_stats(
    conn: &mut DbConn,
    competition_id: &str,
    stage_id: &str,
) -> Result<Vec<WeaponStatItem>> {
    Ok(stats::list_weapon_stats(conn, competition_id, stage_id)?
        .into_iter()
        .map(WeaponStatItem::from)
        .collect())
}

/// A few rows of each table, to check the store is reachable and populated.
pub fn snapshot(conn: &mut DbConn) -> Result<SnapshotData> {
    let competitions = competitions::list(conn, false, Some(SNAPSHOT_SIZE))?
        .into_iter()
        .map(|c| CompetitionSummary {
            id: c.id,
            name: c.name,
            start_date: c.start_date.to_rfc3339(),
        })
        .collect();
    let stages = stages::list_recent(conn, SNAPSHOT_SIZE)?
        .into_iter()
        .map(|s| StageSummary {
            id: s.id,
            name: s.name,
            competition_id: s.competition_id,
        })
        .collect();
    let teams = teams::list_recent(conn, SNAPSHOT_SIZE)?
        .into_iter()
        .map(|t| TeamSummary {
            id: t.id,
            name: t.name,
            competition_id: t.competition_id,
        })
        .collect();
    let scores = scores::list_recent(conn, SNAPSHOT_SIZE)?
        .into_iter()
        .map(|s| ScoreSummary {
            id: s.id,
            points: s.points,
            team_id: s.team_id,
        })
        .collect();

    Ok(SnapshotData {
        competitions,
        stages,
        teams,
        scores,
    })
}

fn score_item(score: Score, team: Option<TeamItem>, player: Option<PlayerItem>) -> ScoreItem {
    let match_scores = serde_json::from_str::<Vec<MatchScore>>(&score.match_scores)
        .unwrap_or_else(|e| {
            warn!("Unreadable match scores on {}: {}", score.id, e);
            Vec::new()
        });

    ScoreItem {
        id: score.id,
        points: score.points,
        kills: score.kills,
        deaths: score.deaths,
        assists: score.assists,
        match_scores,
        stage_id: score.stage_id,
        team_id: score.team_id,
        player_id: score.player_id,
        team,
        player,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::{new_stage, seed_score_graph, temp_pool};
    use crate::database::{competitions, stages};

    #[test]
    fn test_competition_dates_use_display_offset() {
        let (_dir, pool) = temp_pool();
        let mut conn = pool.get().unwrap();
        seed_score_graph(&mut conn, "s-1", "t-1", 10.0, 2);

        let list = list_competitions(&mut conn, false, &DisplaySettings::default()).unwrap();

        assert_eq!(list.len(), 1);
        // 12:00 UTC is 19:00 in UTC+7
        assert_eq!(list[0].start_date, "2024-05-01 19:00:00");
        assert_eq!(list[0].stages.len(), 1);
        assert_eq!(list[0].stages[0].start_date, "2024-05-02 19:00:00");
        assert_eq!(list[0].teams[0].id, "t-1");
    }

    #[test]
    fn test_only_nbpl_uses_stored_flag() {
        let (_dir, pool) = temp_pool();
        let mut conn = pool.get().unwrap();
        competitions::merge_competition(
            &mut conn,
            &crate::database::test_support::new_competition("cup", 0),
        )
        .unwrap();
        competitions::merge_competition(
            &mut conn,
            &crate::database::test_support::new_competition("league", 1),
        )
        .unwrap();

        let display = DisplaySettings::default();
        let ids: Vec<_> = list_competitions(&mut conn, true, &display)
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["league"]);
        assert_eq!(list_competitions(&mut conn, false, &display).unwrap().len(), 2);
    }

    #[test]
    fn test_stage_list_filters_and_nests() {
        let (_dir, pool) = temp_pool();
        let mut conn = pool.get().unwrap();
        seed_score_graph(&mut conn, "s-1", "t-1", 10.0, 2);
        stages::merge_stage(&mut conn, &new_stage("s-2", "c-1", 2, 3)).unwrap();
        let display = DisplaySettings::default();

        let all = list_stages(&mut conn, "c-1", None, None, &display).unwrap();
        assert_eq!(all.len(), 2);

        let filtered = list_stages(&mut conn, "c-1", Some(1), Some(0), &display).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].stage.id, "s-1");
        assert_eq!(filtered[0].scores.len(), 1);
        assert!(filtered[0].hero_stats.is_empty());

        assert!(list_stages(&mut conn, "other", None, None, &display).unwrap().is_empty());
    }

    #[test]
    fn test_rankings_across_stages() {
        let (_dir, pool) = temp_pool();
        let mut conn = pool.get().unwrap();
        seed_score_graph(&mut conn, "s-1", "T1", 10.0, 2);
        seed_score_graph(&mut conn, "s-2", "T2", 15.0, 1);
        seed_score_graph(&mut conn, "s-2", "T1", 5.0, 1);

        let stage_ids = vec!["s-1".to_string(), "s-2".to_string()];
        let rankings = team_rankings(&mut conn, "c-1", &stage_ids).unwrap();

        assert_eq!(rankings.len(), 2);
        assert_eq!((rankings[0].team.id.as_str(), rankings[0].rank), ("T1", 1));
        assert_eq!(rankings[0].total_points, 15.0);
        assert_eq!(rankings[0].total_kills, 3);
        assert_eq!(rankings[0].matches, 2);
        assert_eq!((rankings[1].team.id.as_str(), rankings[1].rank), ("T2", 2));

        let implicit = team_rankings(&mut conn, "c-1", &[]).unwrap();
        assert_eq!(implicit.len(), 2);
    }

    #[test]
    fn test_stage_scores_include_relations() {
        let (_dir, pool) = temp_pool();
        let mut conn = pool.get().unwrap();
        seed_score_graph(&mut conn, "s-1", "t-1", 10.0, 2);

        let scores = list_stage_scores(&mut conn, "s-1").unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].team.as_ref().unwrap().id, "t-1");
        assert_eq!(scores[0].player.as_ref().unwrap().name, "Default Player");
        assert!(scores[0].match_scores.is_empty());
    }

    #[test]
    fn test_snapshot_caps_each_table() {
        let (_dir, pool) = temp_pool();
        let mut conn = pool.get().unwrap();
        for i in 0..7 {
            seed_score_graph(&mut conn, &format!("s-{}", i), &format!("t-{}", i), 1.0, 0);
        }

        let data = snapshot(&mut conn).unwrap();
        assert_eq!(data.competitions.len(), 1);
        assert_eq!(data.stages.len(), 5);
        assert_eq!(data.teams.len(), 5);
        assert_eq!(data.scores.len(), 5);
    }
}
