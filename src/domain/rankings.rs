use std::collections::HashMap;

use crate::database::models::{ScoreWithTeam, Team};

#[derive(Debug, Clone, PartialEq)]
pub struct TeamRanking {
    pub team: Team,
    pub total_points: f64,
    pub total_kills: i64,
    pub matches: i64,
    pub rank: usize,
}

/// Sum points and kills per team and count its score rows, then rank by total
/// points descending. Teams with equal points keep the order in which they
/// first appear in `scores`.
pub fn aggregate_team_rankings(scores: &[ScoreWithTeam]) -> Vec<TeamRanking> {
    let mut order: Vec<TeamRanking> = Vec::new();
    let mut index_by_team: HashMap<&str, usize> = HashMap::new();

    for entry in scores {
        let idx = *index_by_team
            .entry(entry.score.team_id.as_str())
            .or_insert_with(|| {
                order.push(TeamRanking {
                    team: entry.team.clone(),
                    total_points: 0.0,
                    total_kills: 0,
                    matches: 0,
                    rank: 0,
                });
                order.len() - 1
            });

        let ranking = &mut order[idx];
        ranking.total_points += entry.score.points;
        ranking.total_kills += entry.score.kills;
        ranking.matches += 1;
    }

    // sort_by is stable
    order.sort_by(|a, b| b.total_points.total_cmp(&a.total_points));

    for (position, ranking) in order.iter_mut().enumerate() {
        ranking.rank = position + 1;
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Score;

    fn team(id: &str) -> Team {
        Team {
            id: id.to_string(),
            name: format!("Team {}", id),
            logo: None,
            points: 0.0,
            rank: None,
            competition_id: "c-1".to_string(),
        }
    }

    fn entry(stage: &str, team_id: &str, points: f64, kills: i64) -> ScoreWithTeam {
        ScoreWithTeam {
            score: Score {
                id: format!("{}-{}", stage, team_id),
                points,
                kills,
                deaths: 0,
                assists: 0,
                match_scores: "[]".to_string(),
                stage_id: stage.to_string(),
                team_id: team_id.to_string(),
                player_id: format!("default-player-{}", team_id),
            },
            team: team(team_id),
        }
    }

    #[test]
    fn test_equal_totals_keep_first_appearance_order() {
        let scores = vec![
            entry("s-1", "T1", 10.0, 2),
            entry("s-2", "T2", 15.0, 1),
            entry("s-2", "T1", 5.0, 1),
        ];

        let rankings = aggregate_team_rankings(&scores);

        assert_eq!(rankings.len(), 2);
        assert_eq!(rankings[0].team.id, "T1");
        assert_eq!(rankings[0].total_points, 15.0);
        assert_eq!(rankings[0].total_kills, 3);
        assert_eq!(rankings[0].matches, 2);
        assert_eq!(rankings[0].rank, 1);

        assert_eq!(rankings[1].team.id, "T2");
        assert_eq!(rankings[1].total_points, 15.0);
        assert_eq!(rankings[1].total_kills, 1);
        assert_eq!(rankings[1].matches, 1);
        assert_eq!(rankings[1].rank, 2);
    }

    #[test]
    fn test_higher_points_rank_first() {
        let scores = vec![
            entry("s-1", "A", 3.0, 0),
            entry("s-1", "B", 30.0, 4),
            entry("s-1", "C", 12.0, 2),
        ];

        let ids: Vec<_> = aggregate_team_rankings(&scores)
            .into_iter()
            .map(|r| (r.team.id, r.rank))
            .collect();

        assert_eq!(
            ids,
            vec![("B".to_string(), 1), ("C".to_string(), 2), ("A".to_string(), 3)]
        );
    }

    #[test]
    fn test_no_scores_no_rankings() {
        assert!(aggregate_team_rankings(&[]).is_empty());
    }
}
