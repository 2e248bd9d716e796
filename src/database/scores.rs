use anyhow::{Context, Result};
use rusqlite::{OptionalExtension, params, params_from_iter};

use super::connection::DbConn;
use super::models::{Merged, NewScore, Score, ScoreWithRelations, ScoreWithTeam};
use super::players::parse_player_at;
use super::teams::parse_team_at;

const COLUMNS: &str =
    "id, points, kills, deaths, assists, match_scores, stage_id, team_id, player_id";
const JOINED_COLUMNS: &str = "s.id, s.points, s.kills, s.deaths, s.assists, s.match_scores, s.stage_id, s.team_id, s.player_id, \
     t.id, t.name, t.logo, t.points, t.rank, t.competition_id";
const SCORE_WIDTH: usize = 9;
const TEAM_WIDTH: usize = 6;

pub fn merge_score(conn: &mut DbConn, new: &NewScore) -> Result<Merged<Score>> {
    match find_by_id(conn, &new.id)? {
        Some(_) => update_score(conn, new).map(Merged::Updated),
        None => insert_new_score(conn, new).map(Merged::Created),
    }
}

fn insert_new_score(conn: &mut DbConn, new: &NewScore) -> Result<Score> {
    let sql = format!(
        "INSERT INTO scores (id, points, kills, deaths, assists, match_scores, stage_id, team_id, player_id) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) RETURNING {COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![
            new.id,
            new.points,
            new.kills,
            new.deaths,
            new.assists,
            new.match_scores,
            new.stage_id,
            new.team_id,
            new.player_id
        ],
        parse_score_row,
    )
    .context("Failed to insert new score")
}

fn update_score(conn: &mut DbConn, new: &NewScore) -> Result<Score> {
    let sql = format!(
        "UPDATE scores SET points = ?2, kills = ?3, deaths = ?4, assists = ?5, match_scores = ?6, stage_id = ?7, team_id = ?8, player_id = ?9 WHERE id = ?1 RETURNING {COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![
            new.id,
            new.points,
            new.kills,
            new.deaths,
            new.assists,
            new.match_scores,
            new.stage_id,
            new.team_id,
            new.player_id
        ],
        parse_score_row,
    )
    .context("Failed to update score")
}

fn parse_score_row(row: &rusqlite::Row) -> rusqlite::Result<Score> {
    Ok(Score {
        id: row.get(0)?,
        points: row.get(1)?,
        kills: row.get(2)?,
        deaths: row.get(3)?,
        assists: row.get(4)?,
        match_scores: row.get(5)?,
        stage_id: row.get(6)?,
        team_id: row.get(7)?,
        player_id: row.get(8)?,
    })
}

fn parse_score_with_team(row: &rusqlite::Row) -> rusqlite::Result<ScoreWithTeam> {
    Ok(ScoreWithTeam {
        score: parse_score_row(row)?,
        team: parse_team_at(row, SCORE_WIDTH)?,
    })
}

pub fn find_by_id(conn: &mut DbConn, id: &str) -> Result<Option<Score>> {
    let sql = format!("SELECT {COLUMNS} FROM scores WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_score_row)
        .optional()
        .context("Failed to query score by id")
}

pub fn list_by_stage(conn: &mut DbConn, stage_id: &str) -> Result<Vec<Score>> {
    let sql = format!("SELECT {COLUMNS} FROM scores WHERE stage_id = ?1 ORDER BY rowid");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![stage_id], parse_score_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn list_with_relations_by_stage(
    conn: &mut DbConn,
    stage_id: &str,
) -> Result<Vec<ScoreWithRelations>> {
    let sql = format!(
        "SELECT {JOINED_COLUMNS}, p.id, p.name, p.avatar, p.team_id, p.competition_id
         FROM scores s
         JOIN teams t ON s.team_id = t.id
         JOIN players p ON s.player_id = p.id
         WHERE s.stage_id = ?1
         ORDER BY s.rowid"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![stage_id], |row| {
            Ok(ScoreWithRelations {
                score: parse_score_row(row)?,
                team: parse_team_at(row, SCORE_WIDTH)?,
                player: parse_player_at(row, SCORE_WIDTH + TEAM_WIDTH)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Scores of all `stage_ids` joined with their team, in insertion order.
pub fn list_with_team_by_stages(
    conn: &mut DbConn,
    stage_ids: &[String],
) -> Result<Vec<ScoreWithTeam>> {
    if stage_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = (1..=stage_ids.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "SELECT {JOINED_COLUMNS}
         FROM scores s
         JOIN teams t ON s.team_id = t.id
         WHERE s.stage_id IN ({placeholders})
         ORDER BY s.rowid"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(stage_ids.iter()), parse_score_with_team)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn list_recent(conn: &mut DbConn, limit: usize) -> Result<Vec<Score>> {
    let sql = format!("SELECT {COLUMNS} FROM scores ORDER BY rowid LIMIT ?1");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![limit as i64], parse_score_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}
