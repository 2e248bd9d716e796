use anyhow::{Context, Result};
use rusqlite::{OptionalExtension, params};

use super::connection::DbConn;
use super::models::{Merged, NewTeam, Team};

const COLUMNS: &str = "id, name, logo, points, rank, competition_id";

pub fn merge_team(conn: &mut DbConn, new: &NewTeam) -> Result<Merged<Team>> {
    match find_by_id(conn, &new.id)? {
        Some(_) => update_team(conn, new).map(Merged::Updated),
        None => insert_new_team(conn, new).map(Merged::Created),
    }
}

/// Insert `new` only when no team with its id exists yet.
pub fn ensure_team(conn: &mut DbConn, new: &NewTeam) -> Result<Merged<Team>> {
    match find_by_id(conn, &new.id)? {
        Some(existing) => Ok(Merged::Existing(existing)),
        None => insert_new_team(conn, new).map(Merged::Created),
    }
}

fn insert_new_team(conn: &mut DbConn, new: &NewTeam) -> Result<Team> {
    let sql = format!(
        "INSERT INTO teams (id, name, logo, points, rank, competition_id) VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING {COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![
            new.id,
            new.name,
            new.logo,
            new.points.unwrap_or(0.0),
            new.rank,
            new.competition_id
        ],
        parse_team_row,
    )
    .context("Failed to insert new team")
}

/// Absent logo, points and rank keep their stored values.
fn update_team(conn: &mut DbConn, new: &NewTeam) -> Result<Team> {
    let sql = format!(
        "UPDATE teams SET name = ?2, logo = COALESCE(?3, logo), points = COALESCE(?4, points), rank = COALESCE(?5, rank), competition_id = ?6 WHERE id = ?1 RETURNING {COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![new.id, new.name, new.logo, new.points, new.rank, new.competition_id],
        parse_team_row,
    )
    .context("Failed to update team")
}

pub(crate) fn parse_team_row(row: &rusqlite::Row) -> rusqlite::Result<Team> {
    parse_team_at(row, 0)
}

/// Read a team whose columns start at `offset`, for joined selects.
pub(crate) fn parse_team_at(row: &rusqlite::Row, offset: usize) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        logo: row.get(offset + 2)?,
        points: row.get(offset + 3)?,
        rank: row.get(offset + 4)?,
        competition_id: row.get(offset + 5)?,
    })
}

pub fn find_by_id(conn: &mut DbConn, id: &str) -> Result<Option<Team>> {
    let sql = format!("SELECT {COLUMNS} FROM teams WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_team_row)
        .optional()
        .context("Failed to query team by id")
}

pub fn list_by_competition(conn: &mut DbConn, competition_id: &str) -> Result<Vec<Team>> {
    let sql = format!("SELECT {COLUMNS} FROM teams WHERE competition_id = ?1 ORDER BY rowid");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![competition_id], parse_team_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn list_recent(conn: &mut DbConn, limit: usize) -> Result<Vec<Team>> {
    let sql = format!("SELECT {COLUMNS} FROM teams ORDER BY rowid LIMIT ?1");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![limit as i64], parse_team_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}
