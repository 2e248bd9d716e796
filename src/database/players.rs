use anyhow::{Context, Result};
use rusqlite::{OptionalExtension, params};

use super::connection::DbConn;
use super::models::{Merged, NewPlayer, Player, Team};
use crate::domain::default_player_id;

const COLUMNS: &str = "id, name, avatar, team_id, competition_id";
const DEFAULT_PLAYER_NAME: &str = "Default Player";

pub fn merge_player(conn: &mut DbConn, new: &NewPlayer) -> Result<Merged<Player>> {
    match find_by_id(conn, &new.id)? {
        Some(_) => update_player(conn, new).map(Merged::Updated),
        None => insert_new_player(conn, new).map(Merged::Created),
    }
}

/// A player to attach a team's score to: the team's first known player, or a
/// synthesized `default-player-<team>` created on first use.
pub fn ensure_default_player(conn: &mut DbConn, team: &Team) -> Result<Merged<Player>> {
    if let Some(existing) = find_first_by_team(conn, &team.id)? {
        return Ok(Merged::Existing(existing));
    }

    let placeholder = NewPlayer {
        id: default_player_id(&team.id),
        name: DEFAULT_PLAYER_NAME.to_string(),
        avatar: None,
        team_id: team.id.clone(),
        competition_id: team.competition_id.clone(),
    };

    insert_new_player(conn, &placeholder).map(Merged::Created)
}

fn insert_new_player(conn: &mut DbConn, new: &NewPlayer) -> Result<Player> {
    let sql = format!(
        "INSERT INTO players (id, name, avatar, team_id, competition_id) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![new.id, new.name, new.avatar, new.team_id, new.competition_id],
        parse_player_row,
    )
    .context("Failed to insert new player")
}

fn update_player(conn: &mut DbConn, new: &NewPlayer) -> Result<Player> {
    let sql = format!(
        "UPDATE players SET name = ?2, avatar = ?3, team_id = ?4, competition_id = ?5 WHERE id = ?1 RETURNING {COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![new.id, new.name, new.avatar, new.team_id, new.competition_id],
        parse_player_row,
    )
    .context("Failed to update player")
}

pub(crate) fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<Player> {
    parse_player_at(row, 0)
}

pub(crate) fn parse_player_at(row: &rusqlite::Row, offset: usize) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        avatar: row.get(offset + 2)?,
        team_id: row.get(offset + 3)?,
        competition_id: row.get(offset + 4)?,
    })
}

pub fn find_by_id(conn: &mut DbConn, id: &str) -> Result<Option<Player>> {
    let sql = format!("SELECT {COLUMNS} FROM players WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_player_row)
        .optional()
        .context("Failed to query player by id")
}

pub fn find_first_by_team(conn: &mut DbConn, team_id: &str) -> Result<Option<Player>> {
    let sql = format!("SELECT {COLUMNS} FROM players WHERE team_id = ?1 ORDER BY rowid LIMIT 1");

    conn.query_row(&sql, params![team_id], parse_player_row)
        .optional()
        .context("Failed to query first player of team")
}

pub fn list_by_team(conn: &mut DbConn, team_id: &str) -> Result<Vec<Player>> {
    let sql = format!("SELECT {COLUMNS} FROM players WHERE team_id = ?1 ORDER BY rowid");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![team_id], parse_player_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}
