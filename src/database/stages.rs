use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{OptionalExtension, params};

use super::connection::DbConn;
use super::models::{Merged, NewStage, Stage};

const COLUMNS: &str = "id, name, type, rank_type, start_date, end_date, competition_id, created_at";

pub fn merge_stage(conn: &mut DbConn, new: &NewStage) -> Result<Merged<Stage>> {
    match find_by_id(conn, &new.id)? {
        Some(_) => update_stage(conn, new).map(Merged::Updated),
        None => insert_new_stage(conn, new).map(Merged::Created),
    }
}

fn insert_new_stage(conn: &mut DbConn, new: &NewStage) -> Result<Stage> {
    let now = Utc::now();
    let sql = format!(
        "INSERT INTO stages (id, name, type, rank_type, start_date, end_date, competition_id) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING {COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![
            new.id,
            new.name,
            new.kind,
            new.rank_type,
            new.start_date.unwrap_or(now),
            new.end_date.unwrap_or(now),
            new.competition_id
        ],
        parse_stage_row,
    )
    .context("Failed to insert new stage")
}

fn update_stage(conn: &mut DbConn, new: &NewStage) -> Result<Stage> {
    let sql = format!(
        "UPDATE stages SET name = ?2, type = ?3, rank_type = ?4, start_date = COALESCE(?5, start_date), end_date = COALESCE(?6, end_date), competition_id = ?7 WHERE id = ?1 RETURNING {COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![
            new.id,
            new.name,
            new.kind,
            new.rank_type,
            new.start_date,
            new.end_date,
            new.competition_id
        ],
        parse_stage_row,
    )
    .context("Failed to update stage")
}

fn parse_stage_row(row: &rusqlite::Row) -> rusqlite::Result<Stage> {
    Ok(Stage {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
        rank_type: row.get(3)?,
        start_date: row.get(4)?,
        end_date: row.get(5)?,
        competition_id: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub fn find_by_id(conn: &mut DbConn, id: &str) -> Result<Option<Stage>> {
    let sql = format!("SELECT {COLUMNS} FROM stages WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_stage_row)
        .optional()
        .context("Failed to query stage by id")
}

pub fn list_by_competition(conn: &mut DbConn, competition_id: &str) -> Result<Vec<Stage>> {
    let sql = format!("SELECT {COLUMNS} FROM stages WHERE competition_id = ?1 ORDER BY rowid");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![competition_id], parse_stage_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn list_filtered(
    conn: &mut DbConn,
    competition_id: &str,
    kind: i64,
    rank_type: i64,
) -> Result<Vec<Stage>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM stages WHERE competition_id = ?1 AND type = ?2 AND rank_type = ?3 ORDER BY rowid"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![competition_id, kind, rank_type], parse_stage_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn list_recent(conn: &mut DbConn, limit: usize) -> Result<Vec<Stage>> {
    let sql = format!("SELECT {COLUMNS} FROM stages ORDER BY rowid LIMIT ?1");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![limit as i64], parse_stage_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::{new_stage, seed_competition, temp_pool};

    #[test]
    fn test_stage_requires_competition() {
        let (_dir, pool) = temp_pool();
        let mut conn = pool.get().unwrap();

        assert!(merge_stage(&mut conn, &new_stage("s-1", "missing", 1, 0)).is_err());
    }

    #[test]
    fn test_filtered_by_type_and_rank_type() {
        let (_dir, pool) = temp_pool();
        let mut conn = pool.get().unwrap();
        seed_competition(&mut conn, "c-1");

        merge_stage(&mut conn, &new_stage("s-1", "c-1", 1, 0)).unwrap();
        merge_stage(&mut conn, &new_stage("s-2", "c-1", 1, 2)).unwrap();
        merge_stage(&mut conn, &new_stage("s-3", "c-1", 2, 0)).unwrap();
        merge_stage(&mut conn, &new_stage("s-1", "c-1", 1, 0)).unwrap();

        let ids: Vec<_> = list_filtered(&mut conn, "c-1", 1, 0)
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["s-1"]);
        assert_eq!(list_by_competition(&mut conn, "c-1").unwrap().len(), 3);
    }
}
