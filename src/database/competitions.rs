use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{OptionalExtension, params};

use super::connection::DbConn;
use super::models::{Competition, Merged, NewCompetition};

const COLUMNS: &str = "id, name, description, start_date, end_date, type, nbpl, created_at";

pub fn merge_competition(conn: &mut DbConn, new: &NewCompetition) -> Result<Merged<Competition>> {
    match find_by_id(conn, &new.id)? {
        Some(_) => update_competition(conn, new).map(Merged::Updated),
        None => insert_new_competition(conn, new).map(Merged::Created),
    }
}

fn insert_new_competition(conn: &mut DbConn, new: &NewCompetition) -> Result<Competition> {
    let now = Utc::now();
    let sql = format!(
        "INSERT INTO competitions (id, name, description, start_date, end_date, type, nbpl) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING {COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![
            new.id,
            new.name,
            new.description,
            new.start_date.unwrap_or(now),
            new.end_date.unwrap_or(now),
            new.kind,
            new.nbpl
        ],
        parse_competition_row,
    )
    .context("Failed to insert new competition")
}

fn update_competition(conn: &mut DbConn, new: &NewCompetition) -> Result<Competition> {
    let sql = format!(
        "UPDATE competitions SET name = ?2, description = ?3, start_date = COALESCE(?4, start_date), end_date = COALESCE(?5, end_date), type = ?6, nbpl = ?7 WHERE id = ?1 RETURNING {COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![
            new.id,
            new.name,
            new.description,
            new.start_date,
            new.end_date,
            new.kind,
            new.nbpl
        ],
        parse_competition_row,
    )
    .context("Failed to update competition")
}

fn parse_competition_row(row: &rusqlite::Row) -> rusqlite::Result<Competition> {
    Ok(Competition {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        start_date: row.get(3)?,
        end_date: row.get(4)?,
        kind: row.get(5)?,
        nbpl: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub fn find_by_id(conn: &mut DbConn, id: &str) -> Result<Option<Competition>> {
    let sql = format!("SELECT {COLUMNS} FROM competitions WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_competition_row)
        .optional()
        .context("Failed to query competition by id")
}

/// Newest first; `only_nbpl` keeps league competitions only.
pub fn list(conn: &mut DbConn, only_nbpl: bool, limit: Option<usize>) -> Result<Vec<Competition>> {
    let filter = if only_nbpl { "WHERE nbpl = 1" } else { "" };
    let limit = limit.map(|n| format!("LIMIT {}", n)).unwrap_or_default();
    let sql = format!("SELECT {COLUMNS} FROM competitions {filter} ORDER BY start_date DESC {limit}");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_competition_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn list_all(conn: &mut DbConn) -> Result<Vec<Competition>> {
    list(conn, false, None)
}

pub fn count(conn: &mut DbConn) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM competitions", [], |row| row.get(0))
        .context("Failed to count competitions")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::{new_competition, temp_pool};

    #[test]
    fn test_merge_twice_keeps_one_identical_row() {
        let (_dir, pool) = temp_pool();
        let mut conn = pool.get().unwrap();
        let new = new_competition("c-1", 1);

        let first = merge_competition(&mut conn, &new).unwrap();
        assert!(first.was_created());

        let second = merge_competition(&mut conn, &new).unwrap();
        assert_eq!(second.action(), "updated");
        assert_eq!(first.row(), second.row());
        assert_eq!(count(&mut conn).unwrap(), 1);
    }

    #[test]
    fn test_merge_updates_fields() {
        let (_dir, pool) = temp_pool();
        let mut conn = pool.get().unwrap();
        merge_competition(&mut conn, &new_competition("c-1", 0)).unwrap();

        let mut renamed = new_competition("c-1", 1);
        renamed.name = "NBPL Finals".to_string();
        merge_competition(&mut conn, &renamed).unwrap();

        let stored = find_by_id(&mut conn, "c-1").unwrap().unwrap();
        assert_eq!(stored.name, "NBPL Finals");
        assert!(stored.nbpl);
        assert_eq!(Some(stored.start_date), renamed.start_date);
    }

    #[test]
    fn test_merge_without_dates_keeps_stored_dates() {
        let (_dir, pool) = temp_pool();
        let mut conn = pool.get().unwrap();
        let original = merge_competition(&mut conn, &new_competition("c-1", 1))
            .unwrap()
            .into_inner();

        let mut undated = new_competition("c-1", 1);
        undated.start_date = None;
        undated.end_date = None;
        let updated = merge_competition(&mut conn, &undated).unwrap();

        assert_eq!(updated.action(), "updated");
        assert_eq!(updated.into_inner(), original);
    }

    #[test]
    fn test_list_filters_league_and_orders_newest_first() {
        let (_dir, pool) = temp_pool();
        let mut conn = pool.get().unwrap();

        let mut older = new_competition("old", 1);
        older.start_date = older.start_date.map(|d| d - chrono::Duration::days(30));
        merge_competition(&mut conn, &older).unwrap();
        merge_competition(&mut conn, &new_competition("new", 1)).unwrap();
        merge_competition(&mut conn, &new_competition("cup", 0)).unwrap();

        let league: Vec<_> = list(&mut conn, true, None)
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(league, vec!["new", "old"]);

        assert_eq!(list(&mut conn, false, Some(2)).unwrap().len(), 2);
    }
}
