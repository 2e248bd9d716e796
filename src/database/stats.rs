use anyhow::{Context, Result};
use rusqlite::{OptionalExtension, params};

use super::connection::DbConn;
use super::models::{HeroStat, Merged, NewHeroStat, NewWeaponStat, WeaponStat};

const HERO_COLUMNS: &str = "id, stage_id, hero_name, hero_image, battle_amount, kill_times_avg, assist_avg, cure_avg, \
     damage_avg, death_avg, total_live_time_avg, score_top1_battle_amount, rescue_times_avg, score_top1_rate, rank";
const WEAPON_COLUMNS: &str = "id, stage_id, weapon_name, pick_rate, kill_rate";

// --- Hero stats ---

pub fn merge_hero_stat(conn: &mut DbConn, new: &NewHeroStat) -> Result<Merged<HeroStat>> {
    match find_hero_stat(conn, &new.id)? {
        Some(_) => write_hero_stat(conn, new, HERO_UPDATE)
            .context("Failed to update hero stat")
            .map(Merged::Updated),
        None => write_hero_stat(conn, new, HERO_INSERT)
            .context("Failed to insert new hero stat")
            .map(Merged::Created),
    }
}

const HERO_INSERT: &str = "INSERT INTO hero_stats (id, stage_id, hero_name, hero_image, battle_amount, kill_times_avg, \
     assist_avg, cure_avg, damage_avg, death_avg, total_live_time_avg, score_top1_battle_amount, rescue_times_avg, \
     score_top1_rate, rank) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)";

const HERO_UPDATE: &str = "UPDATE hero_stats SET stage_id = ?2, hero_name = ?3, hero_image = ?4, battle_amount = ?5, \
     kill_times_avg = ?6, assist_avg = ?7, cure_avg = ?8, damage_avg = ?9, death_avg = ?10, total_live_time_avg = ?11, \
     score_top1_battle_amount = ?12, rescue_times_avg = ?13, score_top1_rate = ?14, rank = ?15 WHERE id = ?1";

fn write_hero_stat(conn: &mut DbConn, new: &NewHeroStat, statement: &str) -> rusqlite::Result<HeroStat> {
    let sql = format!("{statement} RETURNING {HERO_COLUMNS}");

    conn.query_row(
        &sql,
        params![
            new.id,
            new.stage_id,
            new.hero_name,
            new.hero_image,
            new.battle_amount,
            new.kill_times_avg,
            new.assist_avg,
            new.cure_avg,
            new.damage_avg,
            new.death_avg,
            new.total_live_time_avg,
            new.score_top1_battle_amount,
            new.rescue_times_avg,
            new.score_top1_rate,
            new.rank
        ],
        parse_hero_row,
    )
}

fn parse_hero_row(row: &rusqlite::Row) -> rusqlite::Result<HeroStat> {
    Ok(HeroStat {
        id: row.get(0)?,
        stage_id: row.get(1)?,
        hero_name: row.get(2)?,
        hero_image: row.get(3)?,
        battle_amount: row.get(4)?,
        kill_times_avg: row.get(5)?,
        assist_avg: row.get(6)?,
        cure_avg: row.get(7)?,
        damage_avg: row.get(8)?,
        death_avg: row.get(9)?,
        total_live_time_avg: row.get(10)?,
        score_top1_battle_amount: row.get(11)?,
        rescue_times_avg: row.get(12)?,
        score_top1_rate: row.get(13)?,
        rank: row.get(14)?,
    })
}

pub fn find_hero_stat(conn: &mut DbConn, id: &str) -> Result<Option<HeroStat>> {
    let sql = format!("SELECT {HERO_COLUMNS} FROM hero_stats WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_hero_row)
        .optional()
        .context("Failed to query hero stat by id")
}

/// Most played heroes first. Empty when the stage is not part of the competition.
pub fn list_hero_stats(
    conn: &mut DbConn,
    competition_id: &str,
    stage_id: &str,
) -> Result<Vec<HeroStat>> {
    let sql = format!(
        "SELECT {HERO_COLUMNS} FROM hero_stats
         WHERE stage_id = ?1 AND stage_id IN (SELECT id FROM stages WHERE competition_id = ?2)
         ORDER BY battle_amount DESC, rowid"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![stage_id, competition_id], parse_hero_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

// --- Weapon stats ---

pub fn merge_weapon_stat(conn: &mut DbConn, new: &NewWeaponStat) -> Result<Merged<WeaponStat>> {
    match find_weapon_stat(conn, &new.id)? {
        Some(_) => write_weapon_stat(
            conn,
            new,
            "UPDATE weapon_stats SET stage_id = ?2, weapon_name = ?3, pick_rate = ?4, kill_rate = ?5 WHERE id = ?1",
        )
        .context("Failed to update weapon stat")
        .map(Merged::Updated),
        None => write_weapon_stat(
            conn,
            new,
            "INSERT INTO weapon_stats (id, stage_id, weapon_name, pick_rate, kill_rate) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .context("Failed to insert new weapon stat")
        .map(Merged::Created),
    }
}

fn write_weapon_stat(
    conn: &mut DbConn,
    new: &NewWeaponStat,
    statement: &str,
) -> rusqlite::Result<WeaponStat> {
    let sql = format!("{statement} RETURNING {WEAPON_COLUMNS}");

    conn.query_row(
        &sql,
        params![new.id, new.stage_id, new.weapon_name, new.pick_rate, new.kill_rate],
        parse_weapon_row,
    )
}

fn parse_weapon_row(row: &rusqlite::Row) -> rusqlite::Result<WeaponStat> {
    Ok(WeaponStat {
        id: row.get(0)?,
        stage_id: row.get(1)?,
        weapon_name: row.get(2)?,
        pick_rate: row.get(3)?,
        kill_rate: row.get(4)?,
    })
}

pub fn find_weapon_stat(conn: &mut DbConn, id: &str) -> Result<Option<WeaponStat>> {
    let sql = format!("SELECT {WEAPON_COLUMNS} FROM weapon_stats WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_weapon_row)
        .optional()
        .context("Failed to query weapon stat by id")
}

/// Most picked weapons first.
pub fn list_weapon_stats(
    conn: &mut DbConn,
    competition_id: &str,
    stage_id: &str,
) -> Result<Vec<WeaponStat>> {
    let sql = format!(
        "SELECT {WEAPON_COLUMNS} FROM weapon_stats
         WHERE stage_id = ?1 AND stage_id IN (SELECT id FROM stages WHERE competition_id = ?2)
         ORDER BY pick_rate DESC, rowid"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![stage_id, competition_id], parse_weapon_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::stages;
    use crate::database::test_support::{new_stage, seed_competition, temp_pool};

    fn weapon(stage: &str, name: &str, pick_rate: f64) -> NewWeaponStat {
        NewWeaponStat {
            id: format!("{}-{}", stage, name),
            stage_id: stage.to_string(),
            weapon_name: name.to_string(),
            pick_rate,
            kill_rate: 0.1,
        }
    }

    #[test]
    fn test_weapon_stats_ordered_by_pick_rate() {
        let (_dir, pool) = temp_pool();
        let mut conn = pool.get().unwrap();
        seed_competition(&mut conn, "c-1");
        stages::merge_stage(&mut conn, &new_stage("s-1", "c-1", 1, 0)).unwrap();

        merge_weapon_stat(&mut conn, &weapon("s-1", "Katana", 0.2)).unwrap();
        merge_weapon_stat(&mut conn, &weapon("s-1", "Spear", 0.5)).unwrap();
        let again = merge_weapon_stat(&mut conn, &weapon("s-1", "Katana", 0.3)).unwrap();
        assert_eq!(again.action(), "updated");

        let names: Vec<_> = list_weapon_stats(&mut conn, "c-1", "s-1")
            .unwrap()
            .into_iter()
            .map(|w| (w.weapon_name, w.pick_rate))
            .collect();
        assert_eq!(
            names,
            vec![("Spear".to_string(), 0.5), ("Katana".to_string(), 0.3)]
        );
    }

    #[test]
    fn test_hero_stat_merge_and_order() {
        let (_dir, pool) = temp_pool();
        let mut conn = pool.get().unwrap();
        seed_competition(&mut conn, "c-1");
        stages::merge_stage(&mut conn, &new_stage("s-1", "c-1", 1, 0)).unwrap();

        let payload = crate::domain::HeroStatPayload {
            battle_amount: Some(4.0),
            ..Default::default()
        };
        merge_hero_stat(&mut conn, &payload.to_new_hero_stat("s-1", "Tarka Ji")).unwrap();

        let popular = crate::domain::HeroStatPayload {
            battle_amount: Some(9.0),
            ..Default::default()
        };
        merge_hero_stat(&mut conn, &popular.to_new_hero_stat("s-1", "Viper Ning")).unwrap();
        merge_hero_stat(&mut conn, &popular.to_new_hero_stat("s-1", "Viper Ning")).unwrap();

        assert!(list_hero_stats(&mut conn, "c-2", "s-1").unwrap().is_empty());
        let heroes = list_hero_stats(&mut conn, "c-1", "s-1").unwrap();
        assert_eq!(heroes.len(), 2);
        assert_eq!(heroes[0].id, "s-1-Viper Ning");
        assert_eq!(heroes[1].hero_name, "Tarka Ji");
    }
}
