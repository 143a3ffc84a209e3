// src/storage/client.rs

use crate::storage::models::{FourTeamResult, TwoTeamResult};
use log::info;
use rusqlite::{params, Connection, Result};
use serenity::model::id::UserId;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub struct StorageClient {
    conn: Arc<Mutex<Connection>>,
}

impl StorageClient {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(&path)?;

        conn.execute("PRAGMA foreign_keys = ON", [])?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS results_two_team (
                result_id INTEGER PRIMARY KEY AUTOINCREMENT,
                player TEXT NOT NULL,
                my_score INTEGER NOT NULL,
                enemy TEXT NOT NULL,
                enemy_score INTEGER NOT NULL,
                date TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS results_four_team (
                result_id INTEGER PRIMARY KEY AUTOINCREMENT,
                player TEXT NOT NULL,
                my_score INTEGER NOT NULL,
                enemy1 TEXT NOT NULL,
                point1 INTEGER NOT NULL,
                enemy2 TEXT NOT NULL,
                point2 INTEGER NOT NULL,
                enemy3 TEXT NOT NULL,
                point3 INTEGER NOT NULL,
                rank INTEGER NOT NULL,
                date TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS user_vr (
                user_id INTEGER PRIMARY KEY,
                vr INTEGER NOT NULL
            )",
            [],
        )?;

        info!("database schema created or updated");

        Ok(StorageClient {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn add_two_team(
        &self,
        player: &str,
        my_score: i64,
        enemy: &str,
        enemy_score: i64,
        date: &str,
    ) -> Result<()> {
        let query = "INSERT INTO results_two_team (player, my_score, enemy, enemy_score, date)
                     VALUES (?1, ?2, ?3, ?4, ?5)";
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(query)?;
        stmt.execute(params![player, my_score, enemy, enemy_score, date])?;
        Ok(())
    }

    /// Lists 6v6 results in registration order. `member` keeps rows whose
    /// player list contains that exact name; `enemy` matches exactly.
    pub fn list_two_team(
        &self,
        member: Option<&str>,
        enemy: Option<&str>,
    ) -> Result<Vec<TwoTeamResult>> {
        let query = "SELECT result_id, player, my_score, enemy, enemy_score, date
                     FROM results_two_team ORDER BY result_id";
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(query)?;
        let rows = stmt.query_map([], |row| {
            Ok(TwoTeamResult {
                result_id: row.get(0)?,
                player: row.get(1)?,
                my_score: row.get(2)?,
                enemy: row.get(3)?,
                enemy_score: row.get(4)?,
                date: row.get(5)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            let r = row?;
            if let Some(name) = member {
                if !r.player.split_whitespace().any(|p| p == name) {
                    continue;
                }
            }
            if let Some(team) = enemy {
                if r.enemy != team {
                    continue;
                }
            }
            results.push(r);
        }
        Ok(results)
    }

    pub fn get_two_team(&self, result_id: i64) -> Result<Option<TwoTeamResult>> {
        let query = "SELECT result_id, player, my_score, enemy, enemy_score, date
                     FROM results_two_team WHERE result_id = ?1";
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(query)?;
        let result = stmt.query_row([result_id], |row| {
            Ok(TwoTeamResult {
                result_id: row.get(0)?,
                player: row.get(1)?,
                my_score: row.get(2)?,
                enemy: row.get(3)?,
                enemy_score: row.get(4)?,
                date: row.get(5)?,
            })
        });
        match result {
            Ok(r) => Ok(Some(r)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Returns whether a row was actually deleted.
    pub fn delete_two_team(&self, result_id: i64) -> Result<bool> {
        let query = "DELETE FROM results_two_team WHERE result_id = ?1";
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(query)?;
        Ok(stmt.execute([result_id])? > 0)
    }

    pub fn add_four_team(
        &self,
        player: &str,
        my_score: i64,
        opponents: &[(String, i64); 3],
        rank: i64,
        date: &str,
    ) -> Result<()> {
        let query = "INSERT INTO results_four_team
                     (player, my_score, enemy1, point1, enemy2, point2, enemy3, point3, rank, date)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(query)?;
        stmt.execute(params![
            player,
            my_score,
            opponents[0].0,
            opponents[0].1,
            opponents[1].0,
            opponents[1].1,
            opponents[2].0,
            opponents[2].1,
            rank,
            date,
        ])?;
        Ok(())
    }

    pub fn list_four_team(&self, member: Option<&str>) -> Result<Vec<FourTeamResult>> {
        let query = "SELECT result_id, player, my_score,
                            enemy1, point1, enemy2, point2, enemy3, point3, rank, date
                     FROM results_four_team ORDER BY result_id";
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(query)?;
        let rows = stmt.query_map([], |row| {
            Ok(FourTeamResult {
                result_id: row.get(0)?,
                player: row.get(1)?,
                my_score: row.get(2)?,
                opponents: [
                    (row.get(3)?, row.get(4)?),
                    (row.get(5)?, row.get(6)?),
                    (row.get(7)?, row.get(8)?),
                ],
                rank: row.get(9)?,
                date: row.get(10)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            let r = row?;
            if let Some(name) = member {
                if !r.player.split_whitespace().any(|p| p == name) {
                    continue;
                }
            }
            results.push(r);
        }
        Ok(results)
    }

    /// Registers a VR value once. Returns the already-stored value instead
    /// of overwriting when one exists.
    pub fn set_vr(&self, user: UserId, vr: i64) -> Result<Option<i64>> {
        if let Some(current) = self.get_vr(user)? {
            return Ok(Some(current));
        }
        let query = "INSERT INTO user_vr (user_id, vr) VALUES (?1, ?2)";
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(query)?;
        stmt.execute(params![user.get() as i64, vr])?;
        Ok(None)
    }

    pub fn get_vr(&self, user: UserId) -> Result<Option<i64>> {
        let query = "SELECT vr FROM user_vr WHERE user_id = ?1";
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(query)?;
        let result = stmt.query_row([user.get() as i64], |row| row.get(0));
        match result {
            Ok(vr) => Ok(Some(vr)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// VR values for the given users, skipping anyone unregistered.
    pub fn vr_for_users(&self, users: &[UserId]) -> Result<Vec<i64>> {
        let mut values = Vec::new();
        for user in users {
            if let Some(vr) = self.get_vr(*user)? {
                values.push(vr);
            }
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> StorageClient {
        StorageClient::new(":memory:").unwrap()
    }

    #[test]
    fn two_team_results_round_trip_with_filters() {
        let storage = client();
        storage
            .add_two_team("aki beni chidori dai emi fuu", 512, "StarFox", 420, "2025/08/20 21")
            .unwrap();
        storage
            .add_two_team("aki beni chidori dai emi gon", 430, "Yoshis", 470, "2025/08/21 22")
            .unwrap();

        let all = storage.list_two_team(None, None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].result_id, 1);

        let by_member = storage.list_two_team(Some("gon"), None).unwrap();
        assert_eq!(by_member.len(), 1);
        assert_eq!(by_member[0].enemy, "Yoshis");

        // whole-word match only
        assert!(storage.list_two_team(Some("be"), None).unwrap().is_empty());

        let by_enemy = storage.list_two_team(None, Some("StarFox")).unwrap();
        assert_eq!(by_enemy.len(), 1);
        assert_eq!(by_enemy[0].my_score, 512);
    }

    #[test]
    fn two_team_get_and_delete_by_id() {
        let storage = client();
        storage
            .add_two_team("a b c d e f", 500, "Koopas", 400, "2025/08/20 21")
            .unwrap();

        assert!(storage.get_two_team(1).unwrap().is_some());
        assert!(storage.get_two_team(99).unwrap().is_none());

        assert!(storage.delete_two_team(1).unwrap());
        assert!(!storage.delete_two_team(1).unwrap());
        assert!(storage.get_two_team(1).unwrap().is_none());
    }

    #[test]
    fn four_team_results_round_trip() {
        let storage = client();
        let opponents = [
            ("Koopas".to_string(), 300),
            ("Yoshis".to_string(), 280),
            ("Toads".to_string(), 250),
        ];
        storage
            .add_four_team("a b c d e f", 320, &opponents, 1, "2025/08/20 21")
            .unwrap();

        let all = storage.list_four_team(None).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].opponents, opponents);
        assert_eq!(all[0].rank, 1);

        assert!(storage.list_four_team(Some("zzz")).unwrap().is_empty());
    }

    #[test]
    fn vr_registers_once_and_averages() {
        let storage = client();
        let alice = UserId::new(1);
        let bob = UserId::new(2);

        assert_eq!(storage.set_vr(alice, 12000).unwrap(), None);
        // second registration reports the stored value and keeps it
        assert_eq!(storage.set_vr(alice, 99999).unwrap(), Some(12000));
        assert_eq!(storage.get_vr(alice).unwrap(), Some(12000));

        storage.set_vr(bob, 14000).unwrap();
        let values = storage
            .vr_for_users(&[alice, bob, UserId::new(3)])
            .unwrap();
        assert_eq!(values, vec![12000, 14000]);
    }
}
