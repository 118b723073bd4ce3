//! 用户偏好 DAO - preference 表

use rusqlite::{params, Connection};

use super::select_in;
use crate::error::Result;
use crate::storage::entities::PreferenceRecord;

pub struct PreferenceDao<'a> {
    conn: &'a Connection,
}

impl<'a> PreferenceDao<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, p: &PreferenceRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO preference (id, user_id, category, name, value) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![p.id, p.user_id, p.category, p.name, p.value],
        )?;
        Ok(())
    }

    pub fn update(&self, p: &PreferenceRecord) -> Result<usize> {
        Ok(self.conn.execute(
            "UPDATE preference SET user_id = ?2, category = ?3, name = ?4, value = ?5 WHERE id = ?1",
            params![p.id, p.user_id, p.category, p.name, p.value],
        )?)
    }

    pub fn delete(&self, id: &str) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM preference WHERE id = ?1", params![id])?)
    }

    pub fn get_by_ids(&self, ids: &[String]) -> Result<Vec<PreferenceRecord>> {
        select_in(
            self.conn,
            ids,
            |placeholders| {
                format!("SELECT id, user_id, category, name, value FROM preference WHERE id IN ({})", placeholders)
            },
            |row| {
                Ok(PreferenceRecord {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    category: row.get(2)?,
                    name: row.get(3)?,
                    value: row.get(4)?,
                })
            },
        )
    }
}
