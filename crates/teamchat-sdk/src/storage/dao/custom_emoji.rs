//! 自定义表情 DAO - custom_emoji 表

use rusqlite::{params, Connection};

use super::select_in;
use crate::error::Result;
use crate::storage::entities::CustomEmojiRecord;

pub struct CustomEmojiDao<'a> {
    conn: &'a Connection,
}

impl<'a> CustomEmojiDao<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// 同名表情已存在（并发的对账先一步建好）时不做任何事
    pub fn insert(&self, e: &CustomEmojiRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO custom_emoji (id, name) VALUES (?1, ?2) ON CONFLICT(name) DO NOTHING",
            params![e.id, e.name],
        )?;
        Ok(())
    }

    pub fn update(&self, e: &CustomEmojiRecord) -> Result<usize> {
        Ok(self.conn.execute(
            "UPDATE custom_emoji SET name = ?2 WHERE id = ?1",
            params![e.id, e.name],
        )?)
    }

    pub fn delete(&self, id: &str) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM custom_emoji WHERE id = ?1", params![id])?)
    }

    pub fn get_by_ids(&self, ids: &[String]) -> Result<Vec<CustomEmojiRecord>> {
        self.select_in("id", ids)
    }

    pub fn get_by_names(&self, names: &[String]) -> Result<Vec<CustomEmojiRecord>> {
        self.select_in("name", names)
    }

    fn select_in(&self, column: &str, values: &[String]) -> Result<Vec<CustomEmojiRecord>> {
        select_in(
            self.conn,
            values,
            |placeholders| format!("SELECT id, name FROM custom_emoji WHERE {} IN ({})", column, placeholders),
            |row| {
                Ok(CustomEmojiRecord {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
    }
}
