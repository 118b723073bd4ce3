//! 组-频道关联 DAO - group_channel 表

use rusqlite::{params, Connection};

use super::select_in;
use crate::error::Result;
use crate::storage::entities::GroupChannelRecord;

pub struct GroupChannelDao<'a> {
    conn: &'a Connection,
}

impl<'a> GroupChannelDao<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, r: &GroupChannelRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO group_channel (id, group_id, channel_id) VALUES (?1, ?2, ?3)",
            params![r.id, r.group_id, r.channel_id],
        )?;
        Ok(())
    }

    pub fn update(&self, r: &GroupChannelRecord) -> Result<usize> {
        Ok(self.conn.execute(
            "UPDATE group_channel SET group_id = ?2, channel_id = ?3 WHERE id = ?1",
            params![r.id, r.group_id, r.channel_id],
        )?)
    }

    pub fn delete(&self, id: &str) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM group_channel WHERE id = ?1", params![id])?)
    }

    pub fn get_by_ids(&self, ids: &[String]) -> Result<Vec<GroupChannelRecord>> {
        select_in(
            self.conn,
            ids,
            |placeholders| format!("SELECT id, group_id, channel_id FROM group_channel WHERE id IN ({})", placeholders),
            |row| {
                Ok(GroupChannelRecord {
                    id: row.get(0)?,
                    group_id: row.get(1)?,
                    channel_id: row.get(2)?,
                })
            },
        )
    }
}
