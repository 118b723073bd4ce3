//! 组成员 DAO - group_membership 表

use rusqlite::{params, Connection, Row};

use super::select_in;
use crate::error::Result;
use crate::storage::entities::GroupMembershipRecord;

pub struct GroupMembershipDao<'a> {
    conn: &'a Connection,
}

impl<'a> GroupMembershipDao<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, m: &GroupMembershipRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO group_membership (id, user_id, group_id) VALUES (?1, ?2, ?3)",
            params![m.id, m.user_id, m.group_id],
        )?;
        Ok(())
    }

    pub fn update(&self, m: &GroupMembershipRecord) -> Result<usize> {
        Ok(self.conn.execute(
            "UPDATE group_membership SET user_id = ?2, group_id = ?3 WHERE id = ?1",
            params![m.id, m.user_id, m.group_id],
        )?)
    }

    pub fn delete(&self, id: &str) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM group_membership WHERE id = ?1", params![id])?)
    }

    pub fn get_by_ids(&self, ids: &[String]) -> Result<Vec<GroupMembershipRecord>> {
        select_in(
            self.conn,
            ids,
            |placeholders| format!("SELECT id, user_id, group_id FROM group_membership WHERE id IN ({})", placeholders),
            row_to_membership,
        )
    }

    /// 某个用户的全部组成员关系
    pub fn get_by_user(&self, user_id: &str) -> Result<Vec<GroupMembershipRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, group_id FROM group_membership WHERE user_id = ?1 ORDER BY group_id",
        )?;
        let rows = stmt.query_map(params![user_id], |row| row_to_membership(row))?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

fn row_to_membership(row: &Row<'_>) -> rusqlite::Result<GroupMembershipRecord> {
    Ok(GroupMembershipRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        group_id: row.get(2)?,
    })
}
