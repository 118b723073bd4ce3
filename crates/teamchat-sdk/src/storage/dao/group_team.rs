//! 组-团队关联 DAO - group_team 表

use rusqlite::{params, Connection};

use super::select_in;
use crate::error::Result;
use crate::storage::entities::GroupTeamRecord;

pub struct GroupTeamDao<'a> {
    conn: &'a Connection,
}

impl<'a> GroupTeamDao<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, r: &GroupTeamRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO group_team (id, group_id, team_id) VALUES (?1, ?2, ?3)",
            params![r.id, r.group_id, r.team_id],
        )?;
        Ok(())
    }

    pub fn update(&self, r: &GroupTeamRecord) -> Result<usize> {
        Ok(self.conn.execute(
            "UPDATE group_team SET group_id = ?2, team_id = ?3 WHERE id = ?1",
            params![r.id, r.group_id, r.team_id],
        )?)
    }

    pub fn delete(&self, id: &str) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM group_team WHERE id = ?1", params![id])?)
    }

    pub fn get_by_ids(&self, ids: &[String]) -> Result<Vec<GroupTeamRecord>> {
        select_in(
            self.conn,
            ids,
            |placeholders| format!("SELECT id, group_id, team_id FROM group_team WHERE id IN ({})", placeholders),
            |row| {
                Ok(GroupTeamRecord {
                    id: row.get(0)?,
                    group_id: row.get(1)?,
                    team_id: row.get(2)?,
                })
            },
        )
    }
}
