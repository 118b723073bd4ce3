//! 表情反应 DAO - reaction 表

use rusqlite::{params, Connection, Row};

use super::select_in;
use crate::error::Result;
use crate::storage::entities::ReactionRecord;

pub struct ReactionDao<'a> {
    conn: &'a Connection,
}

impl<'a> ReactionDao<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, r: &ReactionRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO reaction (id, user_id, post_id, emoji_name, create_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![r.id, r.user_id, r.post_id, r.emoji_name, r.create_at],
        )?;
        Ok(())
    }

    pub fn update(&self, r: &ReactionRecord) -> Result<usize> {
        Ok(self.conn.execute(
            "UPDATE reaction SET user_id = ?2, post_id = ?3, emoji_name = ?4, create_at = ?5 WHERE id = ?1",
            params![r.id, r.user_id, r.post_id, r.emoji_name, r.create_at],
        )?)
    }

    pub fn delete(&self, id: &str) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM reaction WHERE id = ?1", params![id])?)
    }

    pub fn get_by_ids(&self, ids: &[String]) -> Result<Vec<ReactionRecord>> {
        self.select_in("id", ids)
    }

    /// 指定帖子上的全部反应（按创建时间）
    pub fn get_by_posts(&self, post_ids: &[String]) -> Result<Vec<ReactionRecord>> {
        let mut reactions = self.select_in("post_id", post_ids)?;
        reactions.sort_by(|a, b| a.create_at.cmp(&b.create_at).then_with(|| a.id.cmp(&b.id)));
        Ok(reactions)
    }

    fn select_in(&self, column: &str, values: &[String]) -> Result<Vec<ReactionRecord>> {
        select_in(
            self.conn,
            values,
            |placeholders| {
                format!(
                    "SELECT id, user_id, post_id, emoji_name, create_at FROM reaction WHERE {} IN ({})",
                    column, placeholders
                )
            },
            row_to_reaction,
        )
    }
}

fn row_to_reaction(row: &Row<'_>) -> rusqlite::Result<ReactionRecord> {
    Ok(ReactionRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        post_id: row.get(2)?,
        emoji_name: row.get(3)?,
        create_at: row.get(4)?,
    })
}
