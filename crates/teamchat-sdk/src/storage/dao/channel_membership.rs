//! 频道成员关系 DAO - channel_membership 表

use rusqlite::{params, Connection, Row};

use super::select_in;
use crate::error::Result;
use crate::storage::entities::ChannelMembershipRecord;

const COLUMNS: &str = "id, user_id, channel_id, roles, msg_count, mention_count, last_viewed_at, \
    last_update_at, scheme_admin, notify_props";

pub struct ChannelMembershipDao<'a> {
    conn: &'a Connection,
}

impl<'a> ChannelMembershipDao<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, m: &ChannelMembershipRecord) -> Result<()> {
        let sql = format!(
            "INSERT INTO channel_membership ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            COLUMNS
        );
        self.conn.execute(
            &sql,
            params![
                m.id,
                m.user_id,
                m.channel_id,
                m.roles,
                m.msg_count,
                m.mention_count,
                m.last_viewed_at,
                m.last_update_at,
                m.scheme_admin as i32,
                m.notify_props,
            ],
        )?;
        Ok(())
    }

    pub fn update(&self, m: &ChannelMembershipRecord) -> Result<usize> {
        let sql = r#"
            UPDATE channel_membership SET
                user_id = ?2, channel_id = ?3, roles = ?4, msg_count = ?5, mention_count = ?6,
                last_viewed_at = ?7, last_update_at = ?8, scheme_admin = ?9, notify_props = ?10
            WHERE id = ?1
        "#;
        Ok(self.conn.execute(
            sql,
            params![
                m.id,
                m.user_id,
                m.channel_id,
                m.roles,
                m.msg_count,
                m.mention_count,
                m.last_viewed_at,
                m.last_update_at,
                m.scheme_admin as i32,
                m.notify_props,
            ],
        )?)
    }

    pub fn delete(&self, id: &str) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM channel_membership WHERE id = ?1", params![id])?)
    }

    pub fn get_by_ids(&self, ids: &[String]) -> Result<Vec<ChannelMembershipRecord>> {
        select_in(
            self.conn,
            ids,
            |placeholders| format!("SELECT {} FROM channel_membership WHERE id IN ({})", COLUMNS, placeholders),
            row_to_membership,
        )
    }
}

fn row_to_membership(row: &Row<'_>) -> rusqlite::Result<ChannelMembershipRecord> {
    Ok(ChannelMembershipRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        channel_id: row.get(2)?,
        roles: row.get(3)?,
        msg_count: row.get(4)?,
        mention_count: row.get(5)?,
        last_viewed_at: row.get(6)?,
        last_update_at: row.get(7)?,
        scheme_admin: row.get::<_, i32>(8)? != 0,
        notify_props: row.get(9)?,
    })
}
