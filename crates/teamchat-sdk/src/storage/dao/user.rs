//! 用户 DAO - user 表

use rusqlite::{params, Connection, Row};

use super::select_in;
use crate::error::Result;
use crate::storage::entities::UserRecord;

const COLUMNS: &str = "id, username, first_name, last_name, nickname, email, position, locale, roles, \
    is_bot, delete_at, update_at, last_picture_update, auth_service, timezone, notify_props, props";

pub struct UserDao<'a> {
    conn: &'a Connection,
}

impl<'a> UserDao<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, u: &UserRecord) -> Result<()> {
        let sql = format!(
            r#"INSERT INTO "user" ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)"#,
            COLUMNS
        );
        self.conn.execute(
            &sql,
            params![
                u.id,
                u.username,
                u.first_name,
                u.last_name,
                u.nickname,
                u.email,
                u.position,
                u.locale,
                u.roles,
                u.is_bot as i32,
                u.delete_at,
                u.update_at,
                u.last_picture_update,
                u.auth_service,
                u.timezone,
                u.notify_props,
                u.props,
            ],
        )?;
        Ok(())
    }

    pub fn update(&self, u: &UserRecord) -> Result<usize> {
        let sql = r#"
            UPDATE "user" SET
                username = ?2, first_name = ?3, last_name = ?4, nickname = ?5, email = ?6,
                position = ?7, locale = ?8, roles = ?9, is_bot = ?10, delete_at = ?11,
                update_at = ?12, last_picture_update = ?13, auth_service = ?14,
                timezone = ?15, notify_props = ?16, props = ?17
            WHERE id = ?1
        "#;
        let n = self.conn.execute(
            sql,
            params![
                u.id,
                u.username,
                u.first_name,
                u.last_name,
                u.nickname,
                u.email,
                u.position,
                u.locale,
                u.roles,
                u.is_bot as i32,
                u.delete_at,
                u.update_at,
                u.last_picture_update,
                u.auth_service,
                u.timezone,
                u.notify_props,
                u.props,
            ],
        )?;
        Ok(n)
    }

    pub fn delete(&self, id: &str) -> Result<usize> {
        Ok(self.conn.execute(r#"DELETE FROM "user" WHERE id = ?1"#, params![id])?)
    }

    pub fn get_by_ids(&self, ids: &[String]) -> Result<Vec<UserRecord>> {
        select_in(
            self.conn,
            ids,
            |placeholders| format!(r#"SELECT {} FROM "user" WHERE id IN ({})"#, COLUMNS, placeholders),
            row_to_user,
        )
    }
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        username: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        nickname: row.get(4)?,
        email: row.get(5)?,
        position: row.get(6)?,
        locale: row.get(7)?,
        roles: row.get(8)?,
        is_bot: row.get::<_, i32>(9)? != 0,
        delete_at: row.get(10)?,
        update_at: row.get(11)?,
        last_picture_update: row.get(12)?,
        auth_service: row.get(13)?,
        timezone: row.get(14)?,
        notify_props: row.get(15)?,
        props: row.get(16)?,
    })
}
