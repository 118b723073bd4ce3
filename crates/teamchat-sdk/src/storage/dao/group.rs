//! 用户组 DAO - group 表

use rusqlite::{params, Connection, Row};

use super::select_in;
use crate::error::Result;
use crate::storage::entities::GroupRecord;

const COLUMNS: &str = r#""group".id, "group".name, "group".display_name, "group".source, "group".remote_id"#;

pub struct GroupDao<'a> {
    conn: &'a Connection,
}

impl<'a> GroupDao<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, g: &GroupRecord) -> Result<()> {
        self.conn.execute(
            r#"INSERT INTO "group" (id, name, display_name, source, remote_id) VALUES (?1, ?2, ?3, ?4, ?5)"#,
            params![g.id, g.name, g.display_name, g.source, g.remote_id],
        )?;
        Ok(())
    }

    /// 按 id 覆盖可变字段，返回受影响行数
    pub fn update(&self, g: &GroupRecord) -> Result<usize> {
        let n = self.conn.execute(
            r#"UPDATE "group" SET name = ?2, display_name = ?3, source = ?4, remote_id = ?5 WHERE id = ?1"#,
            params![g.id, g.name, g.display_name, g.source, g.remote_id],
        )?;
        Ok(n)
    }

    pub fn delete(&self, id: &str) -> Result<usize> {
        Ok(self.conn.execute(r#"DELETE FROM "group" WHERE id = ?1"#, params![id])?)
    }

    pub fn get_by_ids(&self, ids: &[String]) -> Result<Vec<GroupRecord>> {
        select_in(
            self.conn,
            ids,
            |placeholders| format!(r#"SELECT {} FROM "group" WHERE id IN ({})"#, COLUMNS, placeholders),
            row_to_group,
        )
    }

    /// name LIKE pattern（pattern 已转义，转义符为 `\`）
    pub fn query_by_name_like(&self, pattern: &str) -> Result<Vec<GroupRecord>> {
        let sql = format!(r#"SELECT {} FROM "group" WHERE name LIKE ?1 ESCAPE '\' ORDER BY name"#, COLUMNS);
        self.collect(&sql, params![pattern])
    }

    pub fn query_by_names(&self, names: &[String]) -> Result<Vec<GroupRecord>> {
        let mut groups = select_in(
            self.conn,
            names,
            |placeholders| format!(r#"SELECT {} FROM "group" WHERE name IN ({})"#, COLUMNS, placeholders),
            row_to_group,
        )?;
        groups.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(groups)
    }

    /// 通过 group_team 关联表筛选某个团队下的组
    pub fn query_by_name_in_team(&self, pattern: &str, team_id: &str) -> Result<Vec<GroupRecord>> {
        let sql = format!(
            r#"SELECT DISTINCT {} FROM "group"
               JOIN group_team ON group_team.group_id = "group".id
               WHERE group_team.team_id = ?1 AND "group".name LIKE ?2 ESCAPE '\'
               ORDER BY "group".name"#,
            COLUMNS
        );
        self.collect(&sql, params![team_id, pattern])
    }

    /// 通过 group_channel 关联表筛选某个频道下的组
    pub fn query_by_name_in_channel(&self, pattern: &str, channel_id: &str) -> Result<Vec<GroupRecord>> {
        let sql = format!(
            r#"SELECT DISTINCT {} FROM "group"
               JOIN group_channel ON group_channel.group_id = "group".id
               WHERE group_channel.channel_id = ?1 AND "group".name LIKE ?2 ESCAPE '\'
               ORDER BY "group".name"#,
            COLUMNS
        );
        self.collect(&sql, params![channel_id, pattern])
    }

    fn collect<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<GroupRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| row_to_group(row))?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}

fn row_to_group(row: &Row<'_>) -> rusqlite::Result<GroupRecord> {
    Ok(GroupRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        display_name: row.get(2)?,
        source: row.get(3)?,
        remote_id: row.get(4)?,
    })
}
