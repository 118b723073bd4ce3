//! 数据访问层 (DAO) - 每张表一个专门的操作模块
//!
//! 这里封装了所有数据库操作，确保：
//! - 数据操作的一致性和封装性
//! - 批量提交（storage::batch）与查询层共用同一套 SQL
//! - 未来 schema 升级的兼容性

pub mod channel_membership;
pub mod custom_emoji;
pub mod group;
pub mod group_channel;
pub mod group_membership;
pub mod group_team;
pub mod preference;
pub mod reaction;
pub mod user;

pub use channel_membership::ChannelMembershipDao;
pub use custom_emoji::CustomEmojiDao;
pub use group::GroupDao;
pub use group_channel::GroupChannelDao;
pub use group_membership::GroupMembershipDao;
pub use group_team::GroupTeamDao;
pub use preference::PreferenceDao;
pub use reaction::ReactionDao;
pub use user::UserDao;

use rusqlite::{params_from_iter, Connection, Row};

use crate::error::{Result, TeamchatSDKError};
use crate::storage::entities::{Record, Table};

/// 单条 `IN (...)` 语句最多绑定的参数个数（SQLite 变量上限为 32766）
pub(crate) const IN_CHUNK_SIZE: usize = 500;

/// 生成 `?{start}, ?{start+1}, ...` 共 n 个占位符
pub(crate) fn in_placeholders(start: usize, n: usize) -> String {
    (start..start + n)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 按 [`IN_CHUNK_SIZE`] 分片执行 `... IN (...)` 查询，依次拼接各片结果
///
/// `sql_for` 接收本片的占位符列表，返回完整 SQL。跨片不保证 ORDER BY，需要排序的调用方自行排序。
pub(crate) fn select_in<T>(
    conn: &Connection,
    values: &[String],
    sql_for: impl Fn(&str) -> String,
    map_row: impl Fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let mut out = Vec::new();
    for chunk in values.chunks(IN_CHUNK_SIZE) {
        let sql = sql_for(&in_placeholders(1, chunk.len()));
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(chunk.iter()), &map_row)?;
        for row in rows {
            out.push(row?);
        }
    }
    Ok(out)
}

/// DAO 工厂 - 统一创建各种 DAO 实例
pub struct DaoFactory;

impl DaoFactory {
    pub fn group_dao(conn: &Connection) -> GroupDao<'_> {
        GroupDao::new(conn)
    }

    pub fn group_team_dao(conn: &Connection) -> GroupTeamDao<'_> {
        GroupTeamDao::new(conn)
    }

    pub fn group_channel_dao(conn: &Connection) -> GroupChannelDao<'_> {
        GroupChannelDao::new(conn)
    }

    pub fn group_membership_dao(conn: &Connection) -> GroupMembershipDao<'_> {
        GroupMembershipDao::new(conn)
    }

    pub fn user_dao(conn: &Connection) -> UserDao<'_> {
        UserDao::new(conn)
    }

    pub fn preference_dao(conn: &Connection) -> PreferenceDao<'_> {
        PreferenceDao::new(conn)
    }

    pub fn reaction_dao(conn: &Connection) -> ReactionDao<'_> {
        ReactionDao::new(conn)
    }

    pub fn custom_emoji_dao(conn: &Connection) -> CustomEmojiDao<'_> {
        CustomEmojiDao::new(conn)
    }

    pub fn channel_membership_dao(conn: &Connection) -> ChannelMembershipDao<'_> {
        ChannelMembershipDao::new(conn)
    }

    /// 按表分发的主键批量查询（对账时查找已缓存记录）
    pub fn find_by_ids(conn: &Connection, table: Table, ids: &[String]) -> Result<Vec<Record>> {
        let records = match table {
            Table::Group => Self::group_dao(conn).get_by_ids(ids)?.into_iter().map(Record::Group).collect(),
            Table::GroupTeam => Self::group_team_dao(conn)
                .get_by_ids(ids)?
                .into_iter()
                .map(Record::GroupTeam)
                .collect(),
            Table::GroupChannel => Self::group_channel_dao(conn)
                .get_by_ids(ids)?
                .into_iter()
                .map(Record::GroupChannel)
                .collect(),
            Table::GroupMembership => Self::group_membership_dao(conn)
                .get_by_ids(ids)?
                .into_iter()
                .map(Record::GroupMembership)
                .collect(),
            Table::User => Self::user_dao(conn).get_by_ids(ids)?.into_iter().map(Record::User).collect(),
            Table::Preference => Self::preference_dao(conn)
                .get_by_ids(ids)?
                .into_iter()
                .map(Record::Preference)
                .collect(),
            Table::Reaction => Self::reaction_dao(conn)
                .get_by_ids(ids)?
                .into_iter()
                .map(Record::Reaction)
                .collect(),
            Table::CustomEmoji => Self::custom_emoji_dao(conn)
                .get_by_ids(ids)?
                .into_iter()
                .map(Record::CustomEmoji)
                .collect(),
            Table::ChannelMembership => Self::channel_membership_dao(conn)
                .get_by_ids(ids)?
                .into_iter()
                .map(Record::ChannelMembership)
                .collect(),
        };
        Ok(records)
    }
}

/// 事务管理器 - 统一管理跨表操作的事务
pub struct TransactionManager<'a> {
    conn: &'a Connection,
}

impl<'a> TransactionManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// 执行事务操作；闭包返回 Err 时整个事务回滚
    pub fn execute<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Connection) -> Result<R>,
    {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| TeamchatSDKError::Database(format!("开始事务失败: {}", e)))?;

        // tx 在出错返回时被 drop，自动回滚
        let result = f(&tx)?;

        tx.commit()
            .map_err(|e| TeamchatSDKError::Database(format!("提交事务失败: {}", e)))?;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::entities::GroupRecord;
    use crate::storage::migrate::init_db;

    fn seeded(n: usize) -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        init_db(&mut conn).unwrap();
        let dao = DaoFactory::group_dao(&conn);
        for i in 0..n {
            dao.insert(&GroupRecord {
                id: format!("g{:05}", i),
                name: format!("n{:05}", n - i),
                display_name: String::new(),
                source: "custom".to_string(),
                remote_id: String::new(),
            })
            .unwrap();
        }
        conn
    }

    #[test]
    fn lookups_are_split_into_chunks() {
        let n = IN_CHUNK_SIZE * 2 + 17;
        let conn = seeded(n);
        let mut ids: Vec<String> = (0..n).map(|i| format!("g{:05}", i)).collect();
        ids.push("missing".to_string());

        let found = DaoFactory::find_by_ids(&conn, Table::Group, &ids).unwrap();
        assert_eq!(found.len(), n);
        assert!(DaoFactory::find_by_ids(&conn, Table::Group, &[]).unwrap().is_empty());
    }

    #[test]
    fn chunked_name_query_keeps_name_order() {
        let n = IN_CHUNK_SIZE + 3;
        let conn = seeded(n);
        let names: Vec<String> = (1..=n).map(|i| format!("n{:05}", i)).collect();

        let groups = DaoFactory::group_dao(&conn).query_by_names(&names).unwrap();
        let got: Vec<String> = groups.into_iter().map(|g| g.name).collect();
        assert_eq!(got, names);
    }

    #[test]
    fn placeholders_are_numbered_from_start() {
        assert_eq!(in_placeholders(1, 3), "?1, ?2, ?3");
        assert_eq!(in_placeholders(2, 1), "?2");
        assert_eq!(in_placeholders(1, 0), "");
    }
}
