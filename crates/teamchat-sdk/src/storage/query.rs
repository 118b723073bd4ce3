//! 只读查询描述
//!
//! 查询本身只是一个值；每次 fetch 都会被发送到 DB Actor 重新执行，
//! 因此查询层返回的句柄永远反映执行时刻的数据，而不是快照。

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::dao::DaoFactory;
use crate::storage::entities::{Record, Table};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordQuery {
    /// name 子串匹配（ASCII 大小写不敏感）
    GroupsByName { name: String },
    /// name 精确匹配其中之一
    GroupsByNames { names: Vec<String> },
    /// 与团队关联且 name 子串匹配
    GroupsByNameInTeam { name: String, team_id: String },
    /// 与频道关联且 name 子串匹配
    GroupsByNameInChannel { name: String, channel_id: String },
    /// 某个用户的全部组成员关系
    GroupMembershipsForUser { user_id: String },
    /// 指定帖子上的全部反应
    ReactionsForPosts { post_ids: Vec<String> },
    /// 按名称查找自定义表情
    CustomEmojisByNames { names: Vec<String> },
}

impl RecordQuery {
    /// 结果所在的表
    pub fn table(&self) -> Table {
        match self {
            Self::GroupsByName { .. }
            | Self::GroupsByNames { .. }
            | Self::GroupsByNameInTeam { .. }
            | Self::GroupsByNameInChannel { .. } => Table::Group,
            Self::GroupMembershipsForUser { .. } => Table::GroupMembership,
            Self::ReactionsForPosts { .. } => Table::Reaction,
            Self::CustomEmojisByNames { .. } => Table::CustomEmoji,
        }
    }

    /// 在给定连接上执行（只在 DB Actor 线程中调用）
    pub fn execute(&self, conn: &Connection) -> Result<Vec<Record>> {
        let records = match self {
            Self::GroupsByName { name } => DaoFactory::group_dao(conn)
                .query_by_name_like(&like_contains(name))?
                .into_iter()
                .map(Record::Group)
                .collect(),
            Self::GroupsByNames { names } => DaoFactory::group_dao(conn)
                .query_by_names(names)?
                .into_iter()
                .map(Record::Group)
                .collect(),
            Self::GroupsByNameInTeam { name, team_id } => DaoFactory::group_dao(conn)
                .query_by_name_in_team(&like_contains(name), team_id)?
                .into_iter()
                .map(Record::Group)
                .collect(),
            Self::GroupsByNameInChannel { name, channel_id } => DaoFactory::group_dao(conn)
                .query_by_name_in_channel(&like_contains(name), channel_id)?
                .into_iter()
                .map(Record::Group)
                .collect(),
            Self::GroupMembershipsForUser { user_id } => DaoFactory::group_membership_dao(conn)
                .get_by_user(user_id)?
                .into_iter()
                .map(Record::GroupMembership)
                .collect(),
            Self::ReactionsForPosts { post_ids } => DaoFactory::reaction_dao(conn)
                .get_by_posts(post_ids)?
                .into_iter()
                .map(Record::Reaction)
                .collect(),
            Self::CustomEmojisByNames { names } => DaoFactory::custom_emoji_dao(conn)
                .get_by_names(names)?
                .into_iter()
                .map(Record::CustomEmoji)
                .collect(),
        };
        Ok(records)
    }
}

/// `%{escaped}%`，转义 LIKE 通配符（转义符 `\`）
pub(crate) fn like_contains(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(like_contains("dev"), "%dev%");
        assert_eq!(like_contains("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_contains(""), "%%");
    }

    #[test]
    fn query_reports_result_table() {
        let q = RecordQuery::GroupMembershipsForUser { user_id: "u1".into() };
        assert_eq!(q.table(), Table::GroupMembership);
        assert_eq!(RecordQuery::GroupsByName { name: "a".into() }.table(), Table::Group);
    }
}
