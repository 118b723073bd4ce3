//! 组相关的只读查询与准备函数

use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::Result;
use crate::operator::raw::{RawGroup, RawGroupMembership};
use crate::operator::{RecordStore, ServerDataOperator};
use crate::storage::batch::PreparedRecord;
use crate::storage::entities::{GroupMembershipRecord, GroupRecord, Record, TableRecord};
use crate::storage::query::RecordQuery;

/// 惰性查询：只保存查询描述，每次 fetch 都重新执行
pub struct QueryHandle<T> {
    store: Arc<dyn RecordStore>,
    query: RecordQuery,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for QueryHandle<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            query: self.query.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for QueryHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryHandle").field("query", &self.query).finish()
    }
}

impl<T: TableRecord> QueryHandle<T> {
    fn new(store: Arc<dyn RecordStore>, query: RecordQuery) -> Self {
        Self {
            store,
            query,
            _marker: PhantomData,
        }
    }

    pub fn query(&self) -> &RecordQuery {
        &self.query
    }

    pub async fn fetch(&self) -> Result<Vec<T>> {
        let records = self.store.query(self.query.clone()).await?;
        Ok(records.into_iter().filter_map(T::from_record).collect())
    }

    pub async fn fetch_count(&self) -> Result<usize> {
        Ok(self.fetch().await?.len())
    }
}

/// name 包含 `name`（LIKE 通配符已转义）
pub fn query_groups_by_name(store: Arc<dyn RecordStore>, name: &str) -> QueryHandle<GroupRecord> {
    QueryHandle::new(store, RecordQuery::GroupsByName { name: name.to_string() })
}

pub fn query_groups_by_names(store: Arc<dyn RecordStore>, names: &[String]) -> QueryHandle<GroupRecord> {
    QueryHandle::new(store, RecordQuery::GroupsByNames { names: names.to_vec() })
}

/// 与团队关联、name 包含 `name` 的组
pub fn query_groups_by_name_in_team(
    store: Arc<dyn RecordStore>,
    name: &str,
    team_id: &str,
) -> QueryHandle<GroupRecord> {
    QueryHandle::new(
        store,
        RecordQuery::GroupsByNameInTeam {
            name: name.to_string(),
            team_id: team_id.to_string(),
        },
    )
}

/// 与频道关联、name 包含 `name` 的组
pub fn query_groups_by_name_in_channel(
    store: Arc<dyn RecordStore>,
    name: &str,
    channel_id: &str,
) -> QueryHandle<GroupRecord> {
    QueryHandle::new(
        store,
        RecordQuery::GroupsByNameInChannel {
            name: name.to_string(),
            channel_id: channel_id.to_string(),
        },
    )
}

pub fn query_group_memberships_for_user(
    store: Arc<dyn RecordStore>,
    user_id: &str,
) -> QueryHandle<GroupMembershipRecord> {
    QueryHandle::new(
        store,
        RecordQuery::GroupMembershipsForUser {
            user_id: user_id.to_string(),
        },
    )
}

/// 只准备不提交
pub async fn prepare_groups(operator: &ServerDataOperator, groups: Vec<RawGroup>) -> Result<Vec<PreparedRecord>> {
    Ok(operator.handle_groups(groups, true).await?.into_prepared())
}

/// 某用户组成员关系的预备变更
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PreparedMemberships {
    /// 缓存中有、但新组列表里没有的成员关系（永久删除）
    pub stale: Vec<PreparedRecord>,
    /// 新组列表对应的成员关系（新建或更新）
    pub memberships: Vec<PreparedRecord>,
}

impl PreparedMemberships {
    pub fn into_batch(self) -> Vec<PreparedRecord> {
        let mut batch = self.stale;
        batch.extend(self.memberships);
        batch
    }
}

/// 按新的组 id 列表准备某用户的组成员关系
///
/// 新列表里仍然存在的成员关系走处理器（已缓存即更新），不会先删后建。
pub async fn prepare_group_memberships_for_user(
    operator: &ServerDataOperator,
    group_ids: &[String],
    user_id: &str,
) -> Result<PreparedMemberships> {
    let existing = query_group_memberships_for_user(operator.shared_store(), user_id)
        .fetch()
        .await?;

    let raws: Vec<RawGroupMembership> = group_ids
        .iter()
        .filter(|id| !id.is_empty())
        .map(|group_id| RawGroupMembership {
            user_id: user_id.to_string(),
            group_id: group_id.clone(),
        })
        .collect();
    let keep: HashSet<&str> = raws.iter().map(|m| m.group_id.as_str()).collect();

    let stale = existing
        .into_iter()
        .filter(|m| !keep.contains(m.group_id.as_str()))
        .map(|m| PreparedRecord::destroy(Record::GroupMembership(m)))
        .collect();

    let memberships = if raws.is_empty() {
        Vec::new()
    } else {
        operator.handle_group_memberships(raws, true).await?.into_prepared()
    };

    Ok(PreparedMemberships { stale, memberships })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::raw::{RawGroupChannel, RawGroupTeam};
    use crate::operator::test_support::open_operator;
    use crate::storage::batch::OperationType;

    fn raw_group(id: &str, name: &str) -> RawGroup {
        RawGroup {
            id: Some(id.to_string()),
            name: name.to_string(),
            display_name: name.to_string(),
            source: "custom".to_string(),
            remote_id: String::new(),
        }
    }

    async fn seed(operator: &ServerDataOperator) {
        operator
            .handle_groups(
                vec![
                    raw_group("g1", "developers"),
                    raw_group("g2", "DevOps"),
                    raw_group("g3", "qa_team"),
                    raw_group("g4", "qa-team"),
                ],
                false,
            )
            .await
            .unwrap();
        operator
            .handle_group_teams(
                vec![RawGroupTeam {
                    group_id: "g1".to_string(),
                    team_id: "t1".to_string(),
                }],
                false,
            )
            .await
            .unwrap();
        operator
            .handle_group_channels(
                vec![RawGroupChannel {
                    group_id: "g2".to_string(),
                    channel_id: "c1".to_string(),
                }],
                false,
            )
            .await
            .unwrap();
    }

    fn names(groups: Vec<GroupRecord>) -> Vec<String> {
        let mut names: Vec<String> = groups.into_iter().map(|g| g.name).collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn name_search_is_substring_and_case_insensitive() {
        let (_dir, _manager, operator) = open_operator().await;
        seed(&operator).await;

        let handle = query_groups_by_name(operator.shared_store(), "DEV");
        assert_eq!(names(handle.fetch().await.unwrap()), vec!["DevOps", "developers"]);
    }

    #[tokio::test]
    async fn like_wildcards_match_literally() {
        let (_dir, _manager, operator) = open_operator().await;
        seed(&operator).await;

        let handle = query_groups_by_name(operator.shared_store(), "qa_");
        assert_eq!(names(handle.fetch().await.unwrap()), vec!["qa_team"]);
    }

    #[tokio::test]
    async fn handles_rerun_on_every_fetch() {
        let (_dir, _manager, operator) = open_operator().await;
        let handle = query_groups_by_names(operator.shared_store(), &["late".to_string()]);
        assert_eq!(handle.fetch_count().await.unwrap(), 0);

        operator.handle_groups(vec![raw_group("g9", "late")], false).await.unwrap();
        assert_eq!(handle.fetch_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn team_and_channel_scoped_queries_join() {
        let (_dir, _manager, operator) = open_operator().await;
        seed(&operator).await;

        let in_team = query_groups_by_name_in_team(operator.shared_store(), "dev", "t1");
        assert_eq!(names(in_team.fetch().await.unwrap()), vec!["developers"]);

        let in_channel = query_groups_by_name_in_channel(operator.shared_store(), "dev", "c1");
        assert_eq!(names(in_channel.fetch().await.unwrap()), vec!["DevOps"]);

        let elsewhere = query_groups_by_name_in_team(operator.shared_store(), "dev", "t2");
        assert_eq!(elsewhere.fetch_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn prepare_groups_does_not_commit() {
        let (_dir, _manager, operator) = open_operator().await;
        let prepared = prepare_groups(&operator, vec![raw_group("g1", "dev")]).await.unwrap();
        assert_eq!(prepared.len(), 1);
        assert_eq!(
            query_groups_by_name(operator.shared_store(), "dev").fetch_count().await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn stale_memberships_are_destroyed() {
        let (_dir, _manager, operator) = open_operator().await;
        let first = prepare_group_memberships_for_user(&operator, &["g1".to_string(), "g2".to_string()], "u1")
            .await
            .unwrap();
        assert!(first.stale.is_empty());
        operator.batch_records(first.into_batch()).await.unwrap();

        let second = prepare_group_memberships_for_user(&operator, &["g2".to_string(), "g3".to_string()], "u1")
            .await
            .unwrap();
        assert_eq!(second.stale.len(), 1);
        assert_eq!(second.stale[0].id(), "u1_g1");
        assert_eq!(second.stale[0].action, OperationType::Delete);
        let actions: Vec<(&str, OperationType)> =
            second.memberships.iter().map(|p| (p.id(), p.action)).collect();
        assert_eq!(
            actions,
            vec![("u1_g2", OperationType::Update), ("u1_g3", OperationType::Create)]
        );
        operator.batch_records(second.into_batch()).await.unwrap();

        let remaining = query_group_memberships_for_user(operator.shared_store(), "u1")
            .fetch()
            .await
            .unwrap();
        let mut groups: Vec<String> = remaining.into_iter().map(|m| m.group_id).collect();
        groups.sort();
        assert_eq!(groups, vec!["g2", "g3"]);
    }
}
