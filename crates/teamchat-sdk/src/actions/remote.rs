//! 远端动作 - 拉取组数据并对账到本地
//!
//! 任何失败都先交给 `SessionHook`（认证失效时由宿主登出），再作为错误返回。
//! `fetch_only` 为 true 时只准备不提交。

use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::actions::local::{group_records, store_group_memberships_for_member, store_groups};
use crate::context::ServerContext;
use crate::error::Result;
use crate::operator::raw::RawGroup;
use crate::storage::batch::PreparedRecord;
use crate::storage::entities::GroupRecord;

async fn report<T>(ctx: &ServerContext, action: &str, result: Result<T>) -> Result<T> {
    if let Err(error) = &result {
        warn!("⚠️ {} 失败: server={}, error={}", action, ctx.server_url(), error);
        ctx.session()
            .force_logout_if_necessary(ctx.server_url(), error)
            .await;
    }
    result
}

/// @ 自动补全用的组搜索
pub async fn fetch_groups_for_autocomplete(
    ctx: &ServerContext,
    query: &str,
    fetch_only: bool,
) -> Result<Vec<PreparedRecord>> {
    let result = async {
        let groups = ctx.client().get_groups(query).await?;
        store_groups(ctx, groups, fetch_only).await
    }
    .await;
    report(ctx, "fetch_groups_for_autocomplete", result).await
}

/// 并发按多个名称搜索，结果合并后一次对账
pub async fn fetch_groups_by_names(
    ctx: &ServerContext,
    names: &[String],
    fetch_only: bool,
) -> Result<Vec<PreparedRecord>> {
    let result = async {
        let pages = try_join_all(names.iter().map(|name| ctx.client().get_groups(name))).await?;
        let groups: Vec<RawGroup> = pages.into_iter().flatten().collect();
        debug!("按名称拉取组: names={}, groups={}", names.len(), groups.len());
        store_groups(ctx, groups, fetch_only).await
    }
    .await;
    report(ctx, "fetch_groups_by_names", result).await
}

pub async fn fetch_groups_for_channel(
    ctx: &ServerContext,
    channel_id: &str,
    fetch_only: bool,
) -> Result<Vec<PreparedRecord>> {
    let result = async {
        let response = ctx.client().get_all_groups_associated_to_channel(channel_id).await?;
        store_groups(ctx, response.groups, fetch_only).await
    }
    .await;
    report(ctx, "fetch_groups_for_channel", result).await
}

pub async fn fetch_groups_for_team(
    ctx: &ServerContext,
    team_id: &str,
    fetch_only: bool,
) -> Result<Vec<PreparedRecord>> {
    let result = async {
        let response = ctx.client().get_all_groups_associated_to_team(team_id).await?;
        store_groups(ctx, response.groups, fetch_only).await
    }
    .await;
    report(ctx, "fetch_groups_for_team", result).await
}

/// 拉取用户所属的组，并替换其本地组成员关系
pub async fn fetch_groups_for_member(
    ctx: &ServerContext,
    user_id: &str,
    fetch_only: bool,
) -> Result<Vec<PreparedRecord>> {
    let result = async {
        let groups = ctx.client().get_all_groups_associated_to_membership(user_id).await?;
        store_group_memberships_for_member(ctx, groups, user_id, fetch_only).await
    }
    .await;
    report(ctx, "fetch_groups_for_member", result).await
}

fn filter_by_name(prepared: &[PreparedRecord], search_term: &str) -> Vec<GroupRecord> {
    let term = search_term.to_lowercase();
    group_records(prepared)
        .into_iter()
        .filter(|g| g.name.to_lowercase().contains(&term))
        .collect()
}

/// 拉取并保存团队关联组，返回名称包含 `search_term` 的组（大小写不敏感）
pub async fn fetch_filtered_team_groups(
    ctx: &ServerContext,
    search_term: &str,
    team_id: &str,
) -> Result<Vec<GroupRecord>> {
    let prepared = fetch_groups_for_team(ctx, team_id, false).await?;
    Ok(filter_by_name(&prepared, search_term))
}

/// 拉取并保存频道关联组，返回名称包含 `search_term` 的组（大小写不敏感）
pub async fn fetch_filtered_channel_groups(
    ctx: &ServerContext,
    search_term: &str,
    channel_id: &str,
) -> Result<Vec<GroupRecord>> {
    let prepared = fetch_groups_for_channel(ctx, channel_id, false).await?;
    Ok(filter_by_name(&prepared, search_term))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TeamchatSDKError;
    use crate::network::test_support::FakeGroupsApi;
    use crate::operator::test_support::{open_operator, TEST_SERVER};
    use crate::queries::group::{query_group_memberships_for_user, query_groups_by_names};
    use crate::session::test_support::RecordingSessionHook;
    use crate::storage::DatabaseManager;
    use std::collections::HashMap;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn raw_group(id: &str, name: &str) -> RawGroup {
        RawGroup {
            id: Some(id.to_string()),
            name: name.to_string(),
            display_name: name.to_string(),
            source: "custom".to_string(),
            remote_id: String::new(),
        }
    }

    struct Harness {
        _dir: TempDir,
        _manager: DatabaseManager,
        ctx: ServerContext,
        api: Arc<FakeGroupsApi>,
        session: Arc<RecordingSessionHook>,
    }

    async fn harness(api: FakeGroupsApi) -> Harness {
        let (dir, manager, operator) = open_operator().await;
        let api = Arc::new(api);
        let session = Arc::new(RecordingSessionHook::default());
        let ctx = ServerContext::new(
            TEST_SERVER,
            operator.shared_store(),
            api.clone(),
            session.clone(),
        );
        Harness {
            _dir: dir,
            _manager: manager,
            ctx,
            api,
            session,
        }
    }

    fn failing(status: u16) -> FakeGroupsApi {
        FakeGroupsApi {
            fail_status: Some(status),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn autocomplete_stores_results() {
        let h = harness(FakeGroupsApi {
            groups: vec![raw_group("g1", "developers"), raw_group("g2", "qa")],
            ..Default::default()
        })
        .await;

        let prepared = fetch_groups_for_autocomplete(&h.ctx, "dev", false).await.unwrap();
        assert_eq!(prepared.len(), 1);
        let stored = query_groups_by_names(h.ctx.operator().shared_store(), &["developers".to_string()])
            .fetch_count()
            .await
            .unwrap();
        assert_eq!(stored, 1);
        assert!(h.session.calls().is_empty());
    }

    #[tokio::test]
    async fn fetch_only_leaves_cache_untouched() {
        let h = harness(FakeGroupsApi {
            groups: vec![raw_group("g1", "developers")],
            ..Default::default()
        })
        .await;

        let prepared = fetch_groups_for_autocomplete(&h.ctx, "dev", true).await.unwrap();
        assert_eq!(prepared.len(), 1);
        let stored = query_groups_by_names(h.ctx.operator().shared_store(), &["developers".to_string()])
            .fetch_count()
            .await
            .unwrap();
        assert_eq!(stored, 0);
    }

    #[tokio::test]
    async fn names_are_fetched_concurrently_and_merged() {
        let h = harness(FakeGroupsApi {
            groups: vec![raw_group("g1", "alpha"), raw_group("g2", "beta"), raw_group("g3", "gamma")],
            ..Default::default()
        })
        .await;

        let names = vec!["alpha".to_string(), "beta".to_string(), "a".to_string()];
        let prepared = fetch_groups_by_names(&h.ctx, &names, false).await.unwrap();
        // "a" 命中 alpha / beta / gamma；重复的 id 在处理器里合并
        assert_eq!(prepared.len(), 3);
        assert_eq!(h.api.requests.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn auth_failure_is_reported_to_session_hook() {
        let h = harness(failing(401)).await;

        let err = fetch_groups_for_channel(&h.ctx, "c1", false).await.unwrap_err();
        assert!(err.is_auth_error());
        assert_eq!(h.session.calls(), vec![(TEST_SERVER.to_string(), Some(401))]);
    }

    #[tokio::test]
    async fn every_remote_action_consults_session_hook() {
        let h = harness(failing(500)).await;

        assert!(fetch_groups_for_autocomplete(&h.ctx, "x", false).await.is_err());
        assert!(fetch_groups_by_names(&h.ctx, &["x".to_string()], false).await.is_err());
        assert!(fetch_groups_for_channel(&h.ctx, "c1", false).await.is_err());
        assert!(fetch_groups_for_team(&h.ctx, "t1", false).await.is_err());
        assert!(fetch_groups_for_member(&h.ctx, "u1", false).await.is_err());
        assert_eq!(h.session.calls().len(), 5);
    }

    #[tokio::test]
    async fn filtered_team_groups_match_case_insensitively() {
        let mut team_groups = HashMap::new();
        team_groups.insert(
            "t1".to_string(),
            vec![raw_group("g1", "Backend"), raw_group("g2", "frontend"), raw_group("g3", "design")],
        );
        let h = harness(FakeGroupsApi {
            team_groups,
            ..Default::default()
        })
        .await;

        let mut names: Vec<String> = fetch_filtered_team_groups(&h.ctx, "END", "t1")
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["Backend", "frontend"]);
    }

    #[tokio::test]
    async fn filtered_channel_groups_propagate_errors_once() {
        let h = harness(failing(403)).await;

        let err = fetch_filtered_channel_groups(&h.ctx, "dev", "c1").await.unwrap_err();
        assert!(matches!(err, TeamchatSDKError::Network { status: Some(403), .. }));
        assert_eq!(h.session.calls().len(), 1);
    }

    #[tokio::test]
    async fn member_groups_are_synced() {
        let mut member_groups = HashMap::new();
        member_groups.insert("u1".to_string(), vec![raw_group("g1", "a"), raw_group("g2", "b")]);
        let h = harness(FakeGroupsApi {
            member_groups,
            ..Default::default()
        })
        .await;

        fetch_groups_for_member(&h.ctx, "u1", false).await.unwrap();
        let count = query_group_memberships_for_user(h.ctx.operator().shared_store(), "u1")
            .fetch_count()
            .await
            .unwrap();
        assert_eq!(count, 2);
    }
}
