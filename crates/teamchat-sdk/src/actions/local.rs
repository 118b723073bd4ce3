//! 本地动作 - 把已拿到的服务器数据写入本地缓存

use tracing::debug;

use crate::context::ServerContext;
use crate::error::Result;
use crate::operator::raw::RawGroup;
use crate::queries::group::{prepare_group_memberships_for_user, prepare_groups};
use crate::storage::batch::PreparedRecord;
use crate::storage::entities::{GroupRecord, Record};

/// 对账一组 group；`prepare_records_only` 为 false 时整体提交
///
/// 返回预备变更（提交后也原样返回）。
pub async fn store_groups(
    ctx: &ServerContext,
    groups: Vec<RawGroup>,
    prepare_records_only: bool,
) -> Result<Vec<PreparedRecord>> {
    let prepared = prepare_groups(ctx.operator(), groups).await?;
    if !prepare_records_only && !prepared.is_empty() {
        ctx.operator().batch_records(prepared.clone()).await?;
    }
    Ok(prepared)
}

/// 用服务器返回的组列表替换某成员的组成员关系
///
/// 同一批次内：组本身 create/update，新成员关系 create/update，过期成员关系删除。
pub async fn store_group_memberships_for_member(
    ctx: &ServerContext,
    groups: Vec<RawGroup>,
    user_id: &str,
    prepare_records_only: bool,
) -> Result<Vec<PreparedRecord>> {
    let group_ids: Vec<String> = groups.iter().filter_map(|g| g.id.clone()).collect();

    let mut batch = if groups.is_empty() {
        Vec::new()
    } else {
        prepare_groups(ctx.operator(), groups).await?
    };
    let memberships = prepare_group_memberships_for_user(ctx.operator(), &group_ids, user_id).await?;
    debug!(
        "成员组对账: user={}, groups={}, stale={}, memberships={}",
        user_id,
        batch.len(),
        memberships.stale.len(),
        memberships.memberships.len()
    );
    batch.extend(memberships.into_batch());

    if !prepare_records_only && !batch.is_empty() {
        ctx.operator().batch_records(batch.clone()).await?;
    }
    Ok(batch)
}

/// 预备变更中的 group 记录
pub fn group_records(prepared: &[PreparedRecord]) -> Vec<GroupRecord> {
    prepared
        .iter()
        .filter_map(|p| match &p.record {
            Record::Group(group) => Some(group.clone()),
            _ => None,
        })
        .collect()
}
