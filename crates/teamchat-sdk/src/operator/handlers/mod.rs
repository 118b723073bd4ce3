//! 记录处理器 - 去重 → 查缓存 → 转换 → 收集 →（可选）提交
//!
//! 每个实体实现一次 [`EntityReconciler`]，流程统一由 [`reconcile`] 驱动；
//! `ServerDataOperator` 上的 `handle_*` 方法只负责空输入策略和委托。

mod group;
mod user;

pub use group::{GroupChannelEntity, GroupEntity, GroupMembershipEntity, GroupTeamEntity};
pub use user::{ChannelMembershipEntity, PreferenceEntity, UserEntity};

use std::collections::HashMap;
use tracing::debug;

use crate::error::Result;
use crate::operator::dedup::unique_raws_by;
use crate::operator::transformers::RecordPair;
use crate::operator::{Reconciled, RecordStore};
use crate::storage::batch::{OperationType, PreparedRecord};
use crate::storage::entities::TableRecord;

/// 单个实体的对账规则
pub trait EntityReconciler {
    type Raw: Send + Sync;
    type Record: TableRecord + Sync;

    /// 逻辑键，同时也是缓存记录的 id；`None` 表示无法确定（总是新建）
    fn key_of(raw: &Self::Raw) -> Option<String>;

    fn is_equal(existing: Option<&Self::Record>, raw: &Self::Raw) -> bool;

    fn transform(
        action: OperationType,
        store: &dyn RecordStore,
        pair: RecordPair<'_, Self::Record, Self::Raw>,
    ) -> Result<PreparedRecord>;
}

/// 完整的对账流程
pub async fn reconcile<E: EntityReconciler>(
    store: &dyn RecordStore,
    raws: Vec<E::Raw>,
    prepare_only: bool,
) -> Result<Reconciled> {
    let raws = unique_raws_by(raws, E::key_of);
    let prepared = prepare_records::<E>(store, &raws).await?;
    debug!(
        "{} 对账完成: raws={}, prepared={}, prepare_only={}",
        E::Record::TABLE,
        raws.len(),
        prepared.len(),
        prepare_only
    );
    finish(store, prepared, prepare_only).await
}

/// 按键查缓存，已存在的走 Update（沿用缓存 id），其余走 Create
pub async fn prepare_records<E: EntityReconciler>(
    store: &dyn RecordStore,
    raws: &[E::Raw],
) -> Result<Vec<PreparedRecord>> {
    if raws.is_empty() {
        return Ok(Vec::new());
    }

    let keys: Vec<String> = raws.iter().filter_map(E::key_of).collect();
    let cached: HashMap<String, E::Record> = store
        .lookup(E::Record::TABLE, keys)
        .await?
        .into_iter()
        .filter_map(|record| {
            let id = record.id().to_string();
            E::Record::from_record(record).map(|r| (id, r))
        })
        .collect();

    raws.iter()
        .map(|raw| {
            let existing = E::key_of(raw).and_then(|key| cached.get(&key));
            match existing {
                Some(record) => {
                    let mut prepared =
                        E::transform(OperationType::Update, store, RecordPair::new(Some(record), raw))?;
                    prepared.unchanged = E::is_equal(Some(record), raw);
                    Ok(prepared)
                }
                None => E::transform(OperationType::Create, store, RecordPair::create(raw)),
            }
        })
        .collect()
}

/// prepare_only 时原样返回；否则整批提交
pub(crate) async fn finish(
    store: &dyn RecordStore,
    prepared: Vec<PreparedRecord>,
    prepare_only: bool,
) -> Result<Reconciled> {
    if prepare_only {
        return Ok(Reconciled::Prepared(prepared));
    }
    if prepared.is_empty() {
        return Ok(Reconciled::Committed(false));
    }
    store.commit_batch(prepared).await?;
    Ok(Reconciled::Committed(true))
}
