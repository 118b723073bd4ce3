//! 批量持久化 - 预备变更的唯一写入边界
//!
//! 一个批次可以跨多张表混合 create / update / delete，整体在一个 SQLite 事务中提交：
//! 任意一条变更非法（违反 id 以外的唯一约束等）则整个批次回滚，读者看不到部分结果。

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, TeamchatSDKError};
use crate::storage::dao::{DaoFactory, TransactionManager};
use crate::storage::entities::{Record, Table};

/// 变更类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationType {
    Create,
    Update,
    Delete,
}

/// 预备变更：尚未提交到存储的 create / update / delete 指令
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedRecord {
    pub action: OperationType,
    pub record: Record,
    /// 比较器判定与缓存一致（update 为空操作）
    pub unchanged: bool,
}

impl PreparedRecord {
    pub fn create(record: Record) -> Self {
        Self {
            action: OperationType::Create,
            record,
            unchanged: false,
        }
    }

    pub fn update(record: Record, unchanged: bool) -> Self {
        Self {
            action: OperationType::Update,
            record,
            unchanged,
        }
    }

    /// 永久删除（destroyPermanently 语义，不做软删除）
    pub fn destroy(record: Record) -> Self {
        Self {
            action: OperationType::Delete,
            record,
            unchanged: false,
        }
    }

    pub fn table(&self) -> Table {
        self.record.table()
    }

    pub fn id(&self) -> &str {
        self.record.id()
    }
}

/// 在一个事务中提交整个批次
pub fn commit_batch(conn: &Connection, batch: &[PreparedRecord]) -> Result<()> {
    if batch.is_empty() {
        return Ok(());
    }

    let tm = TransactionManager::new(conn);
    tm.execute(|tx| {
        for (index, prepared) in batch.iter().enumerate() {
            apply_one(tx, prepared).map_err(|e| {
                warn!(
                    "批量提交失败，整体回滚: index={}, table={}, id={}, action={:?}, error={}",
                    index,
                    prepared.table(),
                    prepared.id(),
                    prepared.action,
                    e
                );
                TeamchatSDKError::Persistence(format!(
                    "{:?} {}:{} 失败: {}",
                    prepared.action,
                    prepared.table(),
                    prepared.id(),
                    e
                ))
            })?;
        }
        Ok(())
    })
    .map_err(|e| match e {
        TeamchatSDKError::Persistence(_) => e,
        other => TeamchatSDKError::Persistence(other.to_string()),
    })?;

    debug!("批量提交完成: {} 条变更", batch.len());
    Ok(())
}

/// 提交时以库内实际状态为准：
/// - Create / Update 都是按 id 的 upsert（目标行存在则覆盖，不存在则插入）
/// - Delete 目标已不存在时视为成功
///
/// 并发的对账调用各自在查缓存之后才提交，同一个键上最后提交的批次生效。
fn apply_one(conn: &Connection, prepared: &PreparedRecord) -> Result<()> {
    match prepared.action {
        OperationType::Create | OperationType::Update => {
            if update(conn, &prepared.record)? == 0 {
                if prepared.action == OperationType::Update {
                    debug!("更新目标已被删除，重新插入: {}:{}", prepared.table(), prepared.id());
                }
                insert(conn, &prepared.record)?;
            }
            Ok(())
        }
        OperationType::Delete => {
            if delete(conn, prepared.table(), prepared.id())? == 0 {
                debug!("删除目标已不存在: {}:{}", prepared.table(), prepared.id());
            }
            Ok(())
        }
    }
}

fn insert(conn: &Connection, record: &Record) -> Result<()> {
    match record {
        Record::Group(r) => DaoFactory::group_dao(conn).insert(r),
        Record::GroupTeam(r) => DaoFactory::group_team_dao(conn).insert(r),
        Record::GroupChannel(r) => DaoFactory::group_channel_dao(conn).insert(r),
        Record::GroupMembership(r) => DaoFactory::group_membership_dao(conn).insert(r),
        Record::User(r) => DaoFactory::user_dao(conn).insert(r),
        Record::Preference(r) => DaoFactory::preference_dao(conn).insert(r),
        Record::Reaction(r) => DaoFactory::reaction_dao(conn).insert(r),
        Record::CustomEmoji(r) => DaoFactory::custom_emoji_dao(conn).insert(r),
        Record::ChannelMembership(r) => DaoFactory::channel_membership_dao(conn).insert(r),
    }
}

fn update(conn: &Connection, record: &Record) -> Result<usize> {
    match record {
        Record::Group(r) => DaoFactory::group_dao(conn).update(r),
        Record::GroupTeam(r) => DaoFactory::group_team_dao(conn).update(r),
        Record::GroupChannel(r) => DaoFactory::group_channel_dao(conn).update(r),
        Record::GroupMembership(r) => DaoFactory::group_membership_dao(conn).update(r),
        Record::User(r) => DaoFactory::user_dao(conn).update(r),
        Record::Preference(r) => DaoFactory::preference_dao(conn).update(r),
        Record::Reaction(r) => DaoFactory::reaction_dao(conn).update(r),
        Record::CustomEmoji(r) => DaoFactory::custom_emoji_dao(conn).update(r),
        Record::ChannelMembership(r) => DaoFactory::channel_membership_dao(conn).update(r),
    }
}

fn delete(conn: &Connection, table: Table, id: &str) -> Result<usize> {
    match table {
        Table::Group => DaoFactory::group_dao(conn).delete(id),
        Table::GroupTeam => DaoFactory::group_team_dao(conn).delete(id),
        Table::GroupChannel => DaoFactory::group_channel_dao(conn).delete(id),
        Table::GroupMembership => DaoFactory::group_membership_dao(conn).delete(id),
        Table::User => DaoFactory::user_dao(conn).delete(id),
        Table::Preference => DaoFactory::preference_dao(conn).delete(id),
        Table::Reaction => DaoFactory::reaction_dao(conn).delete(id),
        Table::CustomEmoji => DaoFactory::custom_emoji_dao(conn).delete(id),
        Table::ChannelMembership => DaoFactory::channel_membership_dao(conn).delete(id),
    }
}
