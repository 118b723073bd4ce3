//! 转换器 - (action, 缓存记录, 原始数据) → 预备变更
//!
//! 纯函数，不做 I/O；只通过 [`RecordStore::generate_id`] 申请新 id。
//! - Create：id 取自原始数据，缺失时生成；字段全部来自原始数据
//! - Update：id 沿用缓存记录；可变字段以原始数据覆盖
//! - 组合键实体：id 永远是外键拼接

mod group;
mod user;

pub use group::{transform_group, transform_group_channel, transform_group_membership, transform_group_team};
pub use user::{
    preference_id, reaction_id, transform_channel_membership, transform_custom_emoji,
    transform_preference, transform_reaction, transform_user,
};

use crate::error::{Result, TeamchatSDKError};
use crate::operator::RecordStore;
use crate::storage::batch::{OperationType, PreparedRecord};
use crate::storage::entities::Record;

/// 一条原始数据及其对应的缓存记录（如有）
#[derive(Debug)]
pub struct RecordPair<'a, R, Raw> {
    pub record: Option<&'a R>,
    pub raw: &'a Raw,
}

impl<'a, R, Raw> RecordPair<'a, R, Raw> {
    pub fn new(record: Option<&'a R>, raw: &'a Raw) -> Self {
        Self { record, raw }
    }

    pub fn create(raw: &'a Raw) -> Self {
        Self { record: None, raw }
    }
}

impl<R, Raw> Clone for RecordPair<'_, R, Raw> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, Raw> Copy for RecordPair<'_, R, Raw> {}

/// 组合键：`{a}_{b}`
pub fn composite_id(a: &str, b: &str) -> String {
    join_key('_', &[a, b])
}

/// 用 `sep` 拼接各段，段内的 `%` 与 `sep` 按百分号转义
///
/// 不同的分段永远得到不同的 id（`("a-b", "c")` 与 `("a", "b-c")` 不会碰撞）；
/// 不含这两个字符的段原样保留。
pub(crate) fn join_key(sep: char, parts: &[&str]) -> String {
    let escaped_sep = format!("%{:02X}", sep as u32);
    let mut key = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            key.push(sep);
        }
        for ch in part.chars() {
            match ch {
                '%' => key.push_str("%25"),
                c if c == sep => key.push_str(&escaped_sep),
                c => key.push(c),
            }
        }
    }
    key
}

fn require<'v>(entity: &str, field: &str, value: &'v str) -> Result<&'v str> {
    if value.is_empty() {
        return Err(TeamchatSDKError::Transform(format!("{} 缺少必填字段 {}", entity, field)));
    }
    Ok(value)
}

/// Update 必须有缓存记录
fn existing<'r, R>(action: OperationType, entity: &str, record: Option<&'r R>) -> Result<Option<&'r R>> {
    match action {
        OperationType::Create => Ok(record),
        OperationType::Update => record.map(Some).ok_or_else(|| {
            TeamchatSDKError::Transform(format!("{} 更新时缺少缓存记录", entity))
        }),
        OperationType::Delete => Err(TeamchatSDKError::Transform(format!(
            "{} 转换器只支持 create / update",
            entity
        ))),
    }
}

/// 非组合键实体的 id：Update 沿用缓存 id，Create 取原始 id 或生成
fn resolve_id(action: OperationType, existing_id: Option<&str>, raw_id: Option<&str>, store: &dyn RecordStore) -> String {
    match (action, existing_id) {
        (OperationType::Update, Some(id)) => id.to_string(),
        _ => match raw_id.filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => store.generate_id(),
        },
    }
}

fn prepared(action: OperationType, record: Record) -> PreparedRecord {
    match action {
        OperationType::Update => PreparedRecord::update(record, false),
        _ => PreparedRecord::create(record),
    }
}
