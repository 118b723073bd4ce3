//! 帖子反应集合的对账
//!
//! 以帖子为单位：新集合里已缓存且字段一致的反应原样保留，字段有变化的更新，
//! 不在缓存里的新建，缓存里有但新集合没有的永久删除；
//! 新反应引用的、尚未缓存的表情名作为自定义表情新建。

use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::operator::comparators::{is_custom_emoji_equal, is_reaction_equal};
use crate::operator::dedup::unique_raws_by;
use crate::operator::raw::{RawCustomEmoji, RawReaction};
use crate::operator::transformers::{reaction_id, transform_custom_emoji, transform_reaction, RecordPair};
use crate::operator::RecordStore;
use crate::storage::batch::{OperationType, PreparedRecord};
use crate::storage::entities::{CustomEmojiRecord, ReactionRecord, Record, TableRecord};
use crate::storage::query::RecordQuery;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SanitizedReactions {
    pub create_reactions: Vec<RawReaction>,
    /// 已缓存但字段有变化：(缓存记录, 新数据)
    pub update_reactions: Vec<(ReactionRecord, RawReaction)>,
    pub create_emojis: Vec<RawCustomEmoji>,
    pub delete_reactions: Vec<ReactionRecord>,
}

impl SanitizedReactions {
    /// 新建反应 → 更新反应 → 新建表情 → 删除过期反应
    pub fn into_batch(self, store: &dyn RecordStore) -> Result<Vec<PreparedRecord>> {
        let mut batch = Vec::with_capacity(
            self.create_reactions.len()
                + self.update_reactions.len()
                + self.create_emojis.len()
                + self.delete_reactions.len(),
        );
        for raw in &self.create_reactions {
            batch.push(transform_reaction(OperationType::Create, store, RecordPair::create(raw))?);
        }
        for (record, raw) in &self.update_reactions {
            batch.push(transform_reaction(
                OperationType::Update,
                store,
                RecordPair::new(Some(record), raw),
            )?);
        }
        for raw in &self.create_emojis {
            batch.push(transform_custom_emoji(OperationType::Create, store, RecordPair::create(raw))?);
        }
        batch.extend(
            self.delete_reactions
                .into_iter()
                .map(|r| PreparedRecord::destroy(Record::Reaction(r))),
        );
        Ok(batch)
    }
}

fn key_of(raw: &RawReaction) -> Option<String> {
    (!raw.user_id.is_empty() && !raw.post_id.is_empty() && !raw.emoji_name.is_empty())
        .then(|| reaction_id(&raw.user_id, &raw.post_id, &raw.emoji_name))
}

/// 把一批（可能跨多个帖子的）反应拆成新建 / 更新 / 新表情 / 删除
pub async fn sanitize_reactions(
    store: &dyn RecordStore,
    reactions: Vec<RawReaction>,
) -> Result<SanitizedReactions> {
    let reactions = unique_raws_by(reactions, key_of);

    let mut post_ids: Vec<String> = Vec::new();
    for raw in &reactions {
        if !raw.post_id.is_empty() && !post_ids.contains(&raw.post_id) {
            post_ids.push(raw.post_id.clone());
        }
    }

    let cached: Vec<ReactionRecord> = if post_ids.is_empty() {
        Vec::new()
    } else {
        store
            .query(RecordQuery::ReactionsForPosts { post_ids })
            .await?
            .into_iter()
            .filter_map(ReactionRecord::from_record)
            .collect()
    };

    let cached_by_id: HashMap<&str, &ReactionRecord> = cached.iter().map(|r| (r.id.as_str(), r)).collect();
    let incoming_ids: HashSet<String> = reactions.iter().filter_map(key_of).collect();

    let mut create_reactions: Vec<RawReaction> = Vec::new();
    let mut update_reactions: Vec<(ReactionRecord, RawReaction)> = Vec::new();
    for raw in reactions {
        match key_of(&raw).and_then(|id| cached_by_id.get(id.as_str()).copied()) {
            Some(record) if is_reaction_equal(Some(record), &raw) => {}
            Some(record) => update_reactions.push((record.clone(), raw)),
            None => create_reactions.push(raw),
        }
    }

    let delete_reactions: Vec<ReactionRecord> = cached
        .iter()
        .filter(|r| !incoming_ids.contains(&r.id))
        .cloned()
        .collect();

    let mut names: Vec<String> = Vec::new();
    for raw in &create_reactions {
        if !raw.emoji_name.is_empty() && !names.contains(&raw.emoji_name) {
            names.push(raw.emoji_name.clone());
        }
    }

    let create_emojis = if names.is_empty() {
        Vec::new()
    } else {
        let known: Vec<CustomEmojiRecord> = store
            .query(RecordQuery::CustomEmojisByNames { names: names.clone() })
            .await?
            .into_iter()
            .filter_map(CustomEmojiRecord::from_record)
            .collect();
        names
            .into_iter()
            .map(|name| RawCustomEmoji { id: None, name })
            .filter(|emoji| !known.iter().any(|e| is_custom_emoji_equal(Some(e), emoji)))
            .collect()
    };

    Ok(SanitizedReactions {
        create_reactions,
        update_reactions,
        create_emojis,
        delete_reactions,
    })
}
