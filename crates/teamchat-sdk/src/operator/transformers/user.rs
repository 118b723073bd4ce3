use super::{composite_id, existing, join_key, prepared, require, resolve_id, RecordPair};
use crate::error::Result;
use crate::operator::raw::{
    json_text, RawChannelMembership, RawCustomEmoji, RawPreference, RawReaction, RawUser,
};
use crate::operator::RecordStore;
use crate::storage::batch::{OperationType, PreparedRecord};
use crate::storage::entities::{
    ChannelMembershipRecord, CustomEmojiRecord, PreferenceRecord, ReactionRecord, Record, UserRecord,
};

pub fn transform_user(
    action: OperationType,
    store: &dyn RecordStore,
    pair: RecordPair<'_, UserRecord, RawUser>,
) -> Result<PreparedRecord> {
    let record = existing(action, "user", pair.record)?;
    let raw = pair.raw;
    let id = resolve_id(action, record.map(|r| r.id.as_str()), Some(raw.id.as_str()), store);

    Ok(prepared(
        action,
        Record::User(UserRecord {
            id,
            username: raw.username.clone(),
            first_name: raw.first_name.clone(),
            last_name: raw.last_name.clone(),
            nickname: raw.nickname.clone(),
            email: raw.email.clone(),
            position: raw.position.clone(),
            locale: raw.locale.clone(),
            roles: raw.roles.clone(),
            is_bot: raw.is_bot,
            delete_at: raw.delete_at,
            update_at: raw.update_at,
            last_picture_update: raw.last_picture_update,
            auth_service: raw.auth_service.clone(),
            timezone: json_text(&raw.timezone),
            notify_props: json_text(&raw.notify_props),
            props: json_text(&raw.props),
        }),
    ))
}

/// `{user_id}-{category}-{name}`，段内的 `-` 转义为 `%2D`
pub fn preference_id(user_id: &str, category: &str, name: &str) -> String {
    join_key('-', &[user_id, category, name])
}

pub fn transform_preference(
    action: OperationType,
    _store: &dyn RecordStore,
    pair: RecordPair<'_, PreferenceRecord, RawPreference>,
) -> Result<PreparedRecord> {
    existing(action, "preference", pair.record)?;
    let raw = pair.raw;
    let user_id = require("preference", "user_id", &raw.user_id)?;
    let category = require("preference", "category", &raw.category)?;
    let name = require("preference", "name", &raw.name)?;

    Ok(prepared(
        action,
        Record::Preference(PreferenceRecord {
            id: preference_id(user_id, category, name),
            user_id: user_id.to_string(),
            category: category.to_string(),
            name: name.to_string(),
            value: raw.value.clone(),
        }),
    ))
}

/// `{user_id}_{post_id}_{emoji_name}`，段内的 `_` 转义为 `%5F`
pub fn reaction_id(user_id: &str, post_id: &str, emoji_name: &str) -> String {
    join_key('_', &[user_id, post_id, emoji_name])
}

pub fn transform_reaction(
    action: OperationType,
    _store: &dyn RecordStore,
    pair: RecordPair<'_, ReactionRecord, RawReaction>,
) -> Result<PreparedRecord> {
    existing(action, "reaction", pair.record)?;
    let raw = pair.raw;
    let user_id = require("reaction", "user_id", &raw.user_id)?;
    let post_id = require("reaction", "post_id", &raw.post_id)?;
    let emoji_name = require("reaction", "emoji_name", &raw.emoji_name)?;

    Ok(prepared(
        action,
        Record::Reaction(ReactionRecord {
            id: reaction_id(user_id, post_id, emoji_name),
            user_id: user_id.to_string(),
            post_id: post_id.to_string(),
            emoji_name: emoji_name.to_string(),
            create_at: raw.create_at,
        }),
    ))
}

pub fn transform_custom_emoji(
    action: OperationType,
    store: &dyn RecordStore,
    pair: RecordPair<'_, CustomEmojiRecord, RawCustomEmoji>,
) -> Result<PreparedRecord> {
    let record = existing(action, "custom_emoji", pair.record)?;
    let raw = pair.raw;
    let name = require("custom_emoji", "name", &raw.name)?;
    let id = resolve_id(action, record.map(|r| r.id.as_str()), raw.id.as_deref(), store);

    Ok(prepared(
        action,
        Record::CustomEmoji(CustomEmojiRecord {
            id,
            name: name.to_string(),
        }),
    ))
}

/// channel_membership 表：id = `{user_id}_{channel_id}`
pub fn transform_channel_membership(
    action: OperationType,
    _store: &dyn RecordStore,
    pair: RecordPair<'_, ChannelMembershipRecord, RawChannelMembership>,
) -> Result<PreparedRecord> {
    existing(action, "channel_membership", pair.record)?;
    let raw = pair.raw;
    let user_id = require("channel_membership", "user_id", &raw.user_id)?;
    let channel_id = require("channel_membership", "channel_id", &raw.channel_id)?;

    Ok(prepared(
        action,
        Record::ChannelMembership(ChannelMembershipRecord {
            id: composite_id(user_id, channel_id),
            user_id: user_id.to_string(),
            channel_id: channel_id.to_string(),
            roles: raw.roles.clone(),
            msg_count: raw.msg_count,
            mention_count: raw.mention_count,
            last_viewed_at: raw.last_viewed_at,
            last_update_at: raw.last_update_at,
            scheme_admin: raw.scheme_admin,
            notify_props: json_text(&raw.notify_props),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TeamchatSDKError;
    use crate::operator::transformers::test_support::IdOnlyStore;

    #[test]
    fn preference_id_joins_with_dashes() {
        let store = IdOnlyStore::default();
        let raw = RawPreference {
            user_id: "u1".to_string(),
            category: "display_settings".to_string(),
            name: "theme".to_string(),
            value: "dark".to_string(),
        };
        let prepared =
            transform_preference(OperationType::Create, &store, RecordPair::create(&raw)).unwrap();
        assert_eq!(prepared.id(), "u1-display_settings-theme");
    }

    #[test]
    fn reaction_id_is_stable() {
        let store = IdOnlyStore::default();
        let raw = RawReaction {
            user_id: "u1".to_string(),
            post_id: "p1".to_string(),
            emoji_name: "smile".to_string(),
            create_at: 42,
        };
        let a = transform_reaction(OperationType::Create, &store, RecordPair::create(&raw)).unwrap();
        let b = transform_reaction(OperationType::Create, &store, RecordPair::create(&raw)).unwrap();
        assert_eq!(a.id(), "u1_p1_smile");
        assert_eq!(a, b);
    }

    #[test]
    fn reaction_id_escapes_underscores_in_emoji_names() {
        assert_eq!(reaction_id("u1", "p1", "thumbs_up"), "u1_p1_thumbs%5Fup");
        assert_ne!(reaction_id("u1", "p1_x", "y"), reaction_id("u1", "p1", "x_y"));
    }

    #[test]
    fn user_json_props_are_stored_as_text() {
        let store = IdOnlyStore::default();
        let raw = RawUser {
            id: "u1".to_string(),
            username: "alice".to_string(),
            props: serde_json::json!({"customStatus": "busy"}),
            ..Default::default()
        };
        let prepared = transform_user(OperationType::Create, &store, RecordPair::create(&raw)).unwrap();
        let Record::User(user) = prepared.record else {
            panic!("expected user record");
        };
        assert_eq!(user.id, "u1");
        assert_eq!(user.props, r#"{"customStatus":"busy"}"#);
        assert_eq!(user.timezone, "{}");
    }

    #[test]
    fn custom_emoji_without_id_gets_generated_id() {
        let store = IdOnlyStore::default();
        let raw = RawCustomEmoji {
            id: None,
            name: "heart".to_string(),
        };
        let prepared =
            transform_custom_emoji(OperationType::Create, &store, RecordPair::create(&raw)).unwrap();
        assert_eq!(prepared.id(), "gen0");
    }

    #[test]
    fn channel_membership_requires_channel() {
        let store = IdOnlyStore::default();
        let raw = RawChannelMembership {
            user_id: "u1".to_string(),
            ..Default::default()
        };
        let err = transform_channel_membership(OperationType::Create, &store, RecordPair::create(&raw))
            .unwrap_err();
        assert!(matches!(err, TeamchatSDKError::Transform(_)));
    }
}
