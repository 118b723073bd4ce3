//! 缓存记录与原始数据的相等判断
//!
//! 只比较可变（非主键）字段；没有缓存记录时一律返回 false。

use crate::operator::raw::{
    json_text, RawChannelMembership, RawCustomEmoji, RawGroup, RawGroupChannel, RawGroupMembership,
    RawGroupTeam, RawPreference, RawReaction, RawUser,
};
use crate::storage::entities::{
    ChannelMembershipRecord, CustomEmojiRecord, GroupChannelRecord, GroupMembershipRecord,
    GroupRecord, GroupTeamRecord, PreferenceRecord, ReactionRecord, UserRecord,
};

pub fn is_group_equal(existing: Option<&GroupRecord>, raw: &RawGroup) -> bool {
    existing.is_some_and(|r| {
        r.name == raw.name
            && r.display_name == raw.display_name
            && r.source == raw.source
            && r.remote_id == raw.remote_id
    })
}

pub fn is_group_team_equal(existing: Option<&GroupTeamRecord>, raw: &RawGroupTeam) -> bool {
    existing.is_some_and(|r| r.group_id == raw.group_id && r.team_id == raw.team_id)
}

pub fn is_group_channel_equal(existing: Option<&GroupChannelRecord>, raw: &RawGroupChannel) -> bool {
    existing.is_some_and(|r| r.group_id == raw.group_id && r.channel_id == raw.channel_id)
}

pub fn is_group_membership_equal(
    existing: Option<&GroupMembershipRecord>,
    raw: &RawGroupMembership,
) -> bool {
    existing.is_some_and(|r| r.user_id == raw.user_id && r.group_id == raw.group_id)
}

pub fn is_user_equal(existing: Option<&UserRecord>, raw: &RawUser) -> bool {
    existing.is_some_and(|r| {
        r.username == raw.username
            && r.first_name == raw.first_name
            && r.last_name == raw.last_name
            && r.nickname == raw.nickname
            && r.email == raw.email
            && r.position == raw.position
            && r.locale == raw.locale
            && r.roles == raw.roles
            && r.is_bot == raw.is_bot
            && r.delete_at == raw.delete_at
            && r.update_at == raw.update_at
            && r.last_picture_update == raw.last_picture_update
            && r.auth_service == raw.auth_service
            && r.timezone == json_text(&raw.timezone)
            && r.notify_props == json_text(&raw.notify_props)
            && r.props == json_text(&raw.props)
    })
}

pub fn is_preference_equal(existing: Option<&PreferenceRecord>, raw: &RawPreference) -> bool {
    existing.is_some_and(|r| {
        r.user_id == raw.user_id
            && r.category == raw.category
            && r.name == raw.name
            && r.value == raw.value
    })
}

pub fn is_reaction_equal(existing: Option<&ReactionRecord>, raw: &RawReaction) -> bool {
    existing.is_some_and(|r| {
        r.user_id == raw.user_id
            && r.post_id == raw.post_id
            && r.emoji_name == raw.emoji_name
            && r.create_at == raw.create_at
    })
}

pub fn is_custom_emoji_equal(existing: Option<&CustomEmojiRecord>, raw: &RawCustomEmoji) -> bool {
    existing.is_some_and(|r| r.name == raw.name)
}

pub fn is_channel_membership_equal(
    existing: Option<&ChannelMembershipRecord>,
    raw: &RawChannelMembership,
) -> bool {
    existing.is_some_and(|r| {
        r.user_id == raw.user_id
            && r.channel_id == raw.channel_id
            && r.roles == raw.roles
            && r.msg_count == raw.msg_count
            && r.mention_count == raw.mention_count
            && r.last_viewed_at == raw.last_viewed_at
            && r.last_update_at == raw.last_update_at
            && r.scheme_admin == raw.scheme_admin
            && r.notify_props == json_text(&raw.notify_props)
    })
}
