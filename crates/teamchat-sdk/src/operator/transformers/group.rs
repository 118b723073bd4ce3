use super::{composite_id, existing, prepared, require, resolve_id, RecordPair};
use crate::error::Result;
use crate::operator::raw::{RawGroup, RawGroupChannel, RawGroupMembership, RawGroupTeam};
use crate::operator::RecordStore;
use crate::storage::batch::{OperationType, PreparedRecord};
use crate::storage::entities::{
    GroupChannelRecord, GroupMembershipRecord, GroupRecord, GroupTeamRecord, Record,
};

/// group 表：id 来自服务器
pub fn transform_group(
    action: OperationType,
    store: &dyn RecordStore,
    pair: RecordPair<'_, GroupRecord, RawGroup>,
) -> Result<PreparedRecord> {
    let record = existing(action, "group", pair.record)?;
    let raw = pair.raw;
    let id = resolve_id(action, record.map(|r| r.id.as_str()), raw.id.as_deref(), store);

    Ok(prepared(
        action,
        Record::Group(GroupRecord {
            id,
            name: raw.name.clone(),
            display_name: raw.display_name.clone(),
            source: raw.source.clone(),
            remote_id: raw.remote_id.clone(),
        }),
    ))
}

/// group_team 表：id = `{group_id}_{team_id}`
pub fn transform_group_team(
    action: OperationType,
    _store: &dyn RecordStore,
    pair: RecordPair<'_, GroupTeamRecord, RawGroupTeam>,
) -> Result<PreparedRecord> {
    existing(action, "group_team", pair.record)?;
    let group_id = require("group_team", "group_id", &pair.raw.group_id)?;
    let team_id = require("group_team", "team_id", &pair.raw.team_id)?;

    Ok(prepared(
        action,
        Record::GroupTeam(GroupTeamRecord {
            id: composite_id(group_id, team_id),
            group_id: group_id.to_string(),
            team_id: team_id.to_string(),
        }),
    ))
}

/// group_channel 表：id = `{group_id}_{channel_id}`
pub fn transform_group_channel(
    action: OperationType,
    _store: &dyn RecordStore,
    pair: RecordPair<'_, GroupChannelRecord, RawGroupChannel>,
) -> Result<PreparedRecord> {
    existing(action, "group_channel", pair.record)?;
    let group_id = require("group_channel", "group_id", &pair.raw.group_id)?;
    let channel_id = require("group_channel", "channel_id", &pair.raw.channel_id)?;

    Ok(prepared(
        action,
        Record::GroupChannel(GroupChannelRecord {
            id: composite_id(group_id, channel_id),
            group_id: group_id.to_string(),
            channel_id: channel_id.to_string(),
        }),
    ))
}

/// group_membership 表：id = `{user_id}_{group_id}`
pub fn transform_group_membership(
    action: OperationType,
    _store: &dyn RecordStore,
    pair: RecordPair<'_, GroupMembershipRecord, RawGroupMembership>,
) -> Result<PreparedRecord> {
    existing(action, "group_membership", pair.record)?;
    let user_id = require("group_membership", "user_id", &pair.raw.user_id)?;
    let group_id = require("group_membership", "group_id", &pair.raw.group_id)?;

    Ok(prepared(
        action,
        Record::GroupMembership(GroupMembershipRecord {
            id: composite_id(user_id, group_id),
            user_id: user_id.to_string(),
            group_id: group_id.to_string(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TeamchatSDKError;
    use crate::operator::transformers::test_support::IdOnlyStore;

    fn raw_group(id: Option<&str>) -> RawGroup {
        RawGroup {
            id: id.map(str::to_string),
            name: "recent".to_string(),
            display_name: "Recent".to_string(),
            source: "custom".to_string(),
            remote_id: "remote".to_string(),
        }
    }

    #[test]
    fn create_group_uses_server_id() {
        let store = IdOnlyStore::default();
        let raw = raw_group(Some("kjlw9j1ttnxwig7tnqgebg7dtipno"));
        let prepared = transform_group(OperationType::Create, &store, RecordPair::create(&raw)).unwrap();

        assert_eq!(prepared.action, OperationType::Create);
        assert_eq!(prepared.id(), "kjlw9j1ttnxwig7tnqgebg7dtipno");
        let Record::Group(group) = prepared.record else {
            panic!("expected group record");
        };
        assert_eq!(group.display_name, "Recent");
    }

    #[test]
    fn create_group_without_id_generates_one() {
        let store = IdOnlyStore::default();
        let raw = raw_group(None);
        let prepared = transform_group(OperationType::Create, &store, RecordPair::create(&raw)).unwrap();
        assert_eq!(prepared.id(), "gen0");
    }

    #[test]
    fn update_group_keeps_cached_id() {
        let store = IdOnlyStore::default();
        let cached = GroupRecord {
            id: "local".to_string(),
            name: "old".to_string(),
            display_name: "Old".to_string(),
            source: "custom".to_string(),
            remote_id: String::new(),
        };
        let raw = raw_group(Some("server"));
        let prepared =
            transform_group(OperationType::Update, &store, RecordPair::new(Some(&cached), &raw)).unwrap();

        assert_eq!(prepared.action, OperationType::Update);
        assert_eq!(prepared.id(), "local");
    }

    #[test]
    fn update_without_cached_record_fails() {
        let store = IdOnlyStore::default();
        let raw = raw_group(Some("g1"));
        let err = transform_group(OperationType::Update, &store, RecordPair::create(&raw)).unwrap_err();
        assert!(matches!(err, TeamchatSDKError::Transform(_)));
    }

    #[test]
    fn group_team_id_is_derived() {
        let store = IdOnlyStore::default();
        let raw = RawGroupTeam {
            group_id: "kjlw9j1ttnxwig7tnqgebg7dtipno".to_string(),
            team_id: "team_id".to_string(),
        };
        let prepared = transform_group_team(OperationType::Create, &store, RecordPair::create(&raw)).unwrap();
        assert_eq!(prepared.id(), "kjlw9j1ttnxwig7tnqgebg7dtipno_team%5Fid");
    }

    #[test]
    fn group_channel_id_is_derived() {
        let store = IdOnlyStore::default();
        let raw = RawGroupChannel {
            group_id: "g1".to_string(),
            channel_id: "c1".to_string(),
        };
        let prepared =
            transform_group_channel(OperationType::Create, &store, RecordPair::create(&raw)).unwrap();
        assert_eq!(prepared.id(), "g1_c1");
    }

    #[test]
    fn membership_id_is_user_then_group() {
        let store = IdOnlyStore::default();
        let raw = RawGroupMembership {
            user_id: "u1".to_string(),
            group_id: "g1".to_string(),
        };
        let prepared =
            transform_group_membership(OperationType::Create, &store, RecordPair::create(&raw)).unwrap();
        assert_eq!(prepared.id(), "u1_g1");
    }

    #[test]
    fn missing_foreign_key_is_a_transform_error() {
        let store = IdOnlyStore::default();
        let raw = RawGroupTeam {
            group_id: "g1".to_string(),
            team_id: String::new(),
        };
        let err = transform_group_team(OperationType::Create, &store, RecordPair::create(&raw)).unwrap_err();
        assert!(matches!(err, TeamchatSDKError::Transform(_)));
    }
}
