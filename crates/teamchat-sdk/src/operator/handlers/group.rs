use tracing::warn;

use super::{reconcile, EntityReconciler};
use crate::error::Result;
use crate::operator::comparators::{
    is_group_channel_equal, is_group_equal, is_group_membership_equal, is_group_team_equal,
};
use crate::operator::raw::{RawGroup, RawGroupChannel, RawGroupMembership, RawGroupTeam};
use crate::operator::transformers::{
    composite_id, transform_group, transform_group_channel, transform_group_membership,
    transform_group_team, RecordPair,
};
use crate::operator::{Reconciled, RecordStore, ServerDataOperator};
use crate::storage::batch::{OperationType, PreparedRecord};
use crate::storage::entities::{
    GroupChannelRecord, GroupMembershipRecord, GroupRecord, GroupTeamRecord,
};

pub struct GroupEntity;

impl EntityReconciler for GroupEntity {
    type Raw = RawGroup;
    type Record = GroupRecord;

    fn key_of(raw: &RawGroup) -> Option<String> {
        raw.id.clone().filter(|id| !id.is_empty())
    }

    fn is_equal(existing: Option<&GroupRecord>, raw: &RawGroup) -> bool {
        is_group_equal(existing, raw)
    }

    fn transform(
        action: OperationType,
        store: &dyn RecordStore,
        pair: RecordPair<'_, GroupRecord, RawGroup>,
    ) -> Result<PreparedRecord> {
        transform_group(action, store, pair)
    }
}

/// 两段外键都存在时才有逻辑键
fn pair_key(a: &str, b: &str) -> Option<String> {
    (!a.is_empty() && !b.is_empty()).then(|| composite_id(a, b))
}

pub struct GroupTeamEntity;

impl EntityReconciler for GroupTeamEntity {
    type Raw = RawGroupTeam;
    type Record = GroupTeamRecord;

    fn key_of(raw: &RawGroupTeam) -> Option<String> {
        pair_key(&raw.group_id, &raw.team_id)
    }

    fn is_equal(existing: Option<&GroupTeamRecord>, raw: &RawGroupTeam) -> bool {
        is_group_team_equal(existing, raw)
    }

    fn transform(
        action: OperationType,
        store: &dyn RecordStore,
        pair: RecordPair<'_, GroupTeamRecord, RawGroupTeam>,
    ) -> Result<PreparedRecord> {
        transform_group_team(action, store, pair)
    }
}

pub struct GroupChannelEntity;

impl EntityReconciler for GroupChannelEntity {
    type Raw = RawGroupChannel;
    type Record = GroupChannelRecord;

    fn key_of(raw: &RawGroupChannel) -> Option<String> {
        pair_key(&raw.group_id, &raw.channel_id)
    }

    fn is_equal(existing: Option<&GroupChannelRecord>, raw: &RawGroupChannel) -> bool {
        is_group_channel_equal(existing, raw)
    }

    fn transform(
        action: OperationType,
        store: &dyn RecordStore,
        pair: RecordPair<'_, GroupChannelRecord, RawGroupChannel>,
    ) -> Result<PreparedRecord> {
        transform_group_channel(action, store, pair)
    }
}

pub struct GroupMembershipEntity;

impl EntityReconciler for GroupMembershipEntity {
    type Raw = RawGroupMembership;
    type Record = GroupMembershipRecord;

    fn key_of(raw: &RawGroupMembership) -> Option<String> {
        pair_key(&raw.user_id, &raw.group_id)
    }

    fn is_equal(existing: Option<&GroupMembershipRecord>, raw: &RawGroupMembership) -> bool {
        is_group_membership_equal(existing, raw)
    }

    fn transform(
        action: OperationType,
        store: &dyn RecordStore,
        pair: RecordPair<'_, GroupMembershipRecord, RawGroupMembership>,
    ) -> Result<PreparedRecord> {
        transform_group_membership(action, store, pair)
    }
}

/// 组相关的处理器：空输入只记录警告并返回空结果
impl ServerDataOperator {
    pub async fn handle_groups(&self, groups: Vec<RawGroup>, prepare_only: bool) -> Result<Reconciled> {
        if groups.is_empty() {
            warn!("handle_groups 收到空的 groups 数组");
            return Ok(Reconciled::empty(prepare_only));
        }
        reconcile::<GroupEntity>(self.store(), groups, prepare_only).await
    }

    pub async fn handle_group_teams(
        &self,
        group_teams: Vec<RawGroupTeam>,
        prepare_only: bool,
    ) -> Result<Reconciled> {
        if group_teams.is_empty() {
            warn!("handle_group_teams 收到空的 group_teams 数组");
            return Ok(Reconciled::empty(prepare_only));
        }
        reconcile::<GroupTeamEntity>(self.store(), group_teams, prepare_only).await
    }

    pub async fn handle_group_channels(
        &self,
        group_channels: Vec<RawGroupChannel>,
        prepare_only: bool,
    ) -> Result<Reconciled> {
        if group_channels.is_empty() {
            warn!("handle_group_channels 收到空的 group_channels 数组");
            return Ok(Reconciled::empty(prepare_only));
        }
        reconcile::<GroupChannelEntity>(self.store(), group_channels, prepare_only).await
    }

    pub async fn handle_group_memberships(
        &self,
        group_memberships: Vec<RawGroupMembership>,
        prepare_only: bool,
    ) -> Result<Reconciled> {
        if group_memberships.is_empty() {
            warn!("handle_group_memberships 收到空的 group_memberships 数组");
            return Ok(Reconciled::empty(prepare_only));
        }
        reconcile::<GroupMembershipEntity>(self.store(), group_memberships, prepare_only).await
    }
}
