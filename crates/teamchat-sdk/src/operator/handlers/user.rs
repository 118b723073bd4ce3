use tracing::debug;

use super::{finish, reconcile, EntityReconciler};
use crate::error::{Result, TeamchatSDKError};
use crate::operator::comparators::{is_channel_membership_equal, is_preference_equal, is_user_equal};
use crate::operator::raw::{RawChannelMembership, RawPreference, RawReaction, RawUser};
use crate::operator::reaction::sanitize_reactions;
use crate::operator::transformers::{
    composite_id, preference_id, transform_channel_membership, transform_preference, transform_user,
    RecordPair,
};
use crate::operator::{Reconciled, RecordStore, ServerDataOperator};
use crate::storage::batch::{OperationType, PreparedRecord};
use crate::storage::entities::{ChannelMembershipRecord, PreferenceRecord, UserRecord};

pub struct UserEntity;

impl EntityReconciler for UserEntity {
    type Raw = RawUser;
    type Record = UserRecord;

    fn key_of(raw: &RawUser) -> Option<String> {
        (!raw.id.is_empty()).then(|| raw.id.clone())
    }

    fn is_equal(existing: Option<&UserRecord>, raw: &RawUser) -> bool {
        is_user_equal(existing, raw)
    }

    fn transform(
        action: OperationType,
        store: &dyn RecordStore,
        pair: RecordPair<'_, UserRecord, RawUser>,
    ) -> Result<PreparedRecord> {
        transform_user(action, store, pair)
    }
}

pub struct PreferenceEntity;

impl EntityReconciler for PreferenceEntity {
    type Raw = RawPreference;
    type Record = PreferenceRecord;

    fn key_of(raw: &RawPreference) -> Option<String> {
        (!raw.user_id.is_empty() && !raw.category.is_empty() && !raw.name.is_empty())
            .then(|| preference_id(&raw.user_id, &raw.category, &raw.name))
    }

    fn is_equal(existing: Option<&PreferenceRecord>, raw: &RawPreference) -> bool {
        is_preference_equal(existing, raw)
    }

    fn transform(
        action: OperationType,
        store: &dyn RecordStore,
        pair: RecordPair<'_, PreferenceRecord, RawPreference>,
    ) -> Result<PreparedRecord> {
        transform_preference(action, store, pair)
    }
}

pub struct ChannelMembershipEntity;

impl EntityReconciler for ChannelMembershipEntity {
    type Raw = RawChannelMembership;
    type Record = ChannelMembershipRecord;

    fn key_of(raw: &RawChannelMembership) -> Option<String> {
        (!raw.user_id.is_empty() && !raw.channel_id.is_empty())
            .then(|| composite_id(&raw.user_id, &raw.channel_id))
    }

    fn is_equal(existing: Option<&ChannelMembershipRecord>, raw: &RawChannelMembership) -> bool {
        is_channel_membership_equal(existing, raw)
    }

    fn transform(
        action: OperationType,
        store: &dyn RecordStore,
        pair: RecordPair<'_, ChannelMembershipRecord, RawChannelMembership>,
    ) -> Result<PreparedRecord> {
        transform_channel_membership(action, store, pair)
    }
}

fn empty_input(method: &str, field: &str) -> TeamchatSDKError {
    TeamchatSDKError::EmptyInput(format!("{} 收到空的 {} 数组", method, field))
}

/// 用户相关的处理器：空输入是调用方错误
impl ServerDataOperator {
    pub async fn handle_users(&self, users: Vec<RawUser>, prepare_only: bool) -> Result<Reconciled> {
        if users.is_empty() {
            return Err(empty_input("handle_users", "users"));
        }
        reconcile::<UserEntity>(self.store(), users, prepare_only).await
    }

    pub async fn handle_preferences(
        &self,
        preferences: Vec<RawPreference>,
        prepare_only: bool,
    ) -> Result<Reconciled> {
        if preferences.is_empty() {
            return Err(empty_input("handle_preferences", "preferences"));
        }
        reconcile::<PreferenceEntity>(self.store(), preferences, prepare_only).await
    }

    pub async fn handle_channel_memberships(
        &self,
        channel_memberships: Vec<RawChannelMembership>,
        prepare_only: bool,
    ) -> Result<Reconciled> {
        if channel_memberships.is_empty() {
            return Err(empty_input("handle_channel_memberships", "channel_memberships"));
        }
        reconcile::<ChannelMembershipEntity>(self.store(), channel_memberships, prepare_only).await
    }

    /// 以帖子为单位对账反应集合
    ///
    /// 批次顺序：新建反应、新建自定义表情、删除过期反应。
    pub async fn handle_reactions(
        &self,
        reactions: Vec<RawReaction>,
        prepare_only: bool,
    ) -> Result<Reconciled> {
        if reactions.is_empty() {
            return Err(empty_input("handle_reactions", "reactions"));
        }

        let sanitized = sanitize_reactions(self.store(), reactions).await?;
        debug!(
            "反应对账: create={}, update={}, emojis={}, delete={}",
            sanitized.create_reactions.len(),
            sanitized.update_reactions.len(),
            sanitized.create_emojis.len(),
            sanitized.delete_reactions.len()
        );
        let batch = sanitized.into_batch(self.store())?;
        finish(self.store(), batch, prepare_only).await
    }
}
