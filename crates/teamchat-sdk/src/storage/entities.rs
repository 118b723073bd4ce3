//! 数据实体定义 - 对应服务器数据库的表结构
//!
//! 这里定义了本地缓存记录（已对账、已落库的形态），用于：
//! - 类型安全的数据传输
//! - DAO 读写
//! - 预备变更（PreparedRecord）的载荷

use serde::{Deserialize, Serialize};
use std::fmt;

/// 表名 - 每个实体一张表
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Table {
    Group,
    GroupTeam,
    GroupChannel,
    GroupMembership,
    User,
    Preference,
    Reaction,
    CustomEmoji,
    ChannelMembership,
}

impl Table {
    /// SQLite 中的表名（已加引号，可直接拼接进 SQL）
    pub fn sql_name(self) -> &'static str {
        match self {
            Self::Group => r#""group""#,
            Self::GroupTeam => "group_team",
            Self::GroupChannel => "group_channel",
            Self::GroupMembership => "group_membership",
            Self::User => r#""user""#,
            Self::Preference => "preference",
            Self::Reaction => "reaction",
            Self::CustomEmoji => "custom_emoji",
            Self::ChannelMembership => "channel_membership",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::GroupTeam => "group_team",
            Self::GroupChannel => "group_channel",
            Self::GroupMembership => "group_membership",
            Self::User => "user",
            Self::Preference => "preference",
            Self::Reaction => "reaction",
            Self::CustomEmoji => "custom_emoji",
            Self::ChannelMembership => "channel_membership",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 用户组 - 对应 group 表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub source: String,
    pub remote_id: String,
}

/// 组与团队关联 - 对应 group_team 表，id = `{group_id}_{team_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTeamRecord {
    pub id: String,
    pub group_id: String,
    pub team_id: String,
}

/// 组与频道关联 - 对应 group_channel 表，id = `{group_id}_{channel_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupChannelRecord {
    pub id: String,
    pub group_id: String,
    pub channel_id: String,
}

/// 组成员关系 - 对应 group_membership 表，id = `{user_id}_{group_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembershipRecord {
    pub id: String,
    pub user_id: String,
    pub group_id: String,
}

/// 用户 - 对应 user 表
///
/// timezone / notify_props / props 以 JSON 文本存储
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub email: String,
    pub position: String,
    pub locale: String,
    pub roles: String,
    pub is_bot: bool,
    pub delete_at: i64,
    pub update_at: i64,
    pub last_picture_update: i64,
    pub auth_service: String,
    pub timezone: String,
    pub notify_props: String,
    pub props: String,
}

/// 用户偏好 - 对应 preference 表，id = `{user_id}-{category}-{name}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceRecord {
    pub id: String,
    pub user_id: String,
    pub category: String,
    pub name: String,
    pub value: String,
}

/// 消息表情反应 - 对应 reaction 表，id = `{user_id}_{post_id}_{emoji_name}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionRecord {
    pub id: String,
    pub user_id: String,
    pub post_id: String,
    pub emoji_name: String,
    pub create_at: i64,
}

/// 自定义表情 - 对应 custom_emoji 表（name 唯一）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomEmojiRecord {
    pub id: String,
    pub name: String,
}

/// 频道成员关系 - 对应 channel_membership 表，id = `{user_id}_{channel_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMembershipRecord {
    pub id: String,
    pub user_id: String,
    pub channel_id: String,
    pub roles: String,
    pub msg_count: i64,
    pub mention_count: i64,
    pub last_viewed_at: i64,
    pub last_update_at: i64,
    pub scheme_admin: bool,
    pub notify_props: String,
}

/// 任意表的一条记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Record {
    Group(GroupRecord),
    GroupTeam(GroupTeamRecord),
    GroupChannel(GroupChannelRecord),
    GroupMembership(GroupMembershipRecord),
    User(UserRecord),
    Preference(PreferenceRecord),
    Reaction(ReactionRecord),
    CustomEmoji(CustomEmojiRecord),
    ChannelMembership(ChannelMembershipRecord),
}

impl Record {
    pub fn table(&self) -> Table {
        match self {
            Record::Group(_) => Table::Group,
            Record::GroupTeam(_) => Table::GroupTeam,
            Record::GroupChannel(_) => Table::GroupChannel,
            Record::GroupMembership(_) => Table::GroupMembership,
            Record::User(_) => Table::User,
            Record::Preference(_) => Table::Preference,
            Record::Reaction(_) => Table::Reaction,
            Record::CustomEmoji(_) => Table::CustomEmoji,
            Record::ChannelMembership(_) => Table::ChannelMembership,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Record::Group(r) => &r.id,
            Record::GroupTeam(r) => &r.id,
            Record::GroupChannel(r) => &r.id,
            Record::GroupMembership(r) => &r.id,
            Record::User(r) => &r.id,
            Record::Preference(r) => &r.id,
            Record::Reaction(r) => &r.id,
            Record::CustomEmoji(r) => &r.id,
            Record::ChannelMembership(r) => &r.id,
        }
    }
}

/// 单表记录类型与 [`Record`] 之间的转换
pub trait TableRecord: Sized + Send + 'static {
    const TABLE: Table;

    fn into_record(self) -> Record;

    fn from_record(record: Record) -> Option<Self>;
}

macro_rules! impl_table_record {
    ($ty:ty, $variant:ident) => {
        impl TableRecord for $ty {
            const TABLE: Table = Table::$variant;

            fn into_record(self) -> Record {
                Record::$variant(self)
            }

            fn from_record(record: Record) -> Option<Self> {
                match record {
                    Record::$variant(r) => Some(r),
                    _ => None,
                }
            }
        }
    };
}

impl_table_record!(GroupRecord, Group);
impl_table_record!(GroupTeamRecord, GroupTeam);
impl_table_record!(GroupChannelRecord, GroupChannel);
impl_table_record!(GroupMembershipRecord, GroupMembership);
impl_table_record!(UserRecord, User);
impl_table_record!(PreferenceRecord, Preference);
impl_table_record!(ReactionRecord, Reaction);
impl_table_record!(CustomEmojiRecord, CustomEmoji);
impl_table_record!(ChannelMembershipRecord, ChannelMembership);
