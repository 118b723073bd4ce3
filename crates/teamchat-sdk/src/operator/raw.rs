//! 服务器原始数据（DTO）
//!
//! 字段名与服务器 JSON 一致；缺失字段取默认值，由转换器判断是否合法。
//! 这里只有数据，没有行为，生命周期仅限一次同步调用。

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 用户组
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawGroup {
    /// 服务器 id；缺失时创建记录会生成新 id
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub remote_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawGroupTeam {
    #[serde(default)]
    pub group_id: String,
    #[serde(default)]
    pub team_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawGroupChannel {
    #[serde(default)]
    pub group_id: String,
    #[serde(default)]
    pub channel_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawGroupMembership {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub group_id: String,
}

/// 用户
///
/// timezone / notify_props / props 保持服务器原样的 JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawUser {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub locale: String,
    #[serde(default)]
    pub roles: String,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub delete_at: i64,
    #[serde(default)]
    pub update_at: i64,
    #[serde(default)]
    pub last_picture_update: i64,
    #[serde(default)]
    pub auth_service: String,
    #[serde(default)]
    pub timezone: Value,
    #[serde(default)]
    pub notify_props: Value,
    #[serde(default)]
    pub props: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPreference {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReaction {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub post_id: String,
    #[serde(default)]
    pub emoji_name: String,
    #[serde(default)]
    pub create_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawChannelMembership {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub roles: String,
    #[serde(default)]
    pub msg_count: i64,
    #[serde(default)]
    pub mention_count: i64,
    #[serde(default)]
    pub last_viewed_at: i64,
    #[serde(default)]
    pub last_update_at: i64,
    #[serde(default)]
    pub scheme_admin: bool,
    #[serde(default)]
    pub notify_props: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCustomEmoji {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

/// `/channels/{id}/groups`、`/teams/{id}/groups` 的响应
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupsAssociatedResponse {
    #[serde(default)]
    pub groups: Vec<RawGroup>,
    #[serde(default)]
    pub total_group_count: i64,
}

/// JSON 值 → 存储用文本；null 存为 `{}`
pub(crate) fn json_text(value: &Value) -> String {
    if value.is_null() {
        "{}".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let group: RawGroup = serde_json::from_str(r#"{"name":"dev","extra":1}"#).unwrap();
        assert_eq!(group.id, None);
        assert_eq!(group.name, "dev");
        assert_eq!(group.display_name, "");

        let user: RawUser = serde_json::from_str(r#"{"id":"u1","username":"alice"}"#).unwrap();
        assert!(!user.is_bot);
        assert!(user.props.is_null());
    }

    #[test]
    fn associated_groups_response_parses() {
        let resp: GroupsAssociatedResponse = serde_json::from_str(
            r#"{"groups":[{"id":"g1","name":"dev","display_name":"Dev","source":"ldap","remote_id":"r"}],"total_group_count":1}"#,
        )
        .unwrap();
        assert_eq!(resp.groups.len(), 1);
        assert_eq!(resp.groups[0].id.as_deref(), Some("g1"));
        assert_eq!(resp.total_group_count, 1);
    }

    #[test]
    fn json_text_stores_null_as_empty_object() {
        assert_eq!(json_text(&Value::Null), "{}");
        assert_eq!(json_text(&serde_json::json!({"a": 1})), r#"{"a":1}"#);
    }
}
