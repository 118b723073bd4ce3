//! 网络客户端 - 组相关的 REST 接口
//!
//! 对账核心只依赖 [`GroupsApi`]；[`RestClient`] 是基于 reqwest 的默认实现。
//! 不做重试和退避，失败直接以 `Network` 错误返回给动作层。

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::HttpClientConfig;
use crate::error::{Result, TeamchatSDKError};
use crate::operator::raw::{GroupsAssociatedResponse, RawGroup};

/// 组搜索每页条数
const GROUPS_PER_PAGE: u32 = 60;

#[async_trait]
pub trait GroupsApi: Send + Sync {
    /// 按名称搜索可被 @ 引用的组
    async fn get_groups(&self, query: &str) -> Result<Vec<RawGroup>>;

    async fn get_all_groups_associated_to_channel(&self, channel_id: &str) -> Result<GroupsAssociatedResponse>;

    async fn get_all_groups_associated_to_team(&self, team_id: &str) -> Result<GroupsAssociatedResponse>;

    /// 用户所属的全部组
    async fn get_all_groups_associated_to_membership(&self, user_id: &str) -> Result<Vec<RawGroup>>;
}

/// REST 客户端（`{server_url}/api/v4`）
pub struct RestClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl RestClient {
    pub fn new(server_url: &str, token: Option<String>, config: &HttpClientConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());

        if let Some(timeout) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(timeout));
        }

        if let Some(timeout) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        let client = builder
            .build()
            .map_err(|e| TeamchatSDKError::Other(format!("创建 HTTP 客户端失败: {}", e)))?;

        let base_url = format!("{}/api/v4", server_url.trim_end_matches('/'));
        info!("✅ REST 客户端已创建 (base_url: {})", base_url);

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let request = self.client.get(self.url(path));
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "无法读取错误信息".to_string());
            error!("❌ {} 失败，HTTP 状态码: {}, 错误: {}", what, status, error_text);
            return Err(TeamchatSDKError::Network {
                status: Some(status.as_u16()),
                message: format!("{} 失败: {}", what, error_text),
            });
        }
        let body = response.json::<T>().await?;
        debug!("{} 成功", what);
        Ok(body)
    }
}

#[async_trait]
impl GroupsApi for RestClient {
    async fn get_groups(&self, query: &str) -> Result<Vec<RawGroup>> {
        let request = self.get("/groups").query(&[
            ("q", query.to_string()),
            ("filter_allow_reference", "true".to_string()),
            ("page", "0".to_string()),
            ("per_page", GROUPS_PER_PAGE.to_string()),
        ]);
        self.send_json(request, "搜索组").await
    }

    async fn get_all_groups_associated_to_channel(&self, channel_id: &str) -> Result<GroupsAssociatedResponse> {
        let request = self
            .get(&format!("/channels/{}/groups", channel_id))
            .query(&[("paginate", "false"), ("filter_allow_reference", "true")]);
        self.send_json(request, "获取频道关联组").await
    }

    async fn get_all_groups_associated_to_team(&self, team_id: &str) -> Result<GroupsAssociatedResponse> {
        let request = self
            .get(&format!("/teams/{}/groups", team_id))
            .query(&[("paginate", "false"), ("filter_allow_reference", "true")]);
        self.send_json(request, "获取团队关联组").await
    }

    async fn get_all_groups_associated_to_membership(&self, user_id: &str) -> Result<Vec<RawGroup>> {
        let request = self.get(&format!("/users/{}/groups", user_id));
        self.send_json(request, "获取用户所属组").await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 内存中的组接口；`fail_status` 非空时所有请求都以该状态码失败
    #[derive(Debug, Default)]
    pub struct FakeGroupsApi {
        pub groups: Vec<RawGroup>,
        pub channel_groups: HashMap<String, Vec<RawGroup>>,
        pub team_groups: HashMap<String, Vec<RawGroup>>,
        pub member_groups: HashMap<String, Vec<RawGroup>>,
        pub fail_status: Option<u16>,
        pub requests: AtomicUsize,
    }

    impl FakeGroupsApi {
        fn check(&self) -> Result<()> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            match self.fail_status {
                Some(status) => Err(TeamchatSDKError::Network {
                    status: Some(status),
                    message: "fake failure".to_string(),
                }),
                None => Ok(()),
            }
        }

        fn associated(map: &HashMap<String, Vec<RawGroup>>, id: &str) -> GroupsAssociatedResponse {
            let groups = map.get(id).cloned().unwrap_or_default();
            GroupsAssociatedResponse {
                total_group_count: groups.len() as i64,
                groups,
            }
        }
    }

    #[async_trait]
    impl GroupsApi for FakeGroupsApi {
        async fn get_groups(&self, query: &str) -> Result<Vec<RawGroup>> {
            self.check()?;
            Ok(self
                .groups
                .iter()
                .filter(|g| g.name.contains(query))
                .cloned()
                .collect())
        }

        async fn get_all_groups_associated_to_channel(&self, channel_id: &str) -> Result<GroupsAssociatedResponse> {
            self.check()?;
            Ok(Self::associated(&self.channel_groups, channel_id))
        }

        async fn get_all_groups_associated_to_team(&self, team_id: &str) -> Result<GroupsAssociatedResponse> {
            self.check()?;
            Ok(Self::associated(&self.team_groups, team_id))
        }

        async fn get_all_groups_associated_to_membership(&self, user_id: &str) -> Result<Vec<RawGroup>> {
            self.check()?;
            Ok(self.member_groups.get(user_id).cloned().unwrap_or_default())
        }
    }
}
