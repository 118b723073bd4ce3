//! SDK 配置
//!
//! 只包含对账核心及其外围（本地存储、REST 客户端、日志）需要的配置项。
//! 每个服务器的运行时信息（server_url、token 等）放在 `ServerContext` 中，不在这里。

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, TeamchatSDKError};

/// HTTP 客户端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// 连接超时（秒）
    pub connect_timeout_secs: Option<u64>,
    /// 请求超时（秒）
    pub request_timeout_secs: Option<u64>,
    /// User-Agent
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: Some(15),
            request_timeout_secs: Some(30),
            user_agent: format!("teamchat-sdk/{}", crate::version::SDK_VERSION),
        }
    }
}

/// Teamchat SDK 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamchatConfig {
    /// 数据存储目录（每个服务器一个子目录）
    pub data_dir: PathBuf,
    /// HTTP 客户端配置
    pub http_client_config: HttpClientConfig,
    /// 调试模式（日志默认级别为 debug）
    pub debug_mode: bool,
}

impl Default for TeamchatConfig {
    fn default() -> Self {
        Self {
            data_dir: get_default_data_dir(),
            http_client_config: HttpClientConfig::default(),
            debug_mode: false,
        }
    }
}

/// 获取默认数据目录 ~/.teamchat/
fn get_default_data_dir() -> PathBuf {
    if let Some(home_dir) = std::env::var("HOME").ok().map(PathBuf::from) {
        home_dir.join(".teamchat")
    } else if let Some(home_dir) = std::env::var("USERPROFILE").ok().map(PathBuf::from) {
        home_dir.join(".teamchat")
    } else {
        PathBuf::from("./teamchat_data")
    }
}

impl TeamchatConfig {
    pub fn builder() -> TeamchatConfigBuilder {
        TeamchatConfigBuilder::new()
    }

    /// 校验配置；打开数据库前调用
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(TeamchatSDKError::Config("data_dir 不能为空".to_string()));
        }
        if self.http_client_config.request_timeout_secs == Some(0) {
            return Err(TeamchatSDKError::Config("request_timeout_secs 不能为 0".to_string()));
        }
        Ok(())
    }
}

pub struct TeamchatConfigBuilder {
    config: TeamchatConfig,
}

impl TeamchatConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: TeamchatConfig::default(),
        }
    }

    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.data_dir = path.as_ref().to_path_buf();
        self
    }

    pub fn http_client_config(mut self, config: HttpClientConfig) -> Self {
        self.config.http_client_config = config;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.http_client_config.request_timeout_secs = Some(secs);
        self
    }

    pub fn debug_mode(mut self, enabled: bool) -> Self {
        self.config.debug_mode = enabled;
        self
    }

    pub fn build(self) -> TeamchatConfig {
        self.config
    }
}

impl Default for TeamchatConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = TeamchatConfig::builder()
            .data_dir("/tmp/teamchat")
            .request_timeout_secs(5)
            .debug_mode(true)
            .build();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/teamchat"));
        assert_eq!(config.http_client_config.request_timeout_secs, Some(5));
        assert_eq!(config.http_client_config.connect_timeout_secs, Some(15));
        assert!(config.debug_mode);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = TeamchatConfig::builder().request_timeout_secs(0).build();
        assert!(matches!(config.validate(), Err(TeamchatSDKError::Config(_))));
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = TeamchatConfig::builder().data_dir("/data").build();
        let json = serde_json::to_string(&config).unwrap();
        let back: TeamchatConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.data_dir, config.data_dir);
    }
}
