//! 会话 Hook
//!
//! 动作层在远端请求失败时统一调用；是否真正登出由宿主决定（一般只在认证失败时）。

use async_trait::async_trait;
use tracing::warn;

use crate::error::TeamchatSDKError;

#[async_trait]
pub trait SessionHook: Send + Sync {
    /// 远端请求失败后调用；返回 true 表示已执行登出
    async fn force_logout_if_necessary(&self, server_url: &str, error: &TeamchatSDKError) -> bool;
}

/// 只记录日志、从不登出的默认实现
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSessionHook;

#[async_trait]
impl SessionHook for NoopSessionHook {
    async fn force_logout_if_necessary(&self, server_url: &str, error: &TeamchatSDKError) -> bool {
        if error.is_auth_error() {
            warn!("⚠️ 认证失败但未注册会话 Hook，跳过登出: server={}, error={}", server_url, error);
        }
        false
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// 记录每次调用，认证失败时报告已登出
    #[derive(Debug, Default)]
    pub struct RecordingSessionHook {
        pub calls: Mutex<Vec<(String, Option<u16>)>>,
    }

    impl RecordingSessionHook {
        pub fn calls(&self) -> Vec<(String, Option<u16>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SessionHook for RecordingSessionHook {
        async fn force_logout_if_necessary(&self, server_url: &str, error: &TeamchatSDKError) -> bool {
            self.calls
                .lock()
                .unwrap()
                .push((server_url.to_string(), error.status_code()));
            error.is_auth_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_hook_never_logs_out() {
        let err = TeamchatSDKError::Network {
            status: Some(401),
            message: "unauthorized".to_string(),
        };
        assert!(!NoopSessionHook.force_logout_if_necessary("srv", &err).await);
    }
}
