//! 服务器上下文 - 动作层的显式依赖
//!
//! 每次动作调用都传入一个 `ServerContext`，不存在全局的服务器管理器。

use std::sync::Arc;

use crate::config::TeamchatConfig;
use crate::error::Result;
use crate::network::{GroupsApi, RestClient};
use crate::operator::{RecordStore, ServerDataOperator};
use crate::session::SessionHook;
use crate::storage::DatabaseManager;

#[derive(Clone)]
pub struct ServerContext {
    server_url: String,
    operator: ServerDataOperator,
    client: Arc<dyn GroupsApi>,
    session: Arc<dyn SessionHook>,
}

impl std::fmt::Debug for ServerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerContext")
            .field("server_url", &self.server_url)
            .finish_non_exhaustive()
    }
}

impl ServerContext {
    pub fn new(
        server_url: impl Into<String>,
        store: Arc<dyn RecordStore>,
        client: Arc<dyn GroupsApi>,
        session: Arc<dyn SessionHook>,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            operator: ServerDataOperator::new(store),
            client,
            session,
        }
    }

    /// 打开服务器数据库并创建默认 REST 客户端
    pub async fn open(
        manager: &DatabaseManager,
        config: &TeamchatConfig,
        server_url: &str,
        token: Option<String>,
        session: Arc<dyn SessionHook>,
    ) -> Result<Self> {
        let database = manager.open_server(server_url).await?;
        let client = RestClient::new(server_url, token, &config.http_client_config)?;
        Ok(Self::new(server_url, Arc::new(database), Arc::new(client), session))
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn operator(&self) -> &ServerDataOperator {
        &self.operator
    }

    pub fn client(&self) -> &dyn GroupsApi {
        self.client.as_ref()
    }

    pub fn session(&self) -> &dyn SessionHook {
        self.session.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::NoopSessionHook;
    use tempfile::TempDir;

    #[tokio::test]
    async fn open_wires_database_and_client() {
        let dir = TempDir::new().unwrap();
        let config = TeamchatConfig::builder().data_dir(dir.path()).build();
        let manager = DatabaseManager::new(&config).unwrap();

        let ctx = ServerContext::open(
            &manager,
            &config,
            "https://chat.example.com",
            Some("token".to_string()),
            Arc::new(NoopSessionHook),
        )
        .await
        .unwrap();
        assert_eq!(ctx.server_url(), "https://chat.example.com");
        assert!(manager.db_path("https://chat.example.com").exists());
        manager.shutdown();
    }
}
