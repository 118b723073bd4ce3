//! 存储模块 - 服务器数据的本地持久化层
//!
//! 采用分层架构设计：
//! - DatabaseManager: 按服务器打开数据库，持有唯一的 DB Actor
//! - ServerDatabase: 绑定到单个服务器的存储能力（查找、查询、批量提交）
//! - DAO Layer: 数据访问层，每张表一个专门的操作模块
//! - Entities: 数据实体定义，类型安全的数据传输

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::TeamchatConfig;
use crate::error::Result;
use crate::operator::RecordStore;

pub mod batch;
pub mod dao;
pub mod db_actor;
pub mod entities;
pub mod migrate;
pub mod query;

pub use batch::{OperationType, PreparedRecord};
pub use dao::{DaoFactory, TransactionManager};
pub use db_actor::DbActorHandle;
pub use entities::*;
pub use query::RecordQuery;

/// 服务器数据库文件名
const DB_FILE_NAME: &str = "app.db";

/// 数据库管理器
///
/// 每个服务器一个独立数据库：`{data_dir}/servers/{server_dir}/app.db`。
/// 所有连接都由同一个 DB Actor 线程持有。
#[derive(Debug)]
pub struct DatabaseManager {
    base_path: PathBuf,
    db_actor: DbActorHandle,
}

impl DatabaseManager {
    pub fn new(config: &TeamchatConfig) -> Result<Self> {
        config.validate()?;
        Self::with_base_path(&config.data_dir)
    }

    pub fn with_base_path(base_path: &Path) -> Result<Self> {
        std::fs::create_dir_all(base_path)?;
        let db_actor = DbActorHandle::spawn()?;
        info!("✅ DB Actor 已启动（单线程模型，base_path={}）", base_path.display());
        Ok(Self {
            base_path: base_path.to_path_buf(),
            db_actor,
        })
    }

    /// 服务器数据库路径
    pub fn db_path(&self, server_url: &str) -> PathBuf {
        self.base_path
            .join("servers")
            .join(server_dir_name(server_url))
            .join(DB_FILE_NAME)
    }

    /// 打开（必要时创建并迁移）服务器数据库；幂等
    pub async fn open_server(&self, server_url: &str) -> Result<ServerDatabase> {
        let db_path = self.db_path(server_url);
        self.db_actor
            .open_server(server_url.to_string(), db_path)
            .await?;
        Ok(ServerDatabase {
            server_url: server_url.to_string(),
            db: self.db_actor.clone(),
        })
    }

    pub async fn close_server(&self, server_url: &str) -> Result<()> {
        self.db_actor.close_server(server_url.to_string()).await
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// 停止 DB Actor；之后所有 ServerDatabase 调用都会失败
    pub fn shutdown(&self) {
        self.db_actor.shutdown();
    }
}

/// 服务器 URL → 目录名（非字母数字、`.`、`-` 的字符替换为 `_`）
fn server_dir_name(server_url: &str) -> String {
    server_url
        .trim_end_matches('/')
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect()
}

/// 单个服务器的数据库
#[derive(Debug, Clone)]
pub struct ServerDatabase {
    server_url: String,
    db: DbActorHandle,
}

impl ServerDatabase {
    pub fn server_url(&self) -> &str {
        &self.server_url
    }
}

#[async_trait]
impl RecordStore for ServerDatabase {
    async fn lookup(&self, table: Table, ids: Vec<String>) -> Result<Vec<Record>> {
        self.db.find_by_ids(self.server_url.clone(), table, ids).await
    }

    async fn query(&self, query: RecordQuery) -> Result<Vec<Record>> {
        self.db.run_query(self.server_url.clone(), query).await
    }

    async fn commit_batch(&self, batch: Vec<PreparedRecord>) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        self.db.commit_batch(self.server_url.clone(), batch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn server_urls_map_to_safe_directories() {
        assert_eq!(
            server_dir_name("https://chat.example.com:8065/"),
            "https___chat.example.com_8065"
        );
        assert_eq!(server_dir_name("http://localhost"), "http___localhost");
    }

    #[tokio::test]
    async fn open_server_creates_database_file() {
        let temp_dir = TempDir::new().unwrap();
        let manager = DatabaseManager::with_base_path(temp_dir.path()).unwrap();

        let db = manager.open_server("https://chat.example.com").await.unwrap();
        assert_eq!(db.server_url(), "https://chat.example.com");
        assert!(manager.db_path("https://chat.example.com").exists());

        // 再次打开是幂等的
        manager.open_server("https://chat.example.com").await.unwrap();

        let found = db.lookup(Table::Group, vec!["g1".to_string()]).await.unwrap();
        assert!(found.is_empty());
        manager.shutdown();
    }

    #[tokio::test]
    async fn data_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let record = Record::Group(GroupRecord {
            id: "g1".to_string(),
            name: "dev".to_string(),
            display_name: "Developers".to_string(),
            source: "ldap".to_string(),
            remote_id: "r1".to_string(),
        });

        {
            let manager = DatabaseManager::with_base_path(temp_dir.path()).unwrap();
            let db = manager.open_server("srv").await.unwrap();
            db.commit_batch(vec![PreparedRecord::create(record.clone())]).await.unwrap();
            manager.close_server("srv").await.unwrap();
            manager.shutdown();
        }

        let manager = DatabaseManager::with_base_path(temp_dir.path()).unwrap();
        let db = manager.open_server("srv").await.unwrap();
        let found = db.lookup(Table::Group, vec!["g1".to_string()]).await.unwrap();
        assert_eq!(found, vec![record]);
        manager.shutdown();
    }
}
