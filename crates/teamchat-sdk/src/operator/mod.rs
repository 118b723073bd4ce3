//! 服务器数据操作器 - 原始数据与本地缓存之间的对账层
//!
//! 控制流：调用方 → 处理器（查缓存）→ 转换器 → 预备变更；
//! 调用方要么拿走预备变更（prepare_only），要么交给批量持久化整体提交。

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::storage::batch::PreparedRecord;
use crate::storage::entities::{Record, Table};
use crate::storage::query::RecordQuery;

pub mod comparators;
pub mod dedup;
pub mod handlers;
pub mod raw;
pub mod reaction;
pub mod transformers;

pub use raw::*;

/// 对账所需的存储能力
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 按 id 查找缓存记录；不存在的 id 直接忽略
    async fn lookup(&self, table: Table, ids: Vec<String>) -> Result<Vec<Record>>;

    /// 执行只读查询
    async fn query(&self, query: RecordQuery) -> Result<Vec<Record>>;

    /// 为没有服务器 id 的新记录生成 id
    fn generate_id(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }

    /// 在一个事务中提交批次，失败时整体回滚
    async fn commit_batch(&self, batch: Vec<PreparedRecord>) -> Result<()>;
}

/// 处理器的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    /// prepare_only：尚未提交的预备变更
    Prepared(Vec<PreparedRecord>),
    /// 已提交；true 表示确实写入了一个批次
    Committed(bool),
}

impl Reconciled {
    pub(crate) fn empty(prepare_only: bool) -> Self {
        if prepare_only {
            Self::Prepared(Vec::new())
        } else {
            Self::Committed(false)
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Prepared(records) => records.is_empty(),
            Self::Committed(written) => !written,
        }
    }

    pub fn prepared(&self) -> &[PreparedRecord] {
        match self {
            Self::Prepared(records) => records,
            Self::Committed(_) => &[],
        }
    }

    pub fn into_prepared(self) -> Vec<PreparedRecord> {
        match self {
            Self::Prepared(records) => records,
            Self::Committed(_) => Vec::new(),
        }
    }

    /// 去掉比较器判定为未变化的 update
    pub fn without_unchanged(self) -> Self {
        match self {
            Self::Prepared(records) => {
                Self::Prepared(records.into_iter().filter(|r| !r.unchanged).collect())
            }
            committed => committed,
        }
    }
}

/// 单个服务器的数据操作器
///
/// 各实体的 `handle_*` 方法定义在 [`handlers`] 中。
#[derive(Clone)]
pub struct ServerDataOperator {
    store: Arc<dyn RecordStore>,
}

impl std::fmt::Debug for ServerDataOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerDataOperator").finish_non_exhaustive()
    }
}

impl ServerDataOperator {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub fn shared_store(&self) -> Arc<dyn RecordStore> {
        Arc::clone(&self.store)
    }

    /// 提交由多个处理器准备好的变更
    pub async fn batch_records(&self, batch: Vec<PreparedRecord>) -> Result<()> {
        self.store.commit_batch(batch).await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use tempfile::TempDir;

    use super::ServerDataOperator;
    use crate::storage::DatabaseManager;

    pub const TEST_SERVER: &str = "https://chat.example.com";

    /// 临时目录中的服务器数据库 + 操作器
    pub async fn open_operator() -> (TempDir, DatabaseManager, ServerDataOperator) {
        crate::utils::logging::init_test_logging();
        let dir = TempDir::new().unwrap();
        let manager = DatabaseManager::with_base_path(dir.path()).unwrap();
        let db = manager.open_server(TEST_SERVER).await.unwrap();
        let operator = ServerDataOperator::new(Arc::new(db));
        (dir, manager, operator)
    }
}
