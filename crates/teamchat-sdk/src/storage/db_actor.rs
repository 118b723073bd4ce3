//! 数据库 Actor - 单线程数据库访问模型
//!
//! 核心设计：
//! - 每个服务器一个 SQLite Connection，全部只存在于一个专用线程中
//! - 所有数据库操作通过 channel 发送命令，结果经 oneshot 返回
//! - 命令按到达顺序串行执行：一个批次的提交不会与其他批次交错
//! - 命令一旦送达就会执行完毕，调用方放弃等待不会中止提交

use crossbeam_channel::{unbounded, Receiver, Sender};
use rusqlite::Connection;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::thread;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::error::{Result, TeamchatSDKError};
use crate::storage::batch::{self, PreparedRecord};
use crate::storage::dao::DaoFactory;
use crate::storage::entities::{Record, Table};
use crate::storage::query::RecordQuery;

/// 数据库命令
pub enum DbCommand {
    /// 打开（必要时创建并迁移）某个服务器的数据库
    OpenServer {
        server_url: String,
        db_path: PathBuf,
        respond_to: oneshot::Sender<Result<()>>,
    },

    /// 按主键批量查找已缓存记录
    FindByIds {
        server_url: String,
        table: Table,
        ids: Vec<String>,
        respond_to: oneshot::Sender<Result<Vec<Record>>>,
    },

    /// 执行只读查询
    RunQuery {
        server_url: String,
        query: RecordQuery,
        respond_to: oneshot::Sender<Result<Vec<Record>>>,
    },

    /// 在一个事务中提交批次
    CommitBatch {
        server_url: String,
        batch: Vec<PreparedRecord>,
        respond_to: oneshot::Sender<Result<()>>,
    },

    /// 关闭某个服务器的数据库
    CloseServer {
        server_url: String,
        respond_to: oneshot::Sender<Result<()>>,
    },

    /// 停止 Actor
    Shutdown,
}

/// 数据库 Actor（运行在独立线程）
struct DbActor {
    /// server_url -> 连接
    connections: HashMap<String, Connection>,
    receiver: Receiver<DbCommand>,
    thread_id: thread::ThreadId,
}

impl DbActor {
    fn new(receiver: Receiver<DbCommand>) -> Self {
        let thread_id = thread::current().id();
        info!("🚀 [Thread {:?}] DbActor 已启动", thread_id);
        Self {
            connections: HashMap::new(),
            receiver,
            thread_id,
        }
    }

    fn run(mut self) {
        while let Ok(command) = self.receiver.recv() {
            match command {
                DbCommand::Shutdown => {
                    info!("🛑 [Thread {:?}] DbActor 收到停止信号", self.thread_id);
                    break;
                }
                DbCommand::OpenServer {
                    server_url,
                    db_path,
                    respond_to,
                } => {
                    let result = self.handle_open_server(&server_url, &db_path);
                    let _ = respond_to.send(result);
                }
                DbCommand::FindByIds {
                    server_url,
                    table,
                    ids,
                    respond_to,
                } => {
                    let result = self
                        .connection(&server_url)
                        .and_then(|conn| DaoFactory::find_by_ids(conn, table, &ids));
                    let _ = respond_to.send(result);
                }
                DbCommand::RunQuery {
                    server_url,
                    query,
                    respond_to,
                } => {
                    let result = self.connection(&server_url).and_then(|conn| query.execute(conn));
                    let _ = respond_to.send(result);
                }
                DbCommand::CommitBatch {
                    server_url,
                    batch,
                    respond_to,
                } => {
                    let result = self.handle_commit_batch(&server_url, &batch);
                    if respond_to.send(result).is_err() {
                        debug!("[DbActor] 调用方已放弃等待批量提交结果: server={}", server_url);
                    }
                }
                DbCommand::CloseServer {
                    server_url,
                    respond_to,
                } => {
                    let result = self.handle_close_server(&server_url);
                    let _ = respond_to.send(result);
                }
            }
        }

        info!("✅ [Thread {:?}] DbActor 已停止", self.thread_id);
    }

    fn connection(&self, server_url: &str) -> Result<&Connection> {
        self.connections
            .get(server_url)
            .ok_or_else(|| TeamchatSDKError::Database(format!("服务器数据库未打开: {}", server_url)))
    }

    fn handle_open_server(&mut self, server_url: &str, db_path: &Path) -> Result<()> {
        if self.connections.contains_key(server_url) {
            debug!("[DbActor] 数据库已打开，跳过: server={}", server_url);
            return Ok(());
        }

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut conn = Connection::open(db_path).map_err(|e| {
            error!(
                "❌ [DbActor Thread {:?}] 打开数据库失败: server={}, path={}, error={}",
                self.thread_id,
                server_url,
                db_path.display(),
                e
            );
            TeamchatSDKError::Database(format!("打开数据库失败: {}", e))
        })?;

        crate::storage::migrate::init_db(&mut conn)?;

        self.connections.insert(server_url.to_string(), conn);
        info!(
            "✅ [DbActor] 服务器数据库已打开: server={}, path={}, 连接数={}",
            server_url,
            db_path.display(),
            self.connections.len()
        );
        Ok(())
    }

    fn handle_commit_batch(&mut self, server_url: &str, batch: &[PreparedRecord]) -> Result<()> {
        let conn = self.connection(server_url)?;
        batch::commit_batch(conn, batch)?;
        info!("✅ [DbActor] 批量提交成功: server={}, count={}", server_url, batch.len());
        Ok(())
    }

    fn handle_close_server(&mut self, server_url: &str) -> Result<()> {
        match self.connections.remove(server_url) {
            Some(conn) => {
                conn.close().map_err(|(_, e)| {
                    TeamchatSDKError::Database(format!("关闭数据库失败: {}", e))
                })?;
                info!("[DbActor] 服务器数据库已关闭: server={}", server_url);
            }
            None => warn!("[DbActor] 关闭未打开的数据库: server={}", server_url),
        }
        Ok(())
    }
}

/// 数据库 Actor 句柄（用于异步调用）
#[derive(Clone)]
pub struct DbActorHandle {
    sender: Sender<DbCommand>,
}

impl std::fmt::Debug for DbActorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbActorHandle")
            .field("sender", &"<channel>")
            .finish()
    }
}

impl DbActorHandle {
    /// 启动 DB Actor 线程
    pub fn spawn() -> Result<Self> {
        let (sender, receiver) = unbounded();

        thread::Builder::new()
            .name("db-actor".to_string())
            .spawn(move || {
                let actor = DbActor::new(receiver);
                actor.run();
            })
            .map_err(|e| TeamchatSDKError::Other(format!("无法启动 DB Actor 线程: {}", e)))?;

        Ok(Self { sender })
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T>>) -> DbCommand,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .map_err(|_| TeamchatSDKError::Other("DB Actor 已停止".to_string()))?;
        rx.await
            .map_err(|_| TeamchatSDKError::Other("DB Actor 响应失败".to_string()))?
    }

    pub async fn open_server(&self, server_url: String, db_path: PathBuf) -> Result<()> {
        self.request(|respond_to| DbCommand::OpenServer {
            server_url,
            db_path,
            respond_to,
        })
        .await
    }

    pub async fn find_by_ids(&self, server_url: String, table: Table, ids: Vec<String>) -> Result<Vec<Record>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.request(|respond_to| DbCommand::FindByIds {
            server_url,
            table,
            ids,
            respond_to,
        })
        .await
    }

    pub async fn run_query(&self, server_url: String, query: RecordQuery) -> Result<Vec<Record>> {
        self.request(|respond_to| DbCommand::RunQuery {
            server_url,
            query,
            respond_to,
        })
        .await
    }

    pub async fn commit_batch(&self, server_url: String, batch: Vec<PreparedRecord>) -> Result<()> {
        debug!("📤 [DbActorHandle] CommitBatch(server={}, count={})", server_url, batch.len());
        self.request(|respond_to| DbCommand::CommitBatch {
            server_url,
            batch,
            respond_to,
        })
        .await
    }

    pub async fn close_server(&self, server_url: String) -> Result<()> {
        self.request(|respond_to| DbCommand::CloseServer {
            server_url,
            respond_to,
        })
        .await
    }

    /// 停止 DB Actor
    pub fn shutdown(&self) {
        let _ = self.sender.send(DbCommand::Shutdown);
    }
}
