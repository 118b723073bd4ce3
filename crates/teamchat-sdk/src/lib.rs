//! Teamchat SDK - 团队聊天客户端的本地数据对账核心
//!
//! 本 SDK 把服务器下发的实体（用户、组、频道成员、偏好、表情反应）同步到设备上的 SQLite：
//! - 🧹 去重：同一批次内按逻辑键只保留最后一条
//! - 🔍 对账：逐条比较缓存，决定 create / update，组合键实体的 id 由外键派生
//! - 💾 持久化：一个批次一个事务，任何一条失败整体回滚
//! - 🧵 单线程数据库 Actor：所有 SQLite 访问串行执行
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use teamchat_sdk::{
//!     actions::remote::fetch_groups_for_channel, DatabaseManager, NoopSessionHook, ServerContext,
//!     TeamchatConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TeamchatConfig::builder()
//!         .data_dir("/path/to/data")
//!         .build();
//!     teamchat_sdk::utils::logging::init_logging(config.debug_mode);
//!
//!     let manager = DatabaseManager::new(&config)?;
//!     let ctx = ServerContext::open(
//!         &manager,
//!         &config,
//!         "https://chat.example.com",
//!         Some("token".to_string()),
//!         Arc::new(NoopSessionHook),
//!     )
//!     .await?;
//!
//!     let prepared = fetch_groups_for_channel(&ctx, "channel_id", false).await?;
//!     println!("同步了 {} 条记录", prepared.len());
//!
//!     manager.shutdown();
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod config;
pub mod context;
pub mod error;
pub mod network;
pub mod operator;
pub mod queries;
pub mod session;
pub mod storage;
pub mod utils;
pub mod version;

// 重新导出核心类型，方便使用
pub use config::{HttpClientConfig, TeamchatConfig, TeamchatConfigBuilder};
pub use context::ServerContext;
pub use error::{Result, TeamchatSDKError};
pub use network::{GroupsApi, RestClient};
pub use operator::{Reconciled, RecordStore, ServerDataOperator};
pub use queries::QueryHandle;
pub use session::{NoopSessionHook, SessionHook};
pub use storage::{DatabaseManager, OperationType, PreparedRecord, Record, ServerDatabase, Table};
pub use version::{BUILD_TIME, SDK_DB_VERSION, SDK_VERSION};
