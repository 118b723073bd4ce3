use thiserror::Error;

/// SDK 统一错误类型
///
/// 对账核心只会产生 `EmptyInput` / `Transform` / `Persistence` 三类业务错误，
/// 其余变体来自存储、网络等外围组件。
#[derive(Debug, Error)]
pub enum TeamchatSDKError {
    /// 调用方传入了空数组（调用方 bug）
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// raw 缺少必需外键或格式不正确
    #[error("Transform error: {0}")]
    Transform(String),

    /// 批量提交失败，整个批次已回滚
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),

    /// 网络请求失败；status 为 HTTP 状态码（连接失败等情况下为 None）
    #[error("Network error [{}]: {message}", fmt_status(.status))]
    Network { status: Option<u16>, message: String },

    #[error("JSON error: {0}")]
    Json(String),

    #[error("IO error: {0}")]
    IO(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for TeamchatSDKError {
    fn from(error: serde_json::Error) -> Self {
        TeamchatSDKError::Json(error.to_string())
    }
}

impl From<std::io::Error> for TeamchatSDKError {
    fn from(error: std::io::Error) -> Self {
        TeamchatSDKError::IO(error.to_string())
    }
}

impl From<reqwest::Error> for TeamchatSDKError {
    fn from(error: reqwest::Error) -> Self {
        TeamchatSDKError::Network {
            status: error.status().map(|s| s.as_u16()),
            message: error.to_string(),
        }
    }
}

impl From<refinery::Error> for TeamchatSDKError {
    fn from(error: refinery::Error) -> Self {
        TeamchatSDKError::Migration(error.to_string())
    }
}

impl TeamchatSDKError {
    /// 获取 HTTP 状态码（仅网络错误）
    pub fn status_code(&self) -> Option<u16> {
        match self {
            TeamchatSDKError::Network { status, .. } => *status,
            _ => None,
        }
    }

    /// 是否为认证失败（会话失效，需要强制登出）
    pub fn is_auth_error(&self) -> bool {
        self.status_code() == Some(401)
    }
}

fn fmt_status(status: &Option<u16>) -> String {
    status.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string())
}

pub type Result<T> = std::result::Result<T, TeamchatSDKError>;
