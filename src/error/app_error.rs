use thiserror::Error;

/// 应用错误
#[derive(Error, Debug)]
pub enum AppError {
    /// 网络请求失败（可重试）
    #[error("Transport error: {0}")]
    Transport(String),

    /// 单次请求超时（可重试）
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// 外层响应无法解析（可重试）
    #[error("Parse error: {0}")]
    Parse(String),

    /// 调用方参数错误，例如无法拆分的货币对名称
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// 查询范围内没有任何已存储的新闻
    #[error("No data")]
    NoData,

    /// 连续失败次数超过阈值，回填提前终止
    #[error("Not all data downloaded: {days_with_data} day(s) with data, last error: {last_error}")]
    NotAllDataDownloaded {
        days_with_data: usize,
        last_error: String,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// 是否计入回填的连续失败计数
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Transport(_) | AppError::Timeout(_) | AppError::Parse(_)
        )
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport(err.to_string())
    }
}
