//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// 必須フィールドの欠落など、レコードとして読めない入力
    #[error("Malformed record #{index}: {message}")]
    MalformedRecord { index: usize, message: String },

    #[error("Invalid threshold {name}={value} (expected 0-100)")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("Prompt not found: {prompt_type}/{version}")]
    PromptNotFound { prompt_type: String, version: String },
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
