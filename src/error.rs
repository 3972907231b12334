use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("AI CLIがタイムアウトしました（{0}秒）")]
    Timeout(u64),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("CSV読み込みエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSVファイルが見つかりません: {0}")]
    NoInputFiles(String),

    #[error("正解データが空です: {0}")]
    GroundTruthEmpty(String),

    #[error("CLI実行エラー: {0}")]
    CliExecution(String),

    #[error(transparent)]
    Common(#[from] address_eval_common::Error),
}

pub type Result<T> = std::result::Result<T, EvalError>;
