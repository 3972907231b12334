use crate::ai_provider::AiProvider;
use crate::error::{EvalError, Result};
use address_eval_common::{CompareOptions, DEFAULT_PROMPT_VERSION};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ai_provider: AiProvider,
    /// 省略時はAI CLI側のデフォルトモデル
    pub model: Option<String>,
    /// 同時に処理するCSVファイル数
    pub workers: usize,
    /// 1ファイル内で同時に構造化する住所数
    pub address_workers: usize,
    pub timeout_seconds: u64,
    pub match_threshold: f64,
    pub compare_threshold: f64,
    pub prompt_version: String,
}

impl Default for Config {
    fn default() -> Self {
        let thresholds = CompareOptions::default();
        Self {
            ai_provider: AiProvider::Claude,
            model: None,
            workers: 5,
            address_workers: 8,
            timeout_seconds: 120,
            match_threshold: thresholds.match_threshold,
            compare_threshold: thresholds.compare_threshold,
            prompt_version: DEFAULT_PROMPT_VERSION.into(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!(path = %config_path.display(), "config loaded");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| EvalError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("address-eval").join("config.json"))
    }

    /// 閾値を検証して比較オプションに変換
    pub fn compare_options(&self) -> Result<CompareOptions> {
        Ok(CompareOptions::new(self.match_threshold, self.compare_threshold)?)
    }
}
