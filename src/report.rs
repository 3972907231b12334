//! テストレポート（テキスト）生成

use crate::error::Result;
use crate::runner::{FileOutcome, FileStatus};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

const RULE_WIDTH: usize = 80;

/// 一括評価のテストレポート
#[derive(Debug, Clone)]
pub struct TestReport {
    started_at: NaiveDateTime,
    /// (表示名, プロンプト本文)
    prompts: Vec<(String, String)>,
    outcomes: Vec<FileOutcome>,
}

impl TestReport {
    pub fn new(started_at: NaiveDateTime, prompts: Vec<(String, String)>, outcomes: Vec<FileOutcome>) -> Self {
        Self {
            started_at,
            prompts,
            outcomes,
        }
    }

    pub fn total_files(&self) -> usize {
        self.outcomes.len()
    }

    pub fn total_passes(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_pass()).count()
    }

    pub fn total_failures(&self) -> usize {
        self.total_files() - self.total_passes()
    }

    /// `test_report_YYYY-MM-DD_HH-MM-SS.txt`
    pub fn file_name(&self) -> String {
        self.started_at
            .format("test_report_%Y-%m-%d_%H-%M-%S.txt")
            .to_string()
    }

    pub fn render(&self) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let mut lines = Vec::new();

        lines.push(format!(
            "Test Report - {}",
            self.started_at.format("%Y-%m-%d %H:%M:%S")
        ));
        lines.push("Prompts Used:".to_string());
        for (label, prompt) in &self.prompts {
            lines.push(format!("{label}: {prompt}"));
        }
        lines.push(rule.clone());
        lines.push(String::new());

        for outcome in &self.outcomes {
            lines.push(match &outcome.status {
                FileStatus::Pass => format!("{}: PASS", outcome.file_name),
                FileStatus::Failed(reason) => format!("{}: FAILED - {}", outcome.file_name, reason),
            });
        }

        lines.push(rule.clone());
        lines.push(format!("Total files tested: {}", self.total_files()));
        lines.push(format!("Total passes: {}", self.total_passes()));
        lines.push(format!("Total failures: {}", self.total_failures()));
        lines.push(rule);

        lines.join("\n")
    }

    /// 出力フォルダに書き出してパスを返す
    pub fn write(&self, output_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(output_dir)?;
        let path = output_dir.join(self.file_name());
        std::fs::write(&path, self.render())?;
        Ok(path)
    }
}
