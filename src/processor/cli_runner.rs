//! AI CLI連携モジュール
//!
//! claude / codex / gemini のCLIを子プロセスとして呼び出す。

use super::AddressProcessor;
use crate::ai_provider::AiProvider;
use crate::error::{EvalError, Result};
use address_eval_common::{
    clean_text_response, parse_address_response, AddressRecord, PromptBook, PromptKind,
};
use address_eval_common::prompts::{build_separate_prompt, build_structure_prompt};
use std::time::{Duration, Instant};
use tokio::process::Command;

/// AI CLI経由の住所処理
#[derive(Debug, Clone)]
pub struct CliProcessor {
    provider: AiProvider,
    program: String,
    model: Option<String>,
    separate_prompt: String,
    format_prompt: String,
    timeout: Duration,
}

impl CliProcessor {
    /// 指定バージョンのプロンプトがなければエラー
    pub fn new(
        provider: AiProvider,
        model: Option<String>,
        prompts: &PromptBook,
        version: &str,
        timeout_seconds: u64,
    ) -> Result<Self> {
        Ok(Self {
            provider,
            program: provider.command_name().to_string(),
            model,
            separate_prompt: prompts.get(PromptKind::SeparateAddresses, version)?.to_string(),
            format_prompt: prompts.get(PromptKind::FormatAddresses, version)?.to_string(),
            timeout: Duration::from_secs(timeout_seconds),
        })
    }

    /// 実行ファイルを差し替える（PATH外のCLIなど）
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    async fn run_cli(&self, prompt: &str) -> Result<String> {
        let args = self.provider.prompt_args(prompt, self.model.as_deref());

        // Windowsではcmd /c経由（改行は渡せないためスペースに置換）
        #[cfg(windows)]
        let mut command = {
            let mut command = Command::new("cmd");
            command.arg("/c").arg(&self.program);
            command.args(args.iter().map(|a| a.replace('\n', " ")));
            command
        };

        #[cfg(not(windows))]
        let mut command = {
            let mut command = Command::new(&self.program);
            command.args(&args);
            command
        };

        command.kill_on_drop(true);

        let started = Instant::now();
        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| EvalError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| EvalError::ApiCall(format!("{} CLI実行エラー: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EvalError::CliExecution(format!(
                "{} failed (code {:?}): {}",
                self.program,
                output.status.code(),
                stderr.trim()
            )));
        }

        let response = String::from_utf8_lossy(&output.stdout).to_string();
        tracing::debug!(
            program = %self.program,
            prompt_chars = prompt.len(),
            response_chars = response.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "AI CLI finished"
        );

        Ok(response)
    }
}

impl AddressProcessor for CliProcessor {
    async fn separate(&self, lines: &[String]) -> Result<Vec<String>> {
        let prompt = build_separate_prompt(&self.separate_prompt, lines);
        let response = self.run_cli(&prompt).await?;
        Ok(clean_text_response(&response))
    }

    async fn structure(&self, address: &str) -> Result<AddressRecord> {
        let prompt = build_structure_prompt(&self.format_prompt, address);
        let response = self.run_cli(&prompt).await?;
        parse_address_response(&response)
            .map_err(|e| EvalError::ApiParse(format!("Step2: {}", e)))
    }
}
