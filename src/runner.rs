//! 一括評価モジュール
//!
//! CSVファイルごとに 読み込み → 分割 → 構造化 → 正解データと比較 を行う。
//! ファイル単位で並列実行し、1ファイルの失敗は他に影響しない。

use crate::data;
use crate::error::{EvalError, Result};
use crate::processor::{self, AddressProcessor};
use address_eval_common::{AddressRecord, Comparator, CompareOptions};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// 実行設定
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub output_dir: PathBuf,
    /// 同時に処理するファイル数
    pub workers: usize,
    /// 1ファイル内で同時に構造化する住所数
    pub address_workers: usize,
    pub options: CompareOptions,
}

/// ファイル単位の判定
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Pass,
    Failed(String),
}

impl FileStatus {
    fn failed(reason: impl Into<String>) -> Self {
        FileStatus::Failed(reason.into())
    }
}

/// ファイル単位の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub file_name: String,
    pub status: FileStatus,
}

impl FileOutcome {
    pub fn is_pass(&self) -> bool {
        self.status == FileStatus::Pass
    }
}

/// 出力ファイルのパス
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub step1: PathBuf,
    pub step2: PathBuf,
    pub comparison: PathBuf,
}

impl OutputPaths {
    pub fn new(output_dir: &Path, input: &Path) -> Self {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            step1: output_dir.join(format!("{stem}_step1.txt")),
            step2: output_dir.join(format!("{stem}_step2.json")),
            comparison: output_dir.join(format!("{stem}_comparison_results.json")),
        }
    }
}

/// 1ファイルを評価する（エラーはFAILEDとして返す）
pub async fn process_single_file<P: AddressProcessor>(
    processor: Arc<P>,
    input: &Path,
    ground_truth: &[AddressRecord],
    settings: &RunSettings,
) -> FileOutcome {
    let file_name = display_name(input);
    tracing::info!(file = %file_name, "processing file");

    let status = match evaluate_file(processor, input, ground_truth, settings).await {
        Ok(status) => status,
        Err(e) => {
            tracing::error!(file = %file_name, error = %e, "file processing failed");
            FileStatus::failed(e.to_string())
        }
    };

    FileOutcome { file_name, status }
}

async fn evaluate_file<P: AddressProcessor>(
    processor: Arc<P>,
    input: &Path,
    ground_truth: &[AddressRecord],
    settings: &RunSettings,
) -> Result<FileStatus> {
    let paths = OutputPaths::new(&settings.output_dir, input);

    // 1. CSV読み込み
    let lines = data::read_csv(input)?;
    if lines.is_empty() {
        return Ok(FileStatus::failed("No addresses found"));
    }

    // 2. 住所分割
    let separated = match processor.separate(&lines).await {
        Ok(separated) => separated,
        Err(e) => {
            tracing::warn!(file = %input.display(), error = %e, "address separation failed");
            Vec::new()
        }
    };
    if separated.is_empty() {
        return Ok(FileStatus::failed("Address separation error"));
    }
    data::save_txt(&paths.step1, &separated)?;

    // 3. 住所構造化
    let formatted =
        processor::format_addresses(processor, &separated, settings.address_workers).await;
    if formatted.is_empty() {
        return Ok(FileStatus::failed("Address formatting error"));
    }
    data::save_json(&paths.step2, &formatted)?;

    // 4. 正解データと比較
    let outcome = Comparator::new(settings.options).compare(&formatted, ground_truth);
    data::save_json(&paths.comparison, &outcome.report)?;

    tracing::info!(
        file = %input.display(),
        matched = outcome.matched_count,
        mismatched = outcome.mismatch_count(),
        unmatched = outcome.unmatched_count,
        "comparison saved"
    );

    if outcome.is_pass() {
        Ok(FileStatus::Pass)
    } else {
        Ok(FileStatus::failed(format!(
            "{} differences found",
            outcome.report.len()
        )))
    }
}

/// 全ファイルを並列に評価する（結果は入力順）
pub async fn run_all<P: AddressProcessor>(
    processor: Arc<P>,
    files: &[PathBuf],
    ground_truth: Arc<Vec<AddressRecord>>,
    settings: Arc<RunSettings>,
    progress: &ProgressBar,
) -> Vec<FileOutcome> {
    let semaphore = Arc::new(Semaphore::new(settings.workers.max(1)));
    let mut handles = Vec::with_capacity(files.len());

    for file in files {
        let processor = Arc::clone(&processor);
        let ground_truth = Arc::clone(&ground_truth);
        let settings = Arc::clone(&settings);
        let semaphore = Arc::clone(&semaphore);
        let progress = progress.clone();
        let file_name = display_name(file);
        let file = file.clone();

        let handle = tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| EvalError::Config(e.to_string()))?;
            let outcome = process_single_file(processor, &file, &ground_truth, &settings).await;
            progress.inc(1);
            Ok::<_, EvalError>(outcome)
        });
        handles.push((file_name, handle));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for (file_name, handle) in handles {
        let outcome = match handle.await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => FileOutcome {
                file_name,
                status: FileStatus::failed(e.to_string()),
            },
            Err(e) => {
                tracing::error!(file = %file_name, error = %e, "file task aborted");
                FileOutcome {
                    file_name,
                    status: FileStatus::failed(format!("task aborted: {}", e)),
                }
            }
        };
        outcomes.push(outcome);
    }

    outcomes
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
