//! AI処理モジュール
//!
//! 2段階処理:
//! - Step1 (分割): 混在した住所テキストを1行1住所に分割
//! - Step2 (構造化): 1住所ずつ6フィールドのレコードに変換（並列実行）

mod cli_runner;

pub use cli_runner::CliProcessor;

use crate::error::{EvalError, Result};
use address_eval_common::AddressRecord;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// 住所の分割・構造化を行うAI処理
pub trait AddressProcessor: Send + Sync + 'static {
    /// 生テキスト行を1行1住所に分割
    fn separate(&self, lines: &[String]) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// 1件の住所を構造化
    fn structure(&self, address: &str) -> impl Future<Output = Result<AddressRecord>> + Send;
}

/// 分割済み住所をまとめて構造化する
///
/// 最大 `workers` 件を同時に処理する。失敗した住所はログに残して除外し、
/// 残りは分割順のまま返す。
pub async fn format_addresses<P: AddressProcessor>(
    processor: Arc<P>,
    addresses: &[String],
    workers: usize,
) -> Vec<AddressRecord> {
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut handles = Vec::with_capacity(addresses.len());

    for address in addresses {
        let processor = Arc::clone(&processor);
        let semaphore = Arc::clone(&semaphore);
        let address = address.clone();
        handles.push(tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| EvalError::ApiCall(e.to_string()))?;
            processor.structure(&address).await
        }));
    }

    let mut records = Vec::with_capacity(handles.len());
    for (idx, handle) in handles.into_iter().enumerate() {
        match handle.await {
            Ok(Ok(record)) => records.push(record),
            Ok(Err(e)) => {
                tracing::warn!(address = %addresses[idx], error = %e, "failed to structure address");
            }
            Err(e) => {
                tracing::warn!(address = %addresses[idx], error = %e, "structuring task aborted");
            }
        }
    }

    records
}
