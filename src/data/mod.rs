//! 入出力モジュール
//!
//! - 入力フォルダのCSV走査・読み込み
//! - 正解データ / 構造化結果のJSON読み込み
//! - 中間結果・比較結果の保存

mod csv_input;

pub use csv_input::read_csv;

use crate::error::{EvalError, Result};
use address_eval_common::{parse_records, AddressRecord};
use serde::Serialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 入力フォルダ直下のCSVファイルを列挙（ファイル名順）
///
/// 出力ファイル名は拡張子を除いた名前から作るため、名前が重なる
/// ファイル（`a.csv` と `a.CSV` など）は最初の1件だけを残す。
pub fn scan_input_dir(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(EvalError::FolderNotFound(folder.display().to_string()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && is_csv(p))
        .collect();

    files.sort();

    let mut stems = HashSet::new();
    files.retain(|path| {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let first = stems.insert(stem);
        if !first {
            tracing::warn!(path = %path.display(), "skipping file with duplicate name");
        }
        first
    });

    Ok(files)
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// 住所レコードのJSON配列を読み込む
pub fn read_records(path: &Path) -> Result<Vec<AddressRecord>> {
    if !path.exists() {
        return Err(EvalError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(parse_records(&content)?)
}

/// JSONで保存（親フォルダは自動作成）
pub fn save_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    ensure_parent(path)?;
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, data)?;
    Ok(())
}

/// 1要素1行のテキストで保存
pub fn save_txt(path: &Path, lines: &[String]) -> Result<()> {
    ensure_parent(path)?;
    std::fs::write(path, lines.join("\n"))?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
