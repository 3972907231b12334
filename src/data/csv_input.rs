use crate::error::{EvalError, Result};
use std::path::Path;

/// CSVファイルから住所テキスト行を読み込む
///
/// 空白以外の値を1つ以上含む行を、フィールドを半角スペースで連結した1行にする。
pub fn read_csv(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(EvalError::FileNotFound(path.display().to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut lines = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.iter().any(|field| !field.trim().is_empty()) {
            lines.push(row.iter().collect::<Vec<_>>().join(" "));
        }
    }

    if lines.is_empty() {
        tracing::warn!(path = %path.display(), "no addresses found in CSV");
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv_joins_fields_and_skips_blank_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.csv");
        std::fs::write(
            &path,
            "Jane Doe,12 Mill Lane\n,,\nBath BA1 1LT,GB,John Smith\n\"1 Oak Rd, Leeds\"\n",
        )
        .unwrap();

        let lines = read_csv(&path).unwrap();
        assert_eq!(
            lines,
            vec![
                "Jane Doe 12 Mill Lane".to_string(),
                "Bath BA1 1LT GB John Smith".to_string(),
                "1 Oak Rd, Leeds".to_string(),
            ]
        );
    }

    #[test]
    fn test_read_csv_missing_file() {
        let result = read_csv(Path::new("/nonexistent/input.csv"));
        assert!(matches!(result, Err(EvalError::FileNotFound(_))));
    }
}
