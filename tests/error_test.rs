//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use address_eval::data;
use address_eval::error::EvalError;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = data::scan_input_dir(Path::new("/nonexistent/path/12345"));
    assert!(result.is_err());

    let err = result.unwrap_err();
    assert!(matches!(err, EvalError::FolderNotFound(_)));
}

/// CSVのないフォルダをスキャンした場合
#[test]
fn test_scan_folder_without_csv() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("test.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("data.json"), "{}").unwrap();

    // エラーではなく空のVecを返す
    let result = data::scan_input_dir(dir.path());
    assert!(result.unwrap().is_empty());
}

/// 存在しない正解データ
#[test]
fn test_read_missing_ground_truth() {
    let result = data::read_records(Path::new("/nonexistent/ground_truth.json"));
    assert!(matches!(result, Err(EvalError::FileNotFound(_))));
}

/// 必須フィールドが欠けた正解データは位置とフィールド名付きで失敗
#[test]
fn test_read_malformed_ground_truth() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("ground_truth.json");
    std::fs::write(
        &path,
        r#"[{"FirstName": "Jane", "LastName": "Doe", "StreetName": "12 Mill Lane", "Town": "Bath", "Postcode": "BA1 1LT"}]"#,
    )
    .unwrap();

    let err = data::read_records(&path).unwrap_err();
    assert!(matches!(
        err,
        EvalError::Common(address_eval_common::Error::MalformedRecord { index: 0, .. })
    ));
    let display = format!("{}", err);
    assert!(display.contains("Country"));
}

/// JSONとして壊れた正解データ
#[test]
fn test_read_invalid_json() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("ground_truth.json");
    std::fs::write(&path, "{ invalid").unwrap();

    let err = data::read_records(&path).unwrap_err();
    assert!(matches!(err, EvalError::Common(address_eval_common::Error::Json(_))));
}

/// EvalErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        EvalError::Config("テスト設定エラー".to_string()),
        EvalError::FileNotFound("input.csv".to_string()),
        EvalError::FolderNotFound("/path/to/folder".to_string()),
        EvalError::ApiCall("API呼び出し失敗".to_string()),
        EvalError::ApiParse("パース失敗".to_string()),
        EvalError::Timeout(120),
        EvalError::NoInputFiles("input_data".to_string()),
        EvalError::GroundTruthEmpty("ground_truth.json".to_string()),
        EvalError::CliExecution("exit 1".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: EvalError = io_err.into();

    assert!(matches!(err, EvalError::Io(_)));
    assert!(format!("{}", err).contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: EvalError = json_err.into();

    assert!(matches!(err, EvalError::JsonParse(_)));
}

/// common::Errorからの変換（透過的エラー）
#[test]
fn test_common_error_transparent() {
    let common_err = address_eval_common::Error::Config("設定エラー".to_string());
    let err: EvalError = common_err.into();

    assert!(matches!(err, EvalError::Common(_)));
    assert_eq!(format!("{}", err), "Config error: 設定エラー");
}
