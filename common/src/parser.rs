//! AIレスポンスパーサー
//!
//! AI CLIのレスポンスから
//! - 住所分割（Step1）: 1行1住所のテキスト
//! - 住所構造化（Step2）: 6フィールドのJSONオブジェクト
//! を取り出す

use crate::error::{Error, Result};
use crate::types::AddressRecord;

/// APIレスポンスからJSONオブジェクト部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 生の {...} オブジェクト
/// 3. エラー
///
/// # Examples
/// ```
/// use address_eval_common::extract_json;
///
/// let response = "Result: {\"Town\": \"Leeds\"}";
/// let json = extract_json(response).unwrap();
/// assert_eq!(json, "{\"Town\": \"Leeds\"}");
/// ```
pub fn extract_json(response: &str) -> Result<&str> {
    // ```json ... ``` ブロックを探す
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    // 生の {...} を探す
    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if end >= start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(Error::Parse("JSONが見つかりません".into()))
}

/// Step2レスポンスをパース
///
/// 6フィールドが揃っていなければエラー（欠落フィールド名を含む）。
pub fn parse_address_response(response: &str) -> Result<AddressRecord> {
    let json_str = extract_json(response)?;
    serde_json::from_str(json_str.trim())
        .map_err(|e| Error::Parse(format!("住所JSONパースエラー: {}", e)))
}

/// Step1レスポンスを住所のリストに整形
///
/// 空行を除き、各行の前後空白を取り除く。
pub fn clean_text_response(response: &str) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================
    // extract_json テスト
    // =============================================

    #[test]
    fn test_extract_json_with_block() {
        let response = r#"Here is the address:
```json
{"FirstName": "Jane", "Town": "Leeds"}
```
Some additional text."#;

        let json = extract_json(response).unwrap();
        assert_eq!(json, r#"{"FirstName": "Jane", "Town": "Leeds"}"#);
    }

    #[test]
    fn test_extract_json_with_surrounding_text() {
        let response = r#"Result: {"Town": "York"} done."#;

        let json = extract_json(response).unwrap();
        assert_eq!(json, r#"{"Town": "York"}"#);
    }

    #[test]
    fn test_extract_json_error() {
        let result = extract_json("No JSON here, just plain text.");
        assert!(result.is_err());
        if let Err(Error::Parse(msg)) = result {
            assert!(msg.contains("JSONが見つかりません"));
        } else {
            panic!("Expected Parse error");
        }
    }

    #[test]
    fn test_extract_json_empty_response() {
        assert!(extract_json("").is_err());
    }

    // =============================================
    // parse_address_response テスト
    // =============================================

    #[test]
    fn test_parse_address_response() {
        let response = r#"```json
{
  "FirstName": "Jane",
  "LastName": "Doe",
  "StreetName": "12 Mill Lane",
  "Town": "Bath",
  "Postcode": "BA1 1LT",
  "Country": "GB"
}
```"#;

        let record = parse_address_response(response).unwrap();
        assert_eq!(record.first_name, "Jane");
        assert_eq!(record.street_name, "12 Mill Lane");
        assert_eq!(record.postcode, "BA1 1LT");
        assert_eq!(record.country, "GB");
    }

    #[test]
    fn test_parse_address_response_missing_field() {
        let response = r#"{"FirstName": "Jane", "LastName": "Doe", "Town": "Bath"}"#;

        let err = parse_address_response(response).unwrap_err();
        match err {
            Error::Parse(msg) => assert!(msg.contains("StreetName")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_address_response_error() {
        assert!(parse_address_response("Sorry, I can't help with that.").is_err());
    }

    // =============================================
    // clean_text_response テスト
    // =============================================

    #[test]
    fn test_clean_text_response() {
        let response = "\n  Jane Doe, 12 Mill Lane, Bath BA1 1LT  \n\n\tJohn Smith, 1 Oak Rd, Leeds LS1 1AA\n   \n";

        let lines = clean_text_response(response);
        assert_eq!(
            lines,
            vec![
                "Jane Doe, 12 Mill Lane, Bath BA1 1LT".to_string(),
                "John Smith, 1 Oak Rd, Leeds LS1 1AA".to_string(),
            ]
        );
    }

    #[test]
    fn test_clean_text_response_empty() {
        assert!(clean_text_response("   \n\n").is_empty());
    }
}
