//! プロンプト管理モジュール
//!
//! - PromptKind: Step1（住所分割）/ Step2（住所構造化）
//! - PromptBook: 種類×バージョンでプロンプトを引く。JSONファイルから読み込み、
//!   なければ組み込みのv1を使う
//! - build_structure_prompt: Step2用に出力形式（6フィールドJSON）を付加

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::Path;

/// 組み込みプロンプトのバージョン
pub const DEFAULT_PROMPT_VERSION: &str = "v1";

const SEPARATE_ADDRESSES_V1: &str = "You receive raw text that contains several postal addresses mixed together, \
possibly split across lines or joined on one line. Separate them so that each complete address \
(recipient name, street, town, postcode, country) is written on exactly one line. \
Do not correct, translate or invent any data. Output only the addresses, one per line, with no numbering or commentary.";

const FORMAT_ADDRESSES_V1: &str = "You receive a single postal address on one line. \
Split it into the recipient's first name, last name, street name with house number, town, postcode and country code. \
Keep the original spelling. Use an empty string for any part that is not present.";

/// プロンプトの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    /// 混在した住所テキストを1行1住所に分割
    SeparateAddresses,
    /// 1件の住所を6フィールドに構造化
    FormatAddresses,
}

impl PromptKind {
    /// プロンプトファイル上のキー
    pub fn key(&self) -> &'static str {
        match self {
            PromptKind::SeparateAddresses => "separate_addresses",
            PromptKind::FormatAddresses => "format_addresses",
        }
    }
}

/// プロンプト集（種類 → バージョン → 本文）
///
/// ファイル形式:
/// ```json
/// { "separate_addresses": { "v1": "..." }, "format_addresses": { "v1": "..." } }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PromptBook {
    prompts: HashMap<String, HashMap<String, String>>,
}

impl Default for PromptBook {
    fn default() -> Self {
        let mut prompts = HashMap::new();
        for (kind, text) in [
            (PromptKind::SeparateAddresses, SEPARATE_ADDRESSES_V1),
            (PromptKind::FormatAddresses, FORMAT_ADDRESSES_V1),
        ] {
            let versions = HashMap::from([(DEFAULT_PROMPT_VERSION.to_string(), text.to_string())]);
            prompts.insert(kind.key().to_string(), versions);
        }
        Self { prompts }
    }
}

impl PromptBook {
    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let prompts = serde_json::from_str(json)?;
        Ok(Self { prompts })
    }

    /// ファイルから読み込み（ファイルがなければ組み込みプロンプト）
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "prompt file not found, using built-in prompts");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// 指定バージョンのプロンプトを取得
    pub fn get(&self, kind: PromptKind, version: &str) -> Result<&str> {
        self.prompts
            .get(kind.key())
            .and_then(|versions| versions.get(version))
            .map(String::as_str)
            .ok_or_else(|| Error::PromptNotFound {
                prompt_type: kind.key().to_string(),
                version: version.to_string(),
            })
    }
}

/// Step1プロンプト生成（住所分割用）
pub fn build_separate_prompt(system_prompt: &str, lines: &[String]) -> String {
    format!(
        "{system_prompt}\n\n## 入力\n{}",
        lines.join("\n")
    )
}

/// Step2プロンプト生成（住所構造化用）
///
/// 出力を6フィールドのJSONオブジェクトに固定する指示を付加する。
pub fn build_structure_prompt(system_prompt: &str, address: &str) -> String {
    format!(
        r#"{system_prompt}

## 出力形式（厳密にこのJSONオブジェクト形式で出力）
{{
  "FirstName": "First name of the recipient",
  "LastName": "Last name of the recipient",
  "StreetName": "Name of the street and house number",
  "Town": "Name of the town or city",
  "Postcode": "The postal code",
  "Country": "Country code, e.g. 'GB'"
}}

## 注意
- 6つのキーはすべて必須（該当なしは空文字）
- JSONオブジェクトのみ出力。説明文は不要

## 入力
{address}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_book_has_v1_prompts() {
        let book = PromptBook::default();
        assert!(book
            .get(PromptKind::SeparateAddresses, DEFAULT_PROMPT_VERSION)
            .unwrap()
            .contains("one per line"));
        assert!(book
            .get(PromptKind::FormatAddresses, DEFAULT_PROMPT_VERSION)
            .unwrap()
            .contains("postcode"));
    }

    #[test]
    fn test_from_json_and_versions() {
        let json = r#"{
            "separate_addresses": {"v1": "split v1", "v2": "split v2"},
            "format_addresses": {"v1": "format v1"}
        }"#;
        let book = PromptBook::from_json(json).unwrap();

        assert_eq!(book.get(PromptKind::SeparateAddresses, "v2").unwrap(), "split v2");
        assert_eq!(book.get(PromptKind::FormatAddresses, "v1").unwrap(), "format v1");
    }

    #[test]
    fn test_unknown_version_is_error() {
        let book = PromptBook::default();
        let err = book.get(PromptKind::FormatAddresses, "v9").unwrap_err();
        match err {
            Error::PromptNotFound { prompt_type, version } => {
                assert_eq!(prompt_type, "format_addresses");
                assert_eq!(version, "v9");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let book = PromptBook::load(Path::new("/nonexistent/prompts.json")).unwrap();
        assert_eq!(book, PromptBook::default());
    }

    #[test]
    fn test_build_separate_prompt() {
        let lines = vec!["Jane Doe 12 Mill".to_string(), "Lane Bath BA1 1LT GB".to_string()];
        let prompt = build_separate_prompt("SPLIT", &lines);
        assert!(prompt.starts_with("SPLIT"));
        assert!(prompt.ends_with("Jane Doe 12 Mill\nLane Bath BA1 1LT GB"));
    }

    #[test]
    fn test_build_structure_prompt() {
        let prompt = build_structure_prompt("FORMAT", "Jane Doe, 12 Mill Lane, Bath BA1 1LT");
        assert!(prompt.starts_with("FORMAT"));
        for key in ["FirstName", "LastName", "StreetName", "Town", "Postcode", "Country"] {
            assert!(prompt.contains(key), "missing key {}", key);
        }
        assert!(prompt.ends_with("Jane Doe, 12 Mill Lane, Bath BA1 1LT"));
    }
}
