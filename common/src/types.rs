//! 住所レコードの型定義
//!
//! - AddressRecord: LLMが出力する構造化住所 / 正解データの1件
//! - AddressField: 6フィールドの識別子（比較順序もこの順）

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// 構造化住所レコード
///
/// IDを持たないため、処理結果と正解データは比較処理でのみ対応付けられる。
/// JSONキーは `FirstName` などのPascalCase。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddressRecord {
    #[serde(deserialize_with = "null_as_empty")]
    pub first_name: String,

    #[serde(deserialize_with = "null_as_empty")]
    pub last_name: String,

    #[serde(deserialize_with = "null_as_empty")]
    pub street_name: String,

    #[serde(deserialize_with = "null_as_empty")]
    pub town: String,

    #[serde(deserialize_with = "null_as_empty")]
    pub postcode: String,

    #[serde(deserialize_with = "null_as_empty")]
    pub country: String,
}

// キー欠落はエラー、nullは空文字として扱う
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// 住所フィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressField {
    FirstName,
    LastName,
    StreetName,
    Town,
    Postcode,
    Country,
}

impl AddressField {
    /// 差分レポートでの出力順
    pub const ALL: [AddressField; 6] = [
        AddressField::FirstName,
        AddressField::LastName,
        AddressField::StreetName,
        AddressField::Town,
        AddressField::Postcode,
        AddressField::Country,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AddressField::FirstName => "FirstName",
            AddressField::LastName => "LastName",
            AddressField::StreetName => "StreetName",
            AddressField::Town => "Town",
            AddressField::Postcode => "Postcode",
            AddressField::Country => "Country",
        }
    }
}

impl std::fmt::Display for AddressField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AddressRecord {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        street_name: impl Into<String>,
        town: impl Into<String>,
        postcode: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            street_name: street_name.into(),
            town: town.into(),
            postcode: postcode.into(),
            country: country.into(),
        }
    }

    /// フィールド値を取得
    pub fn get(&self, field: AddressField) -> &str {
        match field {
            AddressField::FirstName => &self.first_name,
            AddressField::LastName => &self.last_name,
            AddressField::StreetName => &self.street_name,
            AddressField::Town => &self.town,
            AddressField::Postcode => &self.postcode,
            AddressField::Country => &self.country,
        }
    }
}

/// 郵便番号の正規化（空白除去 + 小文字化）
pub fn normalize_postcode(postcode: &str) -> String {
    postcode
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// JSON配列から住所レコードを読み込む
///
/// 1件でも必須フィールドが欠けていれば `MalformedRecord` で即失敗する。
pub fn parse_records(json: &str) -> Result<Vec<AddressRecord>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
    records_from_values(values)
}

/// 個々のJSON値を住所レコードに変換（位置をエラーに含める）
pub fn records_from_values(values: Vec<serde_json::Value>) -> Result<Vec<AddressRecord>> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            AddressRecord::deserialize(value).map_err(|e| Error::MalformedRecord {
                index,
                message: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_uses_pascal_case_keys() {
        let record = AddressRecord::new("Jane", "Doe", "1 Oak Rd", "Leeds", "LS1 1AA", "GB");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["FirstName"], "Jane");
        assert_eq!(json["StreetName"], "1 Oak Rd");
        assert_eq!(json["Postcode"], "LS1 1AA");
    }

    #[test]
    fn test_parse_records_null_is_empty() {
        let json = r#"[{"FirstName": "Jane", "LastName": null, "StreetName": "",
            "Town": "Leeds", "Postcode": "LS1 1AA", "Country": "GB"}]"#;
        let records = parse_records(json).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].last_name, "");
        assert_eq!(records[0].street_name, "");
    }

    #[test]
    fn test_parse_records_missing_field_fails_fast() {
        let json = r#"[
            {"FirstName": "A", "LastName": "B", "StreetName": "C", "Town": "D", "Postcode": "E", "Country": "GB"},
            {"FirstName": "A", "LastName": "B", "StreetName": "C", "Town": "D", "Country": "GB"}
        ]"#;
        let err = parse_records(json).unwrap_err();
        match err {
            Error::MalformedRecord { index, message } => {
                assert_eq!(index, 1);
                assert!(message.contains("Postcode"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_normalize_postcode() {
        assert_eq!(normalize_postcode("LS1 1AA"), "ls11aa");
        assert_eq!(normalize_postcode(" m1\t1ae "), "m11ae");
        assert_eq!(normalize_postcode(""), "");
    }

    #[test]
    fn test_field_order() {
        let names: Vec<&str> = AddressField::ALL.iter().map(|f| f.as_str()).collect();
        assert_eq!(
            names,
            vec!["FirstName", "LastName", "StreetName", "Town", "Postcode", "Country"]
        );
    }
}
