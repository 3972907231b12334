//! 処理結果と正解データの照合・比較モジュール
//!
//! ## 処理フロー
//! 1. 重み付きスコアで処理結果ごとに最良の正解レコードを貪欲に割り当て
//! 2. 割り当てたペアのフィールド差分を精密比較
//! 3. 未割り当ての正解レコードを欠落として報告
//!
//! 割り当ては処理結果の入力順に先着で確定する（全体最適ではない）。
//! 同じ入力なら結果は常に同じになる。

use crate::error::{Error, Result};
use crate::similarity::{IndelRatio, Similarity};
use crate::types::{normalize_postcode, AddressField, AddressRecord};
use serde::{Serialize, Serializer};

/// 差分レポートで欠落レコードを示すフィールド名
pub const MISSING_ENTRY_FIELD: &str = "Missing entry";

/// 照合・比較の閾値（いずれも0-100のパーセント）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompareOptions {
    /// 照合閾値: 郵便番号類似度はこれを超え、重み付きスコアはこれ以上で採用
    pub match_threshold: f64,
    /// 比較閾値: 名前・通り・町名の類似度がこれ未満なら差分
    pub compare_threshold: f64,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            match_threshold: 60.0,
            compare_threshold: 70.0,
        }
    }
}

impl CompareOptions {
    pub fn new(match_threshold: f64, compare_threshold: f64) -> Result<Self> {
        check_percentage("match_threshold", match_threshold)?;
        check_percentage("compare_threshold", compare_threshold)?;
        Ok(Self {
            match_threshold,
            compare_threshold,
        })
    }
}

fn check_percentage(name: &'static str, value: f64) -> Result<()> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidThreshold { name, value })
    }
}

/// 1フィールド分の差分
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDifference {
    pub field: AddressField,
    pub processed_value: String,
    pub expected_value: String,
}

/// 比較レポートの1エントリ
#[derive(Debug, Clone, PartialEq)]
pub enum DiscrepancyEntry {
    /// 正解データに対応先がない処理結果
    UnmatchedProcessed { processed: AddressRecord },
    /// 対応付けられたがフィールドに差分があるペア
    FieldMismatch {
        processed: AddressRecord,
        ground_truth: AddressRecord,
        differences: Vec<FieldDifference>,
        match_score: f64,
    },
    /// どの処理結果にも対応付けられなかった正解レコード
    UnmatchedGroundTruth { ground_truth: AddressRecord },
}

/// 比較結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonOutcome {
    /// 欠落（処理側）→ 差分ペア → 欠落（正解側）の順
    pub report: Vec<DiscrepancyEntry>,
    /// 差分なしで一致したペア数
    pub matched_count: usize,
    /// 欠落エントリ数（処理側 + 正解側）
    pub unmatched_count: usize,
}

impl ComparisonOutcome {
    /// 差分が1件もなければ合格
    pub fn is_pass(&self) -> bool {
        self.report.is_empty()
    }

    pub fn mismatch_count(&self) -> usize {
        self.report
            .iter()
            .filter(|e| matches!(e, DiscrepancyEntry::FieldMismatch { .. }))
            .count()
    }

    /// 旧集計値（欠落数 + レポート件数、欠落を二重に数える）
    ///
    /// 過去の実行ログとの突き合わせ用。
    pub fn legacy_unmatched_total(&self) -> usize {
        self.unmatched_count + self.report.len()
    }
}

/// 照合中の一時的な対応付け
#[derive(Debug)]
struct MatchCandidate<'a> {
    processed: &'a AddressRecord,
    truth: &'a AddressRecord,
    truth_index: usize,
    score: f64,
}

/// 照合・比較エンジン
#[derive(Debug, Clone, Default)]
pub struct Comparator<S = IndelRatio> {
    similarity: S,
    options: CompareOptions,
}

impl Comparator<IndelRatio> {
    pub fn new(options: CompareOptions) -> Self {
        Self {
            similarity: IndelRatio,
            options,
        }
    }
}

impl<S: Similarity> Comparator<S> {
    /// 類似度アルゴリズムを指定して生成
    pub fn with_similarity(similarity: S, options: CompareOptions) -> Self {
        Self { similarity, options }
    }

    /// 処理結果と正解データを照合し、差分レポートを作る
    pub fn compare(
        &self,
        processed: &[AddressRecord],
        ground_truth: &[AddressRecord],
    ) -> ComparisonOutcome {
        let mut outcome = ComparisonOutcome::default();
        let mut consumed = vec![false; ground_truth.len()];
        let mut matches = Vec::new();

        // Step 1: 貪欲な重み付き照合
        for record in processed {
            match self.find_best_match(record, ground_truth, &consumed) {
                Some((truth_index, score)) => {
                    consumed[truth_index] = true;
                    matches.push(MatchCandidate {
                        processed: record,
                        truth: &ground_truth[truth_index],
                        truth_index,
                        score,
                    });
                }
                None => {
                    outcome.report.push(DiscrepancyEntry::UnmatchedProcessed {
                        processed: record.clone(),
                    });
                    outcome.unmatched_count += 1;
                }
            }
        }

        // Step 2: ペアごとの精密比較
        for candidate in matches {
            let differences = self.diff_fields(candidate.processed, candidate.truth);
            if differences.is_empty() {
                outcome.matched_count += 1;
            } else {
                tracing::debug!(
                    truth_index = candidate.truth_index,
                    score = candidate.score,
                    differences = differences.len(),
                    "field mismatch"
                );
                outcome.report.push(DiscrepancyEntry::FieldMismatch {
                    processed: candidate.processed.clone(),
                    ground_truth: candidate.truth.clone(),
                    differences,
                    match_score: candidate.score,
                });
            }
        }

        // Step 3: 残った正解レコード
        for (truth, used) in ground_truth.iter().zip(&consumed) {
            if !used {
                outcome.report.push(DiscrepancyEntry::UnmatchedGroundTruth {
                    ground_truth: truth.clone(),
                });
                outcome.unmatched_count += 1;
            }
        }

        tracing::debug!(
            processed = processed.len(),
            ground_truth = ground_truth.len(),
            matched = outcome.matched_count,
            unmatched = outcome.unmatched_count,
            "comparison finished"
        );

        outcome
    }

    /// 未使用の正解レコードから最良の候補を探す
    ///
    /// 郵便番号類似度が照合閾値を超える候補のうち重み付きスコア最大のもの。
    /// 同点は先に見つかった方。スコアが閾値未満なら `None`。
    fn find_best_match(
        &self,
        record: &AddressRecord,
        ground_truth: &[AddressRecord],
        consumed: &[bool],
    ) -> Option<(usize, f64)> {
        let threshold = self.options.match_threshold;
        let mut best: Option<(usize, f64)> = None;

        for (idx, truth) in ground_truth.iter().enumerate() {
            if consumed[idx] {
                continue;
            }

            let (postcode_score, total_score) = self.weighted_score(record, truth);
            if postcode_score <= threshold {
                continue;
            }

            if best.map_or(true, |(_, best_score)| total_score > best_score) {
                best = Some((idx, total_score));
            }
        }

        best.filter(|&(_, score)| score >= threshold)
    }

    /// (郵便番号類似度, 重み付きスコア)
    fn weighted_score(&self, record: &AddressRecord, truth: &AddressRecord) -> (f64, f64) {
        let first_name = self.field_ratio(&record.first_name, &truth.first_name);
        let last_name = self.field_ratio(&record.last_name, &truth.last_name);
        let street = self.field_ratio(&record.street_name, &truth.street_name);
        let town = self.field_ratio(&record.town, &truth.town);
        let postcode = self.similarity.ratio(
            &normalize_postcode(&record.postcode),
            &normalize_postcode(&truth.postcode),
        );

        // 郵便番号を最重視
        let total = (postcode * 3.0 + last_name * 2.0 + first_name + street + town) / 8.0;
        (postcode, total)
    }

    fn field_ratio(&self, a: &str, b: &str) -> f64 {
        self.similarity.ratio(&a.to_lowercase(), &b.to_lowercase())
    }

    /// 差分フィールドを `AddressField::ALL` の順で返す
    fn diff_fields(&self, record: &AddressRecord, truth: &AddressRecord) -> Vec<FieldDifference> {
        AddressField::ALL
            .iter()
            .copied()
            .filter(|&field| self.is_different(field, record.get(field), truth.get(field)))
            .map(|field| FieldDifference {
                field,
                processed_value: record.get(field).to_string(),
                expected_value: truth.get(field).to_string(),
            })
            .collect()
    }

    fn is_different(&self, field: AddressField, processed: &str, expected: &str) -> bool {
        match field {
            AddressField::Postcode => normalize_postcode(processed) != normalize_postcode(expected),
            AddressField::Country => processed.to_lowercase() != expected.to_lowercase(),
            _ => self.field_ratio(processed, expected) < self.options.compare_threshold,
        }
    }
}

/// デフォルトの類似度で比較する
pub fn compare(
    processed: &[AddressRecord],
    ground_truth: &[AddressRecord],
    options: &CompareOptions,
) -> ComparisonOutcome {
    Comparator::new(*options).compare(processed, ground_truth)
}

// =============================================
// JSON出力形式
// =============================================

#[derive(Serialize)]
struct EntryRepr<'a> {
    processed_address: Option<&'a AddressRecord>,
    ground_truth: Option<&'a AddressRecord>,
    differences: Vec<DifferenceRepr<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    match_score: Option<f64>,
}

#[derive(Serialize)]
struct DifferenceRepr<'a> {
    field: &'a str,
    processed_value: Option<DiffValue<'a>>,
    expected_value: Option<DiffValue<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum DiffValue<'a> {
    Text(&'a str),
    Record(&'a AddressRecord),
}

impl Serialize for DiscrepancyEntry {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> std::result::Result<Ser::Ok, Ser::Error> {
        let repr = match self {
            DiscrepancyEntry::UnmatchedProcessed { processed } => EntryRepr {
                processed_address: Some(processed),
                ground_truth: None,
                differences: vec![DifferenceRepr {
                    field: MISSING_ENTRY_FIELD,
                    processed_value: Some(DiffValue::Record(processed)),
                    expected_value: None,
                }],
                match_score: None,
            },
            DiscrepancyEntry::FieldMismatch {
                processed,
                ground_truth,
                differences,
                match_score,
            } => EntryRepr {
                processed_address: Some(processed),
                ground_truth: Some(ground_truth),
                differences: differences
                    .iter()
                    .map(|d| DifferenceRepr {
                        field: d.field.as_str(),
                        processed_value: Some(DiffValue::Text(&d.processed_value)),
                        expected_value: Some(DiffValue::Text(&d.expected_value)),
                    })
                    .collect(),
                match_score: Some(*match_score),
            },
            DiscrepancyEntry::UnmatchedGroundTruth { ground_truth } => EntryRepr {
                processed_address: None,
                ground_truth: Some(ground_truth),
                differences: vec![DifferenceRepr {
                    field: MISSING_ENTRY_FIELD,
                    processed_value: None,
                    expected_value: Some(DiffValue::Record(ground_truth)),
                }],
                match_score: None,
            },
        };
        repr.serialize(serializer)
    }
}
