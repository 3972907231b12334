//! 文字列類似度
//!
//! 比較エンジンは `Similarity` トレイト経由で類似度を受け取るため、
//! アルゴリズムを差し替えても照合・差分ロジックは変わらない。

/// 文字列類似度（0-100、100 = 完全一致）
///
/// 実装は対称・単調で、同一文字列に100を返すこと。
/// 大文字小文字の正規化は呼び出し側で済ませる。
pub trait Similarity {
    fn ratio(&self, a: &str, b: &str) -> f64;
}

impl<F> Similarity for F
where
    F: Fn(&str, &str) -> f64,
{
    fn ratio(&self, a: &str, b: &str) -> f64 {
        self(a, b)
    }
}

/// 挿入・削除のみの編集距離による類似度（デフォルト）
///
/// `(len(a) + len(b) - distance) / (len(a) + len(b))` を整数パーセントに丸める。
/// 置換は削除+挿入の2操作として数える。
/// 端数0.5は偶数側に丸める（62.5 → 62, 87.5 → 88）。
#[derive(Debug, Clone, Copy, Default)]
pub struct IndelRatio;

impl Similarity for IndelRatio {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        if a == b {
            return 100.0;
        }

        let total = a.chars().count() + b.chars().count();
        let distance = edit_distance(a, b, 2);

        (100.0 * (total - distance) as f64 / total as f64).round_ties_even()
    }
}

/// 最大文字数で正規化したレーベンシュタイン類似度
#[derive(Debug, Clone, Copy, Default)]
pub struct LevenshteinRatio;

impl Similarity for LevenshteinRatio {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        if a == b {
            return 100.0;
        }

        let distance = edit_distance(a, b, 1);
        let max_len = a.chars().count().max(b.chars().count());

        100.0 * (1.0 - distance as f64 / max_len as f64)
    }
}

/// 編集距離（置換コストを指定）
fn edit_distance(a: &str, b: &str, substitution_cost: usize) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    // 1行分だけ保持
    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr[0] = i;
        for j in 1..=b_len {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { substitution_cost };
            curr[j] = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}
