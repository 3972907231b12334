use clap::{Parser, Subcommand};
use crate::ai_provider::AiProvider;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "address-eval")]
#[command(about = "住所正規化パイプライン評価ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// AIプロバイダ (claude/codex/gemini)（省略時は設定ファイルの値）
    #[arg(long, global = true)]
    pub ai_provider: Option<AiProvider>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 入力CSVを分割・構造化して正解データと比較
    Run {
        /// 入力CSVフォルダ
        #[arg(short, long, default_value = "input_data")]
        input: PathBuf,

        /// 正解データJSON
        #[arg(short, long, default_value = "ground_truth.json")]
        ground_truth: PathBuf,

        /// 出力フォルダ
        #[arg(short, long, default_value = "output_data")]
        output: PathBuf,

        /// プロンプトJSONファイル（なければ組み込みプロンプト）
        #[arg(long, default_value = "prompts/prompts.json")]
        prompts: PathBuf,

        /// プロンプトバージョン
        #[arg(long)]
        prompt_version: Option<String>,

        /// 同時処理ファイル数
        #[arg(short, long)]
        workers: Option<usize>,

        /// 照合閾値（0-100）
        #[arg(long)]
        match_threshold: Option<f64>,

        /// 比較閾値（0-100）
        #[arg(long)]
        compare_threshold: Option<f64>,
    },

    /// 構造化済みJSONを正解データと比較（AI呼び出しなし）
    Compare {
        /// 構造化済み住所JSON
        #[arg(required = true)]
        processed: PathBuf,

        /// 正解データJSON
        #[arg(short, long, default_value = "ground_truth.json")]
        ground_truth: PathBuf,

        /// 比較結果JSONの出力先
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 照合閾値（0-100）
        #[arg(long)]
        match_threshold: Option<f64>,

        /// 比較閾値（0-100）
        #[arg(long)]
        compare_threshold: Option<f64>,
    },

    /// 設定を表示/編集
    Config {
        /// モデルを設定
        #[arg(long)]
        set_model: Option<String>,

        /// 同時処理ファイル数を設定
        #[arg(long)]
        set_workers: Option<usize>,

        /// 照合閾値を設定
        #[arg(long)]
        set_match_threshold: Option<f64>,

        /// 比較閾値を設定
        #[arg(long)]
        set_compare_threshold: Option<f64>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
