use address_eval::{cli, config, data, error, processor, report, runner};
use address_eval_common::{Comparator, PromptBook, PromptKind};
use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load().context("設定の読み込みに失敗")?;
    if let Some(provider) = cli.ai_provider {
        config.ai_provider = provider;
    }

    match cli.command {
        Commands::Run {
            input,
            ground_truth,
            output,
            prompts,
            prompt_version,
            workers,
            match_threshold,
            compare_threshold,
        } => {
            println!("🏠 address-eval - 一括評価\n");
            let started_at = chrono::Local::now().naive_local();

            if let Some(version) = prompt_version {
                config.prompt_version = version;
            }
            if let Some(workers) = workers {
                config.workers = workers;
            }
            apply_thresholds(&mut config, match_threshold, compare_threshold);
            let options = config.compare_options()?;

            // 1. 正解データ
            println!("[1/3] 正解データを読み込み中...");
            let truth = data::read_records(&ground_truth)
                .with_context(|| format!("正解データ: {}", ground_truth.display()))?;
            if truth.is_empty() {
                return Err(error::EvalError::GroundTruthEmpty(ground_truth.display().to_string()).into());
            }
            println!("✔ {}件の正解レコード\n", truth.len());

            // 2. 入力ファイル
            println!("[2/3] 入力CSVをスキャン中...");
            let files = data::scan_input_dir(&input)?;
            if files.is_empty() {
                return Err(error::EvalError::NoInputFiles(input.display().to_string()).into());
            }
            println!("✔ {}件のCSVを検出\n", files.len());

            let book = PromptBook::load(&prompts)?;
            let processor = processor::CliProcessor::new(
                config.ai_provider,
                config.model.clone(),
                &book,
                &config.prompt_version,
                config.timeout_seconds,
            )?;
            let prompts_used = vec![
                (
                    "Separate Addresses Prompt".to_string(),
                    book.get(PromptKind::SeparateAddresses, &config.prompt_version)?.to_string(),
                ),
                (
                    "Format Addresses Prompt".to_string(),
                    book.get(PromptKind::FormatAddresses, &config.prompt_version)?.to_string(),
                ),
            ];

            // 3. 評価
            println!(
                "[3/3] AI処理・比較中... ({} / 並列{})",
                config.ai_provider, config.workers
            );
            let progress = ProgressBar::new(files.len() as u64);
            progress.set_style(
                ProgressStyle::with_template("  {bar:40} {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );

            let settings = runner::RunSettings {
                output_dir: output.clone(),
                workers: config.workers,
                address_workers: config.address_workers,
                options,
            };
            let outcomes = runner::run_all(
                Arc::new(processor),
                &files,
                Arc::new(truth),
                Arc::new(settings),
                &progress,
            )
            .await;
            progress.finish_and_clear();

            let report = report::TestReport::new(started_at, prompts_used, outcomes);
            let report_path = report.write(&output)?;

            println!(
                "✔ 合格 {} / 不合格 {} （全{}件）",
                report.total_passes(),
                report.total_failures(),
                report.total_files()
            );
            println!("✔ レポートを保存: {}", report_path.display());
            println!("\n✅ 評価完了");
        }

        Commands::Compare {
            processed,
            ground_truth,
            output,
            match_threshold,
            compare_threshold,
        } => {
            println!("🔍 address-eval - 比較\n");
            apply_thresholds(&mut config, match_threshold, compare_threshold);
            let options = config.compare_options()?;

            let records = data::read_records(&processed)
                .with_context(|| format!("構造化データ: {}", processed.display()))?;
            let truth = data::read_records(&ground_truth)
                .with_context(|| format!("正解データ: {}", ground_truth.display()))?;

            let outcome = Comparator::new(options).compare(&records, &truth);

            println!("  一致: {}", outcome.matched_count);
            println!("  差分あり: {}", outcome.mismatch_count());
            println!("  欠落: {}", outcome.unmatched_count);
            tracing::debug!(
                legacy_total = outcome.legacy_unmatched_total(),
                "legacy unmatched-or-differing total"
            );

            if let Some(path) = output {
                data::save_json(&path, &outcome.report)?;
                println!("✔ 比較結果を保存: {}", path.display());
            }

            println!(
                "\n{}",
                if outcome.is_pass() { "✅ PASS" } else { "❌ FAILED" }
            );
        }

        Commands::Config {
            set_model,
            set_workers,
            set_match_threshold,
            set_compare_threshold,
            show,
        } => {
            let mut changed = false;

            if let Some(model) = set_model {
                config.model = Some(model);
                changed = true;
            }
            if let Some(workers) = set_workers {
                config.workers = workers;
                changed = true;
            }
            if set_match_threshold.is_some() || set_compare_threshold.is_some() {
                apply_thresholds(&mut config, set_match_threshold, set_compare_threshold);
                config.compare_options()?;
                changed = true;
            }
            if cli.ai_provider.is_some() {
                changed = true;
            }

            if changed {
                config.save()?;
                println!("✔ 設定を保存しました");
            }

            if show || !changed {
                println!("設定:");
                println!("  AIプロバイダ: {}", config.ai_provider);
                println!("  モデル: {}", config.model.as_deref().unwrap_or("(CLIデフォルト)"));
                println!("  並列ファイル数: {}", config.workers);
                println!("  並列住所数: {}", config.address_workers);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  照合閾値: {}", config.match_threshold);
                println!("  比較閾値: {}", config.compare_threshold);
                println!("  プロンプト: {}", config.prompt_version);
            }
        }
    }

    Ok(())
}

fn apply_thresholds(config: &mut Config, match_threshold: Option<f64>, compare_threshold: Option<f64>) {
    if let Some(value) = match_threshold {
        config.match_threshold = value;
    }
    if let Some(value) = compare_threshold {
        config.compare_threshold = value;
    }
}

fn init_tracing(verbose: bool) {
    // RUST_LOG未指定時は警告のみ、--verboseでdebug
    let default_directive = if verbose { "address_eval=debug,address_eval_common=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
