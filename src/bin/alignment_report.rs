use std::path::{Path, PathBuf};

use bitext_align::{
    build_report, evaluate_threshold, load_fixture_cases, write_report, AlignerConfig,
    EnglishTokenizer, Tokenizer,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

const DEFAULT_THRESHOLDS: &str = "0,0.001,0.01,0.05,0.1,0.2,0.5";

#[derive(Debug, Parser)]
#[command(name = "alignment_report")]
#[command(about = "Replay recorded predictions and sweep the minimum-confidence threshold")]
struct Args {
    #[arg(
        long,
        env = "BITEXT_REPORT_FIXTURES",
        default_value = "test-data/alignment_fixtures.json"
    )]
    fixtures: PathBuf,
    #[arg(long, env = "BITEXT_REPORT_OUT")]
    out: Option<PathBuf>,
    #[arg(
        long,
        env = "BITEXT_REPORT_THRESHOLDS",
        value_delimiter = ',',
        default_value = DEFAULT_THRESHOLDS
    )]
    thresholds: Vec<f64>,
    /// Aligner config providing the Japanese dictionary for cases without TO tokens.
    #[arg(long, env = "BITEXT_REPORT_CONFIG")]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    let repo_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let fixtures_path = resolve_path(&repo_root, &args.fixtures);
    if args.thresholds.is_empty() {
        return Err("--thresholds must name at least one value.".to_string());
    }

    let cases = load_fixture_cases(&fixtures_path)
        .map_err(|err| format!("Failed to load fixtures '{}': {err}", fixtures_path.display()))?;
    if cases.is_empty() {
        return Err(format!("No cases found in '{}'.", fixtures_path.display()));
    }

    let config = match args.config.as_ref() {
        Some(path) => AlignerConfig::load(&resolve_path(&repo_root, path))
            .map_err(|err| format!("Failed to load aligner config: {err}"))?,
        None => AlignerConfig::default(),
    };
    let from_tokenizer = EnglishTokenizer;
    let to_tokenizer = build_to_tokenizer(&config)?;

    let progress = ProgressBar::new(args.thresholds.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} thresholds ({elapsed})")
            .map_err(|err| format!("Invalid progress template: {err}"))?,
    );
    let mut reports = Vec::with_capacity(args.thresholds.len());
    for &threshold in &args.thresholds {
        let report =
            evaluate_threshold(&cases, &from_tokenizer, to_tokenizer.as_ref(), threshold)
                .map_err(|err| format!("Replay failed at min_confidence={threshold}: {err}"))?;
        reports.push(report);
        progress.inc(1);
    }
    progress.finish_and_clear();

    for report in &reports {
        println!(
            "min_confidence={:<8} matched={}/{} ratio={:.3}",
            report.min_confidence,
            report.matched,
            cases.len(),
            report.match_ratio
        );
    }

    let report = build_report(&fixtures_path, cases.len(), reports);
    if let Some(best) = report.best_min_confidence {
        println!("best_min_confidence={best}");
    }
    if let Some(out) = args.out.as_ref() {
        let out_path = resolve_path(&repo_root, out);
        write_report(&out_path, &report)
            .map_err(|err| format!("Failed to write report '{}': {err}", out_path.display()))?;
        println!("{}", out_path.display());
    }
    Ok(())
}

#[cfg(feature = "japanese")]
fn build_to_tokenizer(config: &AlignerConfig) -> Result<Box<dyn Tokenizer>, String> {
    match config.japanese_dictionary_path.as_deref() {
        Some(path) => bitext_align::JapaneseTokenizer::from_dictionary_path(Path::new(path))
            .map(|t| Box::new(t) as Box<dyn Tokenizer>)
            .map_err(|err| format!("Failed to load Japanese tokenizer: {err}")),
        None => Ok(Box::new(EnglishTokenizer)),
    }
}

#[cfg(not(feature = "japanese"))]
fn build_to_tokenizer(_config: &AlignerConfig) -> Result<Box<dyn Tokenizer>, String> {
    Ok(Box::new(EnglishTokenizer))
}

fn resolve_path(repo_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        repo_root.join(path)
    }
}
