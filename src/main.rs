use clap::Parser;
use sheet_insight::adapters::narrator_from_config;
use sheet_insight::core::report_text::format_text_report;
use sheet_insight::core::{ConfigProvider, Storage};
use sheet_insight::utils::error::ErrorSeverity;
use sheet_insight::utils::logger::{self, LogFormat};
use sheet_insight::utils::validation::Validate;
use sheet_insight::{
    Analyzer, CliConfig, InMemoryRateLimitStore, InsightError, LocalStorage, RateLimiter,
    ReportEngine, ReportWriter, TomlConfig, Upload,
};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    let log_format = if args.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logger::init_logger(log_format, args.verbose);
    tracing::info!("Starting sheet-insight");

    let outcome = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TomlConfig::from_file(path) {
                Ok(config) => run(&config, &args.input, &args.caller_id).await,
                Err(e) => Err(e),
            }
        }
        None => run(&args, &args.input, &args.caller_id).await,
    };

    match outcome {
        Ok(archive_path) => {
            tracing::info!("📁 Report saved to: {}", archive_path);
            println!("📁 Report saved to: {}", archive_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Analysis failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

async fn run<C: ConfigProvider + Validate>(
    config: &C,
    input: &str,
    caller_id: &str,
) -> Result<String, InsightError> {
    config.validate()?;

    let input_path = Path::new(input);
    let filename = input_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| InsightError::InvalidConfigValueError {
            field: "input".to_string(),
            value: input.to_string(),
            reason: "Input must name a file".to_string(),
        })?;
    let source_dir = input_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let bytes = LocalStorage::new(source_dir).read_file(filename).await?;

    let narrator = narrator_from_config(config)?;
    let analyzer = Analyzer::new(narrator).with_sample_rows(config.sample_rows());
    let limiter = RateLimiter::new(InMemoryRateLimitStore::new(), config.requests_per_minute());
    let engine =
        ReportEngine::new(analyzer, limiter).with_max_file_bytes(config.max_file_bytes());

    let report = engine.run(&Upload::new(caller_id, filename, bytes)).await?;

    println!("{}", format_text_report(&report.analysis, report.generated_at));

    let storage = LocalStorage::new(config.output_path());
    let writer = ReportWriter::new(storage, config.output_path());
    writer.write(&report).await
}
