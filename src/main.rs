use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use log::info;

use expensebot::config::{Cli, Settings, SourceKind};
use expensebot::parser::AmountExtractor;
use expensebot::report::ReportWriter;
use expensebot::retry::RetryConfig;
use expensebot::scanner::HistoryAggregator;
use expensebot::source::{BotUpdatesSource, ExportSource, MessageSource};
use expensebot::utils::Logger;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载环境变量
    dotenv().ok();

    // 加载配置，命令行参数优先
    let cli = Cli::parse();
    let settings = cli.apply(Settings::new()?);

    // 初始化日志，级别来自 RUST_LOG（默认 info）
    Logger::init(&settings.log_level);

    Logger::log_operation_start("ExpenseBot", "Scanning conversation history");

    if let Err(e) = run(settings).await {
        Logger::log_operation_failure("ExpenseBot", &e.to_string());
        return Err(e);
    }

    println!("Done.");
    Ok(())
}

async fn run(settings: Settings) -> Result<()> {
    settings.validate()?;
    Logger::log_operation_success("Configuration", "Settings loaded successfully");

    info!("📊 Configuration:");
    info!("  - Group: {}", settings.group_name);
    info!("  - Output: {}", settings.output_dir.display());
    info!("  - Progress interval: {}", settings.progress_interval);

    let extractor = AmountExtractor::with_tokens(&settings.currency_tokens, &settings.payment_stems)?;
    let aggregator =
        HistoryAggregator::new(extractor).with_progress_interval(settings.progress_interval);

    let source: Box<dyn MessageSource> = match settings.source()? {
        SourceKind::Export(path) => Box::new(ExportSource::open(&path).await?),
        SourceKind::Bot(token) => {
            let retry = RetryConfig::with_attempts(settings.max_retry_attempts);
            Box::new(BotUpdatesSource::connect(teloxide::Bot::new(token), retry).await?)
        }
    };

    let scan = aggregator.scan(source.as_ref(), &settings.group_name).await?;

    let writer = ReportWriter::new(&settings.output_dir);
    writer.write(&scan)?;

    if let Some(summary) = ReportWriter::summary_line(&scan) {
        println!("\n{summary}");
    }

    Ok(())
}
