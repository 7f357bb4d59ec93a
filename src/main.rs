use clap::Parser;
use storefront_etl::utils::error::EtlError;
use storefront_etl::utils::logger;
use storefront_etl::{CliConfig, EtlEngine, LocalStorage, RunConfig, SourcePipeline};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting storefront-etl for source '{}'", cli.source);
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = RunConfig::from_cli(&cli).unwrap_or_else(|e| fail(e));

    if cli.dry_run {
        display_config_summary(&config);
        return;
    }

    let storage = LocalStorage::new(".");
    let pipeline = SourcePipeline::new(storage, config);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(summary) => {
            println!(
                "Done. Saved {} rows to {}",
                summary.row_count, summary.output_path
            );
        }
        Err(e) => fail(e),
    }
}

fn fail(e: EtlError) -> ! {
    tracing::error!("❌ ETL process failed: {} (Severity: {:?})", e, e.severity());
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

fn display_config_summary(config: &RunConfig) {
    println!("📋 Configuration Summary:");
    println!("  Source: {}", config.source);
    println!("  Input: {}", config.input_path);
    println!("  Output: {}", config.output_path);
    println!(
        "  Year window: {}-{}",
        config.year_window.min, config.year_window.max
    );
    println!("  Tag labels: {}", config.tag_labels.len());
    println!("  Currency rates: {}", config.currency_rates.len());
}
