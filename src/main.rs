use clap::Parser;
use creator_etl::domain::ports::ConfigProvider;
use creator_etl::utils::{logger, validation::Validate};
use creator_etl::{CliConfig, CreatorPipeline, ImportEngine, ImportSummary, LocalStorage, TomlConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);

    tracing::info!("starting creator-etl");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Some(config_path) = &cli.config {
        let config = TomlConfig::from_file(config_path)?;
        if let Err(e) = config.validate() {
            tracing::error!("configuration validation failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
        run(config).await
    } else {
        if let Err(e) = cli.validate() {
            tracing::error!("configuration validation failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
        run(cli).await
    }
}

async fn run<C: ConfigProvider + 'static>(config: C) -> Result<(), Box<dyn std::error::Error>> {
    let storage = LocalStorage::new(".".to_string());
    let pipeline = CreatorPipeline::new(storage, config);
    let engine = ImportEngine::new(pipeline);

    match engine.run().await {
        Ok((summary, output_path)) => {
            print_summary(&summary);
            println!("📁 Output saved to: {}", output_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!("import failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}

fn print_summary(summary: &ImportSummary) {
    println!("✅ Import completed");
    println!(
        "   {} records processed, {} accepted, {} filtered, {} duplicates",
        summary.total, summary.accepted, summary.filtered, summary.duplicates
    );
    println!(
        "   follower bounds: {} ~ {}",
        summary.min_followers, summary.max_followers
    );
}
