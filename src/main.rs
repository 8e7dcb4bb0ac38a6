use clap::Parser;
use home_advantage_etl::utils::{logger, validation::Validate};
use home_advantage_etl::{CliConfig, DataModelPipeline, EtlEngine, LocalStorage};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌，詳細程度交由 RUST_LOG 控制
    logger::init_cli_logger(false);

    tracing::info!("Starting home-advantage-etl");
    tracing::debug!("CLI config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code().max(1));
    }

    let storage = LocalStorage::new(config.data_path.clone());
    let pipeline = DataModelPipeline::new(storage, config);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Data model written to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Data model build failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(e.exit_code().max(1));
        }
    }
}
