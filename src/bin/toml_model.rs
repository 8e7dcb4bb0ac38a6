use clap::Parser;
use home_advantage_etl::core::ConfigProvider;
use home_advantage_etl::utils::{logger, validation::Validate};
use home_advantage_etl::{DataModelPipeline, EtlEngine, LocalStorage, TomlConfig};
use std::path::Path;

#[derive(Parser)]
#[command(name = "toml-model")]
#[command(about = "Build the home advantage data model from a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "model-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the competitiveness threshold from config
    #[arg(long, allow_negative_numbers = true)]
    threshold: Option<i64>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if args.verbose {
        logger::init_cli_logger(true);
    } else {
        logger::init_configured_logger(config.log_level(), config.json_logs());
    }

    tracing::info!("🚀 Starting TOML-based data model build");
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(threshold) = args.threshold {
        config.override_threshold(threshold);
        tracing::info!("🔧 Competitiveness threshold overridden to: {}", threshold);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code().max(1));
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    log_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config);
        return;
    }

    // 決定監控設定
    let monitor_enabled = args
        .monitor
        .unwrap_or_else(|| config.system_stats_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.data_path().to_string());
    let pipeline = DataModelPipeline::new(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Data model build completed successfully!");
            println!("✅ Data model written to: {}", output_path);
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
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            std::process::exit(e.exit_code().max(1));
        }
    }
}

fn log_config_summary(config: &TomlConfig) {
    tracing::info!(
        "📋 Pipeline: {} v{}",
        config.pipeline.name,
        config.pipeline.version.as_deref().unwrap_or("-")
    );
    tracing::info!(
        "📋 Tables: {} + {} in {}",
        config.match_file(),
        config.group_file(),
        config.data_path()
    );
    tracing::info!(
        "📋 Output: {} ({:?} profile)",
        config.output_file(),
        config.output_profile()
    );
    tracing::info!("📋 Filter: {}", config.competitiveness().describe());
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis: {}", config.pipeline.name);
    println!("  Filter: {}", config.competitiveness().describe());
    println!("  Profile: {:?}", config.output_profile());
    println!();

    // 輸入檔案檢查
    println!("📡 Input Tables:");
    for file in [config.match_file(), config.group_file()] {
        let path = Path::new(config.data_path()).join(file);
        let status = if path.is_file() { "found" } else { "MISSING" };
        println!("  {} ({})", path.display(), status);
    }

    println!();
    println!("⚙️ Processing:");
    println!(
        "  Duplicate standings: {:?}",
        config.duplicate_policy()
    );
    println!(
        "  Undetermined winners: {}",
        if config.drop_undetermined() { "dropped" } else { "kept with empty Winner" }
    );

    // 輸出分析
    println!();
    println!("💾 Output Configuration:");
    let formats: Vec<&str> = config
        .output_formats()
        .iter()
        .map(|f| f.extension())
        .collect();
    println!("  Formats: {}", formats.join(", "));
    if let Some(bundle) = config.bundle_filename() {
        println!("  Compression: {} (ZIP)", bundle);
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
