use clap::Parser;
use nerf_floorplan::utils::error::error_chain;
use nerf_floorplan::utils::{environment, logger, validation::Validate};
use nerf_floorplan::{CliConfig, FloorplanEngine, NerfFloorplanPipeline, ProcessRunner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(config.verbose, config.json_logs);

    tracing::info!("Starting nerf-floorplan");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    environment::log_environment().await;

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = NerfFloorplanPipeline::new(ProcessRunner::new(), config);
    let engine = FloorplanEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(report) => {
            println!("✅ Floor plan generated in {} ms", report.total_duration_ms());
            println!("📁 PNG: {}", report.floorplan.png_path.display());
            println!("📁 SVG: {}", report.floorplan.svg_path.display());
        }
        Err(e) => {
            tracing::error!(
                "❌ Pipeline failed: {} (Category: {:?}, Severity: {:?})",
                error_chain(&e),
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 任何階段失敗皆以 1 結束
            std::process::exit(1);
        }
    }

    Ok(())
}
