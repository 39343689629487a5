use anyhow::Context;
use clap::Parser;
use nerf_floorplan::core::commands::{export_invocation, train_invocation};
use nerf_floorplan::core::ConfigProvider;
use nerf_floorplan::domain::model::{colmap_sparse_dir, ArtifactSelection};
use nerf_floorplan::utils::error::error_chain;
use nerf_floorplan::utils::{environment, logger, validation::Validate};
use nerf_floorplan::{FloorplanEngine, NerfFloorplanPipeline, ProcessRunner, TomlConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "toml-floorplan")]
#[command(about = "Floor plan pipeline driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "floorplan.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override training iterations from config
    #[arg(long)]
    iterations: Option<u64>,

    /// Show the planned commands without running anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 設定檔需先載入才知道是否輸出 JSON 日誌
    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config.display()))?;

    logger::init_logger(args.verbose, config.json_logs());

    tracing::info!("🚀 Starting TOML-based floor plan pipeline");
    tracing::info!("📁 Loaded configuration from: {}", args.config.display());

    // 應用命令列覆蓋設定
    if let Some(iterations) = args.iterations {
        config.train.max_iterations = iterations;
        tracing::info!("🔧 Training iterations overridden to: {}", iterations);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No tool will be executed");
        perform_dry_run(&config);
        return Ok(());
    }

    environment::log_environment().await;

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
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
            println!("📄 Report: {}", report.report_path().display());
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
            std::process::exit(1);
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    let floorplan = config.floorplan();
    println!("📋 Configuration Summary:");
    println!("  Pipeline: {}", config.name());
    println!("  Data: {}", config.data_dir().display());
    println!(
        "  COLMAP: {}",
        colmap_sparse_dir(config.data_dir(), config.colmap_path()).display()
    );
    println!("  Output: {}", config.output_dir().display());
    println!("  Iterations: {}", config.trainer().max_iterations);
    println!(
        "  Floor plan: {}px canvas, slice {} above floor",
        floorplan.image_size, floorplan.slice_offset
    );

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn describe_selection(selection: &ArtifactSelection, fallback: &str) -> String {
    match selection {
        ArtifactSelection::Explicit(path) => path.display().to_string(),
        ArtifactSelection::NewestModified => fallback.to_string(),
    }
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    let output_dir = config.output_dir();
    let train = train_invocation(
        &config.trainer(),
        config.data_dir(),
        config.colmap_path(),
        output_dir,
    );
    println!("🧠 Training:");
    println!("  {}", train.command_line());

    // 實際的 config.yml 位置要等訓練結束才知道
    let config_path = match config.config_selection() {
        ArtifactSelection::Explicit(path) => path,
        ArtifactSelection::NewestModified => output_dir.join("<run>").join("config.yml"),
    };
    let export_dir = config_path
        .parent()
        .map(|dir| dir.join("exports").join("mesh"))
        .unwrap_or_else(|| PathBuf::from("exports").join("mesh"));
    let export = export_invocation(&config.exporter(), &config_path, &export_dir);
    println!();
    println!("📦 Mesh export:");
    println!("  {}", export.command_line());

    let floorplan = config.floorplan();
    println!();
    println!("🗺️ Floor plan:");
    println!(
        "  Mesh: {}",
        describe_selection(
            &config.mesh_selection(),
            &format!(
                "newest *.{} in {}",
                config.exporter().mesh_extension,
                export_dir.display()
            )
        )
    );
    println!(
        "  Output: {}",
        output_dir.join(&floorplan.subdirectory).display()
    );

    println!();
    println!("✅ Dry run completed - configuration is valid");
}
