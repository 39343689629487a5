use anyhow::Context;
use clap::Parser;
use nerf_floorplan::config::validate_floorplan_settings;
use nerf_floorplan::domain::model::FloorplanSettings;
use nerf_floorplan::utils::error::error_chain;
use nerf_floorplan::utils::{logger, validation};
use nerf_floorplan::FloorplanRenderer;
use std::path::PathBuf;

/// Re-slices an existing mesh without retraining.
#[derive(Parser, Debug)]
#[command(name = "mesh-floorplan")]
#[command(about = "Generate a floor plan from an existing mesh file")]
struct Args {
    /// Mesh file (PLY)
    #[arg(long)]
    mesh: PathBuf,

    /// Directory for floorplan.svg and floorplan.png
    #[arg(long)]
    output: PathBuf,

    /// Slice height above the mesh's lowest point
    #[arg(long, default_value = "0.1")]
    slice_offset: f64,

    /// Edge length of the square PNG canvas
    #[arg(long, default_value = "2000")]
    image_size: u32,

    /// Stroke width in pixels
    #[arg(long, default_value = "5")]
    line_width: u32,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let settings = FloorplanSettings {
        slice_offset: args.slice_offset,
        image_size: args.image_size,
        line_width: args.line_width,
        ..FloorplanSettings::default()
    };
    validation::validate_path("mesh", &args.mesh)?;
    validate_floorplan_settings(&settings)?;

    let renderer = FloorplanRenderer::new(settings);
    let (mesh, output) = (args.mesh.clone(), args.output.clone());
    let outcome = tokio::task::spawn_blocking(move || renderer.render(&mesh, &output))
        .await
        .context("floor plan task aborted")?;

    match outcome {
        Ok(outputs) => {
            println!(
                "✅ Sliced at {:.4}: {} entities",
                outputs.slice_height, outputs.entity_count
            );
            println!("📁 PNG: {}", outputs.png_path.display());
            println!("📁 SVG: {}", outputs.svg_path.display());
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ Error generating floor plan: {}", error_chain(&e));
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    }
}
