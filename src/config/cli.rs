use crate::config::validate_settings;
use crate::core::ConfigProvider;
use crate::domain::model::{ArtifactSelection, ExporterSettings, FloorplanSettings, TrainerSettings};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(name = "nerf-floorplan")]
#[command(about = "Generate floor plan from images: COLMAP data -> NeRF -> mesh -> floor plan")]
pub struct CliConfig {
    /// Path to data directory
    #[arg(long, default_value = "/workspace/data/room_1")]
    pub data: PathBuf,

    /// Path to output directory
    #[arg(long, default_value = "/workspace/output/room_1")]
    pub output: PathBuf,

    /// Training iterations (reduce for faster testing)
    #[arg(long, default_value = "10000")]
    pub iterations: u64,

    /// COLMAP sparse model, relative to the data directory
    #[arg(long, default_value = "colmap/sparse/0")]
    pub colmap_path: String,

    /// Trainer command prefix, split on whitespace
    #[arg(long, default_value = "ns-train")]
    pub trainer_cmd: String,

    /// Exporter command prefix, split on whitespace
    #[arg(long, default_value = "ns-export")]
    pub exporter_cmd: String,

    /// Target point count for the Poisson export
    #[arg(long, default_value = "1000000")]
    pub num_points: u64,

    /// Keep outliers during export
    #[arg(long)]
    pub keep_outliers: bool,

    /// Slice height above the mesh's lowest point, in mesh units
    #[arg(long, default_value = "0.1")]
    pub slice_offset: f64,

    /// Edge length of the square PNG canvas
    #[arg(long, default_value = "2000")]
    pub image_size: u32,

    /// Use this training config instead of the newest config.yml
    #[arg(long)]
    pub config_path: Option<PathBuf>,

    /// Use this mesh instead of the newest exported one
    #[arg(long)]
    pub mesh_path: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per stage")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

pub(crate) fn split_command(command: &str) -> Vec<String> {
    command.split_whitespace().map(str::to_string).collect()
}

impl ConfigProvider for CliConfig {
    fn data_dir(&self) -> &Path {
        &self.data
    }

    fn output_dir(&self) -> &Path {
        &self.output
    }

    fn colmap_path(&self) -> &str {
        &self.colmap_path
    }

    fn trainer(&self) -> TrainerSettings {
        TrainerSettings {
            command: split_command(&self.trainer_cmd),
            max_iterations: self.iterations,
            ..TrainerSettings::default()
        }
    }

    fn exporter(&self) -> ExporterSettings {
        ExporterSettings {
            command: split_command(&self.exporter_cmd),
            num_points: self.num_points,
            remove_outliers: !self.keep_outliers,
            ..ExporterSettings::default()
        }
    }

    fn floorplan(&self) -> FloorplanSettings {
        FloorplanSettings {
            slice_offset: self.slice_offset,
            image_size: self.image_size,
            ..FloorplanSettings::default()
        }
    }

    fn config_selection(&self) -> ArtifactSelection {
        ArtifactSelection::from_override(self.config_path.clone())
    }

    fn mesh_selection(&self) -> ArtifactSelection {
        ArtifactSelection::from_override(self.mesh_path.clone())
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("data", &self.data)?;
        validation::validate_path("output", &self.output)?;
        validation::validate_non_empty_string("colmap_path", &self.colmap_path)?;
        validate_settings(&self.trainer(), &self.exporter(), &self.floorplan())
    }
}
