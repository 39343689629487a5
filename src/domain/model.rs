use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_COLMAP_PATH: &str = "colmap/sparse/0";
pub const TRAINING_CONFIG_NAME: &str = "config.yml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerSettings {
    /// Program plus any leading arguments, e.g. `["conda", "run", "-n", "nerf", "ns-train"]`.
    pub command: Vec<String>,
    pub method: String,
    pub dataparser: String,
    pub max_iterations: u64,
}

impl Default for TrainerSettings {
    fn default() -> Self {
        Self {
            command: vec!["ns-train".to_string()],
            method: "nerfacto".to_string(),
            dataparser: "colmap".to_string(),
            max_iterations: 10000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterSettings {
    pub command: Vec<String>,
    pub method: String,
    pub num_points: u64,
    pub remove_outliers: bool,
    pub mesh_extension: String,
}

impl Default for ExporterSettings {
    fn default() -> Self {
        Self {
            command: vec!["ns-export".to_string()],
            method: "poisson".to_string(),
            num_points: 1_000_000,
            remove_outliers: true,
            mesh_extension: "ply".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorplanSettings {
    /// Added to the mesh's minimum Z, in the mesh's own units.
    pub slice_offset: f64,
    pub image_size: u32,
    pub margin: u32,
    pub line_width: u32,
    pub subdirectory: String,
}

impl Default for FloorplanSettings {
    fn default() -> Self {
        Self {
            slice_offset: 0.1,
            image_size: 2000,
            margin: 50,
            line_width: 5,
            subdirectory: "floorplan".to_string(),
        }
    }
}

/// How an artifact produced by an external tool is picked.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArtifactSelection {
    /// Scan for candidates and take the one modified last.
    #[default]
    NewestModified,
    /// Use exactly this file.
    Explicit(PathBuf),
}

impl ArtifactSelection {
    pub fn from_override(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => ArtifactSelection::Explicit(path),
            None => ArtifactSelection::NewestModified,
        }
    }
}

/// A fully-resolved external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolInvocation {
    /// Splits a command prefix into program and leading arguments, then appends `args`.
    pub fn from_command(command: &[String], args: Vec<String>) -> Self {
        let (program, prefix) = match command.split_first() {
            Some((program, prefix)) => (program.clone(), prefix.to_vec()),
            None => (String::new(), Vec::new()),
        };
        let mut all_args = prefix;
        all_args.extend(args);
        Self {
            program,
            args: all_args,
        }
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Exit status of an external tool. `code` is `None` when killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolStatus {
    pub code: Option<i32>,
}

impl ToolStatus {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingArtifact {
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeshArtifact {
    pub config_path: PathBuf,
    pub export_dir: PathBuf,
    pub mesh_path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct FloorplanOutputs {
    pub directory: PathBuf,
    pub svg_path: PathBuf,
    pub png_path: PathBuf,
    pub slice_height: f64,
    pub mesh_vertex_count: usize,
    pub section_vertex_count: usize,
    pub entity_count: usize,
    /// Row-major transform from SVG/section coordinates back to mesh space.
    pub plane_to_world: [[f64; 4]; 4],
}

#[derive(Debug, Clone, Serialize)]
pub struct StageTiming {
    pub stage: String,
    pub duration_ms: u128,
}

/// Summary of one pipeline run, saved next to the floor plan.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub training: TrainingArtifact,
    pub mesh: MeshArtifact,
    pub floorplan: FloorplanOutputs,
    pub stages: Vec<StageTiming>,
}

impl PipelineReport {
    pub const FILE_NAME: &'static str = "pipeline_report.json";

    pub fn total_duration_ms(&self) -> u128 {
        self.stages.iter().map(|s| s.duration_ms).sum()
    }

    pub fn report_path(&self) -> PathBuf {
        self.floorplan.directory.join(Self::FILE_NAME)
    }

    pub fn save(&self) -> crate::utils::error::Result<PathBuf> {
        let path = self.report_path();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}

pub fn colmap_sparse_dir(data_dir: &Path, colmap_path: &str) -> PathBuf {
    data_dir.join(colmap_path)
}
