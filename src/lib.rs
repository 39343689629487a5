pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod floorplan;
pub mod geometry;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::pipelines::NerfFloorplanPipeline;
pub use config::{process::ProcessRunner, toml_config::TomlConfig};
pub use core::engine::FloorplanEngine;
pub use floorplan::FloorplanRenderer;
pub use utils::error::{FloorplanError, Result};
