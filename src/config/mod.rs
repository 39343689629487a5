#[cfg(feature = "cli")]
pub mod cli;
pub mod process;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use crate::domain::model::{ExporterSettings, FloorplanSettings, TrainerSettings};
use crate::utils::error::{FloorplanError, Result};
use crate::utils::validation::*;

/// Checks shared by every configuration source.
pub fn validate_settings(
    trainer: &TrainerSettings,
    exporter: &ExporterSettings,
    floorplan: &FloorplanSettings,
) -> Result<()> {
    validate_command("train.command", &trainer.command)?;
    validate_non_empty_string("train.method", &trainer.method)?;
    validate_positive_number("train.max_iterations", trainer.max_iterations, 1)?;

    validate_command("export.command", &exporter.command)?;
    validate_non_empty_string("export.method", &exporter.method)?;
    validate_positive_number("export.num_points", exporter.num_points, 1)?;
    validate_non_empty_string("export.mesh_extension", &exporter.mesh_extension)?;

    validate_floorplan_settings(floorplan)
}

pub fn validate_floorplan_settings(floorplan: &FloorplanSettings) -> Result<()> {
    validate_finite("floorplan.slice_offset", floorplan.slice_offset)?;
    validate_range("floorplan.line_width", floorplan.line_width, 1, 100)?;
    validate_non_empty_string("floorplan.subdirectory", &floorplan.subdirectory)?;
    let Some(margins) = floorplan.margin.checked_mul(2) else {
        return Err(FloorplanError::InvalidConfigValueError {
            field: "floorplan.margin".to_string(),
            value: floorplan.margin.to_string(),
            reason: "Margin is too large for any canvas".to_string(),
        });
    };
    if floorplan.image_size <= margins {
        return Err(FloorplanError::InvalidConfigValueError {
            field: "floorplan.image_size".to_string(),
            value: floorplan.image_size.to_string(),
            reason: format!("Must be larger than twice the margin ({})", floorplan.margin),
        });
    }
    Ok(())
}
