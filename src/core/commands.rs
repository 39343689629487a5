//! Argument lists for the trainer and the mesh exporter.

use std::path::Path;

use crate::domain::model::{ExporterSettings, ToolInvocation, TrainerSettings};

/// `<trainer> <method> --output-dir .. --max-num-iterations .. <dataparser> --data .. --colmap-path ..`
///
/// Options before the dataparser name belong to the method; the ones after it
/// are parsed by the dataparser, and `--colmap-path` is relative to `--data`.
pub fn train_invocation(
    settings: &TrainerSettings,
    data_dir: &Path,
    colmap_path: &str,
    output_dir: &Path,
) -> ToolInvocation {
    let args = vec![
        settings.method.clone(),
        "--output-dir".to_string(),
        output_dir.display().to_string(),
        "--max-num-iterations".to_string(),
        settings.max_iterations.to_string(),
        settings.dataparser.clone(),
        "--data".to_string(),
        data_dir.display().to_string(),
        "--colmap-path".to_string(),
        colmap_path.to_string(),
    ];
    ToolInvocation::from_command(&settings.command, args)
}

pub fn export_invocation(
    settings: &ExporterSettings,
    config_path: &Path,
    export_dir: &Path,
) -> ToolInvocation {
    let args = vec![
        settings.method.clone(),
        "--load-config".to_string(),
        config_path.display().to_string(),
        "--output-dir".to_string(),
        export_dir.display().to_string(),
        "--num-points".to_string(),
        settings.num_points.to_string(),
        "--remove-outliers".to_string(),
        python_bool(settings.remove_outliers).to_string(),
    ];
    ToolInvocation::from_command(&settings.command, args)
}

fn python_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}
