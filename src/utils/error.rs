use std::path::PathBuf;
use thiserror::Error;

use crate::geometry::mesh::MeshError;

#[derive(Error, Debug)]
pub enum FloorplanError {
    #[error("{what} not found: {}", path.display())]
    MissingInput { what: String, path: PathBuf },

    #[error("{tool} exited with {}", describe_exit(*code))]
    ExternalToolFailure { tool: String, code: Option<i32> },

    #[error("Failed to launch {tool}")]
    ToolLaunch {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No {artifact} found under {}", location.display())]
    MissingArtifact { artifact: String, location: PathBuf },

    #[error("No valid slice at height {height}")]
    NoValidSlice { height: f64 },

    #[error("Floor plan rasterization failed: {message}")]
    Rasterization { message: String },

    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

pub type Result<T> = std::result::Result<T, FloorplanError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    MissingInput,
    ExternalTool,
    MissingArtifact,
    NoValidSlice,
    Rasterization,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl FloorplanError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FloorplanError::MissingInput { .. } => ErrorCategory::MissingInput,
            FloorplanError::ExternalToolFailure { .. } | FloorplanError::ToolLaunch { .. } => {
                ErrorCategory::ExternalTool
            }
            FloorplanError::MissingArtifact { .. } => ErrorCategory::MissingArtifact,
            FloorplanError::NoValidSlice { .. } => ErrorCategory::NoValidSlice,
            FloorplanError::Rasterization { .. }
            | FloorplanError::Mesh(_)
            | FloorplanError::Image(_) => ErrorCategory::Rasterization,
            FloorplanError::ConfigValidationError { .. }
            | FloorplanError::InvalidConfigValueError { .. }
            | FloorplanError::MissingConfigError { .. } => ErrorCategory::Configuration,
            FloorplanError::IoError(_) | FloorplanError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::NoValidSlice => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            FloorplanError::MissingInput { .. } => {
                "Check --data points at a directory containing colmap/sparse/0".to_string()
            }
            FloorplanError::ExternalToolFailure { tool, .. } => {
                format!("Inspect the {} output above; the pipeline does not retry", tool)
            }
            FloorplanError::ToolLaunch { tool, .. } => {
                format!("Make sure '{}' is installed and on PATH", tool)
            }
            FloorplanError::MissingArtifact { artifact, .. } => format!(
                "Training or export may have failed silently; pass the {} path explicitly if it lives elsewhere",
                artifact
            ),
            FloorplanError::NoValidSlice { .. } => {
                "Try adjusting the slice height or check if the mesh is valid".to_string()
            }
            FloorplanError::Rasterization { .. }
            | FloorplanError::Mesh(_)
            | FloorplanError::Image(_) => {
                "Check the exported mesh file is a readable PLY with faces".to_string()
            }
            FloorplanError::ConfigValidationError { .. }
            | FloorplanError::InvalidConfigValueError { .. }
            | FloorplanError::MissingConfigError { .. } => {
                "Fix the configuration value and run again".to_string()
            }
            FloorplanError::IoError(_) | FloorplanError::SerializationError(_) => {
                "Check disk space and permissions on the output directory".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::MissingInput => format!("Input data missing: {}", self),
            ErrorCategory::ExternalTool => format!("External tool failed: {}", self),
            ErrorCategory::MissingArtifact => format!("Expected output missing: {}", self),
            ErrorCategory::NoValidSlice => format!("Could not slice the mesh: {}", self),
            ErrorCategory::Rasterization => format!("Floor plan generation failed: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

/// 串接整條錯誤鏈（含 source）
pub fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        // #[from] 包裝的錯誤已把 source 寫進訊息
        if !message.ends_with(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    message
}
