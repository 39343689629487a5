pub mod artifacts;
pub mod commands;
pub mod engine;

pub use crate::domain::model::{FloorplanOutputs, MeshArtifact, PipelineReport, TrainingArtifact};
pub use crate::domain::ports::{CommandRunner, ConfigProvider, Pipeline};
pub use crate::utils::error::Result;
