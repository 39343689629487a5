use crate::domain::model::{
    ArtifactSelection, ExporterSettings, FloorplanOutputs, FloorplanSettings, MeshArtifact,
    ToolInvocation, ToolStatus, TrainerSettings, TrainingArtifact,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Runs an external tool to completion.
pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        invocation: &ToolInvocation,
    ) -> impl std::future::Future<Output = Result<ToolStatus>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn data_dir(&self) -> &Path;
    fn output_dir(&self) -> &Path;
    fn colmap_path(&self) -> &str;
    fn trainer(&self) -> TrainerSettings;
    fn exporter(&self) -> ExporterSettings;
    fn floorplan(&self) -> FloorplanSettings;
    fn config_selection(&self) -> ArtifactSelection;
    fn mesh_selection(&self) -> ArtifactSelection;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn preflight(&self) -> Result<()>;
    async fn train(&self) -> Result<TrainingArtifact>;
    async fn export(&self, training: &TrainingArtifact) -> Result<MeshArtifact>;
    async fn generate_floorplan(&self, mesh: &MeshArtifact) -> Result<FloorplanOutputs>;
}
