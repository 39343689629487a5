use std::path::PathBuf;

use crate::core::artifacts::{find_files_named, find_files_with_extension, resolve_artifact};
use crate::core::commands::{export_invocation, train_invocation};
use crate::core::{
    CommandRunner, ConfigProvider, FloorplanOutputs, MeshArtifact, Pipeline, TrainingArtifact,
};
use crate::domain::model::{colmap_sparse_dir, ToolInvocation, TRAINING_CONFIG_NAME};
use crate::floorplan::FloorplanRenderer;
use crate::utils::error::{error_chain, FloorplanError, Result};

/// COLMAP data -> NeRF (external trainer) -> Poisson mesh (external exporter) -> floor plan.
pub struct NerfFloorplanPipeline<R: CommandRunner, C: ConfigProvider> {
    pub(crate) runner: R,
    pub(crate) config: C,
}

impl<R: CommandRunner, C: ConfigProvider> NerfFloorplanPipeline<R, C> {
    pub fn new(runner: R, config: C) -> Self {
        Self { runner, config }
    }

    pub fn floorplan_dir(&self) -> PathBuf {
        self.config
            .output_dir()
            .join(self.config.floorplan().subdirectory)
    }

    async fn run_tool(&self, invocation: &ToolInvocation, label: &str) -> Result<()> {
        let status = self.runner.run(invocation).await?;
        if !status.success() {
            tracing::error!("❌ {} failed!", label);
            return Err(FloorplanError::ExternalToolFailure {
                tool: invocation.program.clone(),
                code: status.code,
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl<R: CommandRunner, C: ConfigProvider> Pipeline for NerfFloorplanPipeline<R, C> {
    async fn preflight(&self) -> Result<()> {
        let data_dir = self.config.data_dir();
        let colmap_dir = colmap_sparse_dir(data_dir, self.config.colmap_path());
        let output_dir = self.config.output_dir();

        std::fs::create_dir_all(output_dir)?;

        tracing::info!("Data: {}", data_dir.display());
        tracing::info!("COLMAP: {}", colmap_dir.display());
        tracing::info!("Output: {}", output_dir.display());
        tracing::info!("Iterations: {}", self.config.trainer().max_iterations);

        if !data_dir.exists() {
            tracing::error!("❌ Data directory not found: {}", data_dir.display());
            return Err(FloorplanError::MissingInput {
                what: "Data directory".to_string(),
                path: data_dir.to_path_buf(),
            });
        }

        if !colmap_dir.exists() {
            tracing::error!("❌ COLMAP data not found: {}", colmap_dir.display());
            return Err(FloorplanError::MissingInput {
                what: "COLMAP data".to_string(),
                path: colmap_dir,
            });
        }

        Ok(())
    }

    async fn train(&self) -> Result<TrainingArtifact> {
        let output_dir = self.config.output_dir().to_path_buf();
        let invocation = train_invocation(
            &self.config.trainer(),
            self.config.data_dir(),
            self.config.colmap_path(),
            &output_dir,
        );

        self.run_tool(&invocation, "Training").await?;

        Ok(TrainingArtifact { output_dir })
    }

    async fn export(&self, training: &TrainingArtifact) -> Result<MeshArtifact> {
        let exporter = self.config.exporter();

        let config_path = resolve_artifact(
            &self.config.config_selection(),
            TRAINING_CONFIG_NAME,
            &training.output_dir,
            || Ok(find_files_named(&training.output_dir, TRAINING_CONFIG_NAME)),
        )
        .inspect_err(|_| tracing::error!("❌ No config.yml found! Training may have failed."))?;
        tracing::info!("Using config: {}", config_path.display());

        let export_dir = config_path
            .parent()
            .map(|dir| dir.join("exports").join("mesh"))
            .unwrap_or_else(|| PathBuf::from("exports").join("mesh"));
        std::fs::create_dir_all(&export_dir)?;

        let invocation = export_invocation(&exporter, &config_path, &export_dir);
        self.run_tool(&invocation, "Mesh export").await?;
        tracing::info!("✓ Mesh export complete!");

        let mesh_label = format!("*.{} mesh", exporter.mesh_extension);
        let mesh_path = resolve_artifact(
            &self.config.mesh_selection(),
            &mesh_label,
            &export_dir,
            || find_files_with_extension(&export_dir, &exporter.mesh_extension),
        )
        .inspect_err(|_| tracing::error!("❌ No mesh file found!"))?;

        Ok(MeshArtifact {
            config_path,
            export_dir,
            mesh_path,
        })
    }

    async fn generate_floorplan(&self, mesh: &MeshArtifact) -> Result<FloorplanOutputs> {
        let renderer = FloorplanRenderer::new(self.config.floorplan());
        let mesh_path = mesh.mesh_path.clone();
        let output_dir = self.floorplan_dir();

        // 光柵化屬 CPU 密集工作，交給 blocking 執行緒；panic 也會在此被攔下
        let outcome = join_render_outcome(
            tokio::task::spawn_blocking(move || renderer.render(&mesh_path, &output_dir)).await,
        );

        if let Err(e) = &outcome {
            tracing::error!("❌ Error generating floor plan: {}", error_chain(e));
            tracing::debug!("Floor plan failure details: {:?}", e);
        }
        outcome
    }
}

/// Flattens the rendering task result. A panic keeps its message; its backtrace was
/// already printed by the panic hook (set `RUST_BACKTRACE=1`).
fn join_render_outcome(
    joined: std::result::Result<Result<FloorplanOutputs>, tokio::task::JoinError>,
) -> Result<FloorplanOutputs> {
    match joined {
        Ok(outcome) => outcome,
        Err(e) if e.is_panic() => {
            let payload = e.into_panic();
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic payload".to_string());
            Err(FloorplanError::Rasterization {
                message: format!("rendering panicked: {}", message),
            })
        }
        Err(e) => Err(FloorplanError::Rasterization {
            message: format!("rendering task aborted: {}", e),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        ArtifactSelection, ExporterSettings, FloorplanSettings, ToolStatus, TrainerSettings,
    };
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct RecordingRunner {
        invocations: Arc<Mutex<Vec<ToolInvocation>>>,
        exit_code: i32,
    }

    impl RecordingRunner {
        fn failing(exit_code: i32) -> Self {
            Self {
                exit_code,
                ..Self::default()
            }
        }

        fn invocations(&self) -> Vec<ToolInvocation> {
            self.invocations.lock().unwrap().clone()
        }
    }

    impl CommandRunner for RecordingRunner {
        async fn run(&self, invocation: &ToolInvocation) -> Result<ToolStatus> {
            self.invocations.lock().unwrap().push(invocation.clone());
            Ok(ToolStatus {
                code: Some(self.exit_code),
            })
        }
    }

    struct MockConfig {
        data_dir: PathBuf,
        output_dir: PathBuf,
        config_selection: ArtifactSelection,
        mesh_selection: ArtifactSelection,
    }

    impl MockConfig {
        fn new(root: &Path) -> Self {
            Self {
                data_dir: root.join("data"),
                output_dir: root.join("output"),
                config_selection: ArtifactSelection::NewestModified,
                mesh_selection: ArtifactSelection::NewestModified,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn data_dir(&self) -> &Path {
            &self.data_dir
        }

        fn output_dir(&self) -> &Path {
            &self.output_dir
        }

        fn colmap_path(&self) -> &str {
            "colmap/sparse/0"
        }

        fn trainer(&self) -> TrainerSettings {
            TrainerSettings::default()
        }

        fn exporter(&self) -> ExporterSettings {
            ExporterSettings::default()
        }

        fn floorplan(&self) -> FloorplanSettings {
            FloorplanSettings::default()
        }

        fn config_selection(&self) -> ArtifactSelection {
            self.config_selection.clone()
        }

        fn mesh_selection(&self) -> ArtifactSelection {
            self.mesh_selection.clone()
        }
    }

    #[tokio::test]
    async fn test_preflight_missing_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let pipeline = NerfFloorplanPipeline::new(
            RecordingRunner::default(),
            MockConfig::new(temp_dir.path()),
        );

        let result = pipeline.preflight().await;

        match result {
            Err(FloorplanError::MissingInput { what, .. }) => assert_eq!(what, "Data directory"),
            other => panic!("unexpected result: {:?}", other),
        }
        // 輸出目錄仍會先建立
        assert!(temp_dir.path().join("output").is_dir());
    }

    #[tokio::test]
    async fn test_preflight_missing_colmap() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("data")).unwrap();
        let pipeline = NerfFloorplanPipeline::new(
            RecordingRunner::default(),
            MockConfig::new(temp_dir.path()),
        );

        let result = pipeline.preflight().await;

        match result {
            Err(FloorplanError::MissingInput { what, path }) => {
                assert_eq!(what, "COLMAP data");
                assert!(path.ends_with("colmap/sparse/0"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_train_passes_arguments() {
        let temp_dir = TempDir::new().unwrap();
        let runner = RecordingRunner::default();
        let pipeline = NerfFloorplanPipeline::new(runner.clone(), MockConfig::new(temp_dir.path()));

        let training = pipeline.train().await.unwrap();

        assert_eq!(training.output_dir, temp_dir.path().join("output"));
        let invocations = runner.invocations();
        assert_eq!(invocations.len(), 1);
        assert_eq!(invocations[0].program, "ns-train");
        assert_eq!(invocations[0].args[0], "nerfacto");
        assert!(invocations[0].args.contains(&"colmap".to_string()));
    }

    #[tokio::test]
    async fn test_train_nonzero_exit_fails() {
        let temp_dir = TempDir::new().unwrap();
        let pipeline = NerfFloorplanPipeline::new(
            RecordingRunner::failing(1),
            MockConfig::new(temp_dir.path()),
        );

        let result = pipeline.train().await;

        assert!(matches!(
            result,
            Err(FloorplanError::ExternalToolFailure { code: Some(1), .. })
        ));
    }

    #[tokio::test]
    async fn test_export_without_config_fails_before_running() {
        let temp_dir = TempDir::new().unwrap();
        let runner = RecordingRunner::default();
        let pipeline = NerfFloorplanPipeline::new(runner.clone(), MockConfig::new(temp_dir.path()));
        let output_dir = temp_dir.path().join("output");
        std::fs::create_dir_all(&output_dir).unwrap();

        let result = pipeline
            .export(&TrainingArtifact {
                output_dir: output_dir.clone(),
            })
            .await;

        assert!(matches!(result, Err(FloorplanError::MissingArtifact { .. })));
        assert!(runner.invocations().is_empty());
    }

    #[tokio::test]
    async fn test_export_without_mesh_fails_after_running() {
        let temp_dir = TempDir::new().unwrap();
        let runner = RecordingRunner::default();
        let pipeline = NerfFloorplanPipeline::new(runner.clone(), MockConfig::new(temp_dir.path()));
        let run_dir = temp_dir.path().join("output/room/nerfacto/run");
        std::fs::create_dir_all(&run_dir).unwrap();
        std::fs::write(run_dir.join("config.yml"), "method: nerfacto").unwrap();

        let result = pipeline
            .export(&TrainingArtifact {
                output_dir: temp_dir.path().join("output"),
            })
            .await;

        match result {
            Err(FloorplanError::MissingArtifact { location, .. }) => {
                assert_eq!(location, run_dir.join("exports/mesh"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        let invocations = runner.invocations();
        assert_eq!(invocations.len(), 1);
        assert_eq!(invocations[0].program, "ns-export");
        assert!(run_dir.join("exports/mesh").is_dir());
    }

    #[tokio::test]
    async fn test_export_uses_explicit_artifacts() {
        let temp_dir = TempDir::new().unwrap();
        let runner = RecordingRunner::default();
        let config_path = temp_dir.path().join("chosen/config.yml");
        let mesh_path = temp_dir.path().join("meshes/chosen.ply");
        std::fs::create_dir_all(config_path.parent().unwrap()).unwrap();
        std::fs::create_dir_all(mesh_path.parent().unwrap()).unwrap();
        std::fs::write(&config_path, "").unwrap();
        std::fs::write(&mesh_path, "").unwrap();

        let mut config = MockConfig::new(temp_dir.path());
        config.config_selection = ArtifactSelection::Explicit(config_path.clone());
        config.mesh_selection = ArtifactSelection::Explicit(mesh_path.clone());
        let pipeline = NerfFloorplanPipeline::new(runner.clone(), config);

        let mesh = pipeline
            .export(&TrainingArtifact {
                output_dir: temp_dir.path().join("output"),
            })
            .await
            .unwrap();

        assert_eq!(mesh.config_path, config_path);
        assert_eq!(mesh.mesh_path, mesh_path);
        assert_eq!(mesh.export_dir, temp_dir.path().join("chosen/exports/mesh"));
        assert!(runner.invocations()[0]
            .args
            .contains(&config_path.display().to_string()));
    }

    #[tokio::test]
    async fn test_floorplan_failure_is_reported_not_panicked() {
        let temp_dir = TempDir::new().unwrap();
        let pipeline = NerfFloorplanPipeline::new(
            RecordingRunner::default(),
            MockConfig::new(temp_dir.path()),
        );

        let result = pipeline
            .generate_floorplan(&MeshArtifact {
                config_path: temp_dir.path().join("config.yml"),
                export_dir: temp_dir.path().to_path_buf(),
                mesh_path: temp_dir.path().join("missing.ply"),
            })
            .await;

        assert!(matches!(result, Err(FloorplanError::Mesh(_))));
    }

    #[tokio::test]
    async fn test_render_panic_becomes_rasterization_error() {
        let joined = tokio::task::spawn_blocking(|| -> Result<FloorplanOutputs> {
            panic!("canvas exploded at row {}", 7)
        })
        .await;

        match join_render_outcome(joined) {
            Err(FloorplanError::Rasterization { message }) => {
                assert_eq!(message, "rendering panicked: canvas exploded at row 7");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_render_static_str_panic_message_kept() {
        let joined =
            tokio::task::spawn_blocking(|| -> Result<FloorplanOutputs> { panic!("boom") }).await;

        assert!(matches!(
            join_render_outcome(joined),
            Err(FloorplanError::Rasterization { ref message }) if message.ends_with("boom")
        ));
    }
}
