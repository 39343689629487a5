use chrono::Utc;
use std::time::Instant;

use crate::core::Pipeline;
use crate::domain::model::{PipelineReport, StageTiming};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

const BANNER: &str = "============================================================";

pub struct FloorplanEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> FloorplanEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Runs every stage in order; the first failure ends the run.
    pub async fn run(&self) -> Result<PipelineReport> {
        let started_at = Utc::now();
        let mut stages = Vec::new();
        self.monitor.log_stats("Start");

        self.pipeline.preflight().await?;

        banner("STEP 1: TRAINING NERF");
        let timer = Instant::now();
        let training = self.pipeline.train().await?;
        stages.push(timing("train", timer));
        tracing::info!("✓ Training complete!");
        self.monitor.log_stats("Train");

        banner("STEP 2: EXPORTING MESH");
        let timer = Instant::now();
        let mesh = self.pipeline.export(&training).await?;
        stages.push(timing("export", timer));
        tracing::info!("Mesh saved at: {}", mesh.mesh_path.display());
        self.monitor.log_stats("Export");

        banner("STEP 3: GENERATING FLOOR PLAN");
        let timer = Instant::now();
        let floorplan = self.pipeline.generate_floorplan(&mesh).await?;
        stages.push(timing("floorplan", timer));
        self.monitor.log_stats("Floorplan");

        let report = PipelineReport {
            started_at,
            finished_at: Utc::now(),
            training,
            mesh,
            floorplan,
            stages,
        };

        // 報告寫入失敗不影響已產生的平面圖
        match report.save() {
            Ok(path) => tracing::debug!("Pipeline report written to {}", path.display()),
            Err(e) => tracing::warn!("⚠ Could not write pipeline report: {}", e),
        }

        banner("✓ PIPELINE COMPLETE!");
        tracing::info!("Floor plan saved to: {}", report.floorplan.directory.display());
        tracing::info!("  - PNG: {}", report.floorplan.png_path.display());
        tracing::info!("  - SVG: {}", report.floorplan.svg_path.display());
        self.monitor.log_final_stats();

        Ok(report)
    }
}

fn banner(title: &str) {
    tracing::info!("{}", BANNER);
    tracing::info!("{}", title);
    tracing::info!("{}", BANNER);
}

fn timing(stage: &str, started: Instant) -> StageTiming {
    StageTiming {
        stage: stage.to_string(),
        duration_ms: started.elapsed().as_millis(),
    }
}
