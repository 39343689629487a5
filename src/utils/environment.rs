//! Informational probes of the execution environment. Nothing here gates the pipeline.

use std::path::Path;
use tokio::process::Command;

const DOCKER_MARKER: &str = "/.dockerenv";
const GPU_QUERY: &str = "nvidia-smi";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuStatus {
    Detected,
    NotDetected,
    Unknown,
}

pub fn is_containerized() -> bool {
    is_containerized_with_marker(Path::new(DOCKER_MARKER))
}

fn is_containerized_with_marker(marker: &Path) -> bool {
    marker.exists()
}

pub async fn probe_gpu() -> GpuStatus {
    probe_gpu_with(GPU_QUERY).await
}

async fn probe_gpu_with(program: &str) -> GpuStatus {
    match Command::new(program).output().await {
        Ok(output) if output.status.success() => GpuStatus::Detected,
        Ok(_) => GpuStatus::NotDetected,
        Err(e) => {
            tracing::debug!("GPU query '{}' could not run: {}", program, e);
            GpuStatus::Unknown
        }
    }
}

pub async fn log_environment() {
    if is_containerized() {
        tracing::info!("✓ Running in Docker");
    } else {
        tracing::warn!("⚠ Not running in Docker");
    }

    match probe_gpu().await {
        GpuStatus::Detected => tracing::info!("✓ GPU detected"),
        GpuStatus::NotDetected => tracing::warn!("⚠ No GPU detected"),
        GpuStatus::Unknown => tracing::warn!("⚠ Could not check GPU"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_container_marker() {
        let temp_dir = TempDir::new().unwrap();
        let marker = temp_dir.path().join(".dockerenv");
        assert!(!is_containerized_with_marker(&marker));

        std::fs::write(&marker, b"").unwrap();
        assert!(is_containerized_with_marker(&marker));
    }

    #[tokio::test]
    async fn test_missing_gpu_query_is_unknown() {
        let status = probe_gpu_with("definitely-not-a-real-gpu-query-tool").await;
        assert_eq!(status, GpuStatus::Unknown);
    }
}
