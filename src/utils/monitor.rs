//! Per-stage resource checkpoints. Training and export run as child processes, so
//! besides this process's own usage the monitor reports how much system memory was
//! left for them and how long each stage took.

#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, RefreshKind, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct SystemStats {
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub available_memory_mb: u64,
    pub total_memory_mb: u64,
    pub elapsed_time: Duration,
}

/// Resource snapshot taken when a stage finishes.
#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct StageCheckpoint {
    pub phase: String,
    pub stage_duration: Duration,
    pub elapsed: Duration,
    pub memory_usage_mb: u64,
    pub memory_delta_mb: i64,
    pub available_memory_mb: u64,
}

#[cfg(feature = "cli")]
pub struct SystemMonitor {
    system: Mutex<System>,
    pid: Option<Pid>,
    start_time: Instant,
    checkpoints: Mutex<Vec<StageCheckpoint>>,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let mut system = System::new_with_specifics(RefreshKind::everything());

        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                tracing::warn!("⚠ Could not resolve current PID, monitoring disabled: {}", e);
                None
            }
        };

        if enabled {
            system.refresh_all();
        }

        Self {
            system: Mutex::new(system),
            pid,
            start_time: Instant::now(),
            checkpoints: Mutex::new(Vec::new()),
            enabled,
        }
    }

    pub fn get_stats(&self) -> Option<SystemStats> {
        if !self.enabled {
            return None;
        }

        let mut system = self.system.lock().ok()?;
        system.refresh_all();

        let process = system.process(self.pid?)?;
        Some(SystemStats {
            cpu_usage: process.cpu_usage(),
            memory_usage_mb: process.memory() / 1024 / 1024,
            available_memory_mb: system.available_memory() / 1024 / 1024,
            total_memory_mb: system.total_memory() / 1024 / 1024,
            elapsed_time: self.start_time.elapsed(),
        })
    }

    /// Records a checkpoint for the stage that just finished and logs it.
    pub fn log_stats(&self, phase: &str) {
        let Some(stats) = self.get_stats() else {
            return;
        };
        let Ok(mut checkpoints) = self.checkpoints.lock() else {
            return;
        };

        let (previous_elapsed, previous_memory) = checkpoints
            .last()
            .map(|c| (c.elapsed, c.memory_usage_mb))
            .unwrap_or((Duration::ZERO, stats.memory_usage_mb));
        let checkpoint = StageCheckpoint {
            phase: phase.to_string(),
            stage_duration: stats.elapsed_time.saturating_sub(previous_elapsed),
            elapsed: stats.elapsed_time,
            memory_usage_mb: stats.memory_usage_mb,
            memory_delta_mb: stats.memory_usage_mb as i64 - previous_memory as i64,
            available_memory_mb: stats.available_memory_mb,
        };

        tracing::info!(
            "📊 {} - took {:?}, CPU: {:.1}%, Memory: {}MB ({:+}MB), System free: {}/{}MB",
            phase,
            checkpoint.stage_duration,
            stats.cpu_usage,
            checkpoint.memory_usage_mb,
            checkpoint.memory_delta_mb,
            stats.available_memory_mb,
            stats.total_memory_mb
        );
        if stats.total_memory_mb > 0 && stats.available_memory_mb * 10 < stats.total_memory_mb {
            tracing::warn!(
                "⚠ Less than 10% system memory free after {}; training or export may be swapping",
                phase
            );
        }
        checkpoints.push(checkpoint);
    }

    pub fn checkpoints(&self) -> Vec<StageCheckpoint> {
        self.checkpoints
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    /// Per-stage breakdown plus the slowest stage.
    pub fn log_final_stats(&self) {
        if !self.enabled {
            return;
        }
        let checkpoints = self.checkpoints();
        tracing::info!("📊 Stage breakdown (total {:?}):", self.start_time.elapsed());
        for checkpoint in &checkpoints {
            tracing::info!(
                "  {:<10} {:>12?}  memory {}MB, system free {}MB",
                checkpoint.phase,
                checkpoint.stage_duration,
                checkpoint.memory_usage_mb,
                checkpoint.available_memory_mb
            );
        }
        if let Some(slowest) = checkpoints.iter().max_by_key(|c| c.stage_duration) {
            tracing::info!("📊 Slowest stage: {} ({:?})", slowest.phase, slowest.stage_duration);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 非 CLI 環境提供空實現
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn log_stats(&self, _phase: &str) {}

    pub fn log_final_stats(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}
