use crate::core::CommandRunner;
use crate::domain::model::{ToolInvocation, ToolStatus};
use crate::utils::error::{FloorplanError, Result};
use tokio::process::Command;

/// Runs tools as child processes with inherited stdio, waiting for them to exit.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolStatus> {
        tracing::info!("Running: {}", invocation.command_line());

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .status()
            .await
            .map_err(|source| FloorplanError::ToolLaunch {
                tool: invocation.program.clone(),
                source,
            })?;

        tracing::debug!("{} finished with {:?}", invocation.program, status);
        Ok(ToolStatus {
            code: status.code(),
        })
    }
}
