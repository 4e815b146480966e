use crate::domain::ports::{CommandOutput, CommandRunner};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

/// Spawns real processes. Output is captured, never streamed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::debug!(program = %program, args = ?args, "Executing command");

        let output = cmd.output().await?;

        let result = CommandOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if result.success {
            tracing::debug!(program = %program, output_size = result.stdout.len(), "Command succeeded");
        } else {
            tracing::debug!(program = %program, status = %result.status, stderr = %result.stderr.trim(), "Command failed");
        }

        Ok(result)
    }
}
