use crate::utils::error::{OpsError, Result};
use async_trait::async_trait;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub status: String,
    pub stdout: String,
    pub stderr: String,
}

/// Runs external tools (container engine, compose, download clients).
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;

    /// A tool counts as installed when it can be spawned and exits cleanly.
    async fn is_installed(&self, program: &str, probe_args: &[&str]) -> bool {
        match self.run(program, probe_args).await {
            Ok(output) => output.success,
            Err(_) => false,
        }
    }

    async fn run_checked(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let output = self.run(program, args).await?;
        if output.success {
            Ok(output)
        } else {
            Err(OpsError::CommandFailed {
                command: command_line(program, args),
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            })
        }
    }
}

#[async_trait]
pub trait HttpProber: Send + Sync {
    /// True when the endpoint answers with a 2xx status.
    async fn is_reachable(&self, url: &str) -> bool;
}

pub fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
