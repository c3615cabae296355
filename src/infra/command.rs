//! Command executor
//!
//! Runs one planned command at a time, either on the local machine or on the
//! remote target through ssh, and forwards its output to the operator's
//! terminal line by line as it arrives. No retries, no timeout: the remote
//! synthesis job runs for however long it runs, and the only structured
//! result is the exit status.

use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::BuildConfig;
use crate::domain::command::{CommandLine, PlannedCommand};

/// Command executor
pub struct CommandRunner;

/// Command execution error
#[derive(Debug)]
pub enum CommandError {
    /// The program could not be spawned
    SpawnFailed(std::io::Error),
    /// Waiting for the program failed
    WaitFailed(std::io::Error),
    /// The operator interrupted the run
    Cancelled,
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::SpawnFailed(e) => write!(f, "Failed to spawn command: {}", e),
            CommandError::WaitFailed(e) => write!(f, "Failed to wait for command: {}", e),
            CommandError::Cancelled => write!(f, "Command was cancelled"),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::SpawnFailed(e) | CommandError::WaitFailed(e) => Some(e),
            CommandError::Cancelled => None,
        }
    }
}

/// Build the ssh argument vector for a remote command.
///
/// `-t -t` forces pty allocation even when local stdin is not a terminal.
pub(crate) fn ssh_command_line(
    config: &BuildConfig,
    command: &CommandLine,
    pty: bool,
) -> CommandLine {
    let mut ssh = CommandLine::new("ssh");
    if pty {
        ssh = ssh.args(["-t", "-t"]);
    }
    ssh.arg("-i")
        .arg(config.key_path.to_string_lossy())
        .arg(&config.remote_target)
        .arg(command.render())
}

impl CommandRunner {
    /// Execute one planned command, streaming output until it exits.
    ///
    /// The command line is logged before execution for traceability. On
    /// cancellation the child is killed and `CommandError::Cancelled` is
    /// returned; the caller decides what still runs afterwards.
    pub async fn run(
        planned: &PlannedCommand,
        config: &BuildConfig,
        cancel: &CancellationToken,
    ) -> Result<ExitStatus, CommandError> {
        let command_line = match planned {
            PlannedCommand::Local(cmd) => cmd.clone(),
            PlannedCommand::Remote { command, pty } => ssh_command_line(config, command, *pty),
        };
        info!(">>> {}", command_line.render());

        let mut child = Command::new(command_line.program())
            .args(command_line.argv())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(CommandError::SpawnFailed)?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let stdout_task = tokio::spawn(async move {
            if let Some(stdout) = stdout {
                let reader = BufReader::new(stdout);
                let mut lines = reader.lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    println!("{}", line);
                }
            }
        });

        let stderr_task = tokio::spawn(async move {
            if let Some(stderr) = stderr {
                let reader = BufReader::new(stderr);
                let mut lines = reader.lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    eprintln!("{}", line);
                }
            }
        });

        let result = tokio::select! {
            _ = cancel.cancelled() => {
                warn!("Command cancelled, killing process");
                let _ = child.kill().await;
                Err(CommandError::Cancelled)
            }
            status = child.wait() => {
                status.map_err(CommandError::WaitFailed)
            }
        };

        let _ = stdout_task.await;
        let _ = stderr_task.await;

        result
    }
}
