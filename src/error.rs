//! Runner-level errors
//!
//! Failures that abort the run before or outside the pipeline itself.
//! Remote command failures are not represented here; they surface as
//! per-stage results in the pipeline summary.

use std::path::PathBuf;

use crate::infra::command::CommandError;

/// Errors that prevent the pipeline from running at all
#[derive(Debug)]
pub enum RunnerError {
    /// Command line arguments missing or malformed
    InvalidArgs(String),
    /// The local output directory must already exist
    OutputDirMissing(PathBuf),
    /// The bundled xsdb.tcl patch could not be found
    PatchFileMissing(PathBuf),
    /// A command could not be spawned or awaited
    Command(CommandError),
}

impl std::fmt::Display for RunnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunnerError::InvalidArgs(msg) => write!(f, "Invalid arguments: {}", msg),
            RunnerError::OutputDirMissing(p) => {
                write!(f, "Output directory does not exist: {}", p.display())
            }
            RunnerError::PatchFileMissing(p) => {
                write!(f, "xsdb.tcl patch file not found: {}", p.display())
            }
            RunnerError::Command(e) => write!(f, "Command execution failed: {}", e),
        }
    }
}

impl std::error::Error for RunnerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunnerError::Command(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CommandError> for RunnerError {
    fn from(e: CommandError) -> Self {
        RunnerError::Command(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_output_dir_missing() {
        let err = RunnerError::OutputDirMissing(PathBuf::from("/no/such/dir"));
        assert!(err.to_string().contains("/no/such/dir"));
    }

    #[test]
    fn test_from_command_error() {
        let err: RunnerError = CommandError::Cancelled.into();
        assert!(matches!(err, RunnerError::Command(CommandError::Cancelled)));
    }
}
