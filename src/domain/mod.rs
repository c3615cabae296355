//! Domain models
//!
//! Pure data structures, no tokio dependency

pub mod command;
pub mod stage;
pub mod workaround;

// Re-exports for convenience
pub use command::{CommandLine, PlannedCommand};
pub use stage::{CommandReport, FailurePolicy, PipelineSummary, StageReport, StageStatus};
pub use workaround::{Workaround, WorkaroundSet};
