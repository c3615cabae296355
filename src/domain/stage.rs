//! Pipeline stage reporting

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Stage status
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Running,
    Success,
    Failed,
    Skipped,
}

/// What the pipeline does when a stage fails
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Run every stage regardless of prior outcomes. This preserves the
    /// historical behavior of the tool: a failed checkout or upload still
    /// leads to an attempted synthesis, retrieval and teardown.
    BestEffort,
    /// Skip the remaining build stages after the first failure.
    /// Teardown is always attempted either way.
    HaltOnFailure,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy::BestEffort
    }
}

/// Outcome of one command within a stage
#[derive(Clone, Debug, Serialize)]
pub struct CommandReport {
    /// Rendered command, as echoed to the operator
    pub command: String,
    /// Exit code, `None` when the command never produced one
    pub exit_code: Option<i32>,
    /// A nonzero exit here is expected and does not fail the stage
    /// (the prepare stage's destructive container reset)
    pub tolerated: bool,
}

impl CommandReport {
    pub fn succeeded(&self) -> bool {
        self.tolerated || self.exit_code == Some(0)
    }
}

/// Execution record of one pipeline stage
#[derive(Clone, Debug, Serialize)]
pub struct StageReport {
    /// Stage identifier (e.g. "prepare", "synthesize")
    pub name: String,
    /// Display name (e.g. "Prepare Remote Environment")
    pub display_name: String,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
    pub status: StageStatus,
    pub commands: Vec<CommandReport>,
}

impl StageReport {
    pub fn new(name: &str, display_name: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            started_at: None,
            finished_at: None,
            duration_ms: None,
            status: StageStatus::Pending,
            commands: Vec::new(),
        }
    }

    pub fn start(&mut self) {
        self.started_at = Some(Utc::now());
        self.status = StageStatus::Running;
    }

    pub fn finish(&mut self, success: bool) {
        let now = Utc::now();
        self.finished_at = Some(now);
        self.status = if success {
            StageStatus::Success
        } else {
            StageStatus::Failed
        };
        if let Some(started) = self.started_at {
            self.duration_ms = Some((now - started).num_milliseconds());
        }
    }

    pub fn skip(&mut self) {
        self.status = StageStatus::Skipped;
    }

    /// Status icon for the end-of-run summary
    pub fn status_icon(&self) -> &'static str {
        match self.status {
            StageStatus::Success => "✓",
            StageStatus::Failed => "✗",
            StageStatus::Skipped => "⊘",
            StageStatus::Running => "⟳",
            StageStatus::Pending => "○",
        }
    }
}

/// End-of-run record for the whole pipeline
#[derive(Clone, Debug, Serialize)]
pub struct PipelineSummary {
    pub project: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Operator interrupt (Ctrl-C) cut the run short
    pub interrupted: bool,
    pub stages: Vec<StageReport>,
}

impl PipelineSummary {
    pub fn new(project: &str) -> Self {
        Self {
            project: project.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            interrupted: false,
            stages: Vec::new(),
        }
    }

    pub fn complete(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// True when every stage ran and succeeded
    pub fn succeeded(&self) -> bool {
        !self.interrupted
            && self
                .stages
                .iter()
                .all(|s| s.status == StageStatus::Success)
    }

    /// Process exit code: 0 on success, 130 on interrupt, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.interrupted {
            130
        } else if self.succeeded() {
            0
        } else {
            1
        }
    }
}
