//! Remote build pipeline
//!
//! Six stages run strictly in order against one remote target:
//! Prepare → Synchronize → Stage Input → Invoke Synthesis → Retrieve →
//! Teardown. Each stage exposes a pure planner returning the commands it
//! would issue; this module executes the plan, collects per-stage reports
//! and guarantees that teardown is attempted on every exit path.

pub mod checkout;
pub mod prepare;
pub mod retrieve;
pub mod stage_input;
pub mod synthesize;
pub mod teardown;

use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use crate::config::BuildConfig;
use crate::domain::command::PlannedCommand;
use crate::domain::{CommandReport, FailurePolicy, PipelineSummary, StageReport};
use crate::infra::command::{CommandError, CommandRunner};

/// One command within a stage plan
#[derive(Clone, Debug)]
pub struct Step {
    pub command: PlannedCommand,
    /// A nonzero exit is expected and does not fail the stage
    pub tolerated: bool,
}

impl Step {
    pub fn required(command: PlannedCommand) -> Self {
        Self {
            command,
            tolerated: false,
        }
    }

    pub fn tolerated(command: PlannedCommand) -> Self {
        Self {
            command,
            tolerated: true,
        }
    }
}

/// The planned commands of one pipeline stage
#[derive(Clone, Debug)]
pub struct StagePlan {
    pub name: &'static str,
    pub display_name: &'static str,
    pub steps: Vec<Step>,
}

/// Plan the whole pipeline without executing anything
pub fn plan(config: &BuildConfig) -> Vec<StagePlan> {
    vec![
        prepare::plan(config),
        checkout::plan(config),
        stage_input::plan(config),
        synthesize::plan(config),
        retrieve::plan(config),
        teardown::plan(config),
    ]
}

/// Execute the pipeline stage by stage.
///
/// Under `BestEffort` every build stage runs regardless of prior outcomes;
/// under `HaltOnFailure` the remaining build stages are skipped after the
/// first failed one. Teardown always runs, with a fresh cancellation token
/// so that an operator interrupt still stops the container.
pub async fn run(config: &BuildConfig, cancel: &CancellationToken) -> PipelineSummary {
    let mut summary = PipelineSummary::new(&config.project_name);
    let mut plans = plan(config);
    let teardown_plan = plans.pop().expect("pipeline has a teardown stage");

    let mut halted = false;
    for stage_plan in plans {
        let mut report = StageReport::new(stage_plan.name, stage_plan.display_name);
        // An interrupt between stages (or before the first one) still counts
        // as an operator interrupt, not a stage failure
        if cancel.is_cancelled() {
            summary.interrupted = true;
        }
        if halted || summary.interrupted {
            report.skip();
            summary.stages.push(report);
            continue;
        }

        let interrupted = execute_stage(&stage_plan, &mut report, config, cancel).await;
        if interrupted {
            summary.interrupted = true;
            halted = true;
        } else if report.status == crate::domain::StageStatus::Failed
            && config.policy == FailurePolicy::HaltOnFailure
        {
            warn!(stage = stage_plan.name, "Stage failed, halting pipeline");
            halted = true;
        }
        summary.stages.push(report);
    }

    // Teardown runs on every exit path, including interrupt
    let mut report = StageReport::new(teardown_plan.name, teardown_plan.display_name);
    let fresh = CancellationToken::new();
    execute_stage(&teardown_plan, &mut report, config, &fresh).await;
    summary.stages.push(report);

    summary.complete();
    print_summary(&summary);
    summary
}

/// Run every step of one stage, recording outcomes in the report.
/// Returns true when the operator interrupted the stage.
async fn execute_stage(
    stage_plan: &StagePlan,
    report: &mut StageReport,
    config: &BuildConfig,
    cancel: &CancellationToken,
) -> bool {
    report.start();
    let mut stage_ok = true;
    let mut interrupted = false;

    for step in &stage_plan.steps {
        match CommandRunner::run(&step.command, config, cancel).await {
            Ok(status) => {
                report.commands.push(CommandReport {
                    command: step.command.describe(),
                    exit_code: status.code(),
                    tolerated: step.tolerated,
                });
                if !status.success() && !step.tolerated {
                    warn!(
                        stage = stage_plan.name,
                        exit_code = status.code(),
                        "Command exited nonzero"
                    );
                    stage_ok = false;
                }
            }
            Err(CommandError::Cancelled) => {
                report.commands.push(CommandReport {
                    command: step.command.describe(),
                    exit_code: None,
                    tolerated: step.tolerated,
                });
                stage_ok = false;
                interrupted = true;
                break;
            }
            Err(e) => {
                error!(stage = stage_plan.name, error = %e, "Command failed to run");
                report.commands.push(CommandReport {
                    command: step.command.describe(),
                    exit_code: None,
                    tolerated: step.tolerated,
                });
                if !step.tolerated {
                    stage_ok = false;
                }
            }
        }
    }

    report.finish(stage_ok);
    interrupted
}

/// End-of-run stage summary, one line per stage
fn print_summary(summary: &PipelineSummary) {
    println!("\n=== Stage Summary ===");
    for stage in &summary.stages {
        let duration = stage
            .duration_ms
            .map(|d| format!("{}ms", d))
            .unwrap_or_else(|| "-".to_string());
        println!("{} {} ({})", stage.status_icon(), stage.display_name, duration);
    }
    if summary.interrupted {
        println!("Pipeline interrupted by operator");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::constants;
    use crate::domain::{FailurePolicy, WorkaroundSet};
    use std::path::PathBuf;

    fn test_config() -> BuildConfig {
        BuildConfig {
            key_path: PathBuf::from("/home/me/keys/admin.pem"),
            remote_target: "ubuntu@host".to_string(),
            container_name: constants::DEFAULT_CONTAINER_NAME.to_string(),
            image_name: constants::DEFAULT_IMAGE_NAME.to_string(),
            project_name: "fm".to_string(),
            local_input_dir: PathBuf::from("/tmp/in"),
            local_output_dir: PathBuf::from("/tmp/out"),
            checkout_ref: None,
            patch_file: PathBuf::from("/tmp/xsdb.tcl"),
            policy: FailurePolicy::BestEffort,
            workarounds: WorkaroundSet::default(),
        }
    }

    #[test]
    fn test_fixed_stage_order() {
        let plans = plan(&test_config());
        let names: Vec<&str> = plans.iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec![
                "prepare",
                "checkout",
                "stage_input",
                "synthesize",
                "retrieve",
                "teardown"
            ]
        );
    }

    #[test]
    fn test_container_name_consistent_across_stages() {
        let mut config = test_config();
        config.container_name = "custom_builder".to_string();
        let plans = plan(&config);

        // Prepare, Invoke and Teardown must all address the same container
        for name in ["prepare", "synthesize", "teardown"] {
            let stage = plans.iter().find(|p| p.name == name).unwrap();
            for step in &stage.steps {
                assert!(
                    step.command.describe().contains("custom_builder"),
                    "{} step missing container name: {}",
                    name,
                    step.command.describe()
                );
            }
        }
    }

    #[test]
    fn test_plan_has_each_stage_exactly_once() {
        let plans = plan(&test_config());
        assert_eq!(plans.len(), 6);
        let mut names: Vec<&str> = plans.iter().map(|p| p.name).collect();
        names.dedup();
        assert_eq!(names.len(), 6);
    }

    use crate::domain::StageStatus;

    /// Target whose DNS lookup fails immediately, so every ssh/scp command
    /// exits fast with a transport error
    fn unreachable_config(policy: FailurePolicy) -> BuildConfig {
        let mut config = test_config();
        config.remote_target = "nobody@invalid.invalid".to_string();
        config.key_path = PathBuf::from("/dev/null");
        config.policy = policy;
        config
    }

    #[tokio::test]
    async fn test_best_effort_attempts_every_stage() {
        let cancel = CancellationToken::new();
        let summary = run(&unreachable_config(FailurePolicy::BestEffort), &cancel).await;

        assert_eq!(summary.stages.len(), 6);
        for stage in &summary.stages {
            assert_ne!(
                stage.status,
                StageStatus::Skipped,
                "{} was skipped under best-effort",
                stage.name
            );
        }
        assert!(!summary.succeeded());
        assert_eq!(summary.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_halt_on_failure_still_tears_down() {
        let cancel = CancellationToken::new();
        let summary = run(&unreachable_config(FailurePolicy::HaltOnFailure), &cancel).await;

        assert_eq!(summary.stages.len(), 6);
        assert_eq!(summary.stages[0].status, StageStatus::Failed);
        for stage in &summary.stages[1..5] {
            assert_eq!(stage.status, StageStatus::Skipped, "{}", stage.name);
        }
        let teardown = summary.stages.last().unwrap();
        assert_eq!(teardown.name, "teardown");
        assert_ne!(teardown.status, StageStatus::Skipped);
    }

    #[tokio::test]
    async fn test_interrupt_before_first_stage_exits_130() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let summary = run(&unreachable_config(FailurePolicy::BestEffort), &cancel).await;

        assert!(summary.interrupted);
        assert_eq!(summary.exit_code(), 130);
        for stage in &summary.stages[..5] {
            assert_eq!(stage.status, StageStatus::Skipped, "{}", stage.name);
        }
        // Teardown runs with a fresh token even after an interrupt
        let teardown = summary.stages.last().unwrap();
        assert_ne!(teardown.status, StageStatus::Skipped);
    }
}
