//! Prepare Remote Environment
//!
//! Guarantees a clean, running build container before any build work
//! begins. Idempotency comes from destructive reset, not inspection:
//! kill and rm run unconditionally and are expected to fail when no
//! container exists yet.

use crate::config::BuildConfig;
use crate::domain::command::{CommandLine, PlannedCommand};

use super::{StagePlan, Step};

pub const NAME: &str = "prepare";
pub const DISPLAY_NAME: &str = "Prepare Remote Environment";

pub fn plan(config: &BuildConfig) -> StagePlan {
    let kill = CommandLine::new("sudo")
        .args(["docker", "kill"])
        .arg(&config.container_name);
    let rm = CommandLine::new("sudo")
        .args(["docker", "rm"])
        .arg(&config.container_name);

    let home = config.remote_home();
    let run = CommandLine::new("sudo")
        .args(["docker", "run"])
        .arg("-v")
        .arg(format!("{}/input/:/root/input/", home))
        .arg("-v")
        .arg(format!(
            "{}/output/:/root/work/{}/output/",
            home, config.project_name
        ))
        .arg("-v")
        .arg(format!(
            "{}/log/:/root/work/{}/log/",
            home, config.project_name
        ))
        .arg("--name")
        .arg(&config.container_name)
        .arg("-itd")
        .arg(&config.image_name);

    StagePlan {
        name: NAME,
        display_name: DISPLAY_NAME,
        steps: vec![
            Step::tolerated(PlannedCommand::remote(kill)),
            Step::tolerated(PlannedCommand::remote(rm)),
            Step::required(PlannedCommand::remote(run)),
        ],
    }
}
