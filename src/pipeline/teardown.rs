//! Teardown
//!
//! Stops the build container to release remote resources. No removal, no
//! verification; the next run's prepare stage clears whatever is left.

use crate::config::BuildConfig;
use crate::domain::command::{CommandLine, PlannedCommand};

use super::{StagePlan, Step};

pub const NAME: &str = "teardown";
pub const DISPLAY_NAME: &str = "Teardown";

pub fn plan(config: &BuildConfig) -> StagePlan {
    let stop = CommandLine::new("sudo")
        .args(["docker", "stop"])
        .arg(&config.container_name);

    StagePlan {
        name: NAME,
        display_name: DISPLAY_NAME,
        steps: vec![Step::required(PlannedCommand::remote(stop))],
    }
}
