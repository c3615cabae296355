//! Synchronize Source Checkout
//!
//! Brings the toolchain's source tree inside the container to the desired
//! revision. With a pinned ref, a throwaway build branch is created at that
//! ref; without one, the tracked branch is fast-forwarded.

use crate::config::{constants, BuildConfig};
use crate::domain::command::{shell_quote, CommandLine, PlannedCommand};

use super::{StagePlan, Step};

pub const NAME: &str = "checkout";
pub const DISPLAY_NAME: &str = "Synchronize Source Checkout";

pub fn plan(config: &BuildConfig) -> StagePlan {
    let script = match &config.checkout_ref {
        Some(checkout_ref) => format!(
            "cd {}/ && git fetch -q && git checkout -q -b {} {}",
            constants::TOOLCHAIN_DIR,
            constants::BUILD_BRANCH,
            shell_quote(checkout_ref)
        ),
        None => format!("cd {}/ && git pull -q", constants::TOOLCHAIN_DIR),
    };

    let exec = CommandLine::new("sudo")
        .args(["docker", "exec", "-t"])
        .arg(&config.container_name)
        .args(["bash", "-c"])
        .arg(script);

    StagePlan {
        name: NAME,
        display_name: DISPLAY_NAME,
        steps: vec![Step::required(PlannedCommand::remote(exec))],
    }
}
