//! Stage Input Artifacts
//!
//! Copies the local project directory to the remote host, ships the bundled
//! xsdb.tcl alongside it, then overwrites the defective script inside the
//! toolchain's installation in the container. The patch content itself is an
//! opaque asset; only its destination path is known here.

use crate::config::{constants, BuildConfig};
use crate::domain::command::{CommandLine, PlannedCommand};
use crate::domain::Workaround;

use super::{StagePlan, Step};

pub const NAME: &str = "stage_input";
pub const DISPLAY_NAME: &str = "Stage Input Artifacts";

pub fn plan(config: &BuildConfig) -> StagePlan {
    let mut steps = Vec::new();

    let push_input = CommandLine::new("scp")
        .arg("-i")
        .arg(config.key_path.to_string_lossy())
        .arg("-r")
        .arg(config.local_input_dir.to_string_lossy())
        .arg(format!("{}:~/", config.remote_target));
    steps.push(Step::required(PlannedCommand::local(push_input)));

    if config.workarounds.enabled(Workaround::PatchedXsdbScript) {
        let push_patch = CommandLine::new("scp")
            .arg("-i")
            .arg(config.key_path.to_string_lossy())
            .arg(config.patch_file.to_string_lossy())
            .arg(format!("{}:~/xsdb.tcl", config.remote_target));
        steps.push(Step::required(PlannedCommand::local(push_patch)));

        let overwrite = CommandLine::new("sudo")
            .args(["docker", "cp", "xsdb.tcl"])
            .arg(format!(
                "{}:{}",
                config.container_name,
                constants::XSDB_PATCH_TARGET
            ));
        steps.push(Step::required(PlannedCommand::remote(overwrite)));
    }

    StagePlan {
        name: NAME,
        display_name: DISPLAY_NAME,
        steps,
    }
}
