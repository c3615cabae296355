//! Invoke Synthesis
//!
//! Runs the long-running synthesis job inside the container and blocks until
//! it exits. The invocation carries the full set of toolchain workarounds:
//! terminfo entries are copied first, the job itself runs behind a virtual
//! display with forced pty allocation, wrapped in screen for environments
//! where stdin is not a real terminal.

use crate::config::{constants, BuildConfig};
use crate::domain::command::{shell_quote, CommandLine, PlannedCommand};
use crate::domain::Workaround;

use super::{StagePlan, Step};

pub const NAME: &str = "synthesize";
pub const DISPLAY_NAME: &str = "Invoke Synthesis";

pub fn plan(config: &BuildConfig) -> StagePlan {
    let pty = config.workarounds.enabled(Workaround::ForcePty);
    let mut steps = Vec::new();

    if config.workarounds.enabled(Workaround::TerminfoCopy) {
        let terminfo = CommandLine::new("sudo")
            .args(["docker", "exec", "-t"])
            .arg(&config.container_name)
            .args(["cp", "-r", "/lib/terminfo/x/", "/usr/share/terminfo/x/"]);
        steps.push(Step::required(PlannedCommand::remote_pty(terminfo, pty)));
    }

    let mut script = String::new();
    if config.workarounds.enabled(Workaround::VirtualDisplay) {
        script.push_str(&format!("sh {} && ", constants::VNC_BOOTSTRAP));
    }
    script.push_str(&format!(
        "python3 {} -m {} -p {} {}",
        constants::SYNTHESIS_SCRIPT,
        shell_quote(&config.container_input_file()),
        shell_quote(&config.project_name),
        constants::XSDK_TIMEOUT_FLAG
    ));

    let exec = if config.workarounds.enabled(Workaround::ScreenWrapper) {
        CommandLine::new("screen").args(["sudo", "docker", "exec", "-t"])
    } else {
        CommandLine::new("sudo").args(["docker", "exec", "-t"])
    };
    let exec = exec
        .arg(&config.container_name)
        .args(["bash", "-c"])
        .arg(script);
    steps.push(Step::required(PlannedCommand::remote_pty(exec, pty)));

    StagePlan {
        name: NAME,
        display_name: DISPLAY_NAME,
        steps,
    }
}
