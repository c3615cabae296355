//! Retrieve Output Artifact
//!
//! Copies the boot image from the remote host back to the caller's output
//! directory. The artifact lands on the remote host filesystem through the
//! output volume mounted at container start; no container-to-host copy is
//! issued.

use crate::config::{constants, BuildConfig};
use crate::domain::command::{CommandLine, PlannedCommand};

use super::{StagePlan, Step};

pub const NAME: &str = "retrieve";
pub const DISPLAY_NAME: &str = "Retrieve Output Artifact";

pub fn plan(config: &BuildConfig) -> StagePlan {
    let local_dest = config.local_output_dir.join(constants::BOOT_IMAGE);
    let fetch = CommandLine::new("scp")
        .arg("-i")
        .arg(config.key_path.to_string_lossy())
        .arg(format!(
            "{}:~/output/{}",
            config.remote_target,
            constants::BOOT_IMAGE
        ))
        .arg(local_dest.to_string_lossy());

    StagePlan {
        name: NAME,
        display_name: DISPLAY_NAME,
        steps: vec![Step::required(PlannedCommand::local(fetch))],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FailurePolicy, WorkaroundSet};
    use std::path::PathBuf;

    fn test_config() -> BuildConfig {
        BuildConfig {
            key_path: PathBuf::from("/home/me/keys/admin.pem"),
            remote_target: "ubuntu@host".to_string(),
            container_name: "hls_builder".to_string(),
            image_name: "hls-toolchain:latest".to_string(),
            project_name: "fm".to_string(),
            local_input_dir: PathBuf::from("/home/me/input/fm"),
            local_output_dir: PathBuf::from("/home/me/output"),
            checkout_ref: None,
            patch_file: PathBuf::from("/tmp/xsdb.tcl"),
            policy: FailurePolicy::BestEffort,
            workarounds: WorkaroundSet::default(),
        }
    }

    #[test]
    fn test_fetches_boot_image_to_output_dir() {
        let stage = plan(&test_config());
        assert_eq!(stage.steps.len(), 1);
        let cmd = stage.steps[0].command.describe();
        assert_eq!(
            cmd,
            "scp -i /home/me/keys/admin.pem ubuntu@host:~/output/BOOT.bin /home/me/output/BOOT.bin"
        );
    }
}
