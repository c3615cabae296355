//! Build configuration
//!
//! One immutable `BuildConfig` per run, constructed from parsed CLI
//! arguments before any pipeline stage executes. No stage mutates it.

use std::path::{Path, PathBuf};

use crate::domain::workaround::WorkaroundSet;
use crate::domain::FailurePolicy;
use crate::error::RunnerError;

/// Fixed names and remote paths baked into the build image
pub mod constants {
    /// Default build container name
    pub const DEFAULT_CONTAINER_NAME: &str = "hls_builder";

    /// Default toolchain image
    pub const DEFAULT_IMAGE_NAME: &str = "hls-toolchain:latest";

    /// Throwaway branch created when a checkout ref is pinned.
    /// Not parameterized: a second pinned run against a live container fails
    /// because the branch already exists; the prepare stage's container reset
    /// is the documented way to clear it.
    pub const BUILD_BRANCH: &str = "hls_build";

    /// Toolchain source checkout inside the container
    pub const TOOLCHAIN_DIR: &str = "/root/hls-toolchain";

    /// Synthesis entry point inside the container
    pub const SYNTHESIS_SCRIPT: &str = "/root/hls-toolchain/script/hls_build_system.py";

    /// First-ever project builds trip an XSDK make-project timeout without this
    pub const XSDK_TIMEOUT_FLAG: &str = "--increase_xsdk_timeout";

    /// Defective XSDK script replaced by the bundled patched copy
    pub const XSDB_PATCH_TARGET: &str = "/opt/Xilinx/SDK/2015.2/scripts/xsdb/xsdb/xsdb.tcl";

    /// Staged input directory inside the container
    pub const CONTAINER_INPUT_DIR: &str = "/root/input";

    /// Virtual display bootstrap script shipped in the image
    pub const VNC_BOOTSTRAP: &str = "/root/vnc.sh";

    /// Final artifact name produced by synthesis
    pub const BOOT_IMAGE: &str = "BOOT.bin";
}

/// All parameters needed by every pipeline stage
#[derive(Clone, Debug)]
pub struct BuildConfig {
    /// SSH identity file for the remote target
    pub key_path: PathBuf,
    /// user@host of the cloud instance hosting the build container
    pub remote_target: String,
    /// Build container name
    pub container_name: String,
    /// Toolchain image the container is started from
    pub image_name: String,
    /// Top-level design entry point (`<name>.maxpat`)
    pub project_name: String,
    /// Local directory holding the design sources
    pub local_input_dir: PathBuf,
    /// Local directory the boot image is copied into; must already exist
    pub local_output_dir: PathBuf,
    /// Optional ref pinning the toolchain revision; `None` fast-forwards
    pub checkout_ref: Option<String>,
    /// Bundled patched xsdb.tcl
    pub patch_file: PathBuf,
    /// Whether a failed stage halts the pipeline
    pub policy: FailurePolicy,
    /// Toolchain-defect workarounds, all enabled by default
    pub workarounds: WorkaroundSet,
}

impl BuildConfig {
    /// Home directory on the remote host, used for the volume mounts.
    ///
    /// Derived from the user part of `remote_target`; `~` only expands
    /// through the remote shell, which docker's `-v` does not go through.
    pub fn remote_home(&self) -> String {
        match self.remote_target.split_once('@') {
            Some((user, _)) if !user.is_empty() => format!("/home/{}", user),
            _ => "~".to_string(),
        }
    }

    /// Input file path inside the container, as passed to the synthesis script
    pub fn container_input_file(&self) -> String {
        format!(
            "{}/{}.maxpat",
            constants::CONTAINER_INPUT_DIR,
            self.project_name
        )
    }

    /// Validate the local preconditions before any stage runs
    pub fn validate(&self) -> Result<(), RunnerError> {
        if !self.local_output_dir.is_dir() {
            return Err(RunnerError::OutputDirMissing(self.local_output_dir.clone()));
        }
        if self.workarounds.enabled(crate::domain::Workaround::PatchedXsdbScript)
            && !self.patch_file.is_file()
        {
            return Err(RunnerError::PatchFileMissing(self.patch_file.clone()));
        }
        Ok(())
    }
}

/// Locate the bundled xsdb.tcl next to the executable, falling back to the
/// in-tree copy for development runs.
pub fn default_patch_file() -> PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let candidate = dir.join("assets").join("xsdb.tcl");
            if candidate.is_file() {
                return candidate;
            }
        }
    }
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("assets")
        .join("xsdb.tcl")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Workaround;

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
    fn test_fields_round_trip() {
        let config = test_config();
        assert_eq!(config.key_path, PathBuf::from("/home/me/keys/admin.pem"));
        assert_eq!(config.remote_target, "ubuntu@host");
        assert_eq!(config.container_name, "hls_builder");
        assert_eq!(config.image_name, "hls-toolchain:latest");
        assert_eq!(config.project_name, "fm");
        assert_eq!(config.local_input_dir, PathBuf::from("/tmp/in"));
        assert_eq!(config.local_output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.checkout_ref, None);
    }

    #[test]
    fn test_remote_home_from_user() {
        let config = test_config();
        assert_eq!(config.remote_home(), "/home/ubuntu");
    }

    #[test]
    fn test_remote_home_without_user() {
        let mut config = test_config();
        config.remote_target = "host.example.com".to_string();
        assert_eq!(config.remote_home(), "~");
    }

    #[test]
    fn test_container_input_file() {
        let config = test_config();
        assert_eq!(config.container_input_file(), "/root/input/fm.maxpat");
    }

    #[test]
    fn test_validate_missing_output_dir() {
        let mut config = test_config();
        config.local_output_dir = PathBuf::from("/no/such/dir");
        assert!(matches!(
            config.validate(),
            Err(RunnerError::OutputDirMissing(_))
        ));
    }

    #[test]
    fn test_validate_missing_patch_tolerated_when_disabled() {
        let mut config = test_config();
        config.local_output_dir = std::env::temp_dir();
        config.patch_file = PathBuf::from("/no/such/xsdb.tcl");
        config.workarounds.disable(Workaround::PatchedXsdbScript);
        assert!(config.validate().is_ok());
    }
}
