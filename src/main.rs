//! hls-runner - remote driver for a containerized HLS synthesis toolchain
//!
//! Usage:
//! - `hls-runner -i ~/input/fm -o ~/output -n fm -k ~/keys/admin.pem -m ubuntu@host`
//! - Pin the toolchain revision: `... -c refs/tags/v0.0.1`
//! - Stop at the first failed stage: `... --halt-on-failure`
//! - Switch off a fixed-upstream workaround: `... --disable screen`

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use hls_runner::config::{constants, default_patch_file, BuildConfig};
use hls_runner::domain::{FailurePolicy, Workaround, WorkaroundSet};
use hls_runner::error::RunnerError;
use hls_runner::pipeline;

/// Parse command line arguments into a build configuration
fn parse_args(args: &[String]) -> Result<(BuildConfig, bool), RunnerError> {
    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut name: Option<String> = None;
    let mut key: Option<PathBuf> = None;
    let mut machine: Option<String> = None;
    let mut checkout: Option<String> = None;
    let mut container = constants::DEFAULT_CONTAINER_NAME.to_string();
    let mut image = constants::DEFAULT_IMAGE_NAME.to_string();
    let mut patch_file: Option<PathBuf> = None;
    let mut policy = FailurePolicy::BestEffort;
    let mut workarounds = WorkaroundSet::default();
    let mut summary_json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--input" | "-i" if i + 1 < args.len() => {
                input = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--output" | "-o" if i + 1 < args.len() => {
                output = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--name" | "-n" if i + 1 < args.len() => {
                name = Some(args[i + 1].clone());
                i += 2;
            }
            "--key" | "-k" if i + 1 < args.len() => {
                key = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--machine" | "-m" if i + 1 < args.len() => {
                machine = Some(args[i + 1].clone());
                i += 2;
            }
            "--checkout" | "-c" if i + 1 < args.len() => {
                checkout = Some(args[i + 1].clone());
                i += 2;
            }
            "--container" if i + 1 < args.len() => {
                container = args[i + 1].clone();
                i += 2;
            }
            "--image" if i + 1 < args.len() => {
                image = args[i + 1].clone();
                i += 2;
            }
            "--patch-file" if i + 1 < args.len() => {
                patch_file = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--halt-on-failure" => {
                policy = FailurePolicy::HaltOnFailure;
                i += 1;
            }
            "--disable" if i + 1 < args.len() => {
                let flag = &args[i + 1];
                let workaround = Workaround::from_flag(flag).ok_or_else(|| {
                    RunnerError::InvalidArgs(format!("unknown workaround: {}", flag))
                })?;
                workarounds.disable(workaround);
                i += 2;
            }
            "--summary-json" => {
                summary_json = true;
                i += 1;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => {
                return Err(RunnerError::InvalidArgs(format!(
                    "unexpected argument: {}",
                    other
                )));
            }
        }
    }

    let missing = |flag: &str| RunnerError::InvalidArgs(format!("{} is required", flag));
    let config = BuildConfig {
        key_path: key.ok_or_else(|| missing("-k/--key"))?,
        remote_target: machine.ok_or_else(|| missing("-m/--machine"))?,
        container_name: container,
        image_name: image,
        project_name: name.ok_or_else(|| missing("-n/--name"))?,
        local_input_dir: input.ok_or_else(|| missing("-i/--input"))?,
        local_output_dir: output.ok_or_else(|| missing("-o/--output"))?,
        checkout_ref: checkout,
        patch_file: patch_file.unwrap_or_else(default_patch_file),
        policy,
        workarounds,
    };
    Ok((config, summary_json))
}

fn print_help() {
    println!("hls-runner - remote driver for a containerized HLS synthesis toolchain");
    println!();
    println!("USAGE:");
    println!("    hls-runner -i <DIR> -o <DIR> -n <NAME> -k <KEY> -m <USER@HOST> [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -i, --input <DIR>      Local directory holding the design sources");
    println!("    -o, --output <DIR>     Existing local directory for BOOT.bin");
    println!("    -n, --name <NAME>      Top-level design entry point (NAME.maxpat)");
    println!("    -k, --key <FILE>       SSH identity file for the remote target");
    println!("    -m, --machine <ADDR>   user@host of the build instance");
    println!("    -c, --checkout <REF>   Pin the toolchain source to this ref");
    println!("    --container <NAME>     Build container name (default: hls_builder)");
    println!("    --image <IMAGE>        Toolchain image (default: hls-toolchain:latest)");
    println!("    --patch-file <FILE>    Patched xsdb.tcl to ship (default: bundled copy)");
    println!("    --halt-on-failure      Skip remaining build stages after a failure");
    println!("    --disable <NAME>       Disable a workaround:");
    println!("                           xsdb-patch, terminfo, vnc, pty, screen");
    println!("    --summary-json         Print the machine-readable run summary");
    println!("    -h, --help             Print help information");
    println!();
    println!("EXAMPLES:");
    println!("    hls-runner -i ~/input/fm -o ~/output -n fm -k ~/keys/admin.pem \\");
    println!("        -m ubuntu@ec2-54-250-171-127.ap-northeast-1.compute.amazonaws.com \\");
    println!("        -c refs/remotes/origin/master");
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let (config, summary_json) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Run with --help for usage.");
            std::process::exit(2);
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    let rt = tokio::runtime::Runtime::new().expect("Failed to create runtime");
    let exit_code = rt.block_on(async {
        let cancel = CancellationToken::new();

        // First Ctrl-C cancels the running stage; teardown still runs
        let signal_token = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, cancelling current stage");
                signal_token.cancel();
            }
        });

        let summary = pipeline::run(&config, &cancel).await;
        if summary_json {
            match serde_json::to_string_pretty(&summary) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::error!(error = %e, "Failed to serialize summary"),
            }
        }
        summary.exit_code()
    });

    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("hls-runner")
            .chain(args.iter().copied())
            .map(String::from)
            .collect()
    }

    const REQUIRED: &[&str] = &[
        "-i", "/tmp/in", "-o", "/tmp/out", "-n", "fm", "-k", "/tmp/key.pem", "-m", "ubuntu@host",
    ];

    #[test]
    fn test_parse_required_args() {
        let (config, summary_json) = parse_args(&argv(REQUIRED)).unwrap();
        assert_eq!(config.project_name, "fm");
        assert_eq!(config.remote_target, "ubuntu@host");
        assert_eq!(config.container_name, "hls_builder");
        assert_eq!(config.image_name, "hls-toolchain:latest");
        assert_eq!(config.checkout_ref, None);
        assert_eq!(config.policy, FailurePolicy::BestEffort);
        assert!(!summary_json);
    }

    #[test]
    fn test_parse_checkout_and_policy() {
        let mut args: Vec<&str> = REQUIRED.to_vec();
        args.extend(["-c", "refs/tags/v0.0.1", "--halt-on-failure"]);
        let (config, _) = parse_args(&argv(&args)).unwrap();
        assert_eq!(config.checkout_ref.as_deref(), Some("refs/tags/v0.0.1"));
        assert_eq!(config.policy, FailurePolicy::HaltOnFailure);
    }

    #[test]
    fn test_parse_disable_workaround() {
        let mut args: Vec<&str> = REQUIRED.to_vec();
        args.extend(["--disable", "screen", "--disable", "vnc"]);
        let (config, _) = parse_args(&argv(&args)).unwrap();
        assert!(!config.workarounds.enabled(Workaround::ScreenWrapper));
        assert!(!config.workarounds.enabled(Workaround::VirtualDisplay));
        assert!(config.workarounds.enabled(Workaround::ForcePty));
    }

    #[test]
    fn test_parse_rejects_unknown_workaround() {
        let mut args: Vec<&str> = REQUIRED.to_vec();
        args.extend(["--disable", "bogus"]);
        assert!(matches!(
            parse_args(&argv(&args)),
            Err(RunnerError::InvalidArgs(_))
        ));
    }

    #[test]
    fn test_parse_missing_required_arg() {
        let args = argv(&["-i", "/tmp/in"]);
        assert!(matches!(
            parse_args(&args),
            Err(RunnerError::InvalidArgs(_))
        ));
    }

    #[test]
    fn test_parse_rejects_unexpected_argument() {
        let mut args: Vec<&str> = REQUIRED.to_vec();
        args.push("--frobnicate");
        assert!(matches!(
            parse_args(&argv(&args)),
            Err(RunnerError::InvalidArgs(_))
        ));
    }
}
