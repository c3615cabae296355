//! hls-runner - remote driver for a containerized HLS synthesis toolchain
//!
//! Stages a local project onto a cloud instance, refreshes the toolchain's
//! source checkout inside a build container, launches the synthesis job and
//! retrieves the resulting boot image.

pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod pipeline;
