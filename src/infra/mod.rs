//! Infrastructure
//!
//! Subprocess execution against the local machine and the remote target

pub mod command;

pub use command::CommandRunner;
