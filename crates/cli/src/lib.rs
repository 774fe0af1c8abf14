//! Umbra command line support
//!
//! Configuration loading and the scripted deployment used by the `umbra`
//! binary.

pub mod config;
pub mod deploy;

pub use config::CliConfig;
pub use deploy::{execute, DeployHistory, DeployRecord, Deployment, Registration};
