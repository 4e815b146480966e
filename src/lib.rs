pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{DeployArgs, HealthArgs, ModelsArgs};

pub use adapters::{ReqwestProber, SystemRunner};
pub use config::OpsConfig;
pub use core::{orchestrator::Deployer, provision::ModelProvisioner, verifier::HealthVerifier};
pub use utils::error::{OpsError, Result};
