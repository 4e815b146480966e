#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{DeployArgs, HealthArgs, ModelsArgs};
pub use toml_config::{OpsConfig, ReadinessCheck};
