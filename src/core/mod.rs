pub mod orchestrator;
pub mod probes;
pub mod provision;
pub mod settle;
pub mod verifier;

pub use crate::domain::model::{HealthReport, ProbeOutcome, ProbeResult, RunOptions, ServiceTarget, Topology};
pub use crate::domain::ports::{CommandOutput, CommandRunner, HttpProber};
pub use crate::utils::error::Result;
