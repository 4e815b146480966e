use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Container,
    HttpEndpoint,
    Bucket,
}

/// One named thing the deployment brings up and the verifier checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTarget {
    pub id: String,
    pub display_name: String,
    pub kind: TargetKind,
}

impl ServiceTarget {
    pub fn container(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            kind: TargetKind::Container,
        }
    }

    pub fn endpoint(url: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: url.into(),
            display_name: display_name.into(),
            kind: TargetKind::HttpEndpoint,
        }
    }

    pub fn bucket(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            display_name: format!("Bucket {}", path),
            id: path,
            kind: TargetKind::Bucket,
        }
    }
}

/// Ordered topology shared by the orchestrator and the verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    pub containers: Vec<ServiceTarget>,
    pub endpoints: Vec<ServiceTarget>,
    pub bucket: Option<ServiceTarget>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeKind {
    RunningState,
    Reachability,
    Readiness,
    Bucket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProbeOutcome {
    Ok,
    Failed,
    Skipped,
}

impl From<bool> for ProbeOutcome {
    fn from(passed: bool) -> Self {
        if passed {
            ProbeOutcome::Ok
        } else {
            ProbeOutcome::Failed
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub target: ServiceTarget,
    pub probe: ProbeKind,
    pub outcome: ProbeOutcome,
}

impl ProbeResult {
    pub fn new(target: ServiceTarget, probe: ProbeKind, outcome: ProbeOutcome) -> Self {
        Self {
            target,
            probe,
            outcome,
        }
    }

    /// Status word printed next to the target.
    pub fn label(&self) -> &'static str {
        match (self.probe, self.outcome) {
            (ProbeKind::RunningState, ProbeOutcome::Ok) => "RUNNING",
            (ProbeKind::RunningState, _) => "STOPPED",
            (ProbeKind::Bucket, ProbeOutcome::Ok) => "EXISTS",
            (ProbeKind::Bucket, ProbeOutcome::Failed) => "NOT CREATED",
            (_, ProbeOutcome::Skipped) => "SKIPPED",
            (_, ProbeOutcome::Ok) => "OK",
            (_, ProbeOutcome::Failed) => "FAILED",
        }
    }

    /// Bucket checks are informational and never fail the verdict.
    pub fn is_mandatory(&self) -> bool {
        matches!(self.probe, ProbeKind::RunningState | ProbeKind::Reachability)
    }

    pub fn is_failure(&self) -> bool {
        self.is_mandatory() && self.outcome == ProbeOutcome::Failed
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    pub gpu: bool,
    pub skip_build: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub checked_at: DateTime<Utc>,
    pub results: Vec<ProbeResult>,
    pub healthy: bool,
}

impl HealthReport {
    pub fn new(results: Vec<ProbeResult>) -> Self {
        let healthy = is_healthy(&results);
        Self {
            checked_at: Utc::now(),
            results,
            healthy,
        }
    }

    pub fn exit_code(&self) -> i32 {
        if self.healthy {
            0
        } else {
            1
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results.iter().filter(|result| result.is_failure())
    }
}

/// Healthy iff no container-state or HTTP probe failed.
pub fn is_healthy(results: &[ProbeResult]) -> bool {
    !results.iter().any(ProbeResult::is_failure)
}
