use crate::core::probes;
use crate::domain::model::{HealthReport, ProbeKind, ProbeOutcome, ProbeResult, ServiceTarget, Topology};
use crate::domain::ports::{CommandRunner, HttpProber};
use crate::utils::console::{self, Tone};

/// Read-only health check over the whole topology.
///
/// Every probe runs; the verdict is computed afterwards from the collected
/// results, so a failing container never hides a failing endpoint.
pub struct HealthVerifier<R: CommandRunner, H: HttpProber> {
    topology: Topology,
    engine: String,
    bucket_cli: String,
    runner: R,
    prober: H,
    status_to_stderr: bool,
}

impl<R: CommandRunner, H: HttpProber> HealthVerifier<R, H> {
    pub fn new(
        topology: Topology,
        engine: impl Into<String>,
        bucket_cli: impl Into<String>,
        runner: R,
        prober: H,
    ) -> Self {
        Self {
            topology,
            engine: engine.into(),
            bucket_cli: bucket_cli.into(),
            runner,
            prober,
            status_to_stderr: false,
        }
    }

    /// Sends the human-readable lines to stderr, leaving stdout free for a
    /// machine-readable report.
    pub fn with_status_on_stderr(mut self, enabled: bool) -> Self {
        self.status_to_stderr = enabled;
        self
    }

    fn emit(&self, line: &str) {
        if self.status_to_stderr {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    fn emit_results(&self, results: &[ProbeResult], width: usize) {
        for result in results {
            self.emit(&render(result, width));
        }
    }

    fn label_width(&self) -> usize {
        self.topology
            .containers
            .iter()
            .chain(&self.topology.endpoints)
            .chain(&self.topology.bucket)
            .map(|target| label(target).chars().count())
            .max()
            .unwrap_or(0)
    }

    pub async fn check_containers(&self) -> Vec<ProbeResult> {
        let mut results = Vec::with_capacity(self.topology.containers.len());
        for target in &self.topology.containers {
            results.push(probes::container_running(&self.runner, &self.engine, target).await);
        }
        results
    }

    pub async fn check_endpoints(&self) -> Vec<ProbeResult> {
        let mut results = Vec::with_capacity(self.topology.endpoints.len());
        for target in &self.topology.endpoints {
            results.push(probes::http_reachable(&self.prober, target).await);
        }
        results
    }

    pub async fn check_bucket(&self) -> Option<ProbeResult> {
        match &self.topology.bucket {
            Some(target) => Some(probes::bucket_exists(&self.runner, &self.bucket_cli, target).await),
            None => None,
        }
    }

    pub async fn run(&self) -> HealthReport {
        tracing::info!(
            containers = self.topology.containers.len(),
            endpoints = self.topology.endpoints.len(),
            "Running health checks"
        );

        let width = self.label_width();

        self.emit(&console::heading("Containers"));
        let mut results = self.check_containers().await;
        self.emit_results(&results, width);

        self.emit(&console::heading("HTTP endpoints"));
        let endpoints = self.check_endpoints().await;
        self.emit_results(&endpoints, width);
        results.extend(endpoints);

        if let Some(bucket) = self.check_bucket().await {
            self.emit(&console::heading("Object storage"));
            self.emit_results(std::slice::from_ref(&bucket), width);
            results.push(bucket);
        }

        let report = HealthReport::new(results);
        self.emit("");
        if report.healthy {
            self.emit(&console::paint("All services are healthy", Tone::Good));
        } else {
            let failed = report.failures().count();
            tracing::warn!(failed, "Health check failed");
            self.emit(&console::paint(&format!("{} check(s) failed", failed), Tone::Bad));
        }
        report
    }
}

pub fn tone_for(result: &ProbeResult) -> Tone {
    match (result.probe, result.outcome) {
        (_, ProbeOutcome::Ok) => Tone::Good,
        (_, ProbeOutcome::Skipped) | (ProbeKind::Bucket, _) => Tone::Warn,
        (_, ProbeOutcome::Failed) => Tone::Bad,
    }
}

fn label(target: &ServiceTarget) -> String {
    format!("{} ({})", target.display_name, target.id)
}

pub fn render(result: &ProbeResult, width: usize) -> String {
    console::status_line(&label(&result.target), width, result.label(), tone_for(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_bucket_is_a_warning_not_an_error() {
        let result = ProbeResult::new(
            ServiceTarget::bucket("local/documents"),
            ProbeKind::Bucket,
            ProbeOutcome::Failed,
        );
        assert_eq!(tone_for(&result), Tone::Warn);
        assert!(render(&result, 0).contains("NOT CREATED"));
    }

    #[test]
    fn test_stopped_container_renders_red() {
        let result = ProbeResult::new(
            ServiceTarget::container("transport_ocr_redis", "Redis"),
            ProbeKind::RunningState,
            ProbeOutcome::Failed,
        );
        assert_eq!(tone_for(&result), Tone::Bad);
        assert!(render(&result, 0).contains("transport_ocr_redis"));
    }
}
