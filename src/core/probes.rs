//! Probe helpers shared by the orchestrator and the verifier.
//!
//! Every helper is read-only and turns tool errors into a failed outcome
//! instead of an `Err`, so a broken probe never stops the remaining ones.

use crate::config::toml_config::substitute_vars;
use crate::config::ReadinessCheck;
use crate::domain::model::{ProbeKind, ProbeOutcome, ProbeResult, ServiceTarget};
use crate::domain::ports::{CommandRunner, HttpProber};
use std::collections::HashMap;

/// Asks the engine for running containers filtered by name and matches the
/// name exactly, since `--filter name=` is a substring match.
pub async fn container_running<R>(runner: &R, engine: &str, target: &ServiceTarget) -> ProbeResult
where
    R: CommandRunner + ?Sized,
{
    let name_filter = format!("name={}", target.id);
    let args = [
        "ps",
        "--filter",
        name_filter.as_str(),
        "--filter",
        "status=running",
        "--format",
        "{{.Names}}",
    ];

    let running = match runner.run(engine, &args).await {
        Ok(output) if output.success => output.stdout.lines().any(|line| line.trim() == target.id),
        Ok(output) => {
            tracing::warn!("{} ps failed for {}: {}", engine, target.id, output.stderr.trim());
            false
        }
        Err(e) => {
            tracing::warn!("Could not query {} for {}: {}", engine, target.id, e);
            false
        }
    };

    ProbeResult::new(target.clone(), ProbeKind::RunningState, running.into())
}

pub async fn http_reachable<H>(prober: &H, target: &ServiceTarget) -> ProbeResult
where
    H: HttpProber + ?Sized,
{
    let reachable = prober.is_reachable(&target.id).await;
    ProbeResult::new(target.clone(), ProbeKind::Reachability, reachable.into())
}

/// Bucket presence through the object-storage CLI. Absent CLI means skipped.
pub async fn bucket_exists<R>(runner: &R, cli: &str, target: &ServiceTarget) -> ProbeResult
where
    R: CommandRunner + ?Sized,
{
    if !runner.is_installed(cli, &["--version"]).await {
        tracing::info!("{} not installed, skipping bucket check", cli);
        return ProbeResult::new(target.clone(), ProbeKind::Bucket, ProbeOutcome::Skipped);
    }

    let exists = match runner.run(cli, &["ls", target.id.as_str()]).await {
        Ok(output) => output.success,
        Err(e) => {
            tracing::warn!("{} ls {} failed: {}", cli, target.id, e);
            false
        }
    };

    ProbeResult::new(target.clone(), ProbeKind::Bucket, exists.into())
}

/// Tool-native readiness: `exec` inside a container or a plain HTTP liveness call.
///
/// `container_id` maps the short container name to its full id and `vars`
/// resolves `${VAR}` placeholders in the command (usually from the env file).
pub async fn readiness<R, H, F>(
    runner: &R,
    prober: &H,
    engine: &str,
    check: &ReadinessCheck,
    container_id: F,
    vars: &HashMap<String, String>,
) -> ProbeResult
where
    R: CommandRunner + ?Sized,
    H: HttpProber + ?Sized,
    F: Fn(&str) -> String,
{
    match check {
        ReadinessCheck::Exec {
            name,
            container,
            command,
            expect,
        } => {
            let id = container_id(container);
            let expanded: Vec<String> = command
                .iter()
                .map(|arg| substitute_vars(arg, |key| vars.get(key).cloned(), true))
                .collect();

            let mut args = vec!["exec", id.as_str()];
            args.extend(expanded.iter().map(String::as_str));

            let ready = match runner.run(engine, &args).await {
                Ok(output) if output.success => match expect {
                    Some(expected) => output.stdout.contains(expected.as_str()),
                    None => true,
                },
                Ok(_) => false,
                Err(e) => {
                    tracing::warn!("Readiness check for {} could not run: {}", name, e);
                    false
                }
            };

            ProbeResult::new(ServiceTarget::container(id, name), ProbeKind::Readiness, ready.into())
        }
        ReadinessCheck::Http { name, url } => {
            let ready = prober.is_reachable(url).await;
            ProbeResult::new(ServiceTarget::endpoint(url, name), ProbeKind::Readiness, ready.into())
        }
    }
}
