use crate::config::toml_config::SettleConfig;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlePlan {
    pub delay: Duration,
    pub poll: bool,
    pub max_wait: Duration,
    pub initial_interval: Duration,
    pub max_interval: Duration,
}

impl From<&SettleConfig> for SettlePlan {
    fn from(config: &SettleConfig) -> Self {
        Self {
            delay: Duration::from_secs(config.delay_seconds),
            poll: config.poll,
            max_wait: Duration::from_secs(config.max_wait_seconds),
            initial_interval: Duration::from_millis(config.initial_interval_ms),
            max_interval: Duration::from_millis(config.max_interval_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// Fixed delay elapsed.
    Waited(Duration),
    /// Every readiness probe passed before the deadline.
    Ready(Duration),
    TimedOut(Duration),
}

/// Exponential policy for the polling wait: no jitter, doubling from
/// `initial_interval` up to `max_interval`, giving up once `max(max_wait, delay)`
/// has elapsed.
pub fn backoff_policy(plan: &SettlePlan) -> ExponentialBackoff {
    let initial = plan.initial_interval.max(Duration::from_millis(1));
    ExponentialBackoff {
        current_interval: initial,
        initial_interval: initial,
        randomization_factor: 0.0,
        multiplier: 2.0,
        max_interval: plan.max_interval.max(initial),
        max_elapsed_time: Some(plan.max_wait.max(plan.delay)),
        ..Default::default()
    }
}

/// Waits for services to settle after `up`.
///
/// Without polling this is the plain fixed delay. With polling, `ready` is
/// called with backoff between attempts; the wait only ends before the fixed
/// delay if `ready` returns true.
pub async fn settle<F, Fut>(plan: &SettlePlan, mut ready: F) -> SettleOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    if !plan.poll {
        tracing::info!("Waiting {:?} for services to settle", plan.delay);
        sleep(plan.delay).await;
        return SettleOutcome::Waited(plan.delay);
    }

    let start = Instant::now();
    let result = retry(backoff_policy(plan), || {
        let probe = ready();
        async move {
            if probe.await {
                Ok(())
            } else {
                tracing::debug!("Services not ready yet");
                Err(backoff::Error::transient(()))
            }
        }
    })
    .await;

    let elapsed = start.elapsed();
    match result {
        Ok(()) => {
            tracing::info!("Services ready after {:?}", elapsed);
            SettleOutcome::Ready(elapsed)
        }
        Err(()) => {
            tracing::warn!("Services still not ready after {:?}", elapsed);
            SettleOutcome::TimedOut(elapsed)
        }
    }
}
