// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Retry logic with exponential backoff for Kubernetes API calls.
//!
//! Transient client errors (429, 5xx, transport failures) are retried with
//! exponential backoff. Permanent errors (other 4xx, serialization) fail fast.

use crate::client::ClientError;
use rand::Rng;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Budget for one provider operation's client call (5 minutes)
const MAX_ELAPSED_TIME_SECS: u64 = 300;

const INITIAL_INTERVAL_MILLIS: u64 = 100;

/// Cap on a single delay, so a long outage is polled every 30s
const MAX_INTERVAL_SECS: u64 = 30;

const BACKOFF_MULTIPLIER: f64 = 2.0;

/// Delays vary by ±10% so that parallel resource operations spread out
const RANDOMIZATION_FACTOR: f64 = 0.1;

/// Delay schedule for retried client calls.
///
/// A [`Context`](crate::context::Context) holds one as a template. Every
/// operation retries with its own clone, so the elapsed-time budget starts
/// when the call is first attempted.
#[derive(Clone, Debug)]
pub struct ExponentialBackoff {
    /// Delay returned by the next call to [`next_backoff`](Self::next_backoff)
    pub current_interval: Duration,
    pub initial_interval: Duration,
    pub max_interval: Duration,
    /// `None` retries until a permanent error
    pub max_elapsed_time: Option<Duration>,
    pub multiplier: f64,
    /// 0.0 gives exact delays, as tests use
    pub randomization_factor: f64,
    start_time: Instant,
}

impl ExponentialBackoff {
    #[must_use]
    pub fn new(
        initial_interval: Duration,
        max_interval: Duration,
        max_elapsed_time: Option<Duration>,
        multiplier: f64,
        randomization_factor: f64,
    ) -> Self {
        Self {
            current_interval: initial_interval,
            initial_interval,
            max_interval,
            max_elapsed_time,
            multiplier,
            randomization_factor,
            start_time: Instant::now(),
        }
    }

    /// Next delay, or `None` once the elapsed-time budget is spent.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        if let Some(max_elapsed) = self.max_elapsed_time {
            if self.start_time.elapsed() >= max_elapsed {
                return None;
            }
        }

        let interval = self.current_interval;
        let jittered = self.apply_jitter(interval);

        let next = interval.as_secs_f64() * self.multiplier;
        self.current_interval = Duration::from_secs_f64(next).min(self.max_interval);

        Some(jittered)
    }

    /// Start over from the initial interval.
    pub fn reset(&mut self) {
        self.current_interval = self.initial_interval;
        self.start_time = Instant::now();
    }

    fn apply_jitter(&self, interval: Duration) -> Duration {
        if self.randomization_factor == 0.0 {
            return interval;
        }

        let secs = interval.as_secs_f64();
        let delta = secs * self.randomization_factor;
        let jittered = rand::rng().random_range((secs - delta)..=(secs + delta));

        Duration::from_secs_f64(jittered.max(0.0))
    }
}

/// Backoff used by [`Context::new`](crate::context::Context::new).
///
/// Delays start at 100ms and double up to 30s (100ms, 200ms, ... 25.6s, 30s,
/// 30s), with ±10% jitter, until 5 minutes have passed.
#[must_use]
pub fn default_backoff() -> ExponentialBackoff {
    ExponentialBackoff::new(
        Duration::from_millis(INITIAL_INTERVAL_MILLIS),
        Duration::from_secs(MAX_INTERVAL_SECS),
        Some(Duration::from_secs(MAX_ELAPSED_TIME_SECS)),
        BACKOFF_MULTIPLIER,
        RANDOMIZATION_FACTOR,
    )
}

/// Retry a client call with the default backoff.
///
/// # Errors
///
/// Returns the first non-retryable error, or the last retryable error once the
/// backoff is exhausted.
///
/// # Example
///
/// ```no_run
/// use hive_provider::client::{KubeObjectClient, ObjectClient};
/// use hive_provider::crd::ClusterDeployment;
/// use hive_provider::retry::retry_client_call;
/// use kube::core::ApiResource;
///
/// # async fn example(client: KubeObjectClient) -> Result<(), hive_provider::client::ClientError> {
/// let ar = ApiResource::erase::<ClusterDeployment>(&());
/// let object = retry_client_call(
///     || client.get(&ar, Some("clusters"), "mycluster"),
///     "get clusterdeployment clusters/mycluster",
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn retry_client_call<T, F, Fut>(operation: F, operation_name: &str) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, ClientError>>,
{
    retry_with_backoff(default_backoff(), operation, operation_name).await
}

/// Retry a client call with the given backoff.
///
/// # Errors
///
/// Returns the first non-retryable error, or the last retryable error once the
/// backoff is exhausted.
pub async fn retry_with_backoff<T, F, Fut>(
    mut backoff: ExponentialBackoff,
    mut operation: F,
    operation_name: &str,
) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, ClientError>>,
{
    backoff.reset();
    let start_time = Instant::now();
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(
                        operation = operation_name,
                        attempt = attempt,
                        elapsed = ?start_time.elapsed(),
                        "Kubernetes API call succeeded after retries"
                    );
                }
                return Ok(value);
            }
            Err(e) => {
                if !e.is_retryable() {
                    debug!(
                        operation = operation_name,
                        error = %e,
                        "Non-retryable Kubernetes API error, failing immediately"
                    );
                    return Err(e);
                }

                if let Some(duration) = backoff.next_backoff() {
                    warn!(
                        operation = operation_name,
                        attempt = attempt,
                        retry_after = ?duration,
                        error = %e,
                        "Retryable Kubernetes API error, will retry"
                    );
                    tokio::time::sleep(duration).await;
                } else {
                    error!(
                        operation = operation_name,
                        attempt = attempt,
                        elapsed = ?start_time.elapsed(),
                        error = %e,
                        "Backoff exhausted, giving up"
                    );
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod retry_tests;
