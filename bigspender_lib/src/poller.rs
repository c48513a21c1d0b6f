//! Polls a server-side job until its transaction step reaches a terminal status.
//!
//! Each tick fetches a fresh job snapshot, looks up the step by title and
//! either returns, fails, or waits a fixed interval before the next fetch.
//! The loop is bounded by an attempt ceiling and a wall-clock budget, and
//! stops as soon as the cancellation token fires.

use std::future::Future;
use std::time::Duration;

use basiq_api::types::{Job, StepStatus};
use basiq_api::Client;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::SpendError;

/// Title of the step whose result links to the transaction collection.
pub const RETRIEVE_TRANSACTIONS: &str = "retrieve-transactions";

const DEFAULT_INTERVAL_MS: u64 = 3000;
const DEFAULT_MAX_ATTEMPTS: u64 = 100;
const DEFAULT_MAX_WAIT_SECS: u64 = 300;
const DEFAULT_TRANSPORT_RETRIES: u64 = 3;

/// Bounds for a single poll loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Fixed wait between fetches.
    pub interval: Duration,
    /// Maximum number of fetches, including the first. The first fetch
    /// always happens, so 0 behaves like 1.
    pub max_attempts: u32,
    /// Give up once another wait would exceed this budget.
    pub max_wait: Duration,
    /// Consecutive transient failures tolerated before giving up.
    pub max_transport_retries: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            max_attempts: DEFAULT_MAX_ATTEMPTS as u32,
            max_wait: Duration::from_secs(DEFAULT_MAX_WAIT_SECS),
            max_transport_retries: DEFAULT_TRANSPORT_RETRIES as u32,
        }
    }
}

impl PollConfig {
    pub fn from_env() -> Self {
        Self {
            interval: Duration::from_millis(env_u64(
                "BIGSPENDER_POLL_INTERVAL_MS",
                DEFAULT_INTERVAL_MS,
            )),
            max_attempts: env_u32("BIGSPENDER_POLL_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS),
            max_wait: Duration::from_secs(env_u64(
                "BIGSPENDER_POLL_MAX_WAIT_SECS",
                DEFAULT_MAX_WAIT_SECS,
            )),
            max_transport_retries: env_u32(
                "BIGSPENDER_TRANSPORT_RETRIES",
                DEFAULT_TRANSPORT_RETRIES,
            ),
        }
    }
}

/// Fetches the job with `fetch` until the step titled `title` is terminal.
///
/// Returns the step's result URL on success. The first fetch happens
/// immediately; waits only separate consecutive fetches.
///
/// - Missing step: `StepNotFound`, without waiting.
/// - `failed`: `JobFailed` carrying the failure result URL, if any.
/// - Transient API errors: retried on the same interval, up to
///   `max_transport_retries` in a row. Other API errors are returned as is.
/// - Out of attempts or time: `Timeout`.
pub async fn wait_for_step<F, Fut>(
    mut fetch: F,
    title: &str,
    config: &PollConfig,
    cancel: &CancellationToken,
) -> Result<String, SpendError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Job, basiq_api::Error>>,
{
    let started = Instant::now();
    let mut attempts: u32 = 0;
    let mut transport_failures: u32 = 0;

    loop {
        attempts += 1;
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SpendError::Cancelled),
            res = fetch() => res,
        };

        match outcome {
            Ok(job) => {
                transport_failures = 0;
                let step = job.find_step(title).ok_or_else(|| SpendError::StepNotFound {
                    title: title.to_string(),
                })?;

                if step.status.is_terminal() {
                    let url = step.result_url().map(str::to_string);
                    if step.status == StepStatus::Success {
                        tracing::info!(job = %job.id, attempts, "Job step '{}' succeeded", title);
                        return url.ok_or_else(|| SpendError::ResultMissing {
                            title: title.to_string(),
                        });
                    }
                    tracing::error!(job = %job.id, attempts, "Job step '{}' failed", title);
                    return Err(SpendError::JobFailed { url });
                }
                tracing::debug!(
                    job = %job.id,
                    attempts,
                    status = %step.status,
                    "Job step still running"
                );
            }
            Err(err)
                if err.is_transient() && transport_failures < config.max_transport_retries =>
            {
                transport_failures += 1;
                tracing::warn!(
                    "Job poll failed (retry {}/{}), retrying in {:.1}s: {}",
                    transport_failures,
                    config.max_transport_retries,
                    config.interval.as_secs_f64(),
                    err
                );
            }
            Err(err) => return Err(SpendError::Api(err)),
        }

        let elapsed = started.elapsed();
        if attempts >= config.max_attempts || elapsed + config.interval > config.max_wait {
            tracing::error!(attempts, "Gave up waiting for job step '{}'", title);
            return Err(SpendError::Timeout { attempts, elapsed });
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SpendError::Cancelled),
            _ = sleep(config.interval) => {}
        }
    }
}

/// Polls jobs through an authenticated client.
pub struct JobPoller<'a> {
    client: &'a Client,
    config: PollConfig,
}

impl<'a> JobPoller<'a> {
    pub fn new(client: &'a Client, config: PollConfig) -> Self {
        Self { client, config }
    }

    /// Waits for the job's `retrieve-transactions` step and returns the
    /// link to the transaction collection.
    pub async fn wait_for_transactions(
        &self,
        job_id: &str,
        cancel: &CancellationToken,
    ) -> Result<String, SpendError> {
        let client = self.client;
        wait_for_step(
            move || client.get_job(job_id),
            RETRIEVE_TRANSACTIONS,
            &self.config,
            cancel,
        )
        .await
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u64) -> u32 {
    u32::try_from(env_u64(key, default)).unwrap_or(u32::MAX)
}
