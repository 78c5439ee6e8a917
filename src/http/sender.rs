use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::time::{Instant, sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{domain::RequestTask, domain::RunConfig, events::EventSink};

use super::body::{
    InjectedFields, MAX_RESPONSE_BYTES, build_body, log_preview, parse_template, read_capped,
};

/// Upper bound on one attempt, including reading the body.
pub const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(15);
const BACKOFF_UNIT_MS: u64 = 100;
const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// Terminal state of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Succeeded,
    /// 4xx response; never retried.
    ClientFailed,
    /// Every attempt failed.
    Exhausted,
    Cancelled,
    /// The body could not be built (bad template); never retried.
    Aborted,
}

enum Attempt {
    Response { status: u16, body: Vec<u8> },
    Transport(reqwest::Error),
    Read(reqwest::Error),
    TimedOut,
}

/// Sends tasks for one run and applies the retry/backoff policy.
#[derive(Clone)]
pub struct RequestSender {
    client: Client,
    config: Arc<RunConfig>,
    events: EventSink,
    attempt_timeout: Duration,
}

impl RequestSender {
    #[must_use]
    pub const fn new(client: Client, config: Arc<RunConfig>, events: EventSink) -> Self {
        Self {
            client,
            config,
            events,
            attempt_timeout: ATTEMPT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    /// Runs the attempt loop for one task until it reaches a terminal state.
    pub async fn send(&self, cancel: &CancellationToken, task: &RequestTask) -> SendOutcome {
        let started = Instant::now();
        let row = task.row;

        let template = match parse_template(&self.config.body_template) {
            Ok(template) => template,
            Err(err) => {
                self.events
                    .log(format!("Row {} body template parse failed: {}", row, err));
                return SendOutcome::Aborted;
            }
        };
        let Some(endpoint) = select_endpoint(&self.config.endpoints, row) else {
            self.events
                .log(format!("Row {} has no endpoint to send to", row));
            return SendOutcome::Aborted;
        };
        let params = String::from_utf8_lossy(&task.payload);
        let fields = InjectedFields {
            endpoint_field: &self.config.endpoint_field,
            endpoint,
            params_field: &self.config.params_field,
            params: &params,
        };

        let max_retries = self.config.max_retries;
        let mut failed: u32 = 0;
        while failed < max_retries {
            if cancel.is_cancelled() {
                return SendOutcome::Cancelled;
            }
            if failed > 0 {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return SendOutcome::Cancelled,
                    () = sleep(backoff_delay(failed)) => {},
                }
            }

            let body = match build_body(&template, &fields) {
                Ok(body) => body,
                Err(err) => {
                    self.events
                        .log(format!("Row {} JSON marshal failed: {}", row, err));
                    return SendOutcome::Aborted;
                }
            };

            debug!(row, endpoint, attempt = failed.saturating_add(1), "sending request");
            let request_start = Instant::now();
            let attempt = tokio::select! {
                biased;
                () = cancel.cancelled() => return SendOutcome::Cancelled,
                result = timeout(self.attempt_timeout, self.attempt(body)) => {
                    result.unwrap_or(Attempt::TimedOut)
                }
            };
            let request_elapsed = request_start.elapsed();

            match attempt {
                Attempt::Transport(err) => {
                    failed = failed.saturating_add(1);
                    self.events.log(format!(
                        "Row {} request failed (retry {}/{}, duration: {:?}): {}",
                        row, failed, max_retries, request_elapsed, err
                    ));
                }
                Attempt::TimedOut => {
                    failed = failed.saturating_add(1);
                    self.events.log(format!(
                        "Row {} request timed out (retry {}/{}, duration: {:?})",
                        row, failed, max_retries, request_elapsed
                    ));
                }
                Attempt::Read(err) => {
                    failed = failed.saturating_add(1);
                    self.events.log(format!(
                        "Row {} response read failed (retry {}/{}): {}",
                        row, failed, max_retries, err
                    ));
                }
                Attempt::Response { status, body } => {
                    let text = String::from_utf8_lossy(&body);
                    if status >= 500 {
                        failed = failed.saturating_add(1);
                        self.events.log(format!(
                            "Row {} server error {} (retry {}/{})",
                            row, status, failed, max_retries
                        ));
                    } else if status >= 400 {
                        self.events.log(format!(
                            "Row {} client error {}: {}",
                            row,
                            status,
                            log_preview(&text)
                        ));
                        return SendOutcome::ClientFailed;
                    } else if self.is_soft_failure(&text) {
                        failed = failed.saturating_add(1);
                        self.events.log(format!(
                            "Row {} {} (retry {}/{}): {}",
                            row,
                            self.config.failure_marker,
                            failed,
                            max_retries,
                            log_preview(&text)
                        ));
                    } else {
                        self.events.log(format!(
                            "Row {} success in {:?} (request: {:?}): {}",
                            row,
                            started.elapsed(),
                            request_elapsed,
                            log_preview(&text)
                        ));
                        return SendOutcome::Succeeded;
                    }
                }
            }
        }

        self.events.log(format!(
            "Row {} final failure after {} retries, total time: {:?}",
            row,
            max_retries,
            started.elapsed()
        ));
        SendOutcome::Exhausted
    }

    async fn attempt(&self, body: Vec<u8>) -> Attempt {
        let response = match self.client.post(&self.config.url).body(body).send().await {
            Ok(response) => response,
            Err(err) => return Attempt::Transport(err),
        };
        let status = response.status().as_u16();
        match read_capped(response, MAX_RESPONSE_BYTES).await {
            Ok(body) => Attempt::Response { status, body },
            Err(err) => Attempt::Read(err),
        }
    }

    fn is_soft_failure(&self, body: &str) -> bool {
        let marker = self.config.failure_marker.as_str();
        !marker.is_empty() && body.contains(marker)
    }
}

/// Deterministic spread over the endpoint list: `row mod len`.
#[must_use]
pub fn select_endpoint(endpoints: &[String], row: usize) -> Option<&str> {
    let idx = row.checked_rem(endpoints.len())?;
    endpoints.get(idx).map(String::as_str)
}

/// Quadratic backoff before retry `failed`, capped at five seconds.
#[must_use]
pub fn backoff_delay(failed: u32) -> Duration {
    let failed = u64::from(failed);
    let millis = failed
        .saturating_mul(failed)
        .saturating_mul(BACKOFF_UNIT_MS);
    Duration::from_millis(millis).min(MAX_BACKOFF)
}
