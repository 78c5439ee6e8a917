use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

/// Fixed-interval gate shared by every worker of a run.
///
/// A ticker releases one permit per `1s / qps` and never holds more than
/// one, so the aggregate send rate stays at or below `qps` with no bursts.
/// The first permit arrives one period after start.
pub(crate) struct RateGate {
    permits: Arc<Semaphore>,
    ticker: JoinHandle<()>,
}

impl Drop for RateGate {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}

impl RateGate {
    pub(crate) fn start(qps: NonZeroU32) -> Self {
        let period = tick_period(qps);
        let permits = Arc::new(Semaphore::new(0));
        let refill = Arc::clone(&permits);
        let ticker = tokio::spawn(async move {
            let start = Instant::now();
            let mut tick = interval_at(start.checked_add(period).unwrap_or(start), period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tick.tick().await;
                if refill.available_permits() == 0 {
                    refill.add_permits(1);
                }
            }
        });
        Self { permits, ticker }
    }

    /// Waits for the next tick. Returns false if cancelled first.
    pub(crate) async fn wait(&self, cancel: &CancellationToken) -> bool {
        tokio::select! {
            biased;
            () = cancel.cancelled() => false,
            permit = self.permits.acquire() => match permit {
                Ok(permit) => {
                    permit.forget();
                    true
                }
                Err(_) => false,
            },
        }
    }
}

pub(crate) fn tick_period(qps: NonZeroU32) -> Duration {
    Duration::from_secs(1)
        .checked_div(qps.get())
        .unwrap_or(Duration::from_secs(1))
        .max(Duration::from_nanos(1))
}
