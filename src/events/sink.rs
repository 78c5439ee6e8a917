use std::time::Duration;

use tokio::sync::mpsc;

/// Point-in-time read of run counters. Observational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    pub processed: u64,
    pub total: u64,
    pub success: u64,
    pub error: u64,
}

impl ProgressSnapshot {
    /// Completion in hundredths of a percent (0..=10_000).
    #[must_use]
    pub fn percent_x100(&self) -> u64 {
        if self.total == 0 {
            return 10_000;
        }
        self.processed
            .min(self.total)
            .saturating_mul(10_000)
            .checked_div(self.total)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct SinkSettings {
    pub log_capacity: usize,
    pub progress_capacity: usize,
    /// How often buffered log lines are handed to the renderer.
    pub flush_interval: Duration,
    /// Minimum spacing between two progress renders.
    pub progress_interval: Duration,
    pub max_buffered_lines: usize,
    /// Lines kept when the buffer overflows.
    pub trimmed_lines: usize,
    /// Newest lines rendered per flush; older buffered lines are dropped.
    pub lines_per_flush: usize,
}

impl Default for SinkSettings {
    fn default() -> Self {
        Self {
            log_capacity: 200,
            progress_capacity: 50,
            flush_interval: Duration::from_millis(1000),
            progress_interval: Duration::from_millis(500),
            max_buffered_lines: 200,
            trimmed_lines: 180,
            lines_per_flush: 20,
        }
    }
}

/// Producer side. Sends never block; events are dropped when a channel is full.
#[derive(Debug, Clone)]
pub struct EventSink {
    log_tx: mpsc::Sender<String>,
    progress_tx: mpsc::Sender<ProgressSnapshot>,
}

#[derive(Debug)]
pub struct EventStream {
    pub(super) log_rx: mpsc::Receiver<String>,
    pub(super) progress_rx: mpsc::Receiver<ProgressSnapshot>,
}

#[must_use]
pub fn event_channels(settings: &SinkSettings) -> (EventSink, EventStream) {
    let (log_tx, log_rx) = mpsc::channel(settings.log_capacity.max(1));
    let (progress_tx, progress_rx) = mpsc::channel(settings.progress_capacity.max(1));
    (
        EventSink {
            log_tx,
            progress_tx,
        },
        EventStream {
            log_rx,
            progress_rx,
        },
    )
}

impl EventSink {
    /// Queues a timestamped log line. Returns false when it was dropped.
    pub fn log(&self, message: impl AsRef<str>) -> bool {
        let stamp = chrono::Local::now().format("%H:%M:%S");
        let line = format!("[{}] {}", stamp, message.as_ref());
        self.log_tx.try_send(line).is_ok()
    }

    /// Queues a progress snapshot. Returns false when it was dropped.
    pub fn progress(&self, snapshot: ProgressSnapshot) -> bool {
        self.progress_tx.try_send(snapshot).is_ok()
    }
}
