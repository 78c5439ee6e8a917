use std::collections::VecDeque;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use super::sink::{EventStream, ProgressSnapshot, SinkSettings};

/// Presentation seam. The consumer task is the only caller.
pub trait EventRenderer: Send + 'static {
    fn render_logs(&mut self, lines: &[String]);

    fn render_progress(&mut self, snapshot: &ProgressSnapshot);

    fn finish(&mut self) {}
}

pub(super) struct Presenter<R> {
    settings: SinkSettings,
    renderer: R,
    buffer: VecDeque<String>,
    last_progress: Option<Instant>,
    pending_progress: Option<ProgressSnapshot>,
}

impl<R: EventRenderer> Presenter<R> {
    pub(super) fn new(settings: SinkSettings, renderer: R) -> Self {
        Self {
            buffer: VecDeque::with_capacity(settings.max_buffered_lines),
            settings,
            renderer,
            last_progress: None,
            pending_progress: None,
        }
    }

    pub(super) fn into_renderer(self) -> R {
        self.renderer
    }

    pub(super) fn push_line(&mut self, line: String) {
        self.buffer.push_back(line);
        if self.buffer.len() > self.settings.max_buffered_lines {
            let excess = self
                .buffer
                .len()
                .saturating_sub(self.settings.trimmed_lines);
            self.buffer.drain(..excess);
        }
    }

    pub(super) fn offer_progress(&mut self, snapshot: ProgressSnapshot, now: Instant) {
        let due = self.last_progress.is_none_or(|last| {
            now.saturating_duration_since(last) >= self.settings.progress_interval
        });
        if due {
            self.last_progress = Some(now);
            self.pending_progress = None;
            self.renderer.render_progress(&snapshot);
        } else {
            self.pending_progress = Some(snapshot);
        }
    }

    pub(super) fn flush(&mut self, now: Instant) {
        if !self.buffer.is_empty() {
            let skip = self
                .buffer
                .len()
                .saturating_sub(self.settings.lines_per_flush);
            let lines: Vec<String> = self.buffer.drain(..).skip(skip).collect();
            self.renderer.render_logs(&lines);
        }
        if let Some(snapshot) = self.pending_progress.take() {
            self.last_progress = Some(now);
            self.renderer.render_progress(&snapshot);
        }
    }
}

/// Spawns the single consumer that owns all presentation state.
///
/// Runs until every `EventSink` clone is dropped, then flushes what is left
/// and hands the renderer back.
pub fn spawn_event_consumer<R>(
    stream: EventStream,
    settings: SinkSettings,
    renderer: R,
) -> JoinHandle<R>
where
    R: EventRenderer,
{
    let EventStream {
        mut log_rx,
        mut progress_rx,
    } = stream;
    let period = settings.flush_interval.max(Duration::from_millis(1));
    let start = Instant::now();
    let mut ticker = interval_at(start.checked_add(period).unwrap_or(start), period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut presenter = Presenter::new(settings, renderer);

    tokio::spawn(async move {
        let mut logs_open = true;
        let mut progress_open = true;
        while logs_open || progress_open {
            tokio::select! {
                line = log_rx.recv(), if logs_open => match line {
                    Some(line) => presenter.push_line(line),
                    None => logs_open = false,
                },
                snapshot = progress_rx.recv(), if progress_open => match snapshot {
                    Some(snapshot) => presenter.offer_progress(snapshot, Instant::now()),
                    None => progress_open = false,
                },
                _ = ticker.tick() => presenter.flush(Instant::now()),
            }
        }
        presenter.flush(Instant::now());
        let mut renderer = presenter.into_renderer();
        renderer.finish();
        renderer
    })
}
