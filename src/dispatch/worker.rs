use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::domain::RequestTask;
use crate::events::EventSink;
use crate::http::{RequestSender, SendOutcome};

use super::executor::RunCounters;
use super::rate::RateGate;

pub(crate) type SharedQueue = Arc<Mutex<mpsc::Receiver<RequestTask>>>;

/// Whatever a worker hands each task to once the rate gate opens.
pub(crate) trait TaskRunner: Send + Sync + 'static {
    fn deliver(
        &self,
        cancel: &CancellationToken,
        task: &RequestTask,
    ) -> impl Future<Output = SendOutcome> + Send;
}

impl TaskRunner for RequestSender {
    fn deliver(
        &self,
        cancel: &CancellationToken,
        task: &RequestTask,
    ) -> impl Future<Output = SendOutcome> + Send {
        self.send(cancel, task)
    }
}

/// A fault caught inside a worker while it was serving one task.
#[derive(Debug)]
pub(crate) struct WorkerFault {
    pub(crate) worker: usize,
    pub(crate) row: usize,
    pub(crate) message: String,
}

pub(crate) struct Worker<R> {
    pub(crate) id: usize,
    pub(crate) queue: SharedQueue,
    pub(crate) gate: Arc<RateGate>,
    pub(crate) runner: Arc<R>,
    pub(crate) counters: Arc<RunCounters>,
    pub(crate) faults: mpsc::Sender<WorkerFault>,
    pub(crate) cancel: CancellationToken,
}

impl<R: TaskRunner> Worker<R> {
    pub(crate) fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.serve())
    }

    async fn serve(self) {
        loop {
            if self.cancel.is_cancelled() {
                break;
            }
            let Some(task) = self.next_task().await else {
                break;
            };
            if self.cancel.is_cancelled() {
                break;
            }
            if !self.gate.wait(&self.cancel).await {
                break;
            }
            let delivery = AssertUnwindSafe(async {
                self.runner.deliver(&self.cancel, &task).await
            });
            match delivery.catch_unwind().await {
                Ok(outcome) => self.counters.record_outcome(outcome),
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    self.report_fault(task.row, message).await;
                }
            }
        }
    }

    async fn next_task(&self) -> Option<RequestTask> {
        let mut queue = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return None,
            queue = self.queue.lock() => queue,
        };
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            task = queue.recv() => task,
        }
    }

    async fn report_fault(&self, row: usize, message: String) {
        self.counters.record_fault();
        warn!(worker = self.id, row, "Recovered worker fault: {}", message);
        let fault = WorkerFault {
            worker: self.id,
            row,
            message,
        };
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => {},
            _ = self.faults.send(fault) => {},
        }
    }
}

/// Logs faults as they arrive; ends once every worker has exited.
pub(crate) fn spawn_fault_monitor(
    mut faults: mpsc::Receiver<WorkerFault>,
    events: EventSink,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(fault) = faults.recv().await {
            events.log(format!(
                "Worker error: worker {} panic on row {}: {}",
                fault.worker, fault.row, fault.message
            ));
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_owned();
    }
    payload
        .downcast_ref::<String>()
        .cloned()
        .unwrap_or_else(|| "unknown panic".to_owned())
}
