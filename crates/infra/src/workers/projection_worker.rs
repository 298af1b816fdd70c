use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use benefits_events::Subscription;

/// How long the loop blocks on the subscription before rechecking the stop flag.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// What a worker did over its lifetime, returned on shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub applied: u64,
    pub failed: u64,
}

impl WorkerReport {
    fn record<E: core::fmt::Display>(&mut self, worker: &str, outcome: Result<(), E>) {
        match outcome {
            Ok(()) => self.applied += 1,
            Err(err) => {
                self.failed += 1;
                warn!(worker, error = %err, "projection worker handler failed");
            }
        }
    }
}

/// Handle to stop and join a background worker.
#[derive(Debug)]
pub struct WorkerHandle {
    name: &'static str,
    stop: Arc<AtomicBool>,
    join: Option<thread::JoinHandle<WorkerReport>>,
}

impl WorkerHandle {
    /// Stop the worker once everything already queued on its subscription
    /// has been handled, then join it.
    pub fn shutdown(mut self) -> WorkerReport {
        self.stop.store(true, Ordering::Release);

        match self.join.take().map(thread::JoinHandle::join) {
            Some(Ok(report)) => report,
            Some(Err(_)) => {
                warn!(worker = self.name, "projection worker panicked");
                WorkerReport::default()
            }
            None => WorkerReport::default(),
        }
    }
}

/// Feeds one bus subscription into a handler on a dedicated thread.
///
/// Messages are handed over one at a time in delivery order, so a worker
/// never applies two events of the same aggregate concurrently. Pinning a
/// worker to one estimate is done with the subscription's `StreamFilter`.
/// Handler failures are counted and logged; the loop keeps going.
#[derive(Debug)]
pub struct ProjectionWorker;

impl ProjectionWorker {
    pub fn spawn<M, H, E>(
        name: &'static str,
        subscription: Subscription<M>,
        mut handler: H,
    ) -> std::io::Result<WorkerHandle>
    where
        M: Send + 'static,
        H: FnMut(M) -> Result<(), E> + Send + 'static,
        E: core::fmt::Display,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || run(name, &subscription, &flag, &mut handler))?;

        Ok(WorkerHandle {
            name,
            stop,
            join: Some(join),
        })
    }
}

fn run<M, H, E>(name: &'static str, subscription: &Subscription<M>, stop: &AtomicBool, handler: &mut H) -> WorkerReport
where
    H: FnMut(M) -> Result<(), E>,
    E: core::fmt::Display,
{
    let mut report = WorkerReport::default();
    debug!(worker = name, filter = ?subscription.filter(), "projection worker started");

    while !stop.load(Ordering::Acquire) {
        match subscription.recv_timeout(POLL_INTERVAL) {
            Ok(message) => report.record(name, handler(message)),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    for message in subscription.drain() {
        report.record(name, handler(message));
    }

    debug!(
        worker = name,
        applied = report.applied,
        failed = report.failed,
        "projection worker stopped"
    );
    report
}
