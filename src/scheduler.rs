//! Single-thread delayed-work queue.
//!
//! One dedicated worker thread runs an `edge-executor` driven by
//! `futures-lite`, with `async-io-mini` reactor timers for the delays.
//! Requests reach it over an `embassy-sync` channel, so the control
//! thread never touches executor state.
//!
//! ```text
//! ┌────────────────────────────┐  Request::Arm   ┌──────────────────────────────┐
//! │ lifecycle / worker context │────────────────▶│  Worker thread               │
//! │ queue_delayed() / cancel() │  Request::Stop  │  LocalExecutor               │
//! └────────────────────────────┘                 │   ├─ Timer::after(delay)     │
//!                                                │   └─ run work (serially)     │
//!                                                └──────────────────────────────┘
//! ```
//!
//! Work callbacks run to completion on the worker thread without yielding,
//! so two callbacks never overlap.  A callback may re-arm itself through a
//! [`QueueHandle`]; that is how the control loop keeps ticking.
//!
//! ## Cancellation
//!
//! A [`DelayedWork`] is a cancel token.  Cancelling it stops a pending
//! callback from firing and stops any further re-arming; a callback that is
//! already running finishes its current pass.  [`WorkQueue::shutdown`]
//! joins the worker, so once it returns no callback is running or will run.

use core::time::Duration;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle, ThreadId};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{debug, info, warn};

use crate::error::SchedulerError;

/// A unit of deferred work.
pub type Work = Box<dyn FnOnce() + Send + 'static>;

/// Channel depth for arm/stop requests.
const REQUEST_DEPTH: usize = 8;

/// Executor run-queue capacity (must be a power of two).
const EXECUTOR_CAPACITY: usize = 16;

enum Request {
    Arm {
        delay: Duration,
        token: DelayedWork,
        work: Work,
    },
    Stop,
}

type RequestChannel = Channel<CriticalSectionRawMutex, Request, REQUEST_DEPTH>;

// ═══════════════════════════════════════════════════════════════
//  Cancel token
// ═══════════════════════════════════════════════════════════════

/// Handle to a (possibly re-armed) delayed work item.
///
/// Clones share the same cancellation state.
#[derive(Debug, Clone, Default)]
pub struct DelayedWork {
    cancelled: Arc<AtomicBool>,
}

impl DelayedWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prevent the pending callback from firing and refuse future arming.
    /// Idempotent; never blocks.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Queue handle
// ═══════════════════════════════════════════════════════════════

/// Cloneable, `Send` handle for arming work on a [`WorkQueue`].
#[derive(Clone)]
pub struct QueueHandle {
    requests: Arc<RequestChannel>,
    closed: Arc<AtomicBool>,
}

impl QueueHandle {
    /// Run `f` on the worker after `delay`, unless `work` is cancelled
    /// first.
    pub fn queue_delayed(
        &self,
        work: &DelayedWork,
        delay: Duration,
        f: impl FnOnce() + Send + 'static,
    ) -> Result<(), SchedulerError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SchedulerError::ShutDown);
        }
        if work.is_cancelled() {
            return Err(SchedulerError::Cancelled);
        }

        self.requests
            .try_send(Request::Arm {
                delay,
                token: work.clone(),
                work: Box::new(f),
            })
            .map_err(|_| SchedulerError::QueueFull)
    }

    /// Arm `f` under a fresh token and return the token.
    pub fn schedule_after(
        &self,
        delay: Duration,
        f: impl FnOnce() + Send + 'static,
    ) -> Result<DelayedWork, SchedulerError> {
        let work = DelayedWork::new();
        self.queue_delayed(&work, delay, f)?;
        Ok(work)
    }

    /// Same as [`DelayedWork::cancel`].
    pub fn cancel(&self, work: &DelayedWork) {
        work.cancel();
    }
}

// ═══════════════════════════════════════════════════════════════
//  Work queue
// ═══════════════════════════════════════════════════════════════

/// Owns the worker thread.  Dropping it shuts the worker down.
pub struct WorkQueue {
    handle: QueueHandle,
    worker: Option<JoinHandle<()>>,
    worker_id: ThreadId,
    name: String,
}

impl WorkQueue {
    /// Spawn the worker thread.
    pub fn spawn(name: &str) -> Result<Self, SchedulerError> {
        let requests: Arc<RequestChannel> = Arc::new(Channel::new());
        let rx = requests.clone();

        let worker = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || run_worker(&rx))
            .map_err(|e| {
                warn!("WorkQueue: failed to spawn '{}': {}", name, e);
                SchedulerError::SpawnFailed
            })?;
        let worker_id = worker.thread().id();

        info!("WorkQueue: '{}' started", name);

        Ok(Self {
            handle: QueueHandle {
                requests,
                closed: Arc::new(AtomicBool::new(false)),
            },
            worker: Some(worker),
            worker_id,
            name: name.to_string(),
        })
    }

    pub fn handle(&self) -> QueueHandle {
        self.handle.clone()
    }

    pub fn queue_delayed(
        &self,
        work: &DelayedWork,
        delay: Duration,
        f: impl FnOnce() + Send + 'static,
    ) -> Result<(), SchedulerError> {
        self.handle.queue_delayed(work, delay, f)
    }

    pub fn schedule_after(
        &self,
        delay: Duration,
        f: impl FnOnce() + Send + 'static,
    ) -> Result<DelayedWork, SchedulerError> {
        self.handle.schedule_after(delay, f)
    }

    pub fn cancel(&self, work: &DelayedWork) {
        work.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Stop accepting work, drop everything still pending, and wait for a
    /// running callback to finish.
    ///
    /// Must not be called from a work callback; that would join the thread
    /// it runs on.  Calling it again after success is a no-op.
    pub fn shutdown(&mut self) -> Result<(), SchedulerError> {
        if self.worker.is_none() {
            return Ok(());
        }
        if thread::current().id() == self.worker_id {
            return Err(SchedulerError::ShutdownFromWorker);
        }
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        self.handle.closed.store(true, Ordering::Release);
        // Blocks only while the channel is full; the worker keeps draining it.
        futures_lite::future::block_on(self.handle.requests.send(Request::Stop));

        if worker.join().is_err() {
            warn!("WorkQueue: '{}' worker panicked", self.name);
        }
        info!("WorkQueue: '{}' stopped", self.name);
        Ok(())
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("WorkQueue: '{}' not joined on drop: {}", self.name, e);
        }
    }
}

// ── Worker ────────────────────────────────────────────────────

fn run_worker(requests: &RequestChannel) {
    let executor: edge_executor::LocalExecutor<'_, EXECUTOR_CAPACITY> =
        edge_executor::LocalExecutor::new();

    futures_lite::future::block_on(executor.run(async {
        loop {
            match requests.receive().await {
                Request::Arm { delay, token, work } => {
                    executor.spawn(fire_after(delay, token, work)).detach();
                }
                Request::Stop => break,
            }
        }
    }));

    // Timers still pending are dropped with the executor and never fire.
    debug!("WorkQueue: worker exiting");
}

async fn fire_after(delay: Duration, token: DelayedWork, work: Work) {
    async_io_mini::Timer::after(delay).await;
    if token.is_cancelled() {
        debug!("WorkQueue: cancelled work skipped");
        return;
    }
    work();
}
