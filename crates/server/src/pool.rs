//! Fixed-size pool of named worker threads.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;
use tracing::trace;
use transfer::CancellationFlag;

const HARNESS: &str = "rsynk::harness";

type Job = Box<dyn FnOnce(&CancellationFlag) + Send + 'static>;

struct Task {
    job: Job,
    cancel: Arc<CancellationFlag>,
}

/// Returned by [`WorkerPool::submit`] when every worker has exited.
#[derive(Debug, Error)]
#[error("worker pool '{0}' is not accepting jobs")]
pub struct PoolClosed(String);

/// Handle to a submitted job.
#[derive(Clone, Debug)]
pub struct TaskHandle {
    cancel: Arc<CancellationFlag>,
}

impl TaskHandle {
    /// Raises the job's cancellation flag. A job still queued is skipped.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Worker threads consuming jobs from an unbounded queue.
///
/// Threads are detached: dropping the pool closes the queue, and each worker
/// exits after the job it is running.
pub struct WorkerPool {
    sender: Sender<Task>,
    name: String,
    size: usize,
}

impl WorkerPool {
    /// Spawns `size` threads named `<name>-<index>`. A size of zero is
    /// treated as one.
    pub fn new(size: usize, name: impl Into<String>) -> io::Result<Self> {
        let size = size.max(1);
        let name = name.into();
        let (sender, receiver) = crossbeam_channel::unbounded::<Task>();

        for index in 0..size {
            let receiver = receiver.clone();
            thread::Builder::new()
                .name(format!("{name}-{index}"))
                .spawn(move || work(&receiver))?;
        }

        Ok(Self { sender, name, size })
    }

    /// Number of worker threads.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Thread name prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queues `job` with a fresh cancellation flag.
    pub fn submit<F>(&self, job: F) -> Result<TaskHandle, PoolClosed>
    where
        F: FnOnce(&CancellationFlag) + Send + 'static,
    {
        self.submit_with_flag(Arc::new(CancellationFlag::new()), job)
    }

    /// Queues `job` guarded by an existing flag, so the caller can cancel it
    /// before the handle is returned.
    pub fn submit_with_flag<F>(
        &self,
        cancel: Arc<CancellationFlag>,
        job: F,
    ) -> Result<TaskHandle, PoolClosed>
    where
        F: FnOnce(&CancellationFlag) + Send + 'static,
    {
        let task = Task {
            job: Box::new(job),
            cancel: Arc::clone(&cancel),
        };
        self.sender
            .send(task)
            .map_err(|_| PoolClosed(self.name.clone()))?;
        Ok(TaskHandle { cancel })
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("queued", &self.sender.len())
            .finish()
    }
}

fn work(receiver: &Receiver<Task>) {
    for task in receiver {
        if task.cancel.is_cancelled() {
            trace!(target: HARNESS, "skipping job cancelled while queued");
            continue;
        }
        (task.job)(&task.cancel);
    }
}
