//! Creation of execution units.
//!
//! # Responsibilities
//! - Launch one OS thread per worker id
//! - Provide a fault-injecting wrapper so creation and join failures can be
//!   forced in tests and from the CLI

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

/// Work handed to a single execution unit.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Something that can start an execution unit for a worker id.
pub trait Spawner: Send + Sync {
    fn spawn(&self, id: usize, job: Job) -> io::Result<JoinHandle<()>>;
}

/// Real, preemptively scheduled OS threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsThreads;

impl Spawner for OsThreads {
    fn spawn(&self, id: usize, job: Job) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(format!("worker-{}", id))
            .spawn(job)
    }
}

/// Failures to force during a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FaultPlan {
    /// Creating the unit with this id fails.
    pub fail_spawn_at: Option<usize>,
    /// The unit with this id panics after its work, so joining it fails.
    pub panic_worker: Option<usize>,
}

impl FaultPlan {
    pub fn is_empty(&self) -> bool {
        self.fail_spawn_at.is_none() && self.panic_worker.is_none()
    }
}

/// Wraps another spawner and applies a [`FaultPlan`].
#[derive(Debug)]
pub struct FaultySpawner<S> {
    inner: S,
    plan: FaultPlan,
    attempts: AtomicUsize,
}

impl<S: Spawner> FaultySpawner<S> {
    pub fn new(inner: S, plan: FaultPlan) -> Self {
        Self {
            inner,
            plan,
            attempts: AtomicUsize::new(0),
        }
    }

    /// Number of spawn calls made so far, failed ones included.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl<S: Spawner> Spawner for FaultySpawner<S> {
    fn spawn(&self, id: usize, job: Job) -> io::Result<JoinHandle<()>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.plan.fail_spawn_at == Some(id) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("injected creation failure for worker {}", id),
            ));
        }

        if self.plan.panic_worker == Some(id) {
            let job: Job = Box::new(move || {
                job();
                panic!("injected failure in worker {}", id);
            });
            return self.inner.spawn(id, job);
        }

        self.inner.spawn(id, job)
    }
}
