//! The thread demo: launch, sleep, join.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::config::WorkerConfig;
use crate::console::Console;
use crate::workers::spawner::{Job, Spawner};

/// Final line, printed once every unit has been joined.
pub const FINISHED_MESSAGE: &str = "All threads have finished";

pub fn starting_message(id: usize) -> String {
    format!("Thread {} starting", id)
}

pub fn done_message(id: usize) -> String {
    format!("Thread {} done", id)
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("failed to create worker {id}: {source}")]
    Spawn {
        id: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to join worker {id}")]
    Join { id: usize },
}

/// What a successful run did.
#[derive(Debug, Clone)]
pub struct ThreadReport {
    /// Ids of launched units, in launch order.
    pub spawned: Vec<usize>,
    /// Ids of joined units, in join order.
    pub joined: Vec<usize>,
    pub elapsed: Duration,
}

/// Launches one unit per id and waits for all of them.
pub struct ThreadDemo<S> {
    config: WorkerConfig,
    spawner: S,
    console: Arc<dyn Console>,
}

impl<S: Spawner> ThreadDemo<S> {
    pub fn new(config: WorkerConfig, spawner: S, console: Arc<dyn Console>) -> Self {
        Self {
            config,
            spawner,
            console,
        }
    }

    pub fn spawner(&self) -> &S {
        &self.spawner
    }

    /// Run the demo to completion.
    ///
    /// Any creation or join failure ends the run immediately. Units already
    /// running at that point are left detached.
    pub fn run(&self) -> Result<ThreadReport, WorkerError> {
        let started = Instant::now();
        let ids: Vec<usize> = (0..self.config.count).collect();
        let pause = Duration::from_millis(self.config.sleep_ms);

        tracing::info!(count = ids.len(), sleep_ms = self.config.sleep_ms, "Launching workers");

        let mut handles = Vec::with_capacity(ids.len());
        for &id in &ids {
            let console = Arc::clone(&self.console);
            let job: Job = Box::new(move || run_worker(id, pause, console.as_ref()));

            let handle = self.spawner.spawn(id, job).map_err(|source| {
                tracing::error!(id, error = %source, "Worker creation failed");
                WorkerError::Spawn { id, source }
            })?;
            tracing::debug!(id, "Worker launched");
            handles.push((id, handle));
        }

        let mut joined = Vec::with_capacity(handles.len());
        for (id, handle) in handles {
            if handle.join().is_err() {
                tracing::error!(id, "Worker join failed");
                return Err(WorkerError::Join { id });
            }
            tracing::debug!(id, "Worker joined");
            joined.push(id);
        }

        self.console.line(FINISHED_MESSAGE);

        let elapsed = started.elapsed();
        tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "All workers joined");

        Ok(ThreadReport {
            spawned: ids,
            joined,
            elapsed,
        })
    }
}

fn run_worker(id: usize, pause: Duration, console: &dyn Console) {
    console.line(&starting_message(id));
    thread::sleep(pause);
    console.line(&done_message(id));
}
