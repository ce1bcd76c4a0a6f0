//! Worker units: one owned OS thread each.

use std::thread::{self, JoinHandle, ThreadId};

use crate::error::{Error, Result};

/// Owns exactly one OS thread bound to a run-loop.
///
/// The unit's [`ThreadId`] is its stable identity and serves as the pool's
/// registry key. The thread is joined at the latest when the unit is
/// dropped; workers are never detached or leaked.
#[derive(Debug)]
pub(crate) struct WorkerUnit {
    id: ThreadId,
    thread: Option<JoinHandle<()>>,
}

impl WorkerUnit {
    /// Spawn a named thread running `run_loop`.
    pub(crate) fn spawn<F>(name: String, stack_size: Option<usize>, run_loop: F) -> Result<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut builder = thread::Builder::new().name(name);
        if let Some(stack_size) = stack_size {
            builder = builder.stack_size(stack_size);
        }

        let thread = builder
            .spawn(run_loop)
            .map_err(|e| Error::pool(format!("spawn failed: {}", e)))?;

        Ok(Self {
            id: thread.thread().id(),
            thread: Some(thread),
        })
    }

    pub(crate) fn id(&self) -> ThreadId {
        self.id
    }

    /// Join the thread. Idempotent; a worker that died from a panic is
    /// still joined and its payload discarded.
    pub(crate) fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for WorkerUnit {
    fn drop(&mut self) {
        self.join();
    }
}
