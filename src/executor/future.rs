//! A task that computes a value and caches it for later retrieval.

use std::fmt;

use parking_lot::{Condvar, Mutex};

use super::task::Task;

/// One-shot-write, many-read-after-ready result cell bound to a function.
///
/// `execute` invokes the wrapped function once, stores its value, and
/// wakes every waiter. [`get_result`](FutureTask::get_result) blocks until
/// the value is first written, then returns it; reads are repeatable.
///
/// ```
/// use std::sync::Arc;
/// use taskband::{FutureTask, ThreadPool};
///
/// let pool = ThreadPool::new(2).unwrap();
/// let task = Arc::new(FutureTask::new(|| 6 * 7));
///
/// pool.submit(task.clone());
/// assert_eq!(task.get_result(), 42);
/// ```
pub struct FutureTask<R> {
    func: Mutex<Option<Box<dyn FnOnce() -> R + Send>>>,
    result: Mutex<Option<R>>,
    ready: Condvar,
}

impl<R: Send + 'static> FutureTask<R> {
    /// Wrap a function whose value should be retrievable later.
    pub fn new<F>(func: F) -> Self
    where
        F: FnOnce() -> R + Send + 'static,
    {
        Self {
            func: Mutex::new(Some(Box::new(func))),
            result: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    /// Whether the value has been computed yet.
    pub fn is_ready(&self) -> bool {
        self.result.lock().is_some()
    }

    /// Block until the value has been computed.
    pub fn wait(&self) {
        let mut result = self.result.lock();
        while result.is_none() {
            self.ready.wait(&mut result);
        }
    }

    /// Block until the value is ready, then return it.
    pub fn get_result(&self) -> R
    where
        R: Clone,
    {
        let mut result = self.result.lock();
        loop {
            if let Some(value) = result.as_ref() {
                return value.clone();
            }
            self.ready.wait(&mut result);
        }
    }
}

impl<R: Send + 'static> Task for FutureTask<R> {
    fn execute(&self) {
        let func = self.func.lock().take();
        if let Some(func) = func {
            let value = func();
            let mut result = self.result.lock();
            *result = Some(value);
            self.ready.notify_all();
        }
    }
}

impl<R> fmt::Debug for FutureTask<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FutureTask")
            .field("ready", &self.result.lock().is_some())
            .finish()
    }
}
