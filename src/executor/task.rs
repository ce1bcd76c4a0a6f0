//! Task representation and scheduling bands.

use std::cmp::Ordering as CmpOrdering;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// A single schedulable unit of work.
///
/// One operation, no arguments, no return value: tasks act purely through
/// side effects. Results travel through [`FutureTask`](super::FutureTask)
/// or externally synchronized state. Ownership of a running task is shared
/// between its queue entry and the worker executing it.
pub trait Task: Send + Sync {
    /// Run the task.
    fn execute(&self);
}

/// Caller-visible scheduling priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// Runs after everything else.
    Low,
    /// The default.
    Normal,
    /// Runs before `Normal` and `Low`.
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

/// Internal scheduling band.
///
/// Control bands rank strictly above every caller-visible band, so control
/// entries always preempt ordinary work still sitting in the queue. Pause
/// is highest: barriers cut ahead even of pending Stop/Kill sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub(crate) enum Band {
    Low = 0,
    Normal = 1,
    High = 2,
    Kill = 5,
    Stop = 6,
    Pause = 7,
}

impl From<Priority> for Band {
    fn from(priority: Priority) -> Band {
        match priority {
            Priority::Low => Band::Low,
            Priority::Normal => Band::Normal,
            Priority::High => Band::High,
        }
    }
}

/// One dispatch queue entry: a task tagged with its band.
pub(crate) struct Entry {
    pub(crate) band: Band,
    pub(crate) task: Arc<dyn Task>,
}

impl Entry {
    pub(crate) fn new(band: Band, task: Arc<dyn Task>) -> Self {
        Self { band, task }
    }
}

// Ordered by band alone. Entries of equal band compare equal, so their
// relative dispatch order is whatever the heap yields, not FIFO.
impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.band == other.band
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.band.cmp(&other.band)
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry").field("band", &self.band).finish()
    }
}

/// Adapts a closure to [`Task`].
///
/// The closure runs at most once; executing the task again is a no-op.
pub struct FnTask {
    func: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl FnTask {
    /// Wrap a closure.
    pub fn new<F>(func: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            func: Mutex::new(Some(Box::new(func))),
        }
    }
}

impl Task for FnTask {
    fn execute(&self) {
        let func = self.func.lock().take();
        if let Some(func) = func {
            func();
        }
    }
}

impl fmt::Debug for FnTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTask")
            .field("spent", &self.func.lock().is_none())
            .finish()
    }
}
