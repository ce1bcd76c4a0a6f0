//! The pool orchestrator.
//!
//! Control operations (pause, resume, shrink, teardown) are injected into
//! the shared dispatch queue as sentinel tasks at bands ranking above
//! every caller-visible band, so control and ordinary work travel the same
//! scheduling path.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex};

use super::task::{Band, Entry, FnTask, Priority, Task};
use super::worker::WorkerUnit;
use crate::config::Config;
use crate::error::Result;
use crate::scheduler::{MaxHeap, WaitQueue};

type DispatchQueue = WaitQueue<MaxHeap<Entry>>;
type RetireQueue = WaitQueue<VecDeque<ThreadId>>;

/// Pause flag plus the wait/notify primitive barrier tasks park on.
struct PauseGate {
    paused: Mutex<bool>,
    resumed: Condvar,
}

impl PauseGate {
    fn new() -> Self {
        Self {
            paused: Mutex::new(false),
            resumed: Condvar::new(),
        }
    }

    fn pause(&self) {
        *self.paused.lock() = true;
    }

    fn resume(&self) {
        let mut paused = self.paused.lock();
        *paused = false;
        self.resumed.notify_all();
    }

    fn is_paused(&self) -> bool {
        *self.paused.lock()
    }

    fn wait_until_resumed(&self) {
        let mut paused = self.paused.lock();
        while *paused {
            self.resumed.wait(&mut paused);
        }
    }
}

/// State shared between the pool handle, its workers, and the sentinels.
struct Shared {
    dispatch: DispatchQueue,
    retired: RetireQueue,
    registry: Mutex<HashMap<ThreadId, WorkerUnit>>,
    gate: PauseGate,
}

impl Shared {
    /// Dispatch loop run by every worker.
    ///
    /// Blocks on the queue rather than polling for emptiness. A Stop entry
    /// is terminal: the loop exits right after executing it. Panics from
    /// `execute` are not caught and take the worker down with them.
    fn run_loop(&self) {
        loop {
            let entry = self.dispatch.pop();
            let retiring = entry.band == Band::Stop;
            entry.task.execute();
            if retiring {
                tracing::debug!(worker = ?thread::current().id(), "worker retired");
                break;
            }
        }
    }
}

/// Self-report half of the retirement handshake: the executing worker
/// pushes its own identity, and its run-loop exits right after.
struct StopSentinel {
    shared: Arc<Shared>,
}

impl Task for StopSentinel {
    fn execute(&self) {
        self.shared.retired.push(thread::current().id());
    }
}

/// Cleanup half of the handshake: pops one retired identity and erases
/// that worker from the registry, joining its thread.
///
/// Runs on whichever worker dequeues it, and never on the worker being
/// removed: Stop outranks Kill, and a worker that executed a Stop dequeues
/// nothing further, so the popped identity always belongs to another,
/// already retiring worker. The join happens outside the registry lock.
struct KillSentinel {
    shared: Arc<Shared>,
}

impl Task for KillSentinel {
    fn execute(&self) {
        let id = self.shared.retired.pop();
        let unit = self.shared.registry.lock().remove(&id);
        if let Some(mut unit) = unit {
            unit.join();
            tracing::debug!(worker = ?id, "retired worker joined");
        }
    }
}

/// Parks the executing worker until the pool is resumed.
struct PauseSentinel {
    shared: Arc<Shared>,
}

impl Task for PauseSentinel {
    fn execute(&self) {
        self.shared.gate.wait_until_resumed();
    }
}

/// Priority-scheduling worker pool.
///
/// A fixed-but-resizable set of OS threads drains a shared max-heap of
/// (task, priority) entries: the highest band still queued is always
/// served next, and entries of equal band dispatch in no particular
/// order. The pool can be paused and resumed, grown and shrunk at
/// runtime, and tears down by joining every worker thread.
///
/// ```
/// use taskband::{Priority, ThreadPool};
///
/// let pool = ThreadPool::new(4).unwrap();
///
/// pool.execute(|| println!("hello from the pool"));
/// pool.execute_with_priority(|| println!("urgent"), Priority::High);
///
/// pool.shutdown();
/// ```
///
/// # Administrative calls
///
/// [`pause`](ThreadPool::pause), [`resume`](ThreadPool::resume),
/// [`set_worker_count`](ThreadPool::set_worker_count) and
/// [`shutdown`](ThreadPool::shutdown) must be serialized by the caller:
/// issue them from a single thread or add external coordination.
/// Overlapping administrative calls cannot corrupt the pool, but they can
/// miscount sentinels (a pause fanned out during a concurrent shrink may
/// park too few workers, for example). [`submit`](ThreadPool::submit) may
/// be called from any thread at any time.
///
/// # Panics in tasks
///
/// A panic inside [`Task::execute`] is not intercepted: it unwinds
/// through the dispatch loop and kills the executing worker. The pool
/// does not detect or replace the lost worker.
pub struct ThreadPool {
    shared: Arc<Shared>,
    config: Config,
    /// Desired worker count. The registry can transiently disagree while
    /// a retirement handshake is in flight.
    worker_count: AtomicUsize,
    /// Monotonic counter for worker thread names.
    spawned: AtomicUsize,
}

impl ThreadPool {
    /// Create a pool with `workers` worker threads.
    pub fn new(workers: usize) -> Result<Self> {
        Self::with_config(Config::builder().num_workers(workers).build()?)
    }

    /// Create a pool from a full [`Config`].
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;

        let shared = Arc::new(Shared {
            dispatch: WaitQueue::new(),
            retired: WaitQueue::new(),
            registry: Mutex::new(HashMap::new()),
            gate: PauseGate::new(),
        });

        let pool = Self {
            shared,
            config,
            worker_count: AtomicUsize::new(0),
            spawned: AtomicUsize::new(0),
        };

        pool.spawn_workers(pool.config.initial_workers())?;
        tracing::debug!(workers = pool.worker_count(), "pool started");
        Ok(pool)
    }

    /// Queue a task at [`Priority::Normal`].
    pub fn submit(&self, task: Arc<dyn Task>) {
        self.submit_with_priority(task, Priority::Normal);
    }

    /// Queue a task at the given priority. Never blocks.
    ///
    /// Entries of equal priority dispatch in heap order, not submission
    /// order; callers needing FIFO within a band must sequence externally.
    pub fn submit_with_priority(&self, task: Arc<dyn Task>, priority: Priority) {
        self.shared.dispatch.push(Entry::new(priority.into(), task));
    }

    /// Queue a closure at [`Priority::Normal`].
    pub fn execute<F>(&self, func: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.execute_with_priority(func, Priority::Normal);
    }

    /// Queue a closure at the given priority.
    pub fn execute_with_priority<F>(&self, func: F, priority: Priority)
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit_with_priority(Arc::new(FnTask::new(func)), priority);
    }

    /// Park every worker until [`resume`](ThreadPool::resume).
    ///
    /// Sets the pause flag, then fans out one barrier entry per worker at
    /// the highest band, so each worker parks at its next dequeue, ahead
    /// of all queued work, pending Stop/Kill sentinels included. Pausing
    /// twice fans out two batches of barriers; a single resume releases
    /// both.
    pub fn pause(&self) {
        self.shared.gate.pause();

        let barriers = self.worker_count.load(Ordering::SeqCst);
        for _ in 0..barriers {
            let sentinel = Arc::new(PauseSentinel {
                shared: Arc::clone(&self.shared),
            });
            self.push_control(Band::Pause, sentinel);
        }
        tracing::debug!(barriers, "pool paused");
    }

    /// Clear the pause flag and wake every parked worker.
    ///
    /// A no-op if the pool is not paused.
    pub fn resume(&self) {
        self.shared.gate.resume();
        tracing::debug!("pool resumed");
    }

    /// Grow or shrink the pool to `target` workers.
    ///
    /// Shrinking queues one Stop and one Kill sentinel per retired worker;
    /// because control bands outrank user bands, they execute before any
    /// queued ordinary work. A shrink to zero therefore leaves queued
    /// tasks starved until the pool is grown again; the final Kill
    /// sentinels stay queued too, since executing them takes a surviving
    /// worker. Growing spawns fresh workers bound to the same dispatch
    /// loop.
    pub fn set_worker_count(&self, target: usize) -> Result<()> {
        let current = self.worker_count.load(Ordering::SeqCst);

        if target < current {
            let excess = current - target;
            tracing::debug!(from = current, to = target, "shrinking pool");
            self.push_stops(excess);
            for _ in 0..excess {
                let sentinel = Arc::new(KillSentinel {
                    shared: Arc::clone(&self.shared),
                });
                self.push_control(Band::Kill, sentinel);
            }
            self.worker_count.store(target, Ordering::SeqCst);
        } else if target > current {
            tracing::debug!(from = current, to = target, "growing pool");
            self.spawn_workers(target - current)?;
        }

        Ok(())
    }

    /// Stop every worker and block until all their threads have exited.
    ///
    /// Clears the pause gate first (parked barriers would otherwise wedge
    /// teardown), queues one Stop per live worker, then drains the
    /// registry and joins each unit from the calling thread. Idempotent;
    /// also runs on drop.
    pub fn shutdown(&self) {
        self.shared.gate.resume();

        let live = self.shared.registry.lock().len();
        self.push_stops(live);
        self.worker_count.store(0, Ordering::SeqCst);

        // Join outside the registry lock: a worker blocked inside a Kill
        // sentinel needs that lock to make progress.
        let units: Vec<WorkerUnit> = {
            let mut registry = self.shared.registry.lock();
            registry.drain().map(|(_, unit)| unit).collect()
        };
        for mut unit in units {
            unit.join();
        }
        tracing::debug!("pool shut down");
    }

    /// Desired worker count, as last set.
    pub fn worker_count(&self) -> usize {
        self.worker_count.load(Ordering::SeqCst)
    }

    /// Number of registry entries right now.
    ///
    /// Trails [`worker_count`](ThreadPool::worker_count) while a
    /// retirement handshake is in flight.
    pub fn registered_workers(&self) -> usize {
        self.shared.registry.lock().len()
    }

    /// Number of queued entries right now, sentinels included.
    pub fn queued_tasks(&self) -> usize {
        self.shared.dispatch.len()
    }

    /// Whether the pool is currently paused.
    pub fn is_paused(&self) -> bool {
        self.shared.gate.is_paused()
    }

    fn push_control(&self, band: Band, task: Arc<dyn Task>) {
        self.shared.dispatch.push(Entry::new(band, task));
    }

    fn push_stops(&self, count: usize) {
        for _ in 0..count {
            let sentinel = Arc::new(StopSentinel {
                shared: Arc::clone(&self.shared),
            });
            self.push_control(Band::Stop, sentinel);
        }
    }

    fn spawn_workers(&self, count: usize) -> Result<()> {
        for _ in 0..count {
            let shared = Arc::clone(&self.shared);
            let name = format!(
                "{}-{}",
                self.config.thread_name_prefix,
                self.spawned.fetch_add(1, Ordering::Relaxed)
            );

            let unit = WorkerUnit::spawn(name, self.config.stack_size, move || shared.run_loop())?;
            self.shared.registry.lock().insert(unit.id(), unit);
            self.worker_count.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadPool")
            .field("worker_count", &self.worker_count())
            .field("registered", &self.registered_workers())
            .field("queued", &self.queued_tasks())
            .field("paused", &self.is_paused())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn wait_for(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        while std::time::Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        cond()
    }

    #[test]
    fn test_starts_with_requested_workers() {
        let pool = ThreadPool::new(3).unwrap();
        assert_eq!(pool.worker_count(), 3);
        assert_eq!(pool.registered_workers(), 3);
        pool.shutdown();
    }

    #[test]
    fn test_submitted_work_runs() {
        let pool = ThreadPool::new(2).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..8 {
            let counter = counter.clone();
            pool.execute(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert!(wait_for(Duration::from_secs(5), || {
            counter.load(Ordering::SeqCst) == 8
        }));
        pool.shutdown();
    }

    #[test]
    fn test_pause_flag_toggles() {
        let pool = ThreadPool::new(1).unwrap();
        assert!(!pool.is_paused());

        pool.pause();
        assert!(pool.is_paused());

        pool.resume();
        assert!(!pool.is_paused());
        pool.shutdown();
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let pool = ThreadPool::new(2).unwrap();
        pool.shutdown();
        pool.shutdown();
        assert_eq!(pool.registered_workers(), 0);
        assert_eq!(pool.worker_count(), 0);
    }

    #[test]
    fn test_grow_registers_new_workers() {
        let pool = ThreadPool::new(1).unwrap();
        pool.set_worker_count(4).unwrap();
        assert_eq!(pool.worker_count(), 4);
        assert_eq!(pool.registered_workers(), 4);
        pool.shutdown();
    }

    #[test]
    fn test_shrink_converges_registry() {
        let pool = ThreadPool::new(4).unwrap();
        pool.set_worker_count(2).unwrap();
        assert_eq!(pool.worker_count(), 2);

        assert!(wait_for(Duration::from_secs(5), || {
            pool.registered_workers() == 2
        }));
        pool.shutdown();
    }
}
