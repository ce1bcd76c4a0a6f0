use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Backing container for a [`WaitQueue`].
///
/// `pop` must return the entry `peek` would show; for an ordered store
/// that is the greatest entry, for a FIFO the oldest.
pub trait Store {
    /// The entry type held by the store.
    type Item;

    /// Insert an entry.
    fn push(&mut self, item: Self::Item);

    /// Remove and return the front entry.
    fn pop(&mut self) -> Option<Self::Item>;

    /// The front entry, without removing it.
    fn peek(&self) -> Option<&Self::Item>;

    /// Whether the store holds no entries.
    fn is_empty(&self) -> bool;

    /// Number of entries held.
    fn len(&self) -> usize;
}

impl<T> Store for VecDeque<T> {
    type Item = T;

    fn push(&mut self, item: T) {
        self.push_back(item);
    }

    fn pop(&mut self) -> Option<T> {
        self.pop_front()
    }

    fn peek(&self) -> Option<&T> {
        self.front()
    }

    fn is_empty(&self) -> bool {
        VecDeque::is_empty(self)
    }

    fn len(&self) -> usize {
        VecDeque::len(self)
    }
}

/// Thread-safe blocking queue over a pluggable [`Store`].
///
/// Producers never block. Consumers block until an entry is available,
/// either indefinitely ([`pop`](WaitQueue::pop)) or up to a deadline
/// ([`pop_timeout`](WaitQueue::pop_timeout)). Every pushed entry is
/// delivered to exactly one successful pop.
pub struct WaitQueue<S: Store> {
    store: Mutex<S>,
    not_empty: Condvar,
}

impl<S: Store + Default> WaitQueue<S> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            store: Mutex::new(S::default()),
            not_empty: Condvar::new(),
        }
    }
}

impl<S: Store + Default> Default for WaitQueue<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Store> WaitQueue<S> {
    /// Insert an entry and wake one blocked consumer.
    pub fn push(&self, item: S::Item) {
        let mut store = self.store.lock();
        store.push(item);
        drop(store);

        self.not_empty.notify_one();
    }

    /// Remove and return the front entry, blocking until one is available.
    pub fn pop(&self) -> S::Item {
        let mut store = self.store.lock();
        loop {
            if let Some(item) = store.pop() {
                return item;
            }
            self.not_empty.wait(&mut store);
        }
    }

    /// Like [`pop`](WaitQueue::pop), but gives up after `timeout`.
    ///
    /// The deadline covers lock acquisition as well as the wait for an
    /// entry, so total wall-clock blocking is bounded by roughly `timeout`
    /// regardless of contention. Returns `None` on expiry.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<S::Item> {
        let deadline = Instant::now() + timeout;

        let mut store = self.store.try_lock_until(deadline)?;
        loop {
            if let Some(item) = store.pop() {
                return Some(item);
            }
            if self.not_empty.wait_until(&mut store, deadline).timed_out() {
                // a push may have raced the deadline
                return store.pop();
            }
        }
    }

    /// Whether the queue was empty at the time of the call.
    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    /// Number of entries at the time of the call.
    pub fn len(&self) -> usize {
        self.store.lock().len()
    }
}

impl<S: Store> fmt::Debug for WaitQueue<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitQueue").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::MaxHeap;
    use std::sync::Arc;
    use std::thread;

    type Fifo = WaitQueue<VecDeque<i32>>;

    #[test]
    fn test_fifo_order() {
        let queue: Fifo = WaitQueue::new();
        queue.push(1);
        queue.push(2);
        queue.push(3);

        assert_eq!(queue.pop(), 1);
        assert_eq!(queue.pop(), 2);
        assert_eq!(queue.pop(), 3);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_heap_store_serves_max_first() {
        let queue: WaitQueue<MaxHeap<i32>> = WaitQueue::new();
        queue.push(1);
        queue.push(9);
        queue.push(4);

        assert_eq!(queue.pop(), 9);
        assert_eq!(queue.pop(), 4);
        assert_eq!(queue.pop(), 1);
    }

    #[test]
    fn test_pop_blocks_until_push() {
        let queue: Arc<Fifo> = Arc::new(WaitQueue::new());

        let producer = {
            let queue = queue.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                queue.push(42);
            })
        };

        assert_eq!(queue.pop(), 42);
        producer.join().unwrap();
    }

    #[test]
    fn test_pop_timeout_expires_on_empty_queue() {
        let queue: Fifo = WaitQueue::new();

        let start = Instant::now();
        let result = queue.pop_timeout(Duration::from_millis(100));
        let elapsed = start.elapsed();

        assert_eq!(result, None);
        assert!(elapsed >= Duration::from_millis(100));
        // generous slack for slow CI schedulers
        assert!(elapsed < Duration::from_secs(2));
    }

    #[test]
    fn test_pop_timeout_wakes_on_push() {
        let queue: Arc<Fifo> = Arc::new(WaitQueue::new());

        let producer = {
            let queue = queue.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                queue.push(7);
            })
        };

        assert_eq!(queue.pop_timeout(Duration::from_secs(5)), Some(7));
        producer.join().unwrap();
    }

    #[test]
    fn test_each_entry_delivered_exactly_once() {
        let queue: Arc<Fifo> = Arc::new(WaitQueue::new());
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let queue = queue.clone();
                let seen = seen.clone();
                thread::spawn(move || {
                    while let Some(item) = queue.pop_timeout(Duration::from_millis(500)) {
                        seen.lock().push(item);
                    }
                })
            })
            .collect();

        for i in 0..100 {
            queue.push(i);
        }

        for consumer in consumers {
            consumer.join().unwrap();
        }

        let mut seen = seen.lock().clone();
        seen.sort_unstable();
        assert_eq!(seen, (0..100).collect::<Vec<_>>());
    }
}
