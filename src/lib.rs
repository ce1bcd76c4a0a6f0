//! Priority-scheduling worker pool.
//!
//! `taskband` runs a fixed-but-resizable set of OS threads that drain a
//! shared priority queue: the highest-priority entry still queued is always
//! dispatched next. The pool can be paused and resumed as a whole, and
//! grown or shrunk at runtime without leaking threads. Teardown blocks
//! until every worker thread has exited.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use taskband::{FutureTask, Priority, ThreadPool};
//!
//! let pool = ThreadPool::new(4).unwrap();
//!
//! // fire-and-forget closures
//! pool.execute(|| println!("hello from the pool"));
//! pool.execute_with_priority(|| println!("this runs first"), Priority::High);
//!
//! // tasks that produce a value
//! let answer = Arc::new(FutureTask::new(|| 6 * 7));
//! pool.submit(answer.clone());
//! assert_eq!(answer.get_result(), 42);
//!
//! pool.shutdown();
//! ```
//!
//! # Features
//!
//! - **Priority bands**: `Low` / `Normal` / `High` submission priorities,
//!   with internal control bands that always preempt ordinary work
//! - **Pause / Resume**: barrier tasks park every worker ahead of all
//!   queued work until the pool is resumed
//! - **Runtime resizing**: grow by spawning, shrink through a Stop/Kill
//!   retirement handshake that joins every removed thread
//! - **Blocking queue**: workers block on the shared queue, they never
//!   poll; a deadline-bounded pop is available for external consumers
//! - **Future tasks**: one-shot result cells readable any number of times
//!   once computed

// Lint configuration
#![warn(missing_docs, missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod executor;
pub mod prelude;
pub mod scheduler;

pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use executor::{FnTask, FutureTask, Priority, Task, ThreadPool};
