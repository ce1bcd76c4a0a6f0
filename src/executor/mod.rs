//! Task execution infrastructure.
//!
//! This module provides the task abstraction and its built-in variants,
//! the worker units owning the pool's OS threads, and the pool
//! orchestrator itself.

pub mod future;
pub mod pool;
pub mod task;
pub mod worker;

pub use future::FutureTask;
pub use pool::ThreadPool;
pub use task::{FnTask, Priority, Task};
