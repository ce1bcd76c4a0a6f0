//! Convenience re-exports of the crate's main types.

pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{Error, Result};
pub use crate::executor::{FnTask, FutureTask, Priority, Task, ThreadPool};
pub use crate::scheduler::{MaxHeap, Store, WaitQueue};
