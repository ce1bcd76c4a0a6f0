//! Blocking scheduling primitives.
//!
//! The scheduler decides which queued entry a worker receives next. It is
//! built from two pieces: a [`WaitQueue`] providing the blocking push/pop
//! protocol, and a pluggable [`Store`] backing it (a [`MaxHeap`] for
//! priority dispatch, or a plain FIFO for handshake traffic).

pub mod heap;
pub mod waitable;

pub use heap::MaxHeap;
pub use waitable::{Store, WaitQueue};
