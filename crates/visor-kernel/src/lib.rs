//! `visor-kernel` – cooperative task execution.
//!
//! The device runs on a single execution core with no preemption: every
//! long-lived activity is a [`Task`][scheduler::Task] whose `step` function
//! runs until it voluntarily returns, and the
//! [`Scheduler`][scheduler::Scheduler] cycles the registered tasks
//! round-robin.

pub mod scheduler;

pub use scheduler::{Scheduler, Task};
