//! [`Scheduler`] – non-preemptive round-robin executor.
//!
//! Exactly one execution core, no time slicing, no priorities.  A task runs
//! until its step function returns; returning is the only yield point.  A
//! step that never returns starves every other task — that is the contract,
//! so long-running work must be sliced by its owner, not by the scheduler.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace};

/// A unit of cooperative work.
///
/// `step` is the "run until yield" entry point: it performs one bounded
/// slice of the task's work and returns to hand control back.  There is no
/// suspension keyword and no implicit preemption point.
pub trait Task {
    /// Stable name used in logs.
    fn name(&self) -> &str;

    /// Run until the next voluntary yield point.
    fn step(&mut self);
}

/// Round-robin executor for a fixed set of long-lived tasks.
///
/// # Example
///
/// ```rust
/// use visor_kernel::scheduler::{Scheduler, Task};
///
/// struct Beep;
/// impl Task for Beep {
///     fn name(&self) -> &str { "beep" }
///     fn step(&mut self) {}
/// }
///
/// let mut sched = Scheduler::new();
/// sched.add_task(Box::new(Beep));
/// sched.run_rounds(3);
/// ```
#[derive(Default)]
pub struct Scheduler {
    tasks: Vec<Box<dyn Task>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task.  Tasks run in registration order, one step each per
    /// round.
    pub fn add_task(&mut self, task: Box<dyn Task>) {
        debug!(task = task.name(), "task registered");
        self.tasks.push(task);
    }

    /// Drive all tasks round-robin until `shutdown` is observed set.
    ///
    /// The flag is checked between steps, never during one: a task that is
    /// mid-step when the flag flips finishes its slice first.
    pub fn run(&mut self, shutdown: &AtomicBool) {
        debug!(tasks = self.tasks.len(), "scheduler running");
        'rounds: loop {
            if shutdown.load(Ordering::SeqCst) {
                break;
            }
            for task in &mut self.tasks {
                if shutdown.load(Ordering::SeqCst) {
                    break 'rounds;
                }
                trace!(task = task.name(), "step");
                task.step();
            }
        }
        debug!("scheduler stopped");
    }

    /// Drive exactly `rounds` full round-robin cycles.  Test-harness entry
    /// point; production callers use [`run`][Self::run].
    pub fn run_rounds(&mut self, rounds: usize) {
        for _ in 0..rounds {
            for task in &mut self.tasks {
                task.step();
            }
        }
    }
}
