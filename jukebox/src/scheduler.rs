//! Single-threaded delayed task queue
//!
//! Everything that looks periodic in the player (the service sampler, the
//! playback screen refresh) is a task that re-posts itself from inside its own
//! callback. Tasks run on the thread that calls [`Scheduler::run_due`], which is
//! the UI thread, so callbacks may freely touch `Rc`/`RefCell` state.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of the current time for the scheduler
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Handle to a posted task, used for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

struct PendingTask {
    id: TaskId,
    due: Instant,
    task: Box<dyn FnOnce()>,
}

pub struct Scheduler {
    clock: Rc<dyn Clock>,
    next_id: Cell<u64>,
    queue: RefCell<Vec<PendingTask>>,
}

impl Scheduler {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            next_id: Cell::new(0),
            queue: RefCell::new(Vec::new()),
        }
    }

    /// Scheduler driven by the wall clock
    pub fn system() -> Self {
        Self::new(Rc::new(SystemClock))
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn clock(&self) -> Rc<dyn Clock> {
        self.clock.clone()
    }

    /// Queue a task to run on the next [`run_due`](Self::run_due) pass
    pub fn post<F>(&self, task: F) -> TaskId
    where
        F: FnOnce() + 'static,
    {
        self.post_delayed(Duration::ZERO, task)
    }

    /// Queue a task to run once `delay` has elapsed
    pub fn post_delayed<F>(&self, delay: Duration, task: F) -> TaskId
    where
        F: FnOnce() + 'static,
    {
        let id = TaskId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        self.queue.borrow_mut().push(PendingTask {
            id,
            due: self.clock.now() + delay,
            task: Box::new(task),
        });

        id
    }

    /// Remove a pending task; returns false if it already ran or was cancelled
    pub fn cancel(&self, id: TaskId) -> bool {
        let mut queue = self.queue.borrow_mut();
        let before = queue.len();
        queue.retain(|pending| pending.id != id);
        queue.len() != before
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.queue.borrow().iter().any(|pending| pending.id == id)
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Time until the earliest pending task is due, zero if one is overdue
    pub fn time_until_next(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.queue
            .borrow()
            .iter()
            .map(|pending| pending.due.saturating_duration_since(now))
            .min()
    }

    /// Run every task that is due, in due order
    ///
    /// Tasks posted while this pass is running wait for the next pass, even
    /// when they are already due. Returns the number of tasks run.
    pub fn run_due(&self) -> usize {
        let cutoff = self.next_id.get();
        let mut ran = 0;

        while let Some(pending) = self.pop_due(cutoff) {
            (pending.task)();
            ran += 1;
        }

        ran
    }

    fn pop_due(&self, cutoff: u64) -> Option<PendingTask> {
        let now = self.clock.now();
        let mut queue = self.queue.borrow_mut();

        let index = queue
            .iter()
            .enumerate()
            .filter(|(_, pending)| pending.id.0 < cutoff && pending.due <= now)
            .min_by_key(|(_, pending)| (pending.due, pending.id))
            .map(|(index, _)| index)?;

        Some(queue.swap_remove(index))
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("next_id", &self.next_id.get())
            .field("pending", &self.pending())
            .finish()
    }
}
