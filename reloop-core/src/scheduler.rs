use crate::validate::repeat_period;
use futures::future::{join_all, LocalBoxFuture};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

/// Work run on every firing of a scheduled command.
pub type TimerTask = Rc<dyn Fn() -> LocalBoxFuture<'static, ()>>;

/// Opaque handle returned by a [`Scheduler`], used to cancel the schedule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerHandle(pub u64);

impl TimerHandle {
    /// Recover a handle that travelled through a RUN argument.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_u64().map(TimerHandle)
    }
}

impl From<TimerHandle> for Value {
    fn from(handle: TimerHandle) -> Self {
        Value::from(handle.0)
    }
}

/// Work detached from the command that started it; nothing awaits it.
pub type DetachedTask = LocalBoxFuture<'static, ()>;

/// Runtime capability used to execute scheduled commands and detached work.
pub trait Scheduler {
    /// Run `task` after `delay`, and every `delay` after that when `repeating`.
    fn schedule(&self, delay: Duration, repeating: bool, task: TimerTask) -> TimerHandle;

    /// Cancel a schedule. Returns false when the handle is unknown or already
    /// finished.
    fn clear(&self, handle: TimerHandle) -> bool;

    /// Drive `task` to completion in the background.
    fn spawn(&self, task: DetachedTask);
}

struct Timer {
    due: Duration,
    period: Option<Duration>,
    task: TimerTask,
}

#[derive(Default)]
struct Clock {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<u64, Timer>,
    detached: Vec<DetachedTask>,
}

/// Scheduler driven by a virtual clock that only moves on [`advance`].
///
/// Firings happen in due-time order (ties broken by handle) and each firing is
/// awaited before the next one starts, so runs are reproducible. Spawned work
/// is queued and driven by the next [`advance`], ahead of any firing.
///
/// [`advance`]: ManualScheduler::advance
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Rc<RefCell<Clock>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.clock.borrow().now
    }

    /// Number of schedules still registered.
    pub fn pending(&self) -> usize {
        self.clock.borrow().timers.len()
    }

    /// Number of spawned tasks waiting for the next [`advance`].
    ///
    /// [`advance`]: ManualScheduler::advance
    pub fn queued(&self) -> usize {
        self.clock.borrow().detached.len()
    }

    /// Move the clock forward by `by`, firing everything that falls due.
    pub async fn advance(&self, by: Duration) {
        let target = self.now() + by;
        self.run_detached().await;
        while let Some(task) = self.next_due(target) {
            task().await;
            self.run_detached().await;
        }
        self.clock.borrow_mut().now = target;
    }

    /// Drive queued spawned work, including whatever it spawns in turn.
    async fn run_detached(&self) {
        loop {
            let batch = std::mem::take(&mut self.clock.borrow_mut().detached);
            if batch.is_empty() {
                break;
            }
            join_all(batch).await;
        }
    }

    fn next_due(&self, target: Duration) -> Option<TimerTask> {
        let mut clock = self.clock.borrow_mut();
        let (id, due) = clock
            .timers
            .iter()
            .filter(|(_, timer)| timer.due <= target)
            .min_by_key(|(id, timer)| (timer.due, **id))
            .map(|(id, timer)| (*id, timer.due))?;
        clock.now = due;
        let timer = clock.timers.get_mut(&id)?;
        let task = timer.task.clone();
        if let Some(period) = timer.period {
            timer.due = due + period;
        } else {
            clock.timers.remove(&id);
        }
        Some(task)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, repeating: bool, task: TimerTask) -> TimerHandle {
        let mut clock = self.clock.borrow_mut();
        clock.next_id += 1;
        let id = clock.next_id;
        let period = repeating.then(|| repeat_period(delay));
        let due = clock.now + period.unwrap_or(delay);
        clock.timers.insert(id, Timer { due, period, task });
        TimerHandle(id)
    }

    fn clear(&self, handle: TimerHandle) -> bool {
        self.clock.borrow_mut().timers.remove(&handle.0).is_some()
    }

    fn spawn(&self, task: DetachedTask) {
        self.clock.borrow_mut().detached.push(task);
    }
}
