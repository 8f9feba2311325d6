//! reloop-time-manager: tokio timers behind the reloop-core [`Scheduler`].
//!
//! Timers and spawned work are `spawn_local` tasks, so the manager must be
//! used from inside a tokio `LocalSet`.

mod requests;

pub use requests::{clear_interval, clear_timeout, now};

use reloop_core::validate::repeat_period;
use reloop_core::{DetachedTask, Scheduler, TimerHandle, TimerTask};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Tracks outstanding timer tasks so they can be cleared deterministically.
#[derive(Default)]
pub struct TimerState {
    next_id: u64,
    tasks: HashMap<u64, JoinHandle<()>>,
}

/// Scheduler running each schedule as a local tokio task.
#[derive(Clone, Default)]
pub struct TimeManager {
    state: Rc<RefCell<TimerState>>,
}

impl TimeManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of timers that have not fired (one-shot) or been cleared.
    pub fn active(&self) -> usize {
        self.state.borrow().tasks.len()
    }

    fn spawn_once(&self, id: u64, delay: Duration, task: TimerTask) -> JoinHandle<()> {
        let state = Rc::downgrade(&self.state);
        tokio::task::spawn_local(async move {
            time::sleep(delay).await;
            if let Some(state) = state.upgrade() {
                state.borrow_mut().tasks.remove(&id);
            }
            tracing::debug!(target: "reloop-time-manager", id, "timeout fired");
            task().await;
        })
    }

    fn spawn_repeating(&self, id: u64, delay: Duration, task: TimerTask) -> JoinHandle<()> {
        let period = repeat_period(delay);
        tokio::task::spawn_local(async move {
            let mut ticks = time::interval_at(Instant::now() + period, period);
            // Late ticks push the schedule back, like setInterval.
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                tracing::debug!(target: "reloop-time-manager", id, "interval fired");
                task().await;
            }
        })
    }
}

impl Scheduler for TimeManager {
    fn schedule(&self, delay: Duration, repeating: bool, task: TimerTask) -> TimerHandle {
        let id = {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            state.next_id
        };
        let handle = if repeating {
            self.spawn_repeating(id, delay, task)
        } else {
            self.spawn_once(id, delay, task)
        };
        self.state.borrow_mut().tasks.insert(id, handle);
        tracing::debug!(target: "reloop-time-manager", id, ?delay, repeating, "timer scheduled");
        TimerHandle(id)
    }

    fn clear(&self, handle: TimerHandle) -> bool {
        let Some(task) = self.state.borrow_mut().tasks.remove(&handle.0) else {
            return false;
        };
        task.abort();
        tracing::debug!(target: "reloop-time-manager", id = handle.0, "timer cleared");
        true
    }

    fn spawn(&self, task: DetachedTask) {
        tokio::task::spawn_local(task);
    }
}
