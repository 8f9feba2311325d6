use reloop_core::{Action, Cmd, RunOptions, RunOutput, Scheduler, TimerHandle};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Cancel a timeout started with `Cmd::schedule`. Produces no action.
pub fn clear_timeout<S, A>(scheduler: Rc<dyn Scheduler>, handle: TimerHandle) -> Cmd<S, A>
where
    S: Clone + 'static,
    A: Action,
{
    Cmd::clear_scheduled(scheduler, handle)
}

/// Cancel an interval started with `Cmd::schedule_repeating`. Produces no action.
pub fn clear_interval<S, A>(scheduler: Rc<dyn Scheduler>, handle: TimerHandle) -> Cmd<S, A>
where
    S: Clone + 'static,
    A: Action,
{
    Cmd::clear_scheduled(scheduler, handle)
}

/// Read the wall clock, as seconds since the unix epoch.
pub fn now<S, A>(returns: impl Fn(f64) -> A + 'static) -> Cmd<S, A>
where
    S: Clone + 'static,
    A: Action,
{
    Cmd::run(
        |_| {
            let ts = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs_f64();
            RunOutput::ok(ts)
        },
        RunOptions::new().on_success(move |value| returns(value.as_f64().unwrap_or_default())),
    )
}
