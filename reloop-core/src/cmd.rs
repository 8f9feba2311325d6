use crate::action::Action;
use crate::map::{Tagged, Tagger};
use crate::run::{Arg, RunArg, RunCmd, RunOptions, RunOutput};
use crate::scheduler::{Scheduler, TimerHandle};
use crate::simulate::{self, Simulated, Simulation};
use crate::validate::{self, throw_invariant, PRODUCTION};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// A declared effect, returned by a reducer next to its new state and executed
/// by the interpreter.
///
/// `S` is the store state visible to RUN functions, `A` the action type the
/// command produces.
pub enum Cmd<S, A> {
    None,
    Action(A),
    Run(RunCmd<S, A>),
    List(ListCmd<S, A>),
    Map(MapCmd<S, A>),
    Scheduled(ScheduledCmd<S, A>),
}

/// Variant tag of a [`Cmd`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CmdKind {
    None,
    Action,
    Run,
    List,
    Map,
    Scheduled,
}

pub struct ListCmd<S, A> {
    pub cmds: Vec<Cmd<S, A>>,
    /// Run strictly in order instead of all at once.
    pub sequence: bool,
    /// Collect nested results instead of dispatching them as they arrive.
    pub batch: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub sequence: bool,
    pub batch: bool,
    pub test_invariants: bool,
}

impl ListOptions {
    pub fn sequence(mut self) -> Self {
        self.sequence = true;
        self
    }

    pub fn batch(mut self) -> Self {
        self.batch = true;
        self
    }

    pub fn test_invariants(mut self) -> Self {
        self.test_invariants = true;
        self
    }
}

/// A nested command whose actions are rewritten by a tagger. The nested
/// action type is erased so parents can wrap children of any action type.
pub struct MapCmd<S, A> {
    pub(crate) inner: Rc<dyn Tagged<S, A>>,
}

pub type ScheduledFn<A> = Rc<dyn Fn(TimerHandle) -> A>;

pub struct ScheduledCmd<S, A> {
    pub nested: Box<Cmd<S, A>>,
    pub delay: Duration,
    pub is_repeating: bool,
    /// Produces the bookkeeping action carrying the scheduling handle.
    pub on_scheduled_action_creator: Option<ScheduledFn<A>>,
}

impl<S, A: Clone> Clone for Cmd<S, A> {
    fn clone(&self) -> Self {
        match self {
            Cmd::None => Cmd::None,
            Cmd::Action(action) => Cmd::Action(action.clone()),
            Cmd::Run(run) => Cmd::Run(run.clone()),
            Cmd::List(list) => Cmd::List(ListCmd {
                cmds: list.cmds.clone(),
                sequence: list.sequence,
                batch: list.batch,
            }),
            Cmd::Map(map) => Cmd::Map(MapCmd {
                inner: map.inner.clone(),
            }),
            Cmd::Scheduled(scheduled) => Cmd::Scheduled(ScheduledCmd {
                nested: scheduled.nested.clone(),
                delay: scheduled.delay,
                is_repeating: scheduled.is_repeating,
                on_scheduled_action_creator: scheduled.on_scheduled_action_creator.clone(),
            }),
        }
    }
}

impl<S, A> Default for Cmd<S, A> {
    fn default() -> Self {
        Cmd::None
    }
}

impl<S, A> Cmd<S, A> {
    pub fn kind(&self) -> CmdKind {
        match self {
            Cmd::None => CmdKind::None,
            Cmd::Action(_) => CmdKind::Action,
            Cmd::Run(_) => CmdKind::Run,
            Cmd::List(_) => CmdKind::List,
            Cmd::Map(_) => CmdKind::Map,
            Cmd::Scheduled(_) => CmdKind::Scheduled,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Cmd::None)
    }
}

impl<S: Clone + 'static, A: Action> Cmd<S, A> {
    /// No-op command - produces no effects
    pub fn none() -> Self {
        Cmd::None
    }

    /// Dispatch `action` as soon as the command executes.
    pub fn action(action: A) -> Self {
        if !PRODUCTION {
            throw_invariant(validate::action(&action));
        }
        Cmd::Action(action)
    }

    /// Call `func` with the resolved `options.args` and map its outcome into
    /// at most one action.
    pub fn run(func: impl Fn(Vec<Arg<S, A>>) -> RunOutput + 'static, options: RunOptions<A>) -> Self {
        throw_invariant(validate::test_invariants("Cmd::run", options.test_invariants));
        Cmd::Run(RunCmd {
            func: Rc::new(func),
            args: options.args,
            success_action_creator: options.success_action_creator,
            fail_action_creator: options.fail_action_creator,
            force_sync: options.force_sync,
        })
    }

    pub fn list(cmds: impl IntoIterator<Item = Cmd<S, A>>, options: ListOptions) -> Self {
        throw_invariant(validate::test_invariants("Cmd::list", options.test_invariants));
        Cmd::List(ListCmd {
            cmds: cmds.into_iter().collect(),
            sequence: options.sequence,
            batch: options.batch,
        })
    }

    /// Run all commands at once and collect their actions in order.
    pub fn batch(cmds: impl IntoIterator<Item = Cmd<S, A>>) -> Self {
        Self::list(cmds, ListOptions::default().batch())
    }

    /// Run commands one after another and collect their actions in order.
    pub fn sequence(cmds: impl IntoIterator<Item = Cmd<S, A>>) -> Self {
        Self::list(cmds, ListOptions::default().sequence().batch())
    }

    /// Wrap every action produced by `nested` with `tagger`.
    pub fn map<B: Action>(nested: Cmd<S, B>, tagger: impl Fn(B) -> A + 'static) -> Self {
        Self::map_with(nested, move |_: &[Value], action| tagger(action), Vec::new())
    }

    /// Like [`Cmd::map`], passing `args` to the tagger ahead of each action.
    pub fn map_with<B: Action>(
        nested: Cmd<S, B>,
        tagger: impl Fn(&[Value], B) -> A + 'static,
        args: Vec<Value>,
    ) -> Self {
        Cmd::Map(MapCmd {
            inner: Rc::new(Tagger {
                nested,
                tagger: Rc::new(tagger),
                args: Rc::new(args),
            }),
        })
    }

    /// Execute `nested` once after `delay`.
    pub fn schedule(
        nested: Cmd<S, A>,
        delay: Duration,
        on_scheduled: Option<ScheduledFn<A>>,
    ) -> Self {
        Self::delayed(nested, delay, false, on_scheduled)
    }

    /// Execute `nested` every `delay` until the schedule is cleared. A zero
    /// delay runs at the minimum period.
    pub fn schedule_repeating(
        nested: Cmd<S, A>,
        delay: Duration,
        on_scheduled: Option<ScheduledFn<A>>,
    ) -> Self {
        Self::delayed(nested, delay, true, on_scheduled)
    }

    fn delayed(
        nested: Cmd<S, A>,
        delay: Duration,
        is_repeating: bool,
        on_scheduled: Option<ScheduledFn<A>>,
    ) -> Self {
        let delay = if is_repeating {
            validate::repeat_period(delay)
        } else {
            delay
        };
        Cmd::Scheduled(ScheduledCmd {
            nested: Box::new(nested),
            delay,
            is_repeating,
            on_scheduled_action_creator: on_scheduled,
        })
    }

    /// RUN command cancelling the schedule behind `handle`. Produces no action.
    pub fn clear_scheduled(scheduler: Rc<dyn Scheduler>, handle: TimerHandle) -> Self {
        Self::run(
            move |args: Vec<Arg<S, A>>| {
                let cleared = args
                    .first()
                    .and_then(Arg::as_value)
                    .and_then(TimerHandle::from_value)
                    .map(|handle| scheduler.clear(handle))
                    .unwrap_or(false);
                RunOutput::ok(cleared)
            },
            RunOptions::new().arg(RunArg::value(handle)),
        )
    }

    /// Compute the actions this command would produce for `simulation`,
    /// without running anything.
    pub fn simulate(&self, simulation: Option<&Simulation>) -> Simulated<A> {
        simulate::simulate(self, simulation)
    }
}

impl<S, A: fmt::Debug> fmt::Debug for Cmd<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cmd::None => f.write_str("Cmd::None"),
            Cmd::Action(action) => f.debug_tuple("Cmd::Action").field(action).finish(),
            Cmd::Run(run) => f
                .debug_struct("Cmd::Run")
                .field("args", &run.args)
                .field("force_sync", &run.force_sync)
                .finish_non_exhaustive(),
            Cmd::List(list) => f
                .debug_struct("Cmd::List")
                .field("cmds", &list.cmds)
                .field("sequence", &list.sequence)
                .field("batch", &list.batch)
                .finish(),
            Cmd::Map(map) => map.inner.describe(f),
            Cmd::Scheduled(scheduled) => f
                .debug_struct("Cmd::Scheduled")
                .field("nested", &scheduled.nested)
                .field("delay", &scheduled.delay)
                .field("is_repeating", &scheduled.is_repeating)
                .finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    type TestCmd = Cmd<(), Value>;

    #[test]
    fn kinds_follow_variants() {
        assert_eq!(TestCmd::none().kind(), CmdKind::None);
        assert_eq!(TestCmd::action(json!({ "type": "X" })).kind(), CmdKind::Action);
        assert_eq!(TestCmd::batch([]).kind(), CmdKind::List);
        assert_eq!(
            TestCmd::map(TestCmd::none(), |action: Value| action).kind(),
            CmdKind::Map
        );
        assert_eq!(
            serde_json::to_value(CmdKind::Scheduled).unwrap(),
            json!("SCHEDULED")
        );
    }

    #[test]
    fn list_aliases_set_flags() {
        let Cmd::List(batch) = TestCmd::batch([TestCmd::none()]) else {
            panic!("expected a list");
        };
        assert!(batch.batch && !batch.sequence);

        let Cmd::List(sequence) = TestCmd::sequence([]) else {
            panic!("expected a list");
        };
        assert!(sequence.batch && sequence.sequence);

        let Cmd::List(plain) = TestCmd::list([], ListOptions::default()) else {
            panic!("expected a list");
        };
        assert!(!plain.batch && !plain.sequence);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "Cmd::action: argument must be an action")]
    fn action_without_type_panics() {
        let _ = TestCmd::action(json!({ "value": 1 }));
    }

    #[test]
    fn zero_delay_repeating_runs_at_minimum_period() {
        let Cmd::Scheduled(scheduled) =
            TestCmd::schedule_repeating(TestCmd::none(), Duration::ZERO, None)
        else {
            panic!("expected a scheduled command");
        };
        assert_eq!(scheduled.delay, validate::MIN_REPEAT_DELAY);

        let Cmd::Scheduled(once) = TestCmd::schedule(TestCmd::none(), Duration::ZERO, None) else {
            panic!("expected a scheduled command");
        };
        assert_eq!(once.delay, Duration::ZERO);
    }

    #[cfg(debug_assertions)]
    #[test]
    fn test_invariants_is_accepted_in_test_builds() {
        let cmd = TestCmd::run(
            |_| RunOutput::ok(1),
            RunOptions::new().test_invariants(),
        );
        assert_eq!(cmd.kind(), CmdKind::Run);
        let list = TestCmd::list([cmd], ListOptions::default().test_invariants());
        assert_eq!(list.kind(), CmdKind::List);
    }

    #[test]
    fn debug_redacts_closures() {
        let cmd = TestCmd::list(
            [
                TestCmd::action(json!({ "type": "X" })),
                TestCmd::run(
                    |_| RunOutput::ok(1),
                    RunOptions::new().arg(RunArg::Dispatch),
                ),
            ],
            ListOptions::default().sequence(),
        );
        let rendered = format!("{cmd:?}");
        assert!(rendered.contains("Cmd::Action"));
        assert!(rendered.contains("args: [Dispatch]"));
        assert!(rendered.contains("sequence: true"));
    }
}
