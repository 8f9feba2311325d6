//! Static interpretation of commands for tests.
//!
//! A simulation tree supplies the outcome of every RUN leaf, so the actions a
//! command would produce can be computed without calling functions, setting
//! timers or dispatching anything.

use crate::cmd::Cmd;
use crate::error::RunError;
use crate::scheduler::TimerHandle;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcomes to assume for a command, shaped like the command itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Simulation {
    /// Outcome of a RUN command. A missing `result` reads as `null`.
    Run {
        #[serde(default)]
        result: Value,
        success: bool,
    },
    /// Handle to hand to the on-scheduled creator, plus the nested outcome.
    Scheduled {
        handle: TimerHandle,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        nested: Option<Box<Simulation>>,
    },
    /// Positional outcomes for the commands of a LIST.
    Many(Vec<Simulation>),
}

impl Simulation {
    pub fn success(result: impl Into<Value>) -> Self {
        Simulation::Run {
            result: result.into(),
            success: true,
        }
    }

    pub fn failure(result: impl Into<Value>) -> Self {
        Simulation::Run {
            result: result.into(),
            success: false,
        }
    }
}

/// Actions a simulated command produces.
#[derive(Clone, Debug, PartialEq)]
pub enum Simulated<A> {
    Nothing,
    One(A),
    Many(Vec<A>),
}

impl<A> Simulated<A> {
    pub fn is_nothing(&self) -> bool {
        matches!(self, Simulated::Nothing)
    }

    pub fn into_vec(self) -> Vec<A> {
        match self {
            Simulated::Nothing => Vec::new(),
            Simulated::One(action) => vec![action],
            Simulated::Many(actions) => actions,
        }
    }

    pub fn map<B>(self, f: impl Fn(A) -> B) -> Simulated<B> {
        match self {
            Simulated::Nothing => Simulated::Nothing,
            Simulated::One(action) => Simulated::One(f(action)),
            Simulated::Many(actions) => Simulated::Many(actions.into_iter().map(f).collect()),
        }
    }
}

pub fn simulate<S, A: Clone>(cmd: &Cmd<S, A>, simulation: Option<&Simulation>) -> Simulated<A> {
    match cmd {
        Cmd::None => Simulated::Nothing,
        Cmd::Action(action) => Simulated::One(action.clone()),
        Cmd::Run(run) => {
            let action = match simulation {
                Some(Simulation::Run {
                    result,
                    success: true,
                }) => run.settle_success(result.clone()),
                Some(Simulation::Run {
                    result,
                    success: false,
                }) => run.settle_failure(RunError::Failed(result.clone())),
                _ => None,
            };
            action.map_or(Simulated::Nothing, Simulated::One)
        }
        Cmd::List(list) => {
            let entries = match simulation {
                Some(Simulation::Many(entries)) => entries.as_slice(),
                _ => &[][..],
            };
            let actions: Vec<A> = list
                .cmds
                .iter()
                .enumerate()
                .flat_map(|(i, nested)| simulate(nested, entries.get(i)).into_vec())
                .collect();
            if actions.is_empty() {
                Simulated::Nothing
            } else {
                Simulated::Many(actions)
            }
        }
        Cmd::Map(map) => map.inner.simulate(simulation),
        Cmd::Scheduled(scheduled) => {
            let (handle, nested_simulation) = match simulation {
                Some(Simulation::Scheduled { handle, nested }) => (*handle, nested.as_deref()),
                other => (TimerHandle::default(), other),
            };
            let nested = simulate(&scheduled.nested, nested_simulation);
            match &scheduled.on_scheduled_action_creator {
                Some(creator) => {
                    let mut actions = vec![creator(handle)];
                    actions.extend(nested.into_vec());
                    Simulated::Many(actions)
                }
                None => nested,
            }
        }
    }
}
