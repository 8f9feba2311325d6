//! reloop-core: commands as return values of state-transition functions.
//!
//! A reducer answers an action with a [`Loop`]: the next state, optionally
//! paired with a [`Cmd`] describing effects. The interpreter executes the
//! command and feeds the actions it produces back into the store; the
//! simulator computes the same actions from supplied outcomes, for tests.

extern crate self as reloop_core;

mod action;
mod cmd;
mod config;
mod error;
mod interpreter;
mod loop_value;
mod map;
mod observation;
mod observer;
mod run;
mod scheduler;
mod simulate;
mod store;
pub mod validate;

pub use action::Action;
pub use cmd::{Cmd, CmdKind, ListCmd, ListOptions, MapCmd, ScheduledCmd, ScheduledFn};
pub use config::LoopConfig;
pub use error::{BuildError, CmdError, ConfigError, RunError};
pub use interpreter::{
    dispatch_all, execute_cmd, CmdFuture, Context, DispatchFuture, Dispatcher, StateReader,
};
pub use loop_value::Loop;
pub use observation::Observation;
pub use observer::{filter_observer, filter_with, no_op_observer, tee_observer, tracing_observer, ObserverFn};
pub use reloop_core_macros::Action;
pub use run::{Arg, FailFn, RunArg, RunCmd, RunFn, RunOptions, RunOutput, SuccessFn};
pub use scheduler::{DetachedTask, ManualScheduler, Scheduler, TimerHandle, TimerTask};
pub use simulate::{simulate, Simulated, Simulation};
pub use store::{HostStore, LoopStore, MemoryStore, Reducer};
