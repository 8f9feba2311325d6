use crate::error::RunError;
use crate::interpreter::{Dispatcher, StateReader};
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::future::Future;
use std::rc::Rc;

/// Argument binding for a RUN function, resolved when the command executes.
#[derive(Clone, Debug, PartialEq)]
pub enum RunArg {
    Value(Value),
    /// The live (wrapped) dispatch.
    Dispatch,
    /// The live state reader.
    GetState,
}

impl RunArg {
    pub fn value(value: impl Into<Value>) -> Self {
        RunArg::Value(value.into())
    }
}

/// A resolved [`RunArg`] as received by the RUN function.
pub enum Arg<S, A> {
    Value(Value),
    Dispatch(Dispatcher<A>),
    GetState(StateReader<S>),
}

impl<S, A> Arg<S, A> {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Arg::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_dispatch(&self) -> Option<&Dispatcher<A>> {
        match self {
            Arg::Dispatch(dispatch) => Some(dispatch),
            _ => None,
        }
    }

    pub fn as_get_state(&self) -> Option<&StateReader<S>> {
        match self {
            Arg::GetState(get_state) => Some(get_state),
            _ => None,
        }
    }
}

/// What a RUN function hands back: an outcome known now, or one still pending.
pub enum RunOutput {
    Ready(Result<Value, RunError>),
    Deferred(LocalBoxFuture<'static, Result<Value, RunError>>),
}

impl RunOutput {
    pub fn ok(value: impl Into<Value>) -> Self {
        RunOutput::Ready(Ok(value.into()))
    }

    pub fn err(error: impl Into<RunError>) -> Self {
        RunOutput::Ready(Err(error.into()))
    }

    pub fn deferred(fut: impl Future<Output = Result<Value, RunError>> + 'static) -> Self {
        RunOutput::Deferred(fut.boxed_local())
    }
}

impl From<Result<Value, RunError>> for RunOutput {
    fn from(outcome: Result<Value, RunError>) -> Self {
        RunOutput::Ready(outcome)
    }
}

pub type RunFn<S, A> = Rc<dyn Fn(Vec<Arg<S, A>>) -> RunOutput>;
pub type SuccessFn<A> = Rc<dyn Fn(Value) -> A>;
pub type FailFn<A> = Rc<dyn Fn(RunError) -> A>;

/// Options for [`Cmd::run`](crate::Cmd::run).
pub struct RunOptions<A> {
    pub args: Vec<RunArg>,
    pub success_action_creator: Option<SuccessFn<A>>,
    pub fail_action_creator: Option<FailFn<A>>,
    /// Do not await a deferred output: it is handed to the scheduler's
    /// `spawn` and the success creator receives `Value::Null` right away.
    pub force_sync: bool,
    /// Skip builder validation. Test builds only.
    pub test_invariants: bool,
}

impl<A> Default for RunOptions<A> {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            success_action_creator: None,
            fail_action_creator: None,
            force_sync: false,
            test_invariants: false,
        }
    }
}

impl<A> RunOptions<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn args(mut self, args: impl IntoIterator<Item = RunArg>) -> Self {
        self.args.extend(args);
        self
    }

    pub fn arg(mut self, arg: RunArg) -> Self {
        self.args.push(arg);
        self
    }

    pub fn on_success(mut self, creator: impl Fn(Value) -> A + 'static) -> Self {
        self.success_action_creator = Some(Rc::new(creator));
        self
    }

    pub fn on_fail(mut self, creator: impl Fn(RunError) -> A + 'static) -> Self {
        self.fail_action_creator = Some(Rc::new(creator));
        self
    }

    pub fn force_sync(mut self) -> Self {
        self.force_sync = true;
        self
    }

    pub fn test_invariants(mut self) -> Self {
        self.test_invariants = true;
        self
    }
}

pub struct RunCmd<S, A> {
    pub(crate) func: RunFn<S, A>,
    pub args: Vec<RunArg>,
    pub success_action_creator: Option<SuccessFn<A>>,
    pub fail_action_creator: Option<FailFn<A>>,
    pub force_sync: bool,
}

impl<S, A> Clone for RunCmd<S, A> {
    fn clone(&self) -> Self {
        Self {
            func: self.func.clone(),
            args: self.args.clone(),
            success_action_creator: self.success_action_creator.clone(),
            fail_action_creator: self.fail_action_creator.clone(),
            force_sync: self.force_sync,
        }
    }
}

impl<S, A> RunCmd<S, A> {
    /// Map an outcome through the configured creators.
    pub(crate) fn settle_success(&self, value: Value) -> Option<A> {
        self.success_action_creator.as_ref().map(|creator| creator(value))
    }

    pub(crate) fn settle_failure(&self, error: RunError) -> Option<A> {
        self.fail_action_creator.as_ref().map(|creator| creator(error))
    }
}
