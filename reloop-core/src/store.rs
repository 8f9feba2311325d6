use crate::action::Action;
use crate::cmd::Cmd;
use crate::config::LoopConfig;
use crate::error::CmdError;
use crate::interpreter::{dispatch_all, execute_cmd, Context, DispatchFuture, Dispatcher, StateReader};
use crate::loop_value::Loop;
use crate::observer::ObserverFn;
use crate::scheduler::Scheduler;
use crate::Observation;
use futures::future;
use futures::FutureExt;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::SystemTime;

/// The state container a [`LoopStore`] drives.
pub trait HostStore<S> {
    fn get_state(&self) -> S;
    fn replace_state(&self, state: S);
}

/// Host store keeping the state in memory.
pub struct MemoryStore<S> {
    state: RefCell<S>,
}

impl<S> MemoryStore<S> {
    pub fn new(state: S) -> Self {
        Self {
            state: RefCell::new(state),
        }
    }
}

impl<S: Clone> HostStore<S> for MemoryStore<S> {
    fn get_state(&self) -> S {
        self.state.borrow().clone()
    }

    fn replace_state(&self, state: S) {
        *self.state.borrow_mut() = state;
    }
}

pub type Reducer<S, A> = Rc<dyn Fn(S, A) -> Loop<S, A>>;

/// Wraps a host store so reducers can answer with commands.
///
/// Every dispatch runs the reducer, commits the new state, then interprets the
/// returned command; actions it produces go back through the same dispatch.
pub struct LoopStore<H, S, A> {
    host: Rc<H>,
    reducer: Reducer<S, A>,
    scheduler: Rc<dyn Scheduler>,
    config: LoopConfig,
    observer: ObserverFn<A>,
    this: Weak<Self>,
}

impl<H, S, A> LoopStore<H, S, A>
where
    H: HostStore<S> + 'static,
    S: Clone + 'static,
    A: Action,
{
    pub fn install(
        host: H,
        reducer: impl Fn(S, A) -> Loop<S, A> + 'static,
        scheduler: Rc<dyn Scheduler>,
        config: LoopConfig,
        observer: ObserverFn<A>,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            host: Rc::new(host),
            reducer: Rc::new(reducer),
            scheduler,
            config,
            observer,
            this: this.clone(),
        })
    }

    pub fn get_state(&self) -> S {
        self.host.get_state()
    }

    /// Commit the initial model and run its command.
    pub fn start(&self, initial: Loop<S, A>) -> DispatchFuture {
        let (model, cmd) = initial.lift();
        self.host.replace_state(model);
        self.run_cmd(cmd)
    }

    /// Reduce `action` now; the returned future drives the resulting effects.
    ///
    /// The state is committed before the command runs, so RUN functions
    /// reading state see the post-transition value.
    pub fn dispatch(&self, action: A) -> DispatchFuture {
        (self.observer)(&Observation::Dispatch {
            ts: SystemTime::now(),
            data: action.clone(),
        });
        let (model, cmd) = (self.reducer)(self.host.get_state(), action).lift();
        self.host.replace_state(model);
        self.run_cmd(cmd)
    }

    /// Interpret `cmd` against this store, re-dispatching what it produces.
    pub fn run_cmd(&self, cmd: Cmd<S, A>) -> DispatchFuture {
        if cmd.is_none() {
            return future::ready(Ok(())).boxed_local();
        }
        (self.observer)(&Observation::Effect {
            ts: SystemTime::now(),
            data: cmd.kind(),
        });

        let ctx = self.context();
        match execute_cmd(cmd, &ctx) {
            Ok(None) => future::ready(Ok(())).boxed_local(),
            Ok(Some(pending)) => async move {
                let actions = pending.await?;
                dispatch_all(&ctx.dispatch, actions).await
            }
            .boxed_local(),
            Err(err) => future::ready(Err(err)).boxed_local(),
        }
    }

    /// Wrapped dispatch, as handed to RUN functions.
    pub fn dispatcher(&self) -> Dispatcher<A> {
        let this = self.this.clone();
        Rc::new(move |action| match this.upgrade() {
            Some(store) => store.dispatch(action),
            None => future::ready(Err(CmdError::StoreClosed)).boxed_local(),
        })
    }

    /// Live state reader, as handed to RUN functions. It shares the host
    /// store, so it keeps answering with the last committed state after the
    /// loop store is dropped.
    pub fn state_reader(&self) -> StateReader<S> {
        let host = self.host.clone();
        Rc::new(move || host.get_state())
    }

    pub fn context(&self) -> Context<S, A> {
        Context::new(
            self.dispatcher(),
            self.state_reader(),
            self.scheduler.clone(),
            self.config.clone(),
        )
    }
}
