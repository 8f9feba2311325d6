use crate::action::Action;
use crate::cmd::{Cmd, ListCmd, ScheduledCmd};
use crate::config::LoopConfig;
use crate::error::{CmdError, RunError};
use crate::run::{Arg, RunArg, RunCmd, RunOutput};
use crate::scheduler::{Scheduler, TimerTask};
use futures::future::{self, join_all, LocalBoxFuture};
use futures::FutureExt;
use serde_json::Value;
use std::rc::Rc;

/// Completes once the effects triggered by a dispatch have run.
pub type DispatchFuture = LocalBoxFuture<'static, Result<(), CmdError>>;

/// Pending result of a command: the ordered follow-up actions.
pub type CmdFuture<A> = LocalBoxFuture<'static, Result<Vec<A>, CmdError>>;

pub type Dispatcher<A> = Rc<dyn Fn(A) -> DispatchFuture>;
pub type StateReader<S> = Rc<dyn Fn() -> S>;

/// Everything a command needs from its surroundings.
pub struct Context<S, A> {
    pub dispatch: Dispatcher<A>,
    pub get_state: StateReader<S>,
    pub scheduler: Rc<dyn Scheduler>,
    pub config: LoopConfig,
}

impl<S, A> Clone for Context<S, A> {
    fn clone(&self) -> Self {
        Self {
            dispatch: self.dispatch.clone(),
            get_state: self.get_state.clone(),
            scheduler: self.scheduler.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S, A> Context<S, A> {
    pub fn new(
        dispatch: Dispatcher<A>,
        get_state: StateReader<S>,
        scheduler: Rc<dyn Scheduler>,
        config: LoopConfig,
    ) -> Self {
        Self {
            dispatch,
            get_state,
            scheduler,
            config,
        }
    }

    /// Same context, different dispatch (and so possibly another action type).
    pub fn with_dispatch<B>(&self, dispatch: Dispatcher<B>) -> Context<S, B> {
        Context {
            dispatch,
            get_state: self.get_state.clone(),
            scheduler: self.scheduler.clone(),
            config: self.config.clone(),
        }
    }
}

/// Execute `cmd`.
///
/// `Ok(None)` means no action is or will be produced. `Err` is returned only
/// when a RUN fails synchronously without a fail action creator; every other
/// failure travels inside the returned future.
pub fn execute_cmd<S, A>(cmd: Cmd<S, A>, ctx: &Context<S, A>) -> Result<Option<CmdFuture<A>>, CmdError>
where
    S: Clone + 'static,
    A: Action,
{
    match cmd {
        Cmd::None => Ok(None),
        Cmd::Action(action) => Ok(Some(future::ready(Ok(vec![action])).boxed_local())),
        Cmd::Run(run) => handle_run(run, ctx),
        Cmd::List(list) if list.sequence => Ok(handle_sequence(list, ctx)),
        Cmd::List(list) => Ok(handle_parallel(list, ctx)),
        Cmd::Map(map) => map.inner.execute(ctx),
        Cmd::Scheduled(scheduled) => Ok(handle_scheduled(scheduled, ctx)),
    }
}

/// Dispatch `actions` in order, then wait for all of their effects. The first
/// failure is reported once every dispatch has settled.
pub async fn dispatch_all<A>(dispatch: &Dispatcher<A>, actions: Vec<A>) -> Result<(), CmdError> {
    let pending: Vec<DispatchFuture> = actions.into_iter().map(|action| dispatch(action)).collect();
    join_all(pending).await.into_iter().collect()
}

fn resolve_args<S, A>(args: &[RunArg], ctx: &Context<S, A>) -> Vec<Arg<S, A>> {
    args.iter()
        .map(|arg| match arg {
            RunArg::Value(value) => Arg::Value(value.clone()),
            RunArg::Dispatch => Arg::Dispatch(ctx.dispatch.clone()),
            RunArg::GetState => Arg::GetState(ctx.get_state.clone()),
        })
        .collect()
}

fn ready_actions<A: 'static>(action: Option<A>) -> Option<CmdFuture<A>> {
    action.map(|action| future::ready(Ok(vec![action])).boxed_local())
}

fn log_handled_failure(error: &RunError, config: &LoopConfig) {
    if !config.dont_log_errors_on_handled_failures {
        tracing::error!(target: "reloop-core::Cmd", %error, "Cmd::run failed, producing fail action");
    }
}

/// Map a failure through the fail creator. Without one the failure is only
/// logged.
fn recover<S, A>(run: &RunCmd<S, A>, error: RunError, config: &LoopConfig) -> Option<A> {
    if run.fail_action_creator.is_some() {
        log_handled_failure(&error, config);
        run.settle_failure(error)
    } else {
        tracing::error!(target: "reloop-core::Cmd", %error, "Cmd::run failed without a fail action creator");
        None
    }
}

fn handle_run<S, A>(run: RunCmd<S, A>, ctx: &Context<S, A>) -> Result<Option<CmdFuture<A>>, CmdError>
where
    S: Clone + 'static,
    A: Action,
{
    let output = (run.func)(resolve_args(&run.args, ctx));
    match output {
        RunOutput::Deferred(pending) if !run.force_sync => {
            let config = ctx.config.clone();
            Ok(Some(
                async move {
                    let action = match pending.await {
                        Ok(value) => run.settle_success(value),
                        Err(error) => recover(&run, error, &config),
                    };
                    Ok(action.into_iter().collect())
                }
                .boxed_local(),
            ))
        }
        RunOutput::Deferred(pending) => {
            ctx.scheduler.spawn(
                async move {
                    if let Err(error) = pending.await {
                        tracing::error!(target: "reloop-core::Cmd", %error, "detached Cmd::run failed");
                    }
                }
                .boxed_local(),
            );
            Ok(ready_actions(run.settle_success(Value::Null)))
        }
        RunOutput::Ready(Ok(value)) => Ok(ready_actions(run.settle_success(value))),
        RunOutput::Ready(Err(error)) if run.fail_action_creator.is_some() => {
            log_handled_failure(&error, &ctx.config);
            Ok(ready_actions(run.settle_failure(error)))
        }
        RunOutput::Ready(Err(error)) => {
            tracing::error!(target: "reloop-core::Cmd", %error, "unhandled failure in Cmd::run");
            Err(CmdError::UnhandledFailure(error))
        }
    }
}

fn handle_parallel<S, A>(list: ListCmd<S, A>, ctx: &Context<S, A>) -> Option<CmdFuture<A>>
where
    S: Clone + 'static,
    A: Action,
{
    let ListCmd { cmds, batch, .. } = list;
    let mut pending: Vec<CmdFuture<A>> = Vec::new();
    for nested in cmds {
        match execute_cmd(nested, ctx) {
            Ok(None) => {}
            Ok(Some(result)) if batch => pending.push(result),
            Ok(Some(result)) => {
                let dispatch = ctx.dispatch.clone();
                pending.push(
                    async move {
                        dispatch_all(&dispatch, result.await?).await?;
                        Ok(Vec::new())
                    }
                    .boxed_local(),
                );
            }
            // Siblings keep running; the failure surfaces with the list result.
            Err(err) => pending.push(future::ready(Err(err)).boxed_local()),
        }
    }

    if pending.is_empty() {
        return None;
    }

    Some(
        async move {
            let mut actions = Vec::new();
            for result in join_all(pending).await {
                actions.extend(result?);
            }
            Ok(actions)
        }
        .boxed_local(),
    )
}

fn handle_sequence<S, A>(list: ListCmd<S, A>, ctx: &Context<S, A>) -> Option<CmdFuture<A>>
where
    S: Clone + 'static,
    A: Action,
{
    let ListCmd { cmds, batch, .. } = list;
    let mut rest = cmds.into_iter();
    let mut step = execute_cmd(rest.next()?, ctx);
    let ctx = ctx.clone();

    Some(
        async move {
            let mut produced = Vec::new();
            loop {
                let actions = match step? {
                    Some(result) => result.await?,
                    None => Vec::new(),
                };
                if batch {
                    produced.extend(actions);
                } else {
                    dispatch_all(&ctx.dispatch, actions).await?;
                }
                match rest.next() {
                    Some(next) => step = execute_cmd(next, &ctx),
                    None => break,
                }
            }
            Ok(produced)
        }
        .boxed_local(),
    )
}

fn handle_scheduled<S, A>(scheduled: ScheduledCmd<S, A>, ctx: &Context<S, A>) -> Option<CmdFuture<A>>
where
    S: Clone + 'static,
    A: Action,
{
    let ScheduledCmd {
        nested,
        delay,
        is_repeating,
        on_scheduled_action_creator,
    } = scheduled;
    let nested = Rc::new(*nested);
    let fire_ctx = ctx.clone();
    let task: TimerTask = Rc::new(move || fire(&nested, &fire_ctx));

    let handle = ctx.scheduler.schedule(delay, is_repeating, task);
    tracing::debug!(target: "reloop-core::Cmd", ?handle, ?delay, is_repeating, "scheduled command");
    ready_actions(on_scheduled_action_creator.map(|creator| creator(handle)))
}

/// One firing of a scheduled command. Nothing awaits a firing, so failures
/// end here, in the log.
fn fire<S, A>(nested: &Cmd<S, A>, ctx: &Context<S, A>) -> LocalBoxFuture<'static, ()>
where
    S: Clone + 'static,
    A: Action,
{
    let pending = match execute_cmd(nested.clone(), ctx) {
        Ok(Some(pending)) => pending,
        Ok(None) => return future::ready(()).boxed_local(),
        Err(error) => {
            tracing::error!(target: "reloop-core::Cmd", %error, "scheduled command failed");
            return future::ready(()).boxed_local();
        }
    };
    let dispatch = ctx.dispatch.clone();
    async move {
        let outcome = match pending.await {
            Ok(actions) => dispatch_all(&dispatch, actions).await,
            Err(error) => Err(error),
        };
        if let Err(error) = outcome {
            tracing::error!(target: "reloop-core::Cmd", %error, "scheduled command failed");
        }
    }
    .boxed_local()
}
