use crate::action::Action;
use crate::cmd::Cmd;
use crate::error::CmdError;
use crate::interpreter::{execute_cmd, CmdFuture, Context, Dispatcher};
use crate::simulate::{simulate, Simulated, Simulation};
use futures::FutureExt;
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

pub(crate) type TaggerFn<B, A> = Rc<dyn Fn(&[Value], B) -> A>;

/// Object-safe view of a MAP command with its nested action type erased.
pub(crate) trait Tagged<S, A> {
    fn execute(&self, ctx: &Context<S, A>) -> Result<Option<CmdFuture<A>>, CmdError>;
    fn simulate(&self, simulation: Option<&Simulation>) -> Simulated<A>;
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

pub(crate) struct Tagger<S, B, A> {
    pub(crate) nested: Cmd<S, B>,
    pub(crate) tagger: TaggerFn<B, A>,
    pub(crate) args: Rc<Vec<Value>>,
}

impl<S, B, A> Tagger<S, B, A> {
    fn tag(&self) -> impl Fn(B) -> A + 'static
    where
        B: 'static,
        A: 'static,
    {
        let tagger = self.tagger.clone();
        let args = self.args.clone();
        move |action| tagger(&args, action)
    }
}

impl<S, B, A> Tagged<S, A> for Tagger<S, B, A>
where
    S: Clone + 'static,
    B: Action,
    A: Action,
{
    fn execute(&self, ctx: &Context<S, A>) -> Result<Option<CmdFuture<A>>, CmdError> {
        // Actions the nested command dispatches on its own get tagged as well.
        let parent = ctx.dispatch.clone();
        let tag = self.tag();
        let dispatch: Dispatcher<B> = Rc::new(move |action| parent(tag(action)));
        let nested_ctx = ctx.with_dispatch(dispatch);

        let Some(pending) = execute_cmd(self.nested.clone(), &nested_ctx)? else {
            return Ok(None);
        };
        let tag = self.tag();
        Ok(Some(
            async move {
                let actions = pending.await?;
                Ok(actions.into_iter().map(tag).collect())
            }
            .boxed_local(),
        ))
    }

    fn simulate(&self, simulation: Option<&Simulation>) -> Simulated<A> {
        simulate(&self.nested, simulation).map(self.tag())
    }

    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cmd::Map")
            .field("nested", &self.nested)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}
