use crate::cmd::Cmd;

/// What a reducer returns: the next state, optionally with a command to run
/// once that state is committed.
pub enum Loop<S, A> {
    Model(S),
    WithCmd(S, Cmd<S, A>),
}

impl<S, A> Loop<S, A> {
    pub fn new(model: S, cmd: Cmd<S, A>) -> Self {
        Loop::WithCmd(model, cmd)
    }

    pub fn is_loop(&self) -> bool {
        matches!(self, Loop::WithCmd(..))
    }

    pub fn model(&self) -> &S {
        match self {
            Loop::Model(model) | Loop::WithCmd(model, _) => model,
        }
    }

    /// The paired command; `None` for a bare state.
    pub fn cmd(&self) -> Option<&Cmd<S, A>> {
        match self {
            Loop::Model(_) => None,
            Loop::WithCmd(_, cmd) => Some(cmd),
        }
    }

    /// Normalize into a `(state, cmd)` pair, a bare state getting `Cmd::None`.
    pub fn lift(self) -> (S, Cmd<S, A>) {
        match self {
            Loop::Model(model) => (model, Cmd::None),
            Loop::WithCmd(model, cmd) => (model, cmd),
        }
    }
}

impl<S, A> From<(S, Cmd<S, A>)> for Loop<S, A> {
    fn from((model, cmd): (S, Cmd<S, A>)) -> Self {
        Loop::WithCmd(model, cmd)
    }
}
