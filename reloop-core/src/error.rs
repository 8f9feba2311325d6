use serde_json::Value;

/// Raised by builders when their arguments are malformed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("{builder}: {reason}")]
    InvalidArgument {
        builder: &'static str,
        reason: String,
    },

    /// `test_invariants` only exists for tests; seeing it in a release build is
    /// a configuration defect.
    #[error("{builder}: the test_invariants option was used in a production build, it is only meant for tests")]
    TestInvariantsInProduction { builder: &'static str },
}

/// Failure reported by a RUN function, either returned directly or by its
/// deferred result.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RunError {
    #[error("{0}")]
    Message(String),

    /// Failure carrying an arbitrary payload (simulated failures use this).
    #[error("run failed with {0}")]
    Failed(Value),
}

impl RunError {
    pub fn msg(message: impl Into<String>) -> Self {
        RunError::Message(message.into())
    }
}

impl From<String> for RunError {
    fn from(message: String) -> Self {
        RunError::Message(message)
    }
}

impl From<&str> for RunError {
    fn from(message: &str) -> Self {
        RunError::Message(message.to_string())
    }
}

/// Fatal errors surfaced by the interpreter and the wrapped dispatch.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CmdError {
    /// A RUN failed synchronously and had no fail action creator.
    #[error("unhandled failure in Cmd::run: {0}")]
    UnhandledFailure(#[source] RunError),

    #[error("dispatch called after its store was dropped")]
    StoreClosed,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid loop config: {0}")]
    Parse(#[from] serde_json::Error),
}
