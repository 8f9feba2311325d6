//! Builder argument checks.
//!
//! Builders run these in debug builds and panic on failure; release builds
//! skip them. The functions are public so callers can check arguments without
//! panicking.

use crate::action::Action;
use crate::error::BuildError;
use std::time::Duration;

pub(crate) const PRODUCTION: bool = !cfg!(debug_assertions);

/// Smallest period a repeating schedule runs at.
pub const MIN_REPEAT_DELAY: Duration = Duration::from_millis(1);

pub fn action<A: Action>(action: &A) -> Result<(), BuildError> {
    if action.action_type().is_empty() {
        return Err(BuildError::InvalidArgument {
            builder: "Cmd::action",
            reason: format!("argument must be an action with a non-empty type, got {action:?}"),
        });
    }
    Ok(())
}

/// Period a repeating schedule actually runs at. A zero delay is legal and
/// means "as often as possible".
pub fn repeat_period(delay: Duration) -> Duration {
    delay.max(MIN_REPEAT_DELAY)
}

pub fn test_invariants(builder: &'static str, requested: bool) -> Result<(), BuildError> {
    if requested && PRODUCTION {
        return Err(BuildError::TestInvariantsInProduction { builder });
    }
    Ok(())
}

pub(crate) fn throw_invariant(check: Result<(), BuildError>) {
    if let Err(err) = check {
        panic!("{err}");
    }
}
