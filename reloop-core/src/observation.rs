use crate::cmd::CmdKind;
use std::time::SystemTime;

/// Observation variants emitted by a loop store
///
/// Carries the action type directly so observers can pattern-match without
/// stringification. No trait bounds are imposed here; helpers add whatever
/// bounds they need.
pub enum Observation<A> {
    Dispatch { ts: SystemTime, data: A },
    Effect { ts: SystemTime, data: CmdKind },
}
