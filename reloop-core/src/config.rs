use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Options threaded into every interpreter call.
///
/// Field names on the wire keep the upper-case spelling used by existing
/// configuration files.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopConfig {
    /// Skip the error log that normally accompanies a RUN failure handled by a
    /// fail action creator. The fail action is produced either way.
    #[serde(rename = "DONT_LOG_ERRORS_ON_HANDLED_FAILURES", default)]
    pub dont_log_errors_on_handled_failures: bool,
}

impl LoopConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn quiet_handled_failures(mut self) -> Self {
        self.dont_log_errors_on_handled_failures = true;
        self
    }
}
