use std::fmt;

use super::LogInfo;
use crate::humanize::{ByteSize, ParseError};

/// Predicate deciding whether an inspected log is due for rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationRule {
    /// Rotate on every run.
    Always,
    /// Rotate once the file has reached the threshold.
    Size(ByteSize),
    /// Cron-style schedule. Evaluation is not implemented, so this never fires.
    Schedule(String),
}

impl RotationRule {
    /// Pick the rule for a project.
    ///
    /// A non-empty schedule wins over a size; a size must parse; with neither
    /// the job rotates on every run.
    pub fn from_settings(schedule: &str, size: &str) -> Result<Self, ParseError> {
        if !schedule.is_empty() {
            return Ok(RotationRule::Schedule(schedule.to_string()));
        }
        if !size.is_empty() {
            return size.parse::<ByteSize>().map(RotationRule::Size);
        }
        Ok(RotationRule::Always)
    }

    pub fn evaluate(&self, info: &LogInfo) -> bool {
        match self {
            RotationRule::Always => true,
            RotationRule::Size(threshold) => info.size_bytes >= threshold.as_u64(),
            RotationRule::Schedule(_) => false,
        }
    }
}

impl fmt::Display for RotationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationRule::Always => f.write_str("always"),
            RotationRule::Size(threshold) => write!(f, "size >= {threshold}"),
            RotationRule::Schedule(expr) => write!(f, "schedule '{expr}' (not evaluated)"),
        }
    }
}
