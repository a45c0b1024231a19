use std::fmt;

/// Abort signal sent when the daemon should stop.
/// Observed at every sleep boundary of the scheduler (see [`crate::scheduler::Clock`]).
#[derive(Debug, Clone, PartialEq)]
pub struct AbortSignal {
    pub reason: String,
}

impl AbortSignal {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for AbortSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}
