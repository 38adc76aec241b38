use crate::protocol::{GetOperationStatusResp, OperationState};
use chrono::{DateTime, Utc};
use std::fmt;

/// Snapshot of an operation's execution state at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    state: Option<OperationState>,
    /// Error message reported by the service alongside the state.
    pub error_message: Option<String>,
    /// SQL state reported by the service alongside the state.
    pub sql_state: Option<String>,
    /// When the snapshot was taken.
    pub at: DateTime<Utc>,
}

impl Status {
    /// Snapshot of `state`, taken now.
    pub fn new(state: Option<OperationState>) -> Self {
        Self {
            state,
            error_message: None,
            sql_state: None,
            at: Utc::now(),
        }
    }

    pub(crate) fn from_response(resp: &GetOperationStatusResp) -> Self {
        Self {
            error_message: resp.error_message.clone(),
            sql_state: resp.sql_state.clone(),
            ..Self::new(resp.operation_state)
        }
    }

    /// Reported state, if the service sent one.
    pub fn state(&self) -> Option<OperationState> {
        self.state
    }

    /// True once the operation finished, failed, or was canceled or closed.
    pub fn is_complete(&self) -> bool {
        self.state.map_or(false, |s| s.is_terminal())
    }

    /// True only if the operation finished.
    pub fn is_success(&self) -> bool {
        self.state == Some(OperationState::Finished)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state {
            Some(state) => write!(f, "{}", state),
            None => f.write_str("unknown"),
        }
    }
}
