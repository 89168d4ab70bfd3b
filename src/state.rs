use std::fmt;

use serde::{Deserialize, Serialize};

/// Remote statement states, mirrored by the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatementState {
    Waiting,
    Running,
    Available,
    Cancelling,
    Cancelled,
    Error,
}

impl StatementState {
    /// AVAILABLE, ERROR and CANCELLED never transition again.
    pub fn is_terminal(self) -> bool {
        match self {
            StatementState::Available | StatementState::Error | StatementState::Cancelled => true,
            StatementState::Waiting | StatementState::Running | StatementState::Cancelling => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatementState::Waiting => "WAITING",
            StatementState::Running => "RUNNING",
            StatementState::Available => "AVAILABLE",
            StatementState::Cancelling => "CANCELLING",
            StatementState::Cancelled => "CANCELLED",
            StatementState::Error => "ERROR",
        }
    }
}

impl fmt::Display for StatementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote session states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Provisioning,
    Ready,
    Failed,
    Timeout,
    Stopping,
    Stopped,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Provisioning => "PROVISIONING",
            SessionStatus::Ready => "READY",
            SessionStatus::Failed => "FAILED",
            SessionStatus::Timeout => "TIMEOUT",
            SessionStatus::Stopping => "STOPPING",
            SessionStatus::Stopped => "STOPPED",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
