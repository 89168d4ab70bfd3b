use std::time::Duration;

use thiserror::Error;

/// Failures reported by the remote service for a submitted statement.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error(
        "Glue returned `{error_name}` for statement {statement_id} for code {code}, {error_value}"
    )]
    Failed {
        statement_id: i64,
        code: String,
        error_name: String,
        error_value: String,
    },

    #[error("statement {statement_id} in session {session_id} was cancelled")]
    Cancelled { session_id: String, statement_id: i64 },
}

/// Every error surfaced by sessions, cursors and the Glue client.
#[derive(Error, Debug)]
pub enum GlueError {
    #[error("CursorClosed")]
    CursorClosed,

    #[error("CursorAlreadyRunning")]
    CursorAlreadyRunning,

    #[error("CursorAlreadyClosed")]
    CursorAlreadyClosed,

    #[error("cursor {cursor_id} no longer holds the session lease")]
    LeaseExpired { cursor_id: String },

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("statement {statement_id} in session {session_id} timed out after {elapsed:?}")]
    StatementTimeout {
        session_id: String,
        statement_id: i64,
        elapsed: Duration,
    },

    #[error("statement submission to session {session_id} timed out after {elapsed:?}")]
    SubmitTimeout { session_id: String, elapsed: Duration },

    #[error("session {session_id} was not ready after {elapsed:?}")]
    SessionTimeout { session_id: String, elapsed: Duration },

    #[error("session {session_id} entered status {status}: {message}")]
    SessionFailed {
        session_id: String,
        status: String,
        message: String,
    },

    #[error("session {0} is closed")]
    SessionClosed(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: HTTP {status} {error_type}: {message}")]
    Api {
        status: u16,
        error_type: String,
        message: String,
    },

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("Unknown error: {0}")]
    Other(String),
}

impl GlueError {
    /// Whether a poll that failed with this error may be retried.
    pub fn is_transient(&self) -> bool {
        match self {
            GlueError::Http(e) => e.is_timeout() || e.is_connect(),
            GlueError::Api {
                status, error_type, ..
            } => {
                *status == 429
                    || *status >= 500
                    || matches!(
                        error_type.as_str(),
                        "ThrottlingException" | "InternalServiceException" | "OperationTimeoutException"
                    )
            }
            _ => false,
        }
    }
}
