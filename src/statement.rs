use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};

use crate::api::statements::StatementService;
use crate::error::GlueError;
use crate::models::GlueStatement;
use crate::state::StatementState;

/// One submission of code to a session, polled until the service reports a terminal state.
///
/// CANCELLING is not terminal: a statement stuck there ends either as CANCELLED
/// or through the timeout.
#[derive(Debug)]
pub struct Statement<C> {
    client: Arc<C>,
    session_id: String,
    code: String,
    id: Option<i64>,
    state: StatementState,
    poll_interval: Duration,
    timeout: Duration,
}

impl<C> Statement<C> {
    pub fn new(
        client: Arc<C>,
        session_id: String,
        code: String,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            session_id,
            code,
            id: None,
            state: StatementState::Waiting,
            poll_interval,
            timeout,
        }
    }

    /// Id assigned by the service, once submitted.
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Last state observed. WAITING until the first poll, ERROR once execution
    /// failed locally.
    pub fn state(&self) -> StatementState {
        self.state
    }
}

impl<C: StatementService> Statement<C> {
    /// Submit the code, then poll until the statement is AVAILABLE, ERROR or CANCELLED.
    ///
    /// Every service call is bounded by the timeout. Transient failures while
    /// polling are retried until then. When the timeout elapses a cancellation
    /// is requested and [`GlueError::StatementTimeout`] returned.
    pub async fn execute(&mut self) -> Result<GlueStatement, GlueError> {
        let result = self.submit_and_poll().await;
        if result.is_err() {
            self.state = StatementState::Error;
        }
        result
    }

    async fn submit_and_poll(&mut self) -> Result<GlueStatement, GlueError> {
        let started = Instant::now();
        let deadline = started + self.timeout;

        let statement_id =
            match timeout_at(deadline, self.client.run_statement(&self.session_id, &self.code))
                .await
            {
                Ok(submitted) => submitted?,
                Err(_) => {
                    return Err(GlueError::SubmitTimeout {
                        session_id: self.session_id.clone(),
                        elapsed: started.elapsed(),
                    })
                }
            };
        self.id = Some(statement_id);
        tracing::debug!(session_id = %self.session_id, statement_id, "Statement submitted");

        loop {
            let polled = timeout_at(
                deadline,
                self.client.get_statement(&self.session_id, statement_id),
            )
            .await;
            match polled {
                Ok(Ok(statement)) => {
                    self.state = statement.state;
                    if statement.state.is_terminal() {
                        tracing::debug!(
                            session_id = %self.session_id,
                            statement_id,
                            state = %statement.state,
                            "Statement finished"
                        );
                        return Ok(statement);
                    }
                    tracing::trace!(
                        session_id = %self.session_id,
                        statement_id,
                        state = %statement.state,
                        progress = statement.progress,
                        "Statement still running"
                    );
                }
                Ok(Err(e)) if e.is_transient() => {
                    tracing::warn!(
                        session_id = %self.session_id,
                        statement_id,
                        error = %e,
                        "Transient error while polling statement, retrying"
                    );
                }
                Ok(Err(e)) => return Err(e),
                // deadline hit mid-request, handled below
                Err(_) => {}
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(self.timed_out(statement_id, now - started).await);
            }
            tokio::time::sleep_until((now + self.poll_interval).min(deadline)).await;
        }
    }

    async fn timed_out(&self, statement_id: i64, elapsed: Duration) -> GlueError {
        let cancel = self.client.cancel_statement(&self.session_id, statement_id);
        match tokio::time::timeout(self.poll_interval, cancel).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(
                session_id = %self.session_id,
                statement_id,
                error = %e,
                "Failed to cancel timed out statement"
            ),
            Err(_) => tracing::warn!(
                session_id = %self.session_id,
                statement_id,
                "Cancel request for timed out statement did not complete"
            ),
        }
        GlueError::StatementTimeout {
            session_id: self.session_id.clone(),
            statement_id,
            elapsed,
        }
    }
}
