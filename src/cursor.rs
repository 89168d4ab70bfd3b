use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use uuid::Uuid;

use crate::api::statements::StatementService;
use crate::error::{DatabaseError, GlueError};
use crate::lease::Lease;
use crate::result::{decode_envelope, ResultEnvelope, Row};
use crate::state::StatementState;
use crate::statement::Statement;

/// Code starting with this marker is passed to the session as-is instead of
/// being wrapped as a SQL query.
pub const CUSTOM_CODE_MARKER: &str = "custom_glue_code_for_dbt_adapter";

/// Outcome of a statement, in the shape the host tool reports to its users.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterResponse {
    pub message: String,
    pub state: StatementState,
    pub rows_affected: Option<u64>,
}

/// Strip the custom code marker, or wrap plain SQL in `SqlWrapper2.execute`.
pub fn normalize_code(code: &str) -> String {
    let code = code.trim_start();
    match code.strip_prefix(CUSTOM_CODE_MARKER) {
        Some(rest) => rest.trim().to_string(),
        None => format!("SqlWrapper2.execute(\"\"\"{}\"\"\")", code.trim()),
    }
}

/// Executes statements on a session and reads back their results.
///
/// A cursor runs one statement at a time. Rows of the last successful
/// statement can be read with [`Cursor::fetchone`], [`Cursor::fetchall`] or by
/// iterating the cursor. Once closed, every operation fails.
#[derive(Debug)]
pub struct Cursor<C> {
    id: String,
    client: Arc<C>,
    session_id: String,
    lease: Lease,
    poll_interval: Duration,
    query_timeout: Duration,
    statement: Option<Statement<C>>,
    response: Option<ResultEnvelope>,
    offset: Option<usize>,
    closed: bool,
}

impl<C> Cursor<C> {
    pub(crate) fn new(
        client: Arc<C>,
        session_id: String,
        lease: Lease,
        poll_interval: Duration,
        query_timeout: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            client,
            session_id,
            lease,
            poll_interval,
            query_timeout,
            statement: None,
            response: None,
            offset: None,
            closed: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// State of the last statement, `None` before the first execute.
    pub fn state(&self) -> Option<StatementState> {
        self.statement.as_ref().map(Statement::state)
    }

    pub fn statement_id(&self) -> Option<i64> {
        self.statement.as_ref().and_then(Statement::id)
    }

    /// Code as it was submitted, after normalization.
    pub fn code(&self) -> Option<&str> {
        self.statement.as_ref().map(Statement::code)
    }

    pub fn closed(&self) -> bool {
        self.closed
    }

    pub fn rowcount(&self) -> Option<u64> {
        self.response.as_ref().and_then(|r| r.rowcount)
    }

    /// Next row of the result, or `None` once every row has been read.
    pub fn fetchone(&mut self) -> Result<Option<Row>, GlueError> {
        if self.closed {
            return Err(GlueError::CursorClosed);
        }
        let Some(response) = &self.response else {
            return Ok(None);
        };
        let offset = self.offset.get_or_insert(0);
        match response.row(*offset) {
            Some(row) => {
                *offset += 1;
                Ok(Some(row))
            }
            None => Ok(None),
        }
    }

    /// Every row of the result. Does not move the [`Cursor::fetchone`] position.
    pub fn fetchall(&self) -> Result<Option<Vec<Row>>, GlueError> {
        if self.closed {
            return Err(GlueError::CursorClosed);
        }
        Ok(self.response.as_ref().map(ResultEnvelope::rows))
    }

    pub fn columns(&self) -> Result<Option<Vec<String>>, GlueError> {
        if self.closed {
            return Err(GlueError::CursorClosed);
        }
        Ok(self.response.as_ref().map(ResultEnvelope::columns))
    }

    /// `(name, type)` of every column.
    pub fn description(&self) -> Result<Option<Vec<(String, String)>>, GlueError> {
        if self.closed {
            return Err(GlueError::CursorClosed);
        }
        Ok(self.response.as_ref().map(ResultEnvelope::description))
    }

    /// Close the cursor and give back its session lease. Closing twice is an error.
    pub fn close(&mut self) -> Result<(), GlueError> {
        if self.closed {
            return Err(GlueError::CursorAlreadyClosed);
        }
        self.closed = true;
        self.lease.release();
        tracing::debug!(cursor_id = %self.id, "Cursor closed");
        Ok(())
    }

    fn adapter_response(&self, state: StatementState) -> AdapterResponse {
        AdapterResponse {
            message: state.to_string(),
            state,
            rows_affected: self.rowcount(),
        }
    }
}

impl<C: StatementService> Cursor<C> {
    /// Run `code` on the session and wait for it to finish.
    ///
    /// Bindings are accepted for interface compatibility only; the session has
    /// no notion of bound parameters.
    pub async fn execute(
        &mut self,
        code: &str,
        bindings: Option<&[Value]>,
    ) -> Result<AdapterResponse, GlueError> {
        if self.closed {
            return Err(GlueError::CursorClosed);
        }
        if self.state().is_some_and(|s| !s.is_terminal()) {
            return Err(GlueError::CursorAlreadyRunning);
        }
        if !self.lease.is_valid() {
            return Err(GlueError::LeaseExpired {
                cursor_id: self.id.clone(),
            });
        }
        if let Some(bindings) = bindings.filter(|b| !b.is_empty()) {
            tracing::warn!(
                cursor_id = %self.id,
                count = bindings.len(),
                "Glue sessions do not support bindings, ignoring them"
            );
        }

        self.offset = None;
        self.response = None;
        let statement = self.statement.insert(Statement::new(
            Arc::clone(&self.client),
            self.session_id.clone(),
            normalize_code(code),
            self.poll_interval,
            self.query_timeout,
        ));
        let record = statement.execute().await?;
        let statement_id = record.id;
        let code = statement.code().to_string();

        match record.state {
            StatementState::Available => {
                let output = record.output.unwrap_or_default();
                if !output.is_ok() {
                    return Err(DatabaseError::Failed {
                        statement_id,
                        code,
                        error_name: output.error_name.unwrap_or_default(),
                        error_value: output.error_value.unwrap_or_default(),
                    }
                    .into());
                }
                self.response = output
                    .text_plain()
                    .filter(|text| !text.trim().is_empty())
                    .and_then(|text| self.decode(text));
            }
            StatementState::Error => {
                let output = record.output.unwrap_or_default();
                return Err(DatabaseError::Failed {
                    statement_id,
                    code,
                    error_name: output.error_name.unwrap_or_default(),
                    error_value: output.error_value.unwrap_or_default(),
                }
                .into());
            }
            StatementState::Cancelled => {
                return Err(DatabaseError::Cancelled {
                    session_id: self.session_id.clone(),
                    statement_id,
                }
                .into());
            }
            // Statement::execute only returns terminal states
            StatementState::Waiting | StatementState::Running | StatementState::Cancelling => {
                return Err(GlueError::Other(format!(
                    "statement {statement_id} returned in non-terminal state {}",
                    record.state
                )));
            }
        }

        tracing::debug!(
            cursor_id = %self.id,
            statement_id,
            rowcount = self.rowcount(),
            "Statement available"
        );
        Ok(self.adapter_response(StatementState::Available))
    }

    /// Malformed output is logged and treated as no result.
    fn decode(&self, text: &str) -> Option<ResultEnvelope> {
        match decode_envelope(text) {
            Ok(envelope) => Some(envelope),
            Err(e) => {
                tracing::warn!(
                    cursor_id = %self.id,
                    statement_id = self.statement_id(),
                    error = %e,
                    "Could not decode statement output"
                );
                None
            }
        }
    }

    /// Current remote state of the last submitted statement.
    pub async fn get_response(&self) -> Result<Option<AdapterResponse>, GlueError> {
        if self.closed {
            return Err(GlueError::CursorClosed);
        }
        let Some(statement_id) = self.statement_id() else {
            return Ok(None);
        };
        let statement = self
            .client
            .get_statement(&self.session_id, statement_id)
            .await?;
        Ok(Some(self.adapter_response(statement.state)))
    }
}

impl<C> Iterator for Cursor<C> {
    type Item = Result<Row, GlueError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.fetchone().transpose()
    }
}
