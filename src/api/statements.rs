use crate::error::GlueError;
use crate::models::GlueStatement;

pub trait StatementService {
    /// AWSGlue.RunStatement
    /// Submit code to a session, returning the statement id assigned by the service.
    async fn run_statement(&self, session_id: &str, code: &str) -> Result<i64, GlueError>;

    /// AWSGlue.GetStatement
    /// Current state of a statement, plus its output once it has run.
    async fn get_statement(
        &self,
        session_id: &str,
        statement_id: i64,
    ) -> Result<GlueStatement, GlueError>;

    /// AWSGlue.CancelStatement
    /// Request that a running statement be cancelled.
    async fn cancel_statement(&self, session_id: &str, statement_id: i64)
        -> Result<(), GlueError>;
}
