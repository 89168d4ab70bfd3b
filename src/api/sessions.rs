use crate::error::GlueError;
use crate::models::{CreateSessionRequest, GlueSession};

pub trait SessionService {
    /// AWSGlue.CreateSession
    async fn create_session(&self, request: &CreateSessionRequest)
        -> Result<GlueSession, GlueError>;

    /// AWSGlue.GetSession
    async fn get_session(&self, session_id: &str) -> Result<GlueSession, GlueError>;

    /// AWSGlue.StopSession
    async fn stop_session(&self, session_id: &str) -> Result<(), GlueError>;

    /// AWSGlue.DeleteSession
    async fn delete_session(&self, session_id: &str) -> Result<(), GlueError>;
}
