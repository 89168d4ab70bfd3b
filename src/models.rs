use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::state::{SessionStatus, StatementState};

/// Request body for `AWSGlue.RunStatement`
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct RunStatementRequest {
    pub session_id: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_origin: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RunStatementResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

/// Request body for `AWSGlue.GetStatement` and `AWSGlue.CancelStatement`
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct StatementKey {
    pub session_id: String,
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetStatementResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement: Option<GlueStatement>,
}

/// A statement as reported by the service.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct GlueStatement {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub state: StatementState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<StatementOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
}

/// Output of a statement once it has run.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct StatementOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<StatementOutputData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_count: Option<i64>,
    /// "ok" or "error"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traceback: Option<Vec<String>>,
}

impl StatementOutput {
    pub fn is_ok(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("ok"))
    }

    pub fn text_plain(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.text_plain.as_deref())
    }
}

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct StatementOutputData {
    #[serde(rename = "TextPlain", skip_serializing_if = "Option::is_none")]
    pub text_plain: Option<String>,
}

/// Request body for `AWSGlue.CreateSession`
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct CreateSessionRequest {
    pub id: String,
    pub role: String,
    pub command: SessionCommand,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_timeout: Option<u32>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub default_arguments: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glue_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_workers: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_origin: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct SessionCommand {
    pub name: String,
    pub python_version: String,
}

impl Default for SessionCommand {
    fn default() -> Self {
        Self {
            name: "glueetl".to_string(),
            python_version: "3".to_string(),
        }
    }
}

/// Request body for `AWSGlue.GetSession`, `StopSession` and `DeleteSession`
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct SessionKey {
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<GlueSession>,
}

/// A session as reported by the service.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct GlueSession {
    pub id: String,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glue_version: Option<String>,
}

/// Error body returned by the JSON 1.1 protocol on non-2xx responses.
#[derive(Debug, Deserialize, Default)]
pub struct ServiceErrorBody {
    #[serde(rename = "__type", default)]
    pub error_type: Option<String>,
    #[serde(alias = "Message", default)]
    pub message: Option<String>,
}
