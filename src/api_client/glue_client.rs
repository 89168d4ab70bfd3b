use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::sessions::SessionService;
use crate::api::statements::StatementService;
use crate::config::GlueConfig;
use crate::error::GlueError;
use crate::models::{
    CreateSessionRequest, GetStatementResponse, GlueSession, GlueStatement, RunStatementRequest,
    RunStatementResponse, ServiceErrorBody, SessionKey, SessionResponse, StatementKey,
};

const CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const REQUEST_ORIGIN: &str = "dbt-glue";

/// Low-level Glue client that speaks the JSON 1.1 protocol of the interactive sessions API.
#[derive(Debug, Clone)]
pub struct GlueClient {
    base_url: String,
    token: Option<String>,
    http_client: Client,
}

impl GlueClient {
    /// Creates a new client for the given endpoint.
    ///
    /// Example `base_url`: `https://glue.us-east-1.amazonaws.com`
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(str::to_string),
            http_client: Client::new(),
        }
    }

    pub fn from_config(config: &GlueConfig) -> Self {
        Self::new(&config.endpoint(), config.token.as_deref())
    }

    /// POST / with `X-Amz-Target: AWSGlue.<operation>`
    async fn call<Req, Resp>(&self, operation: &str, request: &Req) -> Result<Resp, GlueError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let mut builder = self
            .http_client
            .post(format!("{}/", self.base_url))
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .header("X-Amz-Target", format!("AWSGlue.{operation}"))
            .json(request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let resp = builder.send().await?;
        self.handle_response(operation, resp).await
    }

    /// Helper to turn a raw response into the expected body or a typed error.
    async fn handle_response<Resp: DeserializeOwned>(
        &self,
        operation: &str,
        resp: reqwest::Response,
    ) -> Result<Resp, GlueError> {
        let status = resp.status();
        let text_body = resp.text().await?;
        tracing::trace!(operation, status = status.as_u16(), body = %text_body, "Glue response");

        if !status.is_success() {
            let body: ServiceErrorBody = serde_json::from_str(&text_body).unwrap_or_default();
            let error_type = body
                .error_type
                .map(|t| t.rsplit('#').next().unwrap_or_default().to_string())
                .unwrap_or_default();
            let message = body.message.unwrap_or(text_body);
            if error_type == "EntityNotFoundException" || status == reqwest::StatusCode::NOT_FOUND
            {
                return Err(GlueError::NotFound(message));
            }
            return Err(GlueError::Api {
                status: status.as_u16(),
                error_type,
                message,
            });
        }

        // Stop/Delete/Cancel answer with an empty object or nothing at all
        let body = if text_body.trim().is_empty() {
            "{}"
        } else {
            text_body.as_str()
        };
        Ok(serde_json::from_str(body)?)
    }
}

impl StatementService for GlueClient {
    async fn run_statement(&self, session_id: &str, code: &str) -> Result<i64, GlueError> {
        let request = RunStatementRequest {
            session_id: session_id.to_string(),
            code: code.to_string(),
            request_origin: Some(REQUEST_ORIGIN.to_string()),
        };
        let resp: RunStatementResponse = self.call("RunStatement", &request).await?;
        resp.id.ok_or_else(|| {
            GlueError::Other("No statement ID returned by RunStatement.".to_string())
        })
    }

    async fn get_statement(
        &self,
        session_id: &str,
        statement_id: i64,
    ) -> Result<GlueStatement, GlueError> {
        let request = StatementKey {
            session_id: session_id.to_string(),
            id: statement_id,
        };
        let resp: GetStatementResponse = self.call("GetStatement", &request).await?;
        resp.statement.ok_or_else(|| {
            GlueError::Other(format!("No statement in GetStatement response for {statement_id}"))
        })
    }

    async fn cancel_statement(
        &self,
        session_id: &str,
        statement_id: i64,
    ) -> Result<(), GlueError> {
        let request = StatementKey {
            session_id: session_id.to_string(),
            id: statement_id,
        };
        let _: serde_json::Value = self.call("CancelStatement", &request).await?;
        Ok(())
    }
}

impl SessionService for GlueClient {
    async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<GlueSession, GlueError> {
        let resp: SessionResponse = self.call("CreateSession", request).await?;
        resp.session.ok_or_else(|| {
            GlueError::Other(format!("No session in CreateSession response for {}", request.id))
        })
    }

    async fn get_session(&self, session_id: &str) -> Result<GlueSession, GlueError> {
        let request = SessionKey {
            id: session_id.to_string(),
        };
        let resp: SessionResponse = self.call("GetSession", &request).await?;
        resp.session.ok_or_else(|| GlueError::NotFound(session_id.to_string()))
    }

    async fn stop_session(&self, session_id: &str) -> Result<(), GlueError> {
        let request = SessionKey {
            id: session_id.to_string(),
        };
        let _: serde_json::Value = self.call("StopSession", &request).await?;
        Ok(())
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), GlueError> {
        let request = SessionKey {
            id: session_id.to_string(),
        };
        let _: serde_json::Value = self.call("DeleteSession", &request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash() {
        let client = GlueClient::new("http://localhost:4566/", None);
        assert_eq!(client.base_url, "http://localhost:4566");
    }

    #[test]
    fn builds_from_config() {
        let config = GlueConfig {
            region: "ap-southeast-2".into(),
            token: Some("secret".into()),
            ..Default::default()
        };
        let client = GlueClient::from_config(&config);
        assert_eq!(client.base_url, "https://glue.ap-southeast-2.amazonaws.com");
        assert_eq!(client.token.as_deref(), Some("secret"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transient() {
        let client = GlueClient::new("http://127.0.0.1:1", None);
        let err = client.get_session("missing").await.unwrap_err();
        assert!(matches!(err, GlueError::Http(_)), "{err:?}");
        assert!(err.is_transient());
    }
}
