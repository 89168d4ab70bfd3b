use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::error::GlueError;

/// Connection settings for a Glue interactive session.
///
/// Deserializable from whatever profile format the host tool uses; every field
/// except `role_arn` has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GlueConfig {
    pub region: String,
    /// Defaults to `https://glue.<region>.amazonaws.com`
    pub endpoint: Option<String>,
    /// Bearer token attached to every request, for endpoints behind a signing gateway.
    pub token: Option<String>,
    pub role_arn: String,
    /// Attach to this session instead of creating one.
    pub session_id: Option<String>,
    pub session_prefix: String,
    pub glue_version: String,
    pub worker_type: String,
    pub workers: u32,
    /// Minutes
    pub idle_timeout: u32,
    pub session_provisioning_timeout_secs: u64,
    pub query_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub default_arguments: HashMap<String, String>,
}

impl Default for GlueConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            endpoint: None,
            token: None,
            role_arn: String::new(),
            session_id: None,
            session_prefix: "dbt-glue".to_string(),
            glue_version: "4.0".to_string(),
            worker_type: "G.1X".to_string(),
            workers: 2,
            idle_timeout: 10,
            session_provisioning_timeout_secs: 120,
            query_timeout_secs: 300,
            poll_interval_ms: 1000,
            default_arguments: HashMap::new(),
        }
    }
}

impl GlueConfig {
    pub fn endpoint(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://glue.{}.amazonaws.com", self.region),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn session_provisioning_timeout(&self) -> Duration {
        Duration::from_secs(self.session_provisioning_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), GlueError> {
        if self.role_arn.is_empty() && self.session_id.is_none() {
            return Err(GlueError::Config(
                "role_arn is required unless session_id is set".into(),
            ));
        }
        if self.region.is_empty() {
            return Err(GlueError::Config("region must not be empty".into()));
        }
        if self.workers < 2 {
            return Err(GlueError::Config(format!(
                "workers must be at least 2, got {}",
                self.workers
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(GlueError::Config("poll_interval_ms must be positive".into()));
        }
        if self.query_timeout_secs == 0 || self.session_provisioning_timeout_secs == 0 {
            return Err(GlueError::Config("timeouts must be positive".into()));
        }
        Ok(())
    }
}
