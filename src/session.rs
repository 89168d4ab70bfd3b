use std::future::Future;
use std::sync::Arc;

use tokio::time::{timeout_at, Instant};
use uuid::Uuid;

use crate::api::sessions::SessionService;
use crate::api::statements::StatementService;
use crate::config::GlueConfig;
use crate::cursor::Cursor;
use crate::error::GlueError;
use crate::lease::LeaseRegistry;
use crate::models::{CreateSessionRequest, SessionCommand};
use crate::state::SessionStatus;

/// Defines `SqlWrapper2` in the session. It runs a query and prints the rows as
/// the JSON result envelope read back by [`Cursor`].
const BOOTSTRAP_CODE: &str = r#"custom_glue_code_for_dbt_adapter
import json
from pyspark.sql import SparkSession

spark = SparkSession.builder.getOrCreate()

class SqlWrapper2:
    @classmethod
    def execute(cls, sql, output=True):
        df = spark.sql(sql)
        if not output:
            return
        rows = [row.asDict() for row in df.collect()]
        print(json.dumps({
            "type": "results",
            "rowcount": len(rows),
            "results": [{"type": "record", "data": row} for row in rows],
            "description": [
                {"name": f.name, "type": f.dataType.simpleString()} for f in df.schema.fields
            ],
        }, default=str))
"#;

/// A ready Glue interactive session that hands out cursors.
///
/// Only one cursor may execute at a time: every call to [`Session::cursor`]
/// takes the session lease away from the previous cursor. Call
/// [`Session::close`] to release the remote session; it is not released on drop.
#[derive(Debug)]
pub struct Session<C> {
    id: String,
    client: Arc<C>,
    config: GlueConfig,
    leases: Arc<LeaseRegistry>,
    reused: bool,
    closed: bool,
}

impl<C: StatementService + SessionService> Session<C> {
    /// Attach to `config.session_id` when it is usable, otherwise create a new
    /// session, then wait until it is READY and install the result wrapper.
    ///
    /// The provisioning timeout bounds everything up to READY, including a
    /// service call that never answers.
    pub async fn connect(client: Arc<C>, config: GlueConfig) -> Result<Self, GlueError> {
        config.validate()?;
        let started = Instant::now();
        let deadline = started + config.session_provisioning_timeout();

        let reusable = match &config.session_id {
            Some(id) => match within(deadline, started, id, client.get_session(id)).await {
                Ok(session)
                    if matches!(
                        session.status,
                        SessionStatus::Ready | SessionStatus::Provisioning
                    ) =>
                {
                    tracing::info!(session_id = %id, status = %session.status, "Reusing Glue session");
                    Some(id.clone())
                }
                Ok(session) => {
                    tracing::warn!(
                        session_id = %id,
                        status = %session.status,
                        "Configured Glue session is not usable, creating a new one"
                    );
                    None
                }
                Err(GlueError::NotFound(_)) => {
                    tracing::warn!(session_id = %id, "Configured Glue session not found, creating a new one");
                    None
                }
                Err(e) => return Err(e),
            },
            None => None,
        };

        let reused = reusable.is_some();
        let id = match reusable {
            Some(id) => id,
            None => {
                let request = create_request(&config);
                tracing::info!(session_id = %request.id, "Creating Glue session");
                within(deadline, started, &request.id, client.create_session(&request))
                    .await?
                    .id
            }
        };

        let session = Self {
            id,
            client,
            config,
            leases: LeaseRegistry::new(),
            reused,
            closed: false,
        };
        let ready = match session.wait_until_ready(started, deadline).await {
            Ok(()) => session.bootstrap().await,
            Err(e) => Err(e),
        };
        if let Err(e) = ready {
            session.discard().await;
            return Err(e);
        }
        Ok(session)
    }

    /// Best-effort cleanup of a session that never became usable.
    async fn discard(&self) {
        self.leases.expire_all();
        if self.reused {
            return;
        }
        let delete = self.client.delete_session(&self.id);
        match tokio::time::timeout(self.config.poll_interval(), delete).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(session_id = %self.id, error = %e, "Failed to delete unusable Glue session")
            }
            Err(_) => {
                tracing::warn!(session_id = %self.id, "Delete request for unusable Glue session did not complete")
            }
        }
    }

    async fn wait_until_ready(&self, started: Instant, deadline: Instant) -> Result<(), GlueError> {
        loop {
            match timeout_at(deadline, self.client.get_session(&self.id)).await {
                Ok(Ok(session)) => match session.status {
                    SessionStatus::Ready => {
                        tracing::info!(session_id = %self.id, elapsed = ?started.elapsed(), "Glue session ready");
                        return Ok(());
                    }
                    SessionStatus::Provisioning => {
                        tracing::debug!(session_id = %self.id, "Glue session provisioning");
                    }
                    SessionStatus::Failed
                    | SessionStatus::Timeout
                    | SessionStatus::Stopping
                    | SessionStatus::Stopped => {
                        return Err(GlueError::SessionFailed {
                            session_id: self.id.clone(),
                            status: session.status.to_string(),
                            message: session.error_message.unwrap_or_default(),
                        });
                    }
                },
                Ok(Err(e)) if e.is_transient() => {
                    tracing::warn!(session_id = %self.id, error = %e, "Transient error while waiting for session");
                }
                Ok(Err(e)) => return Err(e),
                // deadline hit mid-request, handled below
                Err(_) => {}
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(GlueError::SessionTimeout {
                    session_id: self.id.clone(),
                    elapsed: now - started,
                });
            }
            tokio::time::sleep_until((now + self.config.poll_interval()).min(deadline)).await;
        }
    }

    async fn bootstrap(&self) -> Result<(), GlueError> {
        let mut cursor = self.cursor()?;
        let result = cursor.execute(BOOTSTRAP_CODE, None).await;
        cursor.close()?;
        result.map(|_| ())
    }

    /// Whether the service currently reports the session as READY.
    pub async fn is_ready(&self) -> Result<bool, GlueError> {
        if self.closed {
            return Ok(false);
        }
        Ok(self.client.get_session(&self.id).await?.status == SessionStatus::Ready)
    }

    /// Expire every cursor lease, then stop and delete the remote session unless
    /// it was attached to from configuration. Closing twice does nothing.
    pub async fn close(&mut self) -> Result<(), GlueError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.leases.expire_all();
        if self.reused {
            tracing::info!(session_id = %self.id, "Leaving reused Glue session running");
            return Ok(());
        }
        tracing::info!(session_id = %self.id, "Stopping Glue session");
        if let Err(e) = self.client.stop_session(&self.id).await {
            // a session that already stopped on its own can still be deleted
            tracing::warn!(session_id = %self.id, error = %e, "Failed to stop Glue session");
        }
        tracing::info!(session_id = %self.id, "Deleting Glue session");
        self.client.delete_session(&self.id).await
    }
}

/// Run a provisioning call, failing with [`GlueError::SessionTimeout`] once `deadline` passes.
async fn within<T>(
    deadline: Instant,
    started: Instant,
    session_id: &str,
    call: impl Future<Output = Result<T, GlueError>>,
) -> Result<T, GlueError> {
    match timeout_at(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(GlueError::SessionTimeout {
            session_id: session_id.to_string(),
            elapsed: started.elapsed(),
        }),
    }
}

impl<C> Session<C> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn closed(&self) -> bool {
        self.closed
    }

    /// New cursor holding the session lease.
    pub fn cursor(&self) -> Result<Cursor<C>, GlueError> {
        if self.closed {
            return Err(GlueError::SessionClosed(self.id.clone()));
        }
        Ok(Cursor::new(
            Arc::clone(&self.client),
            self.id.clone(),
            self.leases.acquire(),
            self.config.poll_interval(),
            self.config.query_timeout(),
        ))
    }
}

fn create_request(config: &GlueConfig) -> CreateSessionRequest {
    CreateSessionRequest {
        id: format!("{}-{}", config.session_prefix, Uuid::new_v4()),
        role: config.role_arn.clone(),
        command: SessionCommand::default(),
        idle_timeout: Some(config.idle_timeout),
        default_arguments: config.default_arguments.clone(),
        glue_version: Some(config.glue_version.clone()),
        number_of_workers: Some(config.workers),
        worker_type: Some(config.worker_type.clone()),
        request_origin: Some("dbt-glue".to_string()),
    }
}
