//! In-memory service that replays scripted responses.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::api::sessions::SessionService;
use crate::api::statements::StatementService;
use crate::error::GlueError;
use crate::models::{
    CreateSessionRequest, GlueSession, GlueStatement, StatementOutput, StatementOutputData,
};
use crate::state::{SessionStatus, StatementState};

#[derive(Debug)]
enum Poll {
    State(StatementState, Option<StatementOutput>),
    Error(GlueError),
}

#[derive(Debug)]
struct Inner {
    next_id: i64,
    polls: VecDeque<Poll>,
    idle_state: StatementState,
    submitted: Vec<String>,
    cancelled: Vec<i64>,
    get_calls: usize,
    session_statuses: VecDeque<SessionStatus>,
    created: Vec<CreateSessionRequest>,
    deleted: Vec<String>,
    stopped: Vec<String>,
    hang_submit: bool,
    hang_polls: bool,
}

#[derive(Debug)]
pub(crate) struct ScriptedService {
    inner: Mutex<Inner>,
}

fn ok_output(text: Option<&str>) -> StatementOutput {
    StatementOutput {
        data: Some(StatementOutputData {
            text_plain: text.map(str::to_string),
        }),
        status: Some("ok".to_string()),
        ..Default::default()
    }
}

impl ScriptedService {
    pub(crate) fn new() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        Self {
            inner: Mutex::new(Inner {
                next_id: 0,
                polls: VecDeque::new(),
                idle_state: StatementState::Available,
                submitted: Vec::new(),
                cancelled: Vec::new(),
                get_calls: 0,
                session_statuses: VecDeque::new(),
                created: Vec::new(),
                deleted: Vec::new(),
                stopped: Vec::new(),
                hang_submit: false,
                hang_polls: false,
            }),
        }
    }

    fn inner(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    pub(crate) fn push_states(&self, states: &[StatementState]) {
        let mut inner = self.inner();
        for state in states {
            inner.polls.push_back(Poll::State(*state, None));
        }
    }

    pub(crate) fn push_available(&self, text: &str) {
        self.push_output(StatementState::Available, ok_output(Some(text)));
    }

    pub(crate) fn push_failed(&self, error_name: &str, error_value: &str) {
        self.push_output(
            StatementState::Available,
            StatementOutput {
                status: Some("error".to_string()),
                error_name: Some(error_name.to_string()),
                error_value: Some(error_value.to_string()),
                ..Default::default()
            },
        );
    }

    pub(crate) fn push_output(&self, state: StatementState, output: StatementOutput) {
        self.inner().polls.push_back(Poll::State(state, Some(output)));
    }

    pub(crate) fn push_error(&self, error: GlueError) {
        self.inner().polls.push_back(Poll::Error(error));
    }

    /// State reported once the script is exhausted.
    pub(crate) fn set_idle_state(&self, state: StatementState) {
        self.inner().idle_state = state;
    }

    pub(crate) fn push_session_statuses(&self, statuses: &[SessionStatus]) {
        self.inner().session_statuses.extend(statuses.iter().copied());
    }

    /// `run_statement` never completes.
    pub(crate) fn hang_submit(&self) {
        self.inner().hang_submit = true;
    }

    /// `get_statement` and `get_session` never complete.
    pub(crate) fn hang_polls(&self) {
        self.inner().hang_polls = true;
    }

    pub(crate) fn submitted(&self) -> Vec<String> {
        self.inner().submitted.clone()
    }

    pub(crate) fn cancelled(&self) -> Vec<i64> {
        self.inner().cancelled.clone()
    }

    pub(crate) fn get_calls(&self) -> usize {
        self.inner().get_calls
    }

    pub(crate) fn created(&self) -> Vec<CreateSessionRequest> {
        self.inner().created.clone()
    }

    pub(crate) fn deleted(&self) -> Vec<String> {
        self.inner().deleted.clone()
    }

    pub(crate) fn stopped(&self) -> Vec<String> {
        self.inner().stopped.clone()
    }
}

impl StatementService for ScriptedService {
    async fn run_statement(&self, _session_id: &str, code: &str) -> Result<i64, GlueError> {
        if self.inner().hang_submit {
            return std::future::pending().await;
        }
        let mut inner = self.inner();
        inner.next_id += 1;
        inner.submitted.push(code.to_string());
        Ok(inner.next_id)
    }

    async fn get_statement(
        &self,
        _session_id: &str,
        statement_id: i64,
    ) -> Result<GlueStatement, GlueError> {
        if self.inner().hang_polls {
            return std::future::pending().await;
        }
        let mut inner = self.inner();
        inner.get_calls += 1;
        let (state, output) = match inner.polls.pop_front() {
            Some(Poll::State(state, output)) => (state, output),
            Some(Poll::Error(e)) => return Err(e),
            None => {
                let state = inner.idle_state;
                let output = state.is_terminal().then(|| ok_output(None));
                (state, output)
            }
        };
        Ok(GlueStatement {
            id: statement_id,
            code: inner.submitted.last().cloned(),
            state,
            output,
            progress: None,
        })
    }

    async fn cancel_statement(
        &self,
        _session_id: &str,
        statement_id: i64,
    ) -> Result<(), GlueError> {
        self.inner().cancelled.push(statement_id);
        Ok(())
    }
}

impl SessionService for ScriptedService {
    async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<GlueSession, GlueError> {
        self.inner().created.push(request.clone());
        Ok(GlueSession {
            id: request.id.clone(),
            status: SessionStatus::Provisioning,
            error_message: None,
            glue_version: request.glue_version.clone(),
        })
    }

    async fn get_session(&self, session_id: &str) -> Result<GlueSession, GlueError> {
        if self.inner().hang_polls {
            return std::future::pending().await;
        }
        let mut inner = self.inner();
        if inner.deleted.iter().any(|id| id == session_id) {
            return Err(GlueError::NotFound(session_id.to_string()));
        }
        let status = inner
            .session_statuses
            .pop_front()
            .unwrap_or(SessionStatus::Ready);
        Ok(GlueSession {
            id: session_id.to_string(),
            status,
            error_message: (status == SessionStatus::Failed).then(|| "worker crashed".to_string()),
            glue_version: None,
        })
    }

    async fn stop_session(&self, session_id: &str) -> Result<(), GlueError> {
        self.inner().stopped.push(session_id.to_string());
        Ok(())
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), GlueError> {
        self.inner().deleted.push(session_id.to_string());
        Ok(())
    }
}
