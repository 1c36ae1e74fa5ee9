// SPDX-License-Identifier: MIT

//! Runner - binds a root agent to the session service

use crate::adk::agent::{Agent, AgentEvent};
use crate::adk::context::InvocationContext;
use crate::adk::error::StudioError;
use crate::adk::session::InMemorySessionService;
use crate::adk::state::SessionState;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Final answer of a run together with the session state it left behind
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub text: String,
    pub state: SessionState,
}

pub struct Runner {
    app_name: String,
    agent: Arc<dyn Agent>,
    sessions: InMemorySessionService,
}

impl Runner {
    pub fn new(
        app_name: impl Into<String>,
        agent: Arc<dyn Agent>,
        sessions: InMemorySessionService,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            agent,
            sessions,
        }
    }

    pub fn agent(&self) -> &Arc<dyn Agent> {
        &self.agent
    }

    /// Run the root agent against an existing session.
    ///
    /// State written before a failure is still saved back to the session.
    pub async fn run(
        &self,
        session_id: &str,
        message: impl Into<String>,
        events: Option<mpsc::Sender<AgentEvent>>,
    ) -> Result<RunOutput, StudioError> {
        let session = self
            .sessions
            .get_session(session_id)
            .await
            .ok_or_else(|| StudioError::SessionNotFound(session_id.to_string()))?;

        let mut ctx = InvocationContext::new(session.id, session.state);
        if let Some(tx) = events {
            ctx = ctx.with_events(tx);
        }

        log::info!(
            "[{}] running {} for session {}",
            self.app_name,
            self.agent.name(),
            session_id
        );
        let result = self.agent.run(&mut ctx, message.into()).await;

        self.sessions
            .update_state(session_id, ctx.state.clone())
            .await?;

        match result {
            Ok(text) => Ok(RunOutput {
                text,
                state: ctx.state,
            }),
            Err(e) => {
                log::error!("[{}] session {} failed: {}", self.app_name, session_id, e);
                Err(e)
            }
        }
    }
}
