// SPDX-License-Identifier: MIT

//! The studio facade: validated agent graph, shared sessions and one runner
//! per entry point

use crate::adk::agent::{validate_data_flow, AgentEvent};
use crate::adk::error::StudioError;
use crate::adk::model::Model;
use crate::adk::runner::{RunOutput, Runner};
use crate::adk::session::{InMemorySessionService, Session};
use crate::studio::agents::AgentFactory;
use crate::studio::config::StudioConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

/// The initial topic, audience, tone and keywords input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBrief {
    pub topic: String,
    pub target_audience: String,
    pub tone: String,
    pub keywords: String,
}

impl ContentBrief {
    /// The request message handed to the intake step
    pub fn to_query(&self) -> String {
        format!(
            "Create a complete content package for:\n\
             - Topic: {}\n\
             - Target Audience: {}\n\
             - Tone: {}\n\
             - Keywords: {}\n",
            self.topic, self.target_audience, self.tone, self.keywords
        )
    }
}

pub fn analysis_query(text: &str) -> String {
    format!("Can you analyze this text snippet:\n\n{}", text)
}

pub struct Studio {
    config: StudioConfig,
    model_name: String,
    sessions: InMemorySessionService,
    pipeline: Runner,
    analyzer: Runner,
    orchestrator: Runner,
}

impl Studio {
    /// Build every agent and check the data flow of each entry point.
    pub fn new(model: Arc<dyn Model>, config: StudioConfig) -> Result<Self, StudioError> {
        let model_name = model.model_name().to_string();
        let factory = AgentFactory::new(model, config.generation_config());

        let workflow = factory.full_workflow();
        let analyzer = factory.analyzer();
        let orchestrator = factory.orchestrator(workflow.clone(), analyzer.clone());

        for agent in [&workflow, &analyzer, &orchestrator] {
            let available = validate_data_flow(agent.as_ref(), [])?;
            log::debug!("{} data flow ok, writes {:?}", agent.name(), available);
        }

        let sessions = InMemorySessionService::new();
        log::info!(
            "Studio '{}' ready with model {}",
            config.app_name,
            model_name
        );

        Ok(Self {
            pipeline: Runner::new(&config.app_name, workflow, sessions.clone()),
            analyzer: Runner::new(&config.app_name, analyzer, sessions.clone()),
            orchestrator: Runner::new(&config.app_name, orchestrator, sessions.clone()),
            config,
            model_name,
            sessions,
        })
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn sessions(&self) -> &InMemorySessionService {
        &self.sessions
    }

    /// Name of the root pipeline agent
    pub fn agent_name(&self) -> &str {
        self.pipeline.agent().name()
    }

    /// Reuse a known session id, or create a session (under the given id if any)
    pub async fn open_session(&self, session_id: Option<String>) -> Session {
        if let Some(id) = &session_id {
            if let Some(existing) = self.sessions.get_session(id).await {
                log::info!("Reusing session {}", id);
                return existing;
            }
        }
        self.sessions
            .create_session(&self.config.app_name, &self.config.user_id, session_id)
            .await
    }

    /// Run the full pipeline for a brief in an open session
    pub async fn create_content(
        &self,
        session_id: &str,
        brief: &ContentBrief,
        events: Option<mpsc::Sender<AgentEvent>>,
    ) -> Result<RunOutput, StudioError> {
        self.pipeline
            .run(session_id, brief.to_query(), events)
            .await
    }

    /// Run the analyzer over a text snippet in a throwaway session
    pub async fn analyze_text(&self, text: &str) -> Result<String, StudioError> {
        self.run_once(&self.analyzer, analysis_query(text), None)
            .await
    }

    /// Route a free-form request through the orchestrator
    pub async fn chat(
        &self,
        prompt: &str,
        events: Option<mpsc::Sender<AgentEvent>>,
    ) -> Result<String, StudioError> {
        self.run_once(&self.orchestrator, prompt.to_string(), events)
            .await
    }

    /// Run in a fresh session that is removed afterwards, whatever the outcome
    async fn run_once(
        &self,
        runner: &Runner,
        message: String,
        events: Option<mpsc::Sender<AgentEvent>>,
    ) -> Result<String, StudioError> {
        let session = self.open_session(None).await;
        let result = runner.run(&session.id, message, events).await;
        self.sessions.delete_session(&session.id).await;
        Ok(result?.text)
    }
}
