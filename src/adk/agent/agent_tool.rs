// SPDX-License-Identifier: MIT

//! Agent-as-tool adapter, letting a coordinating agent delegate to others

use super::Agent;
use crate::adk::context::InvocationContext;
use crate::adk::error::StudioError;
use crate::adk::state::StateKey;
use crate::adk::tool::{schema_for, Tool};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize, JsonSchema)]
struct AgentToolArgs {
    /// The request to hand to the agent
    request: String,
}

static AGENT_TOOL_SCHEMA: Lazy<Value> = Lazy::new(schema_for::<AgentToolArgs>);

/// Wraps an [`Agent`] so a model can call it like any other tool.
///
/// The wrapped agent runs against the caller's context, so state it writes
/// stays visible to the caller.
pub struct AgentTool {
    agent: Arc<dyn Agent>,
    writes: Vec<StateKey>,
}

impl AgentTool {
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        let writes = agent.writes().into_iter().collect();
        Self { agent, writes }
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn name(&self) -> &str {
        self.agent.name()
    }

    fn description(&self) -> &str {
        self.agent.description()
    }

    fn schema(&self) -> &Value {
        &AGENT_TOOL_SCHEMA
    }

    fn writes(&self) -> &[StateKey] {
        &self.writes
    }

    async fn execute(
        &self,
        ctx: &mut InvocationContext,
        input: Value,
    ) -> Result<Value, StudioError> {
        let args: AgentToolArgs =
            serde_json::from_value(input).map_err(|e| StudioError::invalid_args(self.name(), e))?;

        log::info!("Delegating to agent {}", self.agent.name());
        let result = self.agent.run(ctx, args.request).await?;
        Ok(json!({ "result": result }))
    }
}
