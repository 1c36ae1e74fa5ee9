// SPDX-License-Identifier: MIT

//! Agent module - defines agent types for AI workflows
//!
//! This module provides the core Agent trait and implementations:
//! - `LLMAgent` - Standard LLM agent with tool calling
//! - `SequentialAgent`, `LoopAgent`, `ParallelAgent` - workflow composition
//! - `AgentTool` - exposes an agent to another agent as a tool

mod agent_tool;
mod llm;
mod workflow;

pub use agent_tool::AgentTool;
pub use llm::LLMAgent;
pub use workflow::{LoopAgent, ParallelAgent, SequentialAgent};

use crate::adk::context::InvocationContext;
use crate::adk::error::{PipelineError, StudioError};
use crate::adk::state::StateKey;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Progress reported by agents while they run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentEvent {
    Thought {
        author: String,
        text: String,
    },
    ToolCall {
        author: String,
        name: String,
        args: serde_json::Value,
    },
    ToolResult {
        author: String,
        name: String,
        result: serde_json::Value,
    },
    Answer {
        author: String,
        text: String,
    },
    Error {
        author: String,
        message: String,
    },
    Log {
        author: String,
        message: String,
    },
}

impl AgentEvent {
    pub fn author(&self) -> &str {
        match self {
            AgentEvent::Thought { author, .. }
            | AgentEvent::ToolCall { author, .. }
            | AgentEvent::ToolResult { author, .. }
            | AgentEvent::Answer { author, .. }
            | AgentEvent::Error { author, .. }
            | AgentEvent::Log { author, .. } => author,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AgentEvent::Thought { .. } => "thought",
            AgentEvent::ToolCall { .. } => "tool_call",
            AgentEvent::ToolResult { .. } => "tool_result",
            AgentEvent::Answer { .. } => "answer",
            AgentEvent::Error { .. } => "error",
            AgentEvent::Log { .. } => "log",
        }
    }

    /// Short human-readable summary, at most `max_chars` characters plus an ellipsis
    pub fn preview(&self, max_chars: usize) -> String {
        let full = match self {
            AgentEvent::Thought { text, .. } | AgentEvent::Answer { text, .. } => text.clone(),
            AgentEvent::ToolCall { name, args, .. } => format!("{}({})", name, args),
            AgentEvent::ToolResult { name, result, .. } => format!("{} -> {}", name, result),
            AgentEvent::Error { message, .. } | AgentEvent::Log { message, .. } => {
                message.clone()
            }
        };
        truncate_chars(&full, max_chars)
    }
}

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Core agent trait for all agent types
#[async_trait]
pub trait Agent: Send + Sync {
    /// Returns the agent name
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Run the agent against the invocation context
    async fn run(&self, ctx: &mut InvocationContext, input: String)
        -> Result<String, StudioError>;

    /// Verify every key this agent reads is in `available`, then add the
    /// keys it writes.
    fn check_data_flow(&self, _available: &mut BTreeSet<StateKey>) -> Result<(), PipelineError> {
        Ok(())
    }

    /// Every key this agent may write, including keys that already hold a value
    fn writes(&self) -> BTreeSet<StateKey> {
        BTreeSet::new()
    }
}

/// Run the data-flow check over a whole agent tree.
///
/// `seed` holds the keys present before the root agent starts. Returns the
/// keys available after it finishes.
pub fn validate_data_flow(
    agent: &dyn Agent,
    seed: impl IntoIterator<Item = StateKey>,
) -> Result<BTreeSet<StateKey>, PipelineError> {
    let mut available: BTreeSet<StateKey> = seed.into_iter().collect();
    agent.check_data_flow(&mut available)?;
    Ok(available)
}
