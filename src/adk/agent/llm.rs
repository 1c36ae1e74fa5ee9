// SPDX-License-Identifier: MIT

//! LLM Agent - Standard LLM agent with tool calling
//!
//! This agent renders its instruction from session state, sends it to an LLM
//! and handles tool calls in a loop until a text response is received.

use super::{truncate_chars, Agent, AgentEvent};
use crate::adk::context::{InvocationContext, LoopControl};
use crate::adk::error::{PipelineError, StudioError};
use crate::adk::instruction::Instruction;
use crate::adk::model::{Content, GenerationConfig, Model, Part};
use crate::adk::state::StateKey;
use crate::adk::tool::Tool;
use async_trait::async_trait;
use serde_json::json;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Upper bound on model round-trips within a single run
pub const MAX_TURNS: u32 = 10;

/// Standard LLM agent with tool calling support
pub struct LLMAgent {
    pub name: String,
    pub description: String,
    pub instruction: Instruction,
    pub model: Arc<dyn Model>,
    pub tools: Vec<Arc<dyn Tool>>,
    /// Session key that receives the final text answer
    pub output_key: Option<StateKey>,
    pub config: Option<GenerationConfig>,
    /// Leave `output_key` untouched when this agent stopped the enclosing loop
    pub keep_output_on_stop: bool,
    /// HashMap for O(1) tool lookups
    tool_map: HashMap<String, usize>,
}

impl LLMAgent {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        instruction: impl Into<Instruction>,
        model: Arc<dyn Model>,
        tools: Vec<Arc<dyn Tool>>,
    ) -> Self {
        // Build tool lookup map
        let tool_map: HashMap<String, usize> = tools
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name().to_string(), i))
            .collect();

        Self {
            name: name.into(),
            description: description.into(),
            instruction: instruction.into(),
            model,
            tools,
            output_key: None,
            config: None,
            keep_output_on_stop: false,
            tool_map,
        }
    }

    pub fn with_output_key(mut self, key: StateKey) -> Self {
        self.output_key = Some(key);
        self
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn keep_output_on_stop(mut self) -> Self {
        self.keep_output_on_stop = true;
        self
    }

    /// O(1) tool lookup by name
    fn get_tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tool_map.get(name).map(|&i| &self.tools[i])
    }

    async fn finish(&self, ctx: &mut InvocationContext, text: String) -> String {
        if let Some(key) = self.output_key {
            if self.keep_output_on_stop && ctx.control() == LoopControl::Stop {
                log::info!("Agent {} stopped the loop; keeping {}", self.name, key);
            } else {
                ctx.state.set(key, text.clone());
            }
        }
        if !text.is_empty() {
            ctx.emit(AgentEvent::Answer {
                author: self.name.clone(),
                text: text.clone(),
            })
            .await;
        }
        text
    }
}

#[async_trait]
impl Agent for LLMAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn run(
        &self,
        ctx: &mut InvocationContext,
        input: String,
    ) -> Result<String, StudioError> {
        let system = self.instruction.render(&ctx.state)?;
        let mut history = vec![Content::system(system), Content::user(input)];

        let tools = (!self.tools.is_empty()).then_some(self.tools.as_slice());

        for turn in 0..MAX_TURNS {
            log::info!("Agent {} turn {}/{}", self.name, turn + 1, MAX_TURNS);
            let response = self
                .model
                .generate_content(&history, self.config.as_ref(), tools)
                .await?;

            log::info!(
                "Agent {} received response with {} parts",
                self.name,
                response.parts.len()
            );

            // Analyze response parts
            let mut text_content = String::new();
            let mut function_calls = Vec::new();

            for part in &response.parts {
                match part {
                    Part::Text(text) => text_content.push_str(text),
                    Part::Thinking(thought) => {
                        ctx.emit(AgentEvent::Thought {
                            author: self.name.clone(),
                            text: thought.clone(),
                        })
                        .await;
                    }
                    Part::FunctionCall { name, args, .. } => {
                        function_calls.push((name.clone(), args.clone()))
                    }
                    Part::FunctionResponse { .. } => {}
                }
            }

            if function_calls.is_empty() {
                if text_content.is_empty() {
                    log::warn!(
                        "Agent {} received empty response with no function calls",
                        self.name
                    );
                } else {
                    log::info!(
                        "Agent {} returning text response (length: {}, preview: '{}')",
                        self.name,
                        text_content.len(),
                        truncate_chars(&text_content, 100)
                    );
                }
                return Ok(self.finish(ctx, text_content).await);
            }

            // Has function calls, treat text as Thought
            if !text_content.is_empty() {
                ctx.emit(AgentEvent::Thought {
                    author: self.name.clone(),
                    text: text_content,
                })
                .await;
            }

            // Execute function calls
            let mut function_responses = Vec::with_capacity(function_calls.len());
            for (name, args) in function_calls {
                log::info!("Tool call: {} {}", name, args);
                ctx.emit(AgentEvent::ToolCall {
                    author: self.name.clone(),
                    name: name.clone(),
                    args: args.clone(),
                })
                .await;

                let tool_response = match self.get_tool(&name) {
                    Some(t) => match t.execute(ctx, args).await {
                        Ok(res) => res,
                        Err(e) => {
                            log::error!("Tool {} failed: {}", name, e);
                            ctx.emit(AgentEvent::Error {
                                author: self.name.clone(),
                                message: format!("Tool {} failed: {}", name, e),
                            })
                            .await;
                            json!({ "error": e.to_string() })
                        }
                    },
                    None => {
                        let e = StudioError::tool_not_found(&name);
                        log::error!("{}", e);
                        json!({ "error": e.to_string() })
                    }
                };

                log::info!(
                    "Tool {} response: {}",
                    name,
                    serde_json::to_string(&tool_response).unwrap_or_default()
                );
                ctx.emit(AgentEvent::ToolResult {
                    author: self.name.clone(),
                    name: name.clone(),
                    result: tool_response.clone(),
                })
                .await;

                function_responses.push(Part::FunctionResponse {
                    name,
                    response: tool_response,
                });
            }

            // Add model response and tool responses to history
            history.push(response);
            history.push(Content {
                role: "user".to_string(),
                parts: function_responses,
            });

            log::info!("Continuing to next turn to get model summary...");
        }

        log::error!(
            "Agent {} reached max turns without text response",
            self.name
        );
        Err(StudioError::MaxIterations {
            kind: "turns".to_string(),
            limit: MAX_TURNS,
        })
    }

    fn check_data_flow(&self, available: &mut BTreeSet<StateKey>) -> Result<(), PipelineError> {
        if let Some(key) = self.instruction.reads().iter().find(|k| !available.contains(k)) {
            return Err(PipelineError::UnsatisfiedRead {
                agent: self.name.clone(),
                key: *key,
            });
        }
        available.extend(self.writes());
        Ok(())
    }

    fn writes(&self) -> BTreeSet<StateKey> {
        self.tools
            .iter()
            .flat_map(|t| t.writes().iter().copied())
            .chain(self.output_key)
            .collect()
    }
}
