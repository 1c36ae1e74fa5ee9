//! Shared mock components for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use content_studio::adk::error::StudioError;
use content_studio::adk::model::{Content, GenerationConfig, Model, Part};
use content_studio::adk::tool::Tool;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One scripted role: recognised by a substring of its system instruction
struct Rule {
    marker: &'static str,
    tool_call: Option<(String, Value)>,
    reply: String,
}

/// Mock model that answers by role rather than by call order, so parallel
/// branches get the right reply whatever order they run in.
///
/// A role with a tool call issues it first and sends its text reply once the
/// tool response comes back.
pub struct ScriptedModel {
    rules: Vec<Rule>,
    calls: Mutex<HashMap<&'static str, usize>>,
    systems: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            calls: Mutex::new(HashMap::new()),
            systems: Mutex::new(Vec::new()),
        }
    }

    pub fn on(mut self, marker: &'static str, reply: &str) -> Self {
        self.rules.push(Rule {
            marker,
            tool_call: None,
            reply: reply.to_string(),
        });
        self
    }

    pub fn on_tool(mut self, marker: &'static str, tool: &str, args: Value, reply: &str) -> Self {
        self.rules.push(Rule {
            marker,
            tool_call: Some((tool.to_string(), args)),
            reply: reply.to_string(),
        });
        self
    }

    /// Model calls made for a role, tool turns included
    pub fn calls(&self, marker: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(marker)
            .copied()
            .unwrap_or(0)
    }

    /// Rendered system instructions containing `marker`
    pub fn systems_matching(&self, marker: &str) -> Vec<String> {
        self.systems
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.contains(marker))
            .cloned()
            .collect()
    }
}

fn is_tool_response(content: &Content) -> bool {
    content
        .parts
        .iter()
        .any(|p| matches!(p, Part::FunctionResponse { .. }))
}

#[async_trait]
impl Model for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted-model"
    }

    async fn generate_content(
        &self,
        history: &[Content],
        _config: Option<&GenerationConfig>,
        _tools: Option<&[Arc<dyn Tool>]>,
    ) -> Result<Content, StudioError> {
        let system = history
            .iter()
            .find(|c| c.role == "system")
            .map(|c| c.text())
            .unwrap_or_default();
        self.systems.lock().unwrap().push(system.clone());

        let rule = self
            .rules
            .iter()
            .find(|r| system.contains(r.marker))
            .ok_or_else(|| StudioError::other(format!("no script for prompt: {}", system)))?;
        *self.calls.lock().unwrap().entry(rule.marker).or_insert(0) += 1;

        let answered = history.last().is_some_and(is_tool_response);
        match (&rule.tool_call, answered) {
            (Some((name, args)), false) => Ok(Content {
                role: "model".to_string(),
                parts: vec![Part::FunctionCall {
                    name: name.clone(),
                    args: args.clone(),
                    thought_signature: None,
                }],
            }),
            _ => Ok(Content::model(rule.reply.clone())),
        }
    }
}

pub const INTAKE: &str = "content brief analyzer";
pub const RESEARCH: &str = "topic research expert";
pub const DRAFTER: &str = "You are a content writer";
pub const CHECKER: &str = "content quality analyst";
pub const IMPROVER: &str = "Reviewer feedback";
pub const BLOG: &str = "professional blog writer";
pub const SOCIAL: &str = "social media specialist";
pub const EMAIL: &str = "email marketing specialist";
pub const SEO: &str = "SEO specialist";
pub const PACKAGER: &str = "content package coordinator";
pub const ANALYZER: &str = "content analysis expert";
pub const COORDINATOR: &str = "content creation coordinator";
pub const ORCHESTRATOR: &str = "Content Creation Studio orchestrator";

pub fn brief_args() -> Value {
    json!({
        "topic": "AI productivity for remote workers",
        "target_audience": "digital nomads",
        "tone": "friendly",
        "keywords": "AI, remote work, productivity"
    })
}

/// A complete script for the content pipeline.
///
/// `quality_passes` decides whether the checker's scores meet the threshold.
pub fn pipeline_model(quality_passes: bool) -> ScriptedModel {
    let quality_args = if quality_passes {
        json!({
            "word_count": 900,
            "readability_score": 65.0,
            "has_headings": true,
            "has_conclusion": true
        })
    } else {
        json!({
            "word_count": 300,
            "readability_score": 20.0,
            "has_headings": false,
            "has_conclusion": false
        })
    };

    ScriptedModel::new()
        .on_tool(INTAKE, "update_session_state", brief_args(), "Brief saved.")
        .on(RESEARCH, "7 AI Habits That Give Remote Workers Their Evenings Back")
        .on(DRAFTER, "DRAFT")
        .on_tool(
            CHECKER,
            "calculate_content_quality_score",
            quality_args,
            "Quality score: 99.25. Issues: none",
        )
        .on(IMPROVER, "IMPROVED DRAFT")
        .on(BLOG, "BLOG POST")
        .on(SOCIAL, "SOCIAL POSTS")
        .on(EMAIL, "NEWSLETTER")
        .on(SEO, "SEO METADATA")
        .on(PACKAGER, "FINAL PACKAGE")
}
