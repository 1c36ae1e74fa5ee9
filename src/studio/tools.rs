// SPDX-License-Identifier: MIT

//! Function tools exposed to the studio agents

use crate::adk::context::InvocationContext;
use crate::adk::error::StudioError;
use crate::adk::state::StateKey;
use crate::adk::tool::{schema_for, Tool};
use crate::studio::analysis;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use std::sync::Arc;

fn parse_args<T: DeserializeOwned>(tool: &str, input: Value) -> Result<T, StudioError> {
    serde_json::from_value(input).map_err(|e| StudioError::invalid_args(tool, e))
}

/// Models sometimes send whole numbers as `650.0`
fn lenient_int<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(d)?;
    match &value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .ok_or_else(|| D::Error::custom(format!("invalid integer: {}", n))),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(|f| f.round() as i64)
            .map_err(D::Error::custom),
        other => Err(D::Error::custom(format!("expected integer, got {}", other))),
    }
}

// --- count_words ---

#[derive(Debug, Deserialize, JsonSchema)]
struct TextArgs {
    /// The text to analyze
    text: String,
}

static TEXT_SCHEMA: Lazy<Value> = Lazy::new(schema_for::<TextArgs>);

pub struct CountWordsTool;

#[async_trait]
impl Tool for CountWordsTool {
    fn name(&self) -> &str {
        "count_words"
    }

    fn description(&self) -> &str {
        "Counts the number of words in the provided text."
    }

    fn schema(&self) -> &Value {
        &TEXT_SCHEMA
    }

    async fn execute(
        &self,
        _ctx: &mut InvocationContext,
        input: Value,
    ) -> Result<Value, StudioError> {
        let args: TextArgs = parse_args(self.name(), input)?;
        let count = analysis::count_words(&args.text);
        log::info!("count_words: {} words", count);
        Ok(json!({ "result": count }))
    }
}

// --- calculate_readability_score ---

pub struct ReadabilityTool;

#[async_trait]
impl Tool for ReadabilityTool {
    fn name(&self) -> &str {
        "calculate_readability_score"
    }

    fn description(&self) -> &str {
        "Calculates a readability score (0-100, higher is easier to read)."
    }

    fn schema(&self) -> &Value {
        &TEXT_SCHEMA
    }

    async fn execute(
        &self,
        _ctx: &mut InvocationContext,
        input: Value,
    ) -> Result<Value, StudioError> {
        let args: TextArgs = parse_args(self.name(), input)?;
        let result = analysis::calculate_readability_score(&args.text);
        log::info!("readability: {} - {}", result.score, result.grade);
        Ok(serde_json::to_value(result)?)
    }
}

// --- generate_hashtags ---

#[derive(Debug, Deserialize, JsonSchema)]
struct HashtagArgs {
    /// The text to extract key terms from
    text: String,
    /// How many hashtags to return
    #[serde(deserialize_with = "lenient_int")]
    count: i64,
}

static HASHTAG_SCHEMA: Lazy<Value> = Lazy::new(schema_for::<HashtagArgs>);

pub struct HashtagTool;

#[async_trait]
impl Tool for HashtagTool {
    fn name(&self) -> &str {
        "generate_hashtags"
    }

    fn description(&self) -> &str {
        "Generates relevant hashtags from text by extracting key terms."
    }

    fn schema(&self) -> &Value {
        &HASHTAG_SCHEMA
    }

    async fn execute(
        &self,
        _ctx: &mut InvocationContext,
        input: Value,
    ) -> Result<Value, StudioError> {
        let args: HashtagArgs = parse_args(self.name(), input)?;
        let count = usize::try_from(args.count).unwrap_or(0);
        let hashtags = analysis::generate_hashtags(&args.text, count);
        log::info!("generate_hashtags: {}", hashtags.join(", "));
        Ok(json!({ "result": hashtags }))
    }
}

// --- calculate_content_quality_score ---

#[derive(Debug, Deserialize, JsonSchema)]
struct QualityArgs {
    /// Approximate number of words in the content
    #[serde(deserialize_with = "lenient_int")]
    word_count: i64,
    /// Estimated readability score, 0-100
    readability_score: f64,
    /// Whether the content has clear headings
    has_headings: bool,
    /// Whether the content ends with a conclusion section
    has_conclusion: bool,
}

static QUALITY_SCHEMA: Lazy<Value> = Lazy::new(schema_for::<QualityArgs>);

/// Scores content and tells the enclosing loop to stop once it passes
pub struct QualityScoreTool;

#[async_trait]
impl Tool for QualityScoreTool {
    fn name(&self) -> &str {
        "calculate_content_quality_score"
    }

    fn description(&self) -> &str {
        "Calculates overall content quality score based on multiple factors."
    }

    fn schema(&self) -> &Value {
        &QUALITY_SCHEMA
    }

    async fn execute(
        &self,
        ctx: &mut InvocationContext,
        input: Value,
    ) -> Result<Value, StudioError> {
        let args: QualityArgs = parse_args(self.name(), input)?;
        let result = analysis::calculate_content_quality_score(
            args.word_count,
            args.readability_score,
            args.has_headings,
            args.has_conclusion,
        );
        log::info!(
            "quality score: {}/100 (threshold {})",
            result.overall_score,
            if result.meets_threshold { "MET" } else { "NOT MET" }
        );
        if result.meets_threshold {
            ctx.escalate();
        }
        Ok(serde_json::to_value(result)?)
    }
}

// --- update_session_state ---

#[derive(Debug, Deserialize, JsonSchema)]
struct BriefArgs {
    /// Main topic of the content
    topic: String,
    /// Who the content is written for
    target_audience: String,
    /// Desired tone of voice
    tone: String,
    /// Comma-separated SEO keywords
    keywords: String,
}

static BRIEF_SCHEMA: Lazy<Value> = Lazy::new(schema_for::<BriefArgs>);

const BRIEF_KEYS: [StateKey; 4] = [
    StateKey::Topic,
    StateKey::TargetAudience,
    StateKey::Tone,
    StateKey::Keywords,
];

/// Saves the extracted content brief into session state
pub struct UpdateSessionStateTool;

#[async_trait]
impl Tool for UpdateSessionStateTool {
    fn name(&self) -> &str {
        "update_session_state"
    }

    fn description(&self) -> &str {
        "Saves extracted content brief parameters to session state."
    }

    fn schema(&self) -> &Value {
        &BRIEF_SCHEMA
    }

    fn writes(&self) -> &[StateKey] {
        &BRIEF_KEYS
    }

    async fn execute(
        &self,
        ctx: &mut InvocationContext,
        input: Value,
    ) -> Result<Value, StudioError> {
        let args: BriefArgs = parse_args(self.name(), input)?;
        log::info!(
            "Saved brief: {} | {} | {}",
            args.topic,
            args.target_audience,
            args.tone
        );
        ctx.state.set(StateKey::Topic, args.topic);
        ctx.state.set(StateKey::TargetAudience, args.target_audience);
        ctx.state.set(StateKey::Tone, args.tone);
        ctx.state.set(StateKey::Keywords, args.keywords);
        Ok(json!({ "status": "success" }))
    }
}

// --- exit_loop ---

static EMPTY_SCHEMA: Lazy<Value> = Lazy::new(|| json!({ "type": "object", "properties": {} }));

/// Ends the quality loop at the model's request
pub struct ExitLoopTool;

#[async_trait]
impl Tool for ExitLoopTool {
    fn name(&self) -> &str {
        "exit_loop"
    }

    fn description(&self) -> &str {
        "Terminates the improvement loop when quality meets threshold."
    }

    fn schema(&self) -> &Value {
        &EMPTY_SCHEMA
    }

    async fn execute(
        &self,
        ctx: &mut InvocationContext,
        _input: Value,
    ) -> Result<Value, StudioError> {
        log::info!("Quality approved, terminating loop");
        ctx.escalate();
        Ok(json!({ "result": "Quality threshold met. Content approved." }))
    }
}

/// Tools used by the content analyzer
pub fn analysis_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(CountWordsTool),
        Arc::new(ReadabilityTool),
        Arc::new(HashtagTool),
    ]
}
