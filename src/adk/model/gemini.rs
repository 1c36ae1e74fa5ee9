// SPDX-License-Identifier: MIT

//! Gemini Model - Google's Gemini API implementation

use super::{Content, GenerationConfig, Model, Part};
use crate::adk::error::{ModelError, StudioError};
use crate::adk::tool::Tool;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Map, Value};
use std::env;
use std::sync::Arc;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini model implementation
pub struct GeminiModel {
    client: Client,
    api_key: String,
    model_name: String,
    base_url: String,
}

impl GeminiModel {
    /// Create a new GeminiModel
    ///
    /// Requires `GOOGLE_API_KEY` environment variable to be set.
    pub fn new(model_name: impl Into<String>) -> Result<Self, StudioError> {
        let api_key = env::var("GOOGLE_API_KEY")
            .map_err(|_| ModelError::ApiKeyMissing("Gemini (GOOGLE_API_KEY)".to_string()))?;
        Ok(Self::with_api_key(model_name, api_key))
    }

    pub fn with_api_key(model_name: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model_name: model_name.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different endpoint (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model_name
        )
    }
}

#[async_trait]
impl Model for GeminiModel {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn generate_content(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
        tools: Option<&[Arc<dyn Tool>]>,
    ) -> Result<Content, StudioError> {
        let body = build_request_body(history, config, tools);

        log::debug!(
            "Gemini request body: {}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(ModelError::RateLimited { retry_after_secs }.into());
        }
        if !status.is_success() {
            let text = resp.text().await?;
            return Err(StudioError::api("Gemini", format!("{}: {}", status, text)));
        }

        let resp_json: Value = resp.json().await?;
        log::debug!("Gemini response: {}", resp_json);

        parse_response(&resp_json)
    }
}

/// Build the `generateContent` request body.
///
/// System turns are lifted into `systemInstruction`; Gemini rejects a
/// `system` role inside `contents`.
pub fn build_request_body(
    history: &[Content],
    config: Option<&GenerationConfig>,
    tools: Option<&[Arc<dyn Tool>]>,
) -> Value {
    let mut system_parts = Vec::new();
    let mut contents = Vec::new();

    for c in history {
        let parts: Vec<Value> = c.parts.iter().filter_map(part_to_gemini_json).collect();
        if c.role == "system" {
            system_parts.extend(parts);
        } else if !parts.is_empty() {
            contents.push(json!({ "role": c.role, "parts": parts }));
        }
    }

    let mut body = json!({ "contents": contents });

    if !system_parts.is_empty() {
        body["systemInstruction"] = json!({ "parts": system_parts });
    }

    let mut tool_entries = Vec::new();
    if let Some(tools) = tools {
        if !tools.is_empty() {
            let function_declarations: Vec<Value> =
                tools.iter().map(|t| function_declaration(t.as_ref())).collect();
            tool_entries.push(json!({ "functionDeclarations": function_declarations }));
        }
    }

    if let Some(config) = config {
        if config.google_search {
            tool_entries.push(json!({ "googleSearch": {} }));
        }

        let mut generation = Map::new();
        if let Some(t) = config.temperature {
            generation.insert("temperature".to_string(), json!(t));
        }
        if let Some(m) = config.max_output_tokens {
            generation.insert("maxOutputTokens".to_string(), json!(m));
        }
        if let Some(p) = config.top_p {
            generation.insert("topP".to_string(), json!(p));
        }
        if let Some(k) = config.top_k {
            generation.insert("topK".to_string(), json!(k));
        }
        if !generation.is_empty() {
            body["generationConfig"] = Value::Object(generation);
        }
    }

    if !tool_entries.is_empty() {
        body["tools"] = Value::Array(tool_entries);
    }

    body
}

/// Function declaration for one tool. Parameterless tools omit `parameters`.
fn function_declaration(tool: &dyn Tool) -> Value {
    let schema = tool.schema();
    let has_params = schema
        .get("properties")
        .and_then(|p| p.as_object())
        .is_some_and(|p| !p.is_empty());

    let mut decl = json!({
        "name": tool.name(),
        "description": tool.description(),
    });
    if has_params {
        decl["parameters"] = schema.clone();
    }
    decl
}

/// Turn a `generateContent` response into a model [`Content`]
pub fn parse_response(resp_json: &Value) -> Result<Content, StudioError> {
    if let Some(reason) = resp_json
        .get("promptFeedback")
        .and_then(|f| f.get("blockReason"))
        .and_then(|r| r.as_str())
    {
        return Err(ModelError::Blocked(format!("prompt blocked: {}", reason)).into());
    }

    let candidate = resp_json["candidates"]
        .as_array()
        .and_then(|c| c.first())
        .ok_or_else(|| ModelError::InvalidResponse("no candidates in response".to_string()))?;

    if let Some(finish_reason) = candidate.get("finishReason").and_then(|v| v.as_str()) {
        log::debug!("Gemini finish reason: {}", finish_reason);
        match finish_reason {
            "SAFETY" | "PROHIBITED_CONTENT" | "BLOCKLIST" => {
                return Err(ModelError::Blocked(finish_reason.to_string()).into());
            }
            "UNEXPECTED_TOOL_CALL" => {
                return Err(ModelError::InvalidResponse(
                    "model called a tool that was not declared".to_string(),
                )
                .into());
            }
            "MALFORMED_FUNCTION_CALL" => {
                let msg = candidate
                    .get("finishMessage")
                    .and_then(|m| m.as_str())
                    .unwrap_or("malformed function call");
                log::warn!("Gemini malformed function call: {}", msg);
                return Ok(Content::model(format!(
                    "I tried to use a tool incorrectly. {}",
                    msg
                )));
            }
            _ => {}
        }
    }

    let parts_json = candidate
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or_else(|| {
            ModelError::InvalidResponse(format!("no content parts in candidate: {}", candidate))
        })?;

    let parts = parts_json.iter().flat_map(parse_gemini_part).collect();

    Ok(Content {
        role: "model".to_string(),
        parts,
    })
}

/// Serialize a Part to Gemini API JSON format
/// Returns None for parts that shouldn't be sent (e.g., Thinking)
pub fn part_to_gemini_json(part: &Part) -> Option<Value> {
    match part {
        Part::Text(t) => Some(json!({ "text": t })),
        Part::Thinking(_) => None,
        Part::FunctionCall {
            name,
            args,
            thought_signature,
        } => {
            let mut fc = json!({ "functionCall": { "name": name, "args": args } });
            if let Some(sig) = thought_signature {
                fc["thoughtSignature"] = json!(sig);
            }
            Some(fc)
        }
        Part::FunctionResponse { name, response } => {
            Some(json!({ "functionResponse": { "name": name, "response": response } }))
        }
    }
}

/// Parse a Gemini API JSON part into Parts
pub fn parse_gemini_part(p: &Value) -> Vec<Part> {
    let mut parts = Vec::new();

    // Thought summaries arrive as text flagged with `thought: true`
    if p.get("thought").and_then(|t| t.as_bool()) == Some(true) {
        if let Some(text) = p.get("text").and_then(|t| t.as_str()) {
            if !text.is_empty() {
                parts.push(Part::Thinking(text.to_string()));
            }
        }
        return parts;
    }

    if let Some(text) = p.get("text").and_then(|t| t.as_str()) {
        parts.push(Part::Text(text.to_string()));
    } else if let Some(fc) = p.get("functionCall") {
        let name = fc["name"].as_str().unwrap_or_default().to_string();
        let args = match &fc["args"] {
            Value::Null => json!({}),
            other => other.clone(),
        };
        let thought_signature = p
            .get("thoughtSignature")
            .and_then(|s| s.as_str())
            .map(|s| s.to_string());
        parts.push(Part::FunctionCall {
            name,
            args,
            thought_signature,
        });
    }

    parts
}
