// SPDX-License-Identifier: MIT

use crate::adk::context::InvocationContext;
use crate::adk::error::StudioError;
use crate::adk::state::StateKey;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde_json::Value;

/// Trait for tools that can be called by agents.
///
/// - `name()` and `description()` return `&str` to avoid allocation on every call
/// - `schema()` returns `&Value`; implementations keep it in a static
/// - `writes()` lists the session keys `execute` may set, used by the
///   pipeline's data-flow check
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool name (must be unique within an agent's tool set)
    fn name(&self) -> &str;

    /// Returns a human-readable description of what the tool does
    fn description(&self) -> &str;

    /// Returns the JSON schema for the tool's input parameters
    fn schema(&self) -> &Value;

    fn writes(&self) -> &[StateKey] {
        &[]
    }

    /// Execute the tool with the given input and return the result
    async fn execute(
        &self,
        ctx: &mut InvocationContext,
        input: Value,
    ) -> Result<Value, StudioError>;
}

/// Build a function-declaration schema for an argument struct.
///
/// Drops the `$schema` and `title` keys that schemars emits, which the
/// Gemini function-declaration format does not accept.
pub fn schema_for<T: JsonSchema>() -> Value {
    let root = schemars::schema_for!(T);
    let mut value = serde_json::to_value(root).unwrap_or_default();
    if let Some(obj) = value.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[allow(dead_code)]
    #[derive(Deserialize, JsonSchema)]
    struct Args {
        /// The text to inspect
        text: String,
        limit: Option<i64>,
    }

    #[test]
    fn test_schema_for_strips_meta_keys() {
        let schema = schema_for::<Args>();
        assert!(schema.get("$schema").is_none());
        assert!(schema.get("title").is_none());
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["text"]["type"], "string");
        assert_eq!(schema["required"], serde_json::json!(["text"]));
    }
}
