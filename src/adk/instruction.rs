// SPDX-License-Identifier: MIT

//! Instruction templates with session-state placeholders
//!
//! `{current_content}` is replaced with the value of that key and fails if
//! it is unset; `{current_content?}` renders as empty instead. Brace text
//! that does not name a [`StateKey`] is left untouched.

use crate::adk::error::StudioError;
use crate::adk::state::{SessionState, StateKey};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)(\?)?\}").expect("placeholder pattern is valid")
});

#[derive(Debug, Clone)]
pub struct Instruction {
    template: String,
    required: Vec<StateKey>,
}

impl Instruction {
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let mut required = Vec::new();
        for caps in PLACEHOLDER.captures_iter(&template) {
            let optional = caps.get(2).is_some();
            if let Ok(key) = caps[1].parse::<StateKey>() {
                if !optional && !required.contains(&key) {
                    required.push(key);
                }
            }
        }
        Self { template, required }
    }

    /// Keys that must be set before this instruction can render
    pub fn reads(&self) -> &[StateKey] {
        &self.required
    }

    pub fn render(&self, state: &SessionState) -> Result<String, StudioError> {
        for key in &self.required {
            state.require(*key)?;
        }

        let rendered = PLACEHOLDER.replace_all(&self.template, |caps: &Captures| {
            match caps[1].parse::<StateKey>() {
                Ok(key) => state.get(key).unwrap_or_default().to_string(),
                Err(_) => caps[0].to_string(),
            }
        });
        Ok(rendered.into_owned())
    }
}

impl From<&str> for Instruction {
    fn from(s: &str) -> Self {
        Instruction::new(s)
    }
}

impl From<String> for Instruction {
    fn from(s: String) -> Self {
        Instruction::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_keys() {
        let mut state = SessionState::new();
        state.set(StateKey::Topic, "remote work");
        state.set(StateKey::Tone, "friendly");

        let instruction = Instruction::new("Write about {topic} in a {tone} voice.");
        assert_eq!(
            instruction.render(&state).unwrap(),
            "Write about remote work in a friendly voice."
        );
    }

    #[test]
    fn test_render_fails_on_unset_required_key() {
        let instruction = Instruction::new("Improve: {current_content}");
        let err = instruction.render(&SessionState::new()).unwrap_err();
        assert!(matches!(
            err,
            StudioError::MissingState {
                key: StateKey::CurrentContent
            }
        ));
    }

    #[test]
    fn test_optional_key_renders_empty() {
        let instruction = Instruction::new("Feedback: [{quality_feedback?}]");
        assert_eq!(
            instruction.render(&SessionState::new()).unwrap(),
            "Feedback: []"
        );
        assert!(instruction.reads().is_empty());
    }

    #[test]
    fn test_unknown_names_left_verbatim() {
        let instruction = Instruction::new(r#"Reply as {"score": 1} or {placeholder}"#);
        assert_eq!(
            instruction.render(&SessionState::new()).unwrap(),
            r#"Reply as {"score": 1} or {placeholder}"#
        );
    }

    #[test]
    fn test_reads_are_deduplicated_in_order() {
        let instruction = Instruction::new("{tone} {topic} {tone} {keywords?}");
        assert_eq!(instruction.reads(), &[StateKey::Tone, StateKey::Topic]);
    }
}
