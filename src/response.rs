//! Normalized model responses.

use serde::{Deserialize, Serialize};

use crate::types::Usage;

/// A structured instruction from the model to invoke a named tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDirective {
    /// Id pairing this directive with its tool result
    pub call_id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

impl ToolDirective {
    /// Create a directive with a fresh call id.
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            call_id: format!("call_{}", uuid::Uuid::new_v4().simple()),
            name: name.into(),
            arguments,
        }
    }
}

/// What the model decided: answer, or call exactly one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Output {
    FinalAnswer { text: String },
    ToolDirective(ToolDirective),
}

/// Reason why generation finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    Other(String),
}

/// A response normalized from a backend reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub output: Output,
    pub finish_reason: Option<FinishReason>,
    pub usage: Usage,
}

impl GenerationResponse {
    /// A final answer response.
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            output: Output::FinalAnswer { text: text.into() },
            finish_reason: Some(FinishReason::Stop),
            usage: Usage::default(),
        }
    }

    /// A response directing a call to `name`.
    pub fn directive(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            output: Output::ToolDirective(ToolDirective::new(name, arguments)),
            finish_reason: Some(FinishReason::Stop),
            usage: Usage::default(),
        }
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self
    }

    /// The final answer text, if the model answered.
    pub fn text(&self) -> Option<&str> {
        match &self.output {
            Output::FinalAnswer { text } => Some(text),
            Output::ToolDirective(_) => None,
        }
    }

    /// The tool directive, if the model asked for a tool.
    pub fn directive_ref(&self) -> Option<&ToolDirective> {
        match &self.output {
            Output::ToolDirective(directive) => Some(directive),
            Output::FinalAnswer { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_answer_has_no_directive() {
        let response = GenerationResponse::answer("Paris");
        assert_eq!(response.text(), Some("Paris"));
        assert!(response.directive_ref().is_none());
    }

    #[test]
    fn test_directive_has_no_text() {
        let response = GenerationResponse::directive("calculator", json!({"expression": "2+2"}));
        assert!(response.text().is_none());

        let directive = response.directive_ref().unwrap();
        assert_eq!(directive.name, "calculator");
        assert!(directive.call_id.starts_with("call_"));
    }

    #[test]
    fn test_fresh_call_ids() {
        let a = ToolDirective::new("calculator", json!({}));
        let b = ToolDirective::new("calculator", json!({}));
        assert_ne!(a.call_id, b.call_id);
    }

    #[test]
    fn test_output_serializes_tagged() {
        let value = serde_json::to_value(Output::FinalAnswer {
            text: "4".to_string(),
        })
        .unwrap();
        assert_eq!(value, json!({"type": "final_answer", "text": "4"}));
    }
}
