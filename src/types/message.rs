use serde::{Deserialize, Serialize};

use crate::response::ToolDirective;

/// One segment of a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    /// Instruction for the model
    System { content: String },
    /// User input
    User { content: String },
    /// Text previously produced by the model
    Model { content: String },
    /// A tool directive previously produced by the model
    ToolCall { directive: ToolDirective },
    /// Output of a tool call, keyed by the directive's call id
    ToolResult {
        call_id: String,
        name: String,
        output: String,
    },
}

impl Segment {
    /// Create a system segment.
    pub fn system(content: impl Into<String>) -> Self {
        Segment::System {
            content: content.into(),
        }
    }

    /// Create a user segment.
    pub fn user(content: impl Into<String>) -> Self {
        Segment::User {
            content: content.into(),
        }
    }

    /// Create a model segment.
    pub fn model(content: impl Into<String>) -> Self {
        Segment::Model {
            content: content.into(),
        }
    }

    /// Create a tool call segment.
    pub fn tool_call(directive: ToolDirective) -> Self {
        Segment::ToolCall { directive }
    }

    /// Create a tool result segment answering `directive`.
    pub fn tool_result(directive: &ToolDirective, output: impl Into<String>) -> Self {
        Segment::ToolResult {
            call_id: directive.call_id.clone(),
            name: directive.name.clone(),
            output: output.into(),
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, Segment::System { .. })
    }

    /// Get the text content of this segment (if any).
    pub fn text(&self) -> Option<&str> {
        match self {
            Segment::System { content }
            | Segment::User { content }
            | Segment::Model { content } => Some(content),
            Segment::ToolResult { output, .. } => Some(output),
            Segment::ToolCall { .. } => None,
        }
    }
}
