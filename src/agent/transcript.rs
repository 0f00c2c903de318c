use crate::response::{GenerationResponse, Output, ToolDirective};
use crate::types::{Prompt, Segment};

/// One entry of an agent transcript.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// The user's request
    Request(String),
    /// A response returned by the model
    Response(GenerationResponse),
    /// Output (or error text) of a dispatched tool
    ToolResult {
        directive: ToolDirective,
        output: String,
    },
}

/// Append-only record of one agent run, used to build each prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    /// Start a transcript with the user's request.
    pub fn new(request: impl Into<String>) -> Self {
        Self {
            entries: vec![Entry::Request(request.into())],
        }
    }

    pub fn push_response(&mut self, response: GenerationResponse) {
        self.entries.push(Entry::Response(response));
    }

    pub fn push_tool_result(&mut self, directive: ToolDirective, output: impl Into<String>) {
        self.entries.push(Entry::ToolResult {
            directive,
            output: output.into(),
        });
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the prompt for the next model call.
    pub fn to_prompt(&self, system_instruction: Option<&str>) -> Prompt {
        let prompt = match system_instruction {
            Some(instruction) => Prompt::system(instruction),
            None => Prompt::new(),
        };

        prompt.with_segments(self.entries.iter().map(|entry| match entry {
            Entry::Request(request) => Segment::user(request.clone()),
            Entry::Response(response) => match &response.output {
                Output::FinalAnswer { text } => Segment::model(text.clone()),
                Output::ToolDirective(directive) => Segment::tool_call(directive.clone()),
            },
            Entry::ToolResult { directive, output } => Segment::tool_result(directive, output.clone()),
        }))
    }
}
