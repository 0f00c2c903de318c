use super::message::Segment;

/// An ordered sequence of segments sent to a model in one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prompt {
    segments: Vec<Segment>,
}

impl Prompt {
    /// Create a new empty prompt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a prompt with a system instruction.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::system(content)],
        }
    }

    /// Create a prompt with a user segment.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::user(content)],
        }
    }

    /// Add a system instruction.
    pub fn with_system(self, content: impl Into<String>) -> Self {
        self.with_segment(Segment::system(content))
    }

    /// Add a user segment.
    pub fn with_user(self, content: impl Into<String>) -> Self {
        self.with_segment(Segment::user(content))
    }

    /// Add a model segment.
    pub fn with_model(self, content: impl Into<String>) -> Self {
        self.with_segment(Segment::model(content))
    }

    /// Add a segment.
    pub fn with_segment(mut self, segment: Segment) -> Self {
        self.segments.push(segment);
        self
    }

    /// Add multiple segments.
    pub fn with_segments(mut self, segments: impl IntoIterator<Item = Segment>) -> Self {
        self.segments.extend(segments);
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// A prompt is sendable once it holds something besides system instructions.
    pub fn has_content(&self) -> bool {
        self.segments.iter().any(|s| !s.is_system())
    }
}

impl From<&str> for Prompt {
    fn from(s: &str) -> Self {
        Prompt::user(s)
    }
}

impl From<String> for Prompt {
    fn from(s: String) -> Self {
        Prompt::user(s)
    }
}

impl From<Vec<Segment>> for Prompt {
    fn from(segments: Vec<Segment>) -> Self {
        Prompt { segments }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_preserves_order() {
        let prompt = Prompt::system("Be brief")
            .with_user("What is 2+2?")
            .with_model("4");

        assert_eq!(prompt.segments().len(), 3);
        assert!(prompt.segments()[0].is_system());
        assert_eq!(prompt.segments()[1].text(), Some("What is 2+2?"));
        assert_eq!(prompt.segments()[2], Segment::model("4"));
    }

    #[test]
    fn test_system_only_prompt_has_no_content() {
        assert!(!Prompt::new().has_content());
        assert!(!Prompt::system("Be brief").has_content());
        assert!(Prompt::from("hello").has_content());
    }
}
