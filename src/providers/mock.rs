//! In-memory adapter returning pre-configured responses.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::adapter::ModelAdapter;
use crate::{Error, GenerationOptions, GenerationResponse, Prompt};

/// An adapter that replays scripted responses in order and records every
/// prompt it is given.
pub struct ScriptedAdapter {
    responses: Mutex<VecDeque<Result<GenerationResponse, Error>>>,
    /// Returned once the script is exhausted
    fallback: Option<GenerationResponse>,
    prompts: Mutex<Vec<Prompt>>,
}

impl ScriptedAdapter {
    /// Create an adapter with a sequence of responses.
    pub fn new(responses: Vec<Result<GenerationResponse, Error>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            fallback: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Create an adapter that returns `response` on every call.
    pub fn repeating(response: GenerationResponse) -> Self {
        Self::new(Vec::new()).with_fallback(response)
    }

    pub fn with_fallback(mut self, response: GenerationResponse) -> Self {
        self.fallback = Some(response);
        self
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Number of generate calls made so far.
    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl ModelAdapter for ScriptedAdapter {
    async fn generate(
        &self,
        prompt: &Prompt,
        _options: &GenerationOptions,
    ) -> Result<GenerationResponse, Error> {
        if !prompt.has_content() {
            return Err(Error::EmptyPrompt);
        }
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }

        let next = self
            .responses
            .lock()
            .map_err(|_| Error::unavailable("scripted adapter lock poisoned"))?
            .pop_front();

        match (next, &self.fallback) {
            (Some(response), _) => response,
            (None, Some(fallback)) => Ok(fallback.clone()),
            (None, None) => Err(Error::unavailable("scripted adapter has no responses left")),
        }
    }

    fn adapter_type(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
