use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::transcript::Transcript;
use crate::adapter::ModelAdapter;
use crate::error::AgentError;
use crate::response::Output;
use crate::tools::ToolSet;
use crate::types::GenerationOptions;

/// Default cap on model calls per run.
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a helpful assistant. \
Use the available tools whenever they help answer the question, \
then reply with the final answer.";

/// Phase of an agent run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Awaiting a model response
    Thinking,
    /// Executing a requested tool
    ToolDispatch,
    Done,
    Failed,
}

/// Configuration for an agent runner.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Maximum number of model calls before the run fails. A directive
    /// returned by the last allowed call is recorded but not dispatched.
    pub max_iterations: usize,
    pub system_instruction: Option<String>,
    /// Options for every model call; tool declarations are filled in by the runner
    pub options: GenerationOptions,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            system_instruction: Some(DEFAULT_SYSTEM_INSTRUCTION.to_string()),
            options: GenerationOptions::default(),
        }
    }
}

impl AgentConfig {
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_system_instruction(mut self, instruction: Option<String>) -> Self {
        self.system_instruction = instruction;
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }
}

/// Outcome of one run along with the phases it went through.
#[derive(Debug)]
pub struct AgentRun {
    pub result: Result<String, AgentError>,
    pub phases: Vec<Phase>,
    pub transcript: Transcript,
}

impl AgentRun {
    pub fn into_result(self) -> Result<String, AgentError> {
        self.result
    }
}

/// Alternates model calls and tool calls until the model answers.
pub struct AgentRunner {
    adapter: Arc<dyn ModelAdapter>,
    tools: ToolSet,
    config: AgentConfig,
}

impl AgentRunner {
    pub fn new(adapter: Arc<dyn ModelAdapter>, tools: ToolSet) -> Self {
        Self::with_config(adapter, tools, AgentConfig::default())
    }

    pub fn with_config(adapter: Arc<dyn ModelAdapter>, tools: ToolSet, config: AgentConfig) -> Self {
        Self {
            adapter,
            tools,
            config,
        }
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    /// Run the agent and return the final answer.
    pub async fn run(&self, request: &str) -> Result<String, AgentError> {
        self.run_traced(request).await.into_result()
    }

    /// Run the agent, keeping the phase trace and transcript.
    #[instrument(name = "agent.run", skip_all, fields(adapter = self.adapter.adapter_type(), model = %self.adapter.model()))]
    pub async fn run_traced(&self, request: &str) -> AgentRun {
        let mut transcript = Transcript::new(request);
        let mut phases = vec![Phase::Thinking];
        let options = self
            .config
            .options
            .clone()
            .tools(self.tools.declarations());

        for iteration in 0..self.config.max_iterations {
            debug!(iteration = iteration + 1, "Agent iteration");

            let prompt = transcript.to_prompt(self.config.system_instruction.as_deref());
            let response = match self.adapter.generate(&prompt, &options).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(error = %e, "Model call failed");
                    return fail(AgentError::Model(e), phases, transcript);
                }
            };

            let directive = match response.output.clone() {
                Output::FinalAnswer { text } => {
                    transcript.push_response(response);
                    phases.push(Phase::Done);
                    info!(iterations = iteration + 1, "Agent produced a final answer");
                    return AgentRun {
                        result: Ok(text),
                        phases,
                        transcript,
                    };
                }
                Output::ToolDirective(directive) => directive,
            };
            transcript.push_response(response);

            // No model call is left to consume the tool result
            if iteration + 1 == self.config.max_iterations {
                break;
            }

            let Some(tool) = self.tools.get(&directive.name) else {
                warn!(tool = %directive.name, "Model requested an unknown tool");
                return fail(AgentError::UnknownTool(directive.name), phases, transcript);
            };

            phases.push(Phase::ToolDispatch);
            let output = match tool.call(&directive.arguments) {
                Ok(output) => {
                    debug!(tool = %directive.name, output = %output, "Tool succeeded");
                    output
                }
                Err(e) => {
                    warn!(tool = %directive.name, error = %e, "Tool failed; returning error to the model");
                    format!("Error: {e}")
                }
            };
            transcript.push_tool_result(directive, output);
            phases.push(Phase::Thinking);
        }

        warn!(max_iterations = self.config.max_iterations, "Agent hit the iteration limit");
        fail(
            AgentError::IterationLimitExceeded(self.config.max_iterations),
            phases,
            transcript,
        )
    }
}

fn fail(error: AgentError, mut phases: Vec<Phase>, transcript: Transcript) -> AgentRun {
    phases.push(Phase::Failed);
    AgentRun {
        result: Err(error),
        phases,
        transcript,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::transcript::Entry;
    use crate::providers::ScriptedAdapter;
    use crate::tools::Calculator;
    use crate::{Error, GenerationResponse, Segment};
    use serde_json::json;

    fn runner(adapter: Arc<ScriptedAdapter>) -> AgentRunner {
        AgentRunner::new(adapter, ToolSet::new().with(Calculator))
    }

    #[tokio::test]
    async fn test_calculator_round_trip() {
        let adapter = Arc::new(ScriptedAdapter::new(vec![
            Ok(GenerationResponse::directive(
                "calculator",
                json!({"expression": "2+2"}),
            )),
            Ok(GenerationResponse::answer("2 + 2 = 4")),
        ]));

        let run = runner(adapter.clone()).run_traced("What is 2+2?").await;

        assert_eq!(
            run.phases,
            vec![Phase::Thinking, Phase::ToolDispatch, Phase::Thinking, Phase::Done]
        );
        assert!(run.result.unwrap().contains('4'));

        // Second prompt carries the tool result back to the model
        let prompts = adapter.prompts();
        assert_eq!(prompts.len(), 2);
        let last = prompts[1].segments().last().unwrap();
        assert!(matches!(last, Segment::ToolResult { name, output, .. } if name == "calculator" && output == "4"));
    }

    #[tokio::test]
    async fn test_unknown_tool_fails() {
        let adapter = Arc::new(ScriptedAdapter::new(vec![Ok(GenerationResponse::directive(
            "weather",
            json!({"city": "Paris"}),
        ))]));

        let run = runner(adapter).run_traced("Weather in Paris?").await;

        assert_eq!(run.phases, vec![Phase::Thinking, Phase::Failed]);
        assert!(matches!(run.result, Err(AgentError::UnknownTool(ref name)) if name == "weather"));
    }

    #[tokio::test]
    async fn test_iteration_limit() {
        let adapter = Arc::new(ScriptedAdapter::repeating(GenerationResponse::directive(
            "calculator",
            json!({"expression": "1+1"}),
        )));

        let run = runner(adapter.clone()).run_traced("Loop forever").await;

        assert!(matches!(
            run.result,
            Err(AgentError::IterationLimitExceeded(DEFAULT_MAX_ITERATIONS))
        ));
        assert_eq!(adapter.calls(), DEFAULT_MAX_ITERATIONS);
        assert_eq!(run.phases.last(), Some(&Phase::Failed));
    }

    #[tokio::test]
    async fn test_custom_iteration_limit() {
        let adapter = Arc::new(ScriptedAdapter::repeating(GenerationResponse::directive(
            "calculator",
            json!({"expression": "1+1"}),
        )));
        let runner = AgentRunner::with_config(
            adapter.clone(),
            ToolSet::new().with(Calculator),
            AgentConfig::default().with_max_iterations(3),
        );

        let result = runner.run("Loop").await;
        assert!(matches!(result, Err(AgentError::IterationLimitExceeded(3))));
        assert_eq!(adapter.calls(), 3);
    }

    #[tokio::test]
    async fn test_last_directive_is_not_dispatched() {
        let adapter = Arc::new(ScriptedAdapter::repeating(GenerationResponse::directive(
            "calculator",
            json!({"expression": "1+1"}),
        )));
        let runner = AgentRunner::with_config(
            adapter.clone(),
            ToolSet::new().with(Calculator),
            AgentConfig::default().with_max_iterations(2),
        );

        let run = runner.run_traced("Loop").await;

        assert_eq!(
            run.phases,
            vec![Phase::Thinking, Phase::ToolDispatch, Phase::Thinking, Phase::Failed]
        );
        let tool_results = run
            .transcript
            .entries()
            .iter()
            .filter(|entry| matches!(entry, Entry::ToolResult { .. }))
            .count();
        assert_eq!(tool_results, 1);
        assert_eq!(adapter.calls(), 2);
    }

    #[tokio::test]
    async fn test_tool_error_is_fed_back() {
        let adapter = Arc::new(ScriptedAdapter::new(vec![
            Ok(GenerationResponse::directive(
                "calculator",
                json!({"expression": "abc"}),
            )),
            Ok(GenerationResponse::answer("I could not compute that.")),
        ]));

        let run = runner(adapter).run_traced("What is abc?").await;

        assert_eq!(run.result.unwrap(), "I could not compute that.");
        let tool_output = run
            .transcript
            .entries()
            .iter()
            .find_map(|entry| match entry {
                Entry::ToolResult { output, .. } => Some(output.clone()),
                _ => None,
            })
            .unwrap();
        assert!(tool_output.starts_with("Error: Invalid expression"));
    }

    #[tokio::test]
    async fn test_adapter_error_propagates_unchanged() {
        let adapter = Arc::new(ScriptedAdapter::new(vec![Err(Error::auth(
            "no API key configured",
        ))]));

        let run = runner(adapter).run_traced("Hello").await;

        assert_eq!(run.phases, vec![Phase::Thinking, Phase::Failed]);
        match run.result {
            Err(AgentError::Model(Error::Authentication(msg))) => {
                assert_eq!(msg, "no API key configured")
            }
            other => panic!("expected authentication failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transcript_only_grows() {
        let adapter = Arc::new(ScriptedAdapter::new(vec![
            Ok(GenerationResponse::directive("calculator", json!({"expression": "3*4"}))),
            Ok(GenerationResponse::directive("calculator", json!({"expression": "12+1"}))),
            Ok(GenerationResponse::answer("13")),
        ]));

        let run = runner(adapter.clone()).run_traced("3*4+1?").await;
        assert_eq!(run.result.unwrap(), "13");
        assert_eq!(run.transcript.len(), 6);

        // Each prompt extends the previous one
        let prompts = adapter.prompts();
        for pair in prompts.windows(2) {
            let (before, after) = (pair[0].segments(), pair[1].segments());
            assert!(after.len() > before.len());
            assert_eq!(&after[..before.len()], before);
        }
    }

    #[tokio::test]
    async fn test_tool_declarations_are_offered() {
        struct AssertTools;

        #[async_trait::async_trait]
        impl ModelAdapter for AssertTools {
            async fn generate(
                &self,
                _prompt: &crate::Prompt,
                options: &GenerationOptions,
            ) -> Result<GenerationResponse, Error> {
                assert_eq!(options.tools.len(), 1);
                assert_eq!(options.tools[0].name, "calculator");
                assert_eq!(options.temperature, Some(0.0));
                Ok(GenerationResponse::answer("ok"))
            }

            fn adapter_type(&self) -> &'static str {
                "assert"
            }

            fn model(&self) -> &str {
                "assert"
            }
        }

        let runner = AgentRunner::with_config(
            Arc::new(AssertTools),
            ToolSet::new().with(Calculator),
            AgentConfig::default().with_options(GenerationOptions::new().temperature(0.0)),
        );
        assert_eq!(runner.run("hi").await.unwrap(), "ok");
    }
}
