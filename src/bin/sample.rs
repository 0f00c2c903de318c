use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use genai_agent::agent::AgentRunner;
use genai_agent::tools::{Calculator, ToolSet};
use genai_agent::{AdapterConfig, GenerationOptions, ModelAdapter, Prompt, PromptTemplate};

const QUESTION: &str = "What is the capital of France?";
const MATH_QUESTION: &str = "What is 12 * (7 + 3)?";

/// Render a template, send it to the model and return the answer text.
async fn run_chain(adapter: &dyn ModelAdapter) -> Result<String> {
    let template = PromptTemplate::new(["question"], "Answer concisely: {{ question }}")?;
    let rendered = template.render(&HashMap::from([("question", QUESTION)]))?;

    let response = adapter
        .generate(&Prompt::user(rendered), &GenerationOptions::default())
        .await?;
    response
        .text()
        .map(str::to_string)
        .context("model replied with a tool call instead of an answer")
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    genai_agent::telemetry::init_tracing();

    let config = AdapterConfig::from_env()?;
    let adapter: Arc<dyn ModelAdapter> = Arc::new(config.build()?);

    println!("=== Chain ===");
    println!("Q: {QUESTION}");
    println!("A: {}", run_chain(adapter.as_ref()).await?);

    println!("\n=== Agent ===");
    println!("Q: {MATH_QUESTION}");
    let runner = AgentRunner::new(adapter, ToolSet::new().with(Calculator));
    match runner.run(MATH_QUESTION).await {
        Ok(answer) => println!("A: {answer}"),
        Err(e) => println!("Agent failed: {e}"),
    }

    Ok(())
}
