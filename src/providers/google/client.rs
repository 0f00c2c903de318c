use gcp_auth::TokenProvider;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use super::types::*;
use crate::adapter::ModelAdapter;
use crate::response::{FinishReason, Output, ToolDirective};
use crate::types::{GenerationOptions, Prompt, Segment, Usage};
use crate::{Error, GenerationResponse};

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Authentication method for Vertex AI.
pub enum VertexAuth {
    /// Use access token (passed as Bearer header)
    AccessToken(String),
    /// Use Application Default Credentials (ADC), resolved on first call
    ApplicationDefault,
}

/// Which Google service requests go to.
pub enum GoogleBackend {
    /// Gemini Developer API, authenticated with an API key.
    GeminiApi { api_key: Option<String> },
    /// Vertex AI, authenticated with a bearer token.
    VertexAi {
        project_id: String,
        location: String,
        auth: VertexAuth,
    },
}

/// Model adapter for Google Gen AI (Gemini) models.
pub struct GoogleGenAIAdapter {
    client: Client,
    model: String,
    backend: GoogleBackend,
    auth_manager: OnceCell<Arc<dyn TokenProvider>>,
    base_url: Option<String>,
}

impl GoogleGenAIAdapter {
    /// Create an adapter for the Gemini Developer API. A missing key is only
    /// reported when `generate` is called.
    pub fn gemini(model: impl Into<String>, api_key: Option<String>) -> Result<Self, Error> {
        Self::with_backend(model, GoogleBackend::GeminiApi { api_key })
    }

    /// Create an adapter for Gemini models served by Vertex AI.
    pub fn vertex(
        model: impl Into<String>,
        project_id: String,
        location: String,
        auth: VertexAuth,
    ) -> Result<Self, Error> {
        Self::with_backend(
            model,
            GoogleBackend::VertexAi {
                project_id,
                location,
                auth,
            },
        )
    }

    pub fn with_backend(model: impl Into<String>, backend: GoogleBackend) -> Result<Self, Error> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            client,
            model: model.into(),
            backend,
            auth_manager: OnceCell::new(),
            base_url: None,
        })
    }

    /// Send requests to a custom base URL (for testing).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn backend(&self) -> &GoogleBackend {
        &self.backend
    }

    /// Get the generateContent endpoint for the configured backend.
    fn endpoint(&self) -> String {
        match &self.backend {
            GoogleBackend::GeminiApi { .. } => format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url
                    .as_deref()
                    .unwrap_or(GEMINI_API_BASE)
                    .trim_end_matches('/'),
                self.model
            ),
            GoogleBackend::VertexAi {
                project_id,
                location,
                ..
            } => {
                let base = match &self.base_url {
                    Some(base_url) => base_url.trim_end_matches('/').to_string(),
                    None if location == "global" => {
                        "https://aiplatform.googleapis.com".to_string()
                    }
                    None => format!("https://{location}-aiplatform.googleapis.com"),
                };
                format!(
                    "{base}/v1/projects/{project_id}/locations/{location}/publishers/google/models/{}:generateContent",
                    self.model
                )
            }
        }
    }

    /// Attach credentials to the request.
    async fn authorize(&self, request_builder: RequestBuilder) -> Result<RequestBuilder, Error> {
        match &self.backend {
            GoogleBackend::GeminiApi { api_key } => match api_key.as_deref() {
                Some(key) if !key.trim().is_empty() => {
                    Ok(request_builder.header("x-goog-api-key", key))
                }
                _ => Err(Error::auth(
                    "no API key configured; set GEMINI_API_KEY or GOOGLE_API_KEY",
                )),
            },
            GoogleBackend::VertexAi { auth, .. } => match auth {
                VertexAuth::AccessToken(token) => Ok(request_builder.bearer_auth(token)),
                VertexAuth::ApplicationDefault => {
                    let auth_manager = self
                        .auth_manager
                        .get_or_try_init(|| async {
                            gcp_auth::provider().await.map_err(|e| {
                                Error::auth(format!("no Application Default Credentials: {e}"))
                            })
                        })
                        .await?;

                    let token = auth_manager
                        .token(&[CLOUD_PLATFORM_SCOPE])
                        .await
                        .map_err(|e| Error::auth(format!("Failed to get ADC token: {e}")))?;

                    Ok(request_builder.bearer_auth(token.as_str()))
                }
            },
        }
    }

    /// Convert a prompt and options to the Gemini request format.
    fn convert_request(
        prompt: &Prompt,
        options: &GenerationOptions,
    ) -> Result<GoogleRequest, Error> {
        let mut contents: Vec<GoogleContent> = Vec::new();
        let mut system_texts: Vec<&str> = Vec::new();

        for segment in prompt.segments() {
            match segment {
                Segment::System { content } => system_texts.push(content),
                Segment::User { content } => {
                    push_part(&mut contents, "user", GooglePart::text(content.clone()))
                }
                Segment::Model { content } => {
                    push_part(&mut contents, "model", GooglePart::text(content.clone()))
                }
                Segment::ToolCall { directive } => {
                    let args = serde_json::from_value(directive.arguments.clone()).map_err(|e| {
                        Error::provider("Google", format!("Invalid function arguments: {e}"))
                    })?;
                    push_part(
                        &mut contents,
                        "model",
                        GooglePart::FunctionCall {
                            function_call: GoogleFunctionCall {
                                name: directive.name.clone(),
                                args: Some(args),
                            },
                        },
                    );
                }
                Segment::ToolResult { name, output, .. } => push_part(
                    &mut contents,
                    "user",
                    GooglePart::FunctionResponse {
                        function_response: GoogleFunctionResponse {
                            name: name.clone(),
                            response: serde_json::json!({ "result": output }),
                        },
                    },
                ),
            }
        }

        // Google uses the system_instruction field for system segments
        let system_instruction = (!system_texts.is_empty()).then(|| GoogleContent {
            role: "user".to_string(),
            parts: vec![GooglePart::text(system_texts.join("\n\n"))],
        });

        let generation_config = (options.temperature.is_some()
            || options.max_output_tokens.is_some()
            || options.stop_sequences.is_some())
        .then(|| GoogleGenerationConfig {
            temperature: options.temperature,
            max_output_tokens: options.max_output_tokens,
            stop_sequences: options.stop_sequences.clone(),
        });

        let tools = (!options.tools.is_empty()).then(|| {
            vec![GoogleTool {
                function_declarations: options
                    .tools
                    .iter()
                    .map(|tool| GoogleFunctionDeclaration {
                        name: tool.name.clone(),
                        description: tool.description.clone(),
                        parameters: tool.parameters.clone(),
                    })
                    .collect(),
            }]
        });

        Ok(GoogleRequest {
            contents,
            system_instruction,
            generation_config,
            tools,
        })
    }

    /// Map a non-2xx reply to an error kind.
    fn classify_error(status: StatusCode, body: &str) -> Error {
        let message = serde_json::from_str::<GoogleErrorEnvelope>(body)
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| body.trim().to_string());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::auth(message),
            // Gemini rejects bad keys with 400 INVALID_ARGUMENT
            StatusCode::BAD_REQUEST if body.contains("API_KEY_INVALID") => Error::auth(message),
            StatusCode::TOO_MANY_REQUESTS => Error::unavailable(format!("HTTP {status}: {message}")),
            s if s.is_server_error() => Error::unavailable(format!("HTTP {status}: {message}")),
            _ => Error::provider("Google", format!("HTTP {status}: {message}")),
        }
    }

    /// Normalize a decoded reply into a final answer or a single tool directive.
    fn normalize(reply: GoogleResponse) -> Result<GenerationResponse, Error> {
        let usage = reply.usage_metadata.map(Usage::from).unwrap_or_default();

        let Some(candidate) = reply.candidates.into_iter().next() else {
            return Err(match reply.prompt_feedback.and_then(|f| f.block_reason) {
                Some(reason) => Error::malformed(format!("prompt blocked: {reason}")),
                None => Error::malformed("reply has no candidates"),
            });
        };

        let finish_reason = candidate.finish_reason.as_deref().map(|reason| match reason {
            "STOP" => FinishReason::Stop,
            "MAX_TOKENS" => FinishReason::Length,
            "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII" => {
                FinishReason::ContentFilter
            }
            other => FinishReason::Other(other.to_string()),
        });

        let Some(content) = candidate.content else {
            return Err(Error::malformed(format!(
                "candidate has no content (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("none")
            )));
        };

        let mut text = String::new();
        let mut calls = Vec::new();
        for part in content.parts {
            match part {
                GooglePart::Text { thought: Some(true), .. } => {}
                GooglePart::Text { text: chunk, .. } => text.push_str(&chunk),
                GooglePart::FunctionCall { function_call } => calls.push(function_call),
                GooglePart::FunctionResponse { .. } | GooglePart::Other(_) => {}
            }
        }

        let output = match calls.len() {
            0 if text.trim().is_empty() => {
                return Err(Error::malformed(
                    "reply contains neither text nor a function call",
                ))
            }
            0 => Output::FinalAnswer { text },
            1 => {
                let call = calls.remove(0);
                if call.name.is_empty() {
                    return Err(Error::malformed("function call without a name"));
                }
                if !text.is_empty() {
                    debug!(function = %call.name, "Dropping text that accompanies a function call");
                }
                let arguments = match call.args {
                    Some(args) => serde_json::to_value(&args)?,
                    None => serde_json::Value::Object(Default::default()),
                };
                Output::ToolDirective(ToolDirective::new(call.name, arguments))
            }
            n => {
                return Err(Error::malformed(format!(
                    "expected at most one function call, got {n}"
                )))
            }
        };

        Ok(GenerationResponse {
            output,
            finish_reason,
            usage,
        })
    }
}

/// Append a part to the last turn if it has the same role, otherwise open a new turn.
fn push_part(contents: &mut Vec<GoogleContent>, role: &str, part: GooglePart) {
    match contents.last_mut() {
        Some(last) if last.role == role => last.parts.push(part),
        _ => contents.push(GoogleContent {
            role: role.to_string(),
            parts: vec![part],
        }),
    }
}

#[async_trait::async_trait]
impl ModelAdapter for GoogleGenAIAdapter {
    #[instrument(name = "google_genai.generate", skip_all, fields(model = %self.model))]
    async fn generate(
        &self,
        prompt: &Prompt,
        options: &GenerationOptions,
    ) -> Result<GenerationResponse, Error> {
        if !prompt.has_content() {
            return Err(Error::EmptyPrompt);
        }

        let google_request = Self::convert_request(prompt, options)?;
        let endpoint = self.endpoint();

        let request_builder = self.client.post(&endpoint).json(&google_request);
        let request_builder = self.authorize(request_builder).await?;

        debug!(url = %endpoint, segments = prompt.segments().len(), "Sending generateContent request");
        let response = request_builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::classify_error(status, &error_text));
        }

        let body = response.text().await?;
        let reply: GoogleResponse = serde_json::from_str(&body)
            .map_err(|e| Error::malformed(format!("Failed to parse reply: {e}")))?;

        let normalized = Self::normalize(reply)?;
        debug!(
            input_tokens = normalized.usage.input_tokens,
            output_tokens = normalized.usage.output_tokens,
            total_tokens = normalized.usage.total_tokens,
            "generateContent completed"
        );
        Ok(normalized)
    }

    fn adapter_type(&self) -> &'static str {
        "google-genai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
