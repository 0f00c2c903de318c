use crate::{Error, GenerationOptions, GenerationResponse, Prompt};

/// A backend that turns a prompt into a normalized response.
///
/// Implementations perform exactly one backend call per `generate` and never
/// retry; errors reach the caller unchanged.
#[async_trait::async_trait]
pub trait ModelAdapter: Send + Sync + 'static {
    /// Generate the next response for `prompt`.
    async fn generate(
        &self,
        prompt: &Prompt,
        options: &GenerationOptions,
    ) -> Result<GenerationResponse, Error>;

    /// Short identifier of the backend family, e.g. `"google-genai"`.
    fn adapter_type(&self) -> &'static str;

    /// Model id requests are sent to.
    fn model(&self) -> &str;
}
