use crate::providers::google::{GoogleGenAIAdapter, VertexAuth, DEFAULT_MODEL};
use crate::Error;
use std::env;
use std::fmt;

/// Default Vertex AI region.
pub const DEFAULT_LOCATION: &str = "us-central1";

/// Which Google service the adapter talks to.
#[derive(Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// Gemini Developer API. The key is not validated until the first call.
    GeminiApi { api_key: Option<String> },
    /// Vertex AI. Without an access token, Application Default Credentials are used.
    VertexAi {
        project_id: String,
        location: String,
        access_token: Option<String>,
    },
}

// Credentials are reported as set/unset, never printed
impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendConfig::GeminiApi { api_key } => f
                .debug_struct("GeminiApi")
                .field("api_key_set", &api_key.is_some())
                .finish(),
            BackendConfig::VertexAi {
                project_id,
                location,
                access_token,
            } => f
                .debug_struct("VertexAi")
                .field("project_id", project_id)
                .field("location", location)
                .field("access_token_set", &access_token.is_some())
                .finish(),
        }
    }
}

/// Configuration for creating the model adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    pub model: String,
    pub backend: BackendConfig,
}

impl AdapterConfig {
    /// Configuration for the Gemini Developer API.
    pub fn gemini(model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            model: model.into(),
            backend: BackendConfig::GeminiApi { api_key },
        }
    }

    /// Configuration for Vertex AI.
    pub fn vertex(
        model: impl Into<String>,
        project_id: impl Into<String>,
        location: impl Into<String>,
        access_token: Option<String>,
    ) -> Self {
        Self {
            model: model.into(),
            backend: BackendConfig::VertexAi {
                project_id: project_id.into(),
                location: location.into(),
                access_token,
            },
        }
    }

    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    ///
    /// Recognized variables: `GENAI_MODEL`, `GEMINI_API_KEY` (falls back to
    /// `GOOGLE_API_KEY`), `GOOGLE_GENAI_USE_VERTEXAI`, `GOOGLE_CLOUD_PROJECT`,
    /// `GOOGLE_CLOUD_LOCATION` and `VERTEX_ACCESS_TOKEN`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let model = var("GENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let use_vertex = var("GOOGLE_GENAI_USE_VERTEXAI")
            .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        if use_vertex {
            let project_id = var("GOOGLE_CLOUD_PROJECT").ok_or_else(|| {
                Error::config("GOOGLE_CLOUD_PROJECT environment variable is required for Vertex AI")
            })?;
            let location =
                var("GOOGLE_CLOUD_LOCATION").unwrap_or_else(|| DEFAULT_LOCATION.to_string());
            return Ok(Self::vertex(
                model,
                project_id,
                location,
                var("VERTEX_ACCESS_TOKEN"),
            ));
        }

        let api_key = var("GEMINI_API_KEY").or_else(|| var("GOOGLE_API_KEY"));
        Ok(Self::gemini(model, api_key))
    }

    /// Build the adapter described by this configuration.
    pub fn build(&self) -> Result<GoogleGenAIAdapter, Error> {
        match &self.backend {
            BackendConfig::GeminiApi { api_key } => {
                GoogleGenAIAdapter::gemini(self.model.clone(), api_key.clone())
            }
            BackendConfig::VertexAi {
                project_id,
                location,
                access_token,
            } => {
                let auth = match access_token {
                    Some(token) => VertexAuth::AccessToken(token.clone()),
                    None => VertexAuth::ApplicationDefault,
                };
                GoogleGenAIAdapter::vertex(
                    self.model.clone(),
                    project_id.clone(),
                    location.clone(),
                    auth,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = AdapterConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.backend, BackendConfig::GeminiApi { api_key: None });
    }

    #[test]
    fn test_api_key_fallback_order() {
        let config = AdapterConfig::from_lookup(lookup(&[
            ("GOOGLE_API_KEY", "google-key"),
            ("GEMINI_API_KEY", "gemini-key"),
        ]))
        .unwrap();
        assert_eq!(
            config.backend,
            BackendConfig::GeminiApi {
                api_key: Some("gemini-key".to_string())
            }
        );

        let config =
            AdapterConfig::from_lookup(lookup(&[("GOOGLE_API_KEY", "google-key")])).unwrap();
        assert_eq!(
            config.backend,
            BackendConfig::GeminiApi {
                api_key: Some("google-key".to_string())
            }
        );
    }

    #[test]
    fn test_blank_key_is_treated_as_missing() {
        let config = AdapterConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "  ")])).unwrap();
        assert_eq!(config.backend, BackendConfig::GeminiApi { api_key: None });
    }

    #[test]
    fn test_vertex_configuration() {
        let config = AdapterConfig::from_lookup(lookup(&[
            ("GOOGLE_GENAI_USE_VERTEXAI", "true"),
            ("GOOGLE_CLOUD_PROJECT", "test-project"),
            ("GENAI_MODEL", "gemini-2.0-flash"),
        ]))
        .unwrap();

        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(
            config.backend,
            BackendConfig::VertexAi {
                project_id: "test-project".to_string(),
                location: "us-central1".to_string(),
                access_token: None,
            }
        );
    }

    #[test]
    fn test_vertex_requires_project() {
        let err = AdapterConfig::from_lookup(lookup(&[("GOOGLE_GENAI_USE_VERTEXAI", "1")]))
            .unwrap_err();
        assert!(err.to_string().contains("GOOGLE_CLOUD_PROJECT"));
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let config = AdapterConfig::gemini("gemini-2.5-flash", Some("secret-key".to_string()));
        let printed = format!("{config:?}");
        assert!(!printed.contains("secret-key"));
        assert!(printed.contains("api_key_set: true"));

        let backend = AdapterConfig::vertex(
            "gemini-2.5-flash",
            "test-project",
            "us-central1",
            Some("secret-token".to_string()),
        )
        .backend;
        let printed = format!("{backend:?}");
        assert!(!printed.contains("secret-token"));
        assert!(printed.contains("access_token_set: true"));
        assert!(printed.contains("test-project"));
    }

    #[test]
    fn test_build_adapter() {
        use crate::ModelAdapter;

        let adapter = AdapterConfig::gemini("gemini-2.5-flash", None).build().unwrap();
        assert_eq!(adapter.model(), "gemini-2.5-flash");
        assert_eq!(adapter.adapter_type(), "google-genai");
    }
}
