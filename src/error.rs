use thiserror::Error;

/// Errors raised by model adapters.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Prompt must contain at least one non-system segment")]
    EmptyPrompt,
}

impl Error {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Error::Authentication(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Error::BackendUnavailable(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedResponse(message.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::MalformedResponse(err.to_string())
        } else {
            Error::BackendUnavailable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedResponse(err.to_string())
    }
}

/// Errors raised by a tool. These are fed back to the model rather than
/// aborting an agent run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

/// Terminal failures of an agent run.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] Error),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Iteration limit exceeded: no final answer after {0} model calls")]
    IterationLimitExceeded(usize),
}

/// Errors from the weather forecast client.
#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Location '{0}' not found")]
    LocationNotFound(String),

    #[error("Malformed forecast: {0}")]
    MalformedForecast(String),
}
