//! Error types for the Ollama adapter

use thiserror::Error;
use toolgate_application::ports::llm_gateway::GatewayError;

/// Errors that can occur when talking to an Ollama-compatible server
#[derive(Error, Debug)]
pub enum OllamaError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Cannot reach {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<OllamaError> for GatewayError {
    fn from(err: OllamaError) -> Self {
        match err {
            OllamaError::Connection { .. } => GatewayError::ConnectionError(err.to_string()),
            OllamaError::Http(ref e) if e.is_connect() => {
                GatewayError::ConnectionError(err.to_string())
            }
            OllamaError::Http(ref e) if e.is_timeout() => GatewayError::Timeout,
            OllamaError::ModelNotFound(model) => GatewayError::ModelNotAvailable(model),
            OllamaError::Status { .. } | OllamaError::Http(_) | OllamaError::Backend(_) => {
                GatewayError::RequestFailed(err.to_string())
            }
            OllamaError::Decode(_) => GatewayError::InvalidResponse(err.to_string()),
            OllamaError::ClientBuild(_) => GatewayError::Other(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_to_gateway_errors() {
        assert_eq!(
            GatewayError::from(OllamaError::ModelNotFound("qwen3:14b".into())),
            GatewayError::ModelNotAvailable("qwen3:14b".into())
        );
        assert_eq!(
            GatewayError::from(OllamaError::Status {
                status: 500,
                body: "boom".into()
            }),
            GatewayError::RequestFailed("Server returned 500: boom".into())
        );
        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(
            GatewayError::from(OllamaError::Decode(decode)),
            GatewayError::InvalidResponse(_)
        ));
    }
}
