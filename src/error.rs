use crate::api_client::api_models::RawResponse;
use std::time::Duration;
use strum::{AsRefStr, Display};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub const FALLBACK_MESSAGE: &str = "network error";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingBaseUrl(&'static str),

    #[error("Invalid base url {0:?}: {1}")]
    InvalidBaseUrl(String, #[source] url::ParseError),

    #[error("Invalid timeout {0:?}, expected milliseconds")]
    InvalidTimeout(String),

    #[error("Failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("timeout of {}ms exceeded", .0.as_millis())]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("request failed with status code {}", .response.status.as_u16())]
    Status { response: RawResponse },

    #[error("invalid request url {0:?}: {1}")]
    InvalidUrl(String, #[source] url::ParseError),
}

impl TransportError {
    pub fn response(&self) -> Option<&RawResponse> {
        match self {
            TransportError::Status { response } => Some(response),
            _ => None,
        }
    }
}

/// Raised by an interceptor hook, e.g. when an auth token cannot be produced.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct InterceptorError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl InterceptorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Stage {
    Request,
    Response,
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("{stage} interceptor failed: {source}")]
    Interceptor {
        stage: Stage,
        #[source]
        source: InterceptorError,
    },

    #[error("unexpected response body: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        response: RawResponse,
    },
}

impl RequestError {
    /// The raw response attached to the failure, if the server replied at all.
    pub fn response(&self) -> Option<&RawResponse> {
        match self {
            RequestError::Transport(e) => e.response(),
            RequestError::Decode { response, .. } => Some(response),
            _ => None,
        }
    }

    /// The `msg` field of the error payload, when the server sent a non-empty one.
    pub fn server_message(&self) -> Option<String> {
        let body: serde_json::Value = self.response()?.json().ok()?;
        match body.get("msg")? {
            serde_json::Value::String(msg) if !msg.is_empty() => Some(msg.clone()),
            _ => None,
        }
    }

    /// Human readable description used by the error hooks. Prefers the server's
    /// `msg`, then the error's own text (an interceptor's bare message), then a generic fallback.
    pub fn display_message(&self) -> String {
        if let Some(msg) = self.server_message() {
            return msg;
        }
        let msg = match self {
            RequestError::Interceptor { source, .. } => source.message().to_string(),
            _ => self.to_string(),
        };
        if msg.trim().is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            msg
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use bytes::Bytes;
    use reqwest::{header::HeaderMap, StatusCode};

    fn status_error(status: StatusCode, body: &'static str) -> RequestError {
        RequestError::Transport(TransportError::Status {
            response: RawResponse {
                status,
                headers: HeaderMap::new(),
                body: Bytes::from_static(body.as_bytes()),
            },
        })
    }

    #[test]
    fn test_display_message_prefers_server_msg() {
        let err = status_error(StatusCode::NOT_FOUND, r#"{"code":404,"msg":"not found","data":null}"#);
        assert_eq!(err.server_message(), Some("not found".to_string()));
        assert_eq!(err.display_message(), "not found");
    }

    #[test]
    fn test_display_message_falls_back_to_error_text() {
        let err = status_error(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert_eq!(err.server_message(), None);
        assert_eq!(err.display_message(), "request failed with status code 502");

        let err = status_error(StatusCode::BAD_REQUEST, r#"{"msg":""}"#);
        assert_eq!(err.display_message(), "request failed with status code 400");

        let err = RequestError::Transport(TransportError::Timeout(Duration::from_millis(10_000)));
        assert_eq!(err.display_message(), "timeout of 10000ms exceeded");
        assert!(err.response().is_none());
    }

    #[test]
    fn test_display_message_generic_fallback() {
        let err = RequestError::Interceptor {
            stage: Stage::Request,
            source: InterceptorError::new(""),
        };
        assert_eq!(err.display_message(), FALLBACK_MESSAGE);

        let err = RequestError::Interceptor {
            stage: Stage::Response,
            source: InterceptorError::new("token store unavailable"),
        };
        assert_eq!(err.display_message(), "token store unavailable");
        assert_eq!(
            err.to_string(),
            "response interceptor failed: token store unavailable"
        );
    }
}
