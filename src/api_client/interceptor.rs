use super::api_models::{CallContext, RawResponse, RequestDescription};
use crate::error::{InterceptorError, RequestError};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::*;

/// Hook run on every outgoing request, in registration order.
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    /// May rewrite the request (add headers, adjust params) before it is sent
    async fn on_request(
        &self,
        ctx: &CallContext,
        request: RequestDescription,
    ) -> Result<RequestDescription, InterceptorError>;

    /// Observes a request-stage failure. The error is returned to the caller afterwards.
    fn on_request_error(&self, _ctx: &CallContext, _error: &RequestError) {}
}

/// Hook run on every response received from the transport, in registration order.
#[async_trait]
pub trait ResponseInterceptor: Send + Sync {
    async fn on_response(
        &self,
        ctx: &CallContext,
        response: RawResponse,
    ) -> Result<RawResponse, InterceptorError>;

    /// Observes a send/response-stage failure. The error is returned to the caller afterwards.
    fn on_response_error(&self, _ctx: &CallContext, _error: &RequestError) {}
}

#[derive(Debug, Clone, Default)]
pub struct DefaultRequestInterceptor;

#[async_trait]
impl RequestInterceptor for DefaultRequestInterceptor {
    async fn on_request(
        &self,
        _ctx: &CallContext,
        request: RequestDescription,
    ) -> Result<RequestDescription, InterceptorError> {
        Ok(request)
    }

    fn on_request_error(&self, ctx: &CallContext, error: &RequestError) {
        if ctx.show_log {
            error!(
                "[{}] request configuration error: {}",
                ctx.request_id, error
            );
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DefaultResponseInterceptor;

#[async_trait]
impl ResponseInterceptor for DefaultResponseInterceptor {
    async fn on_response(
        &self,
        _ctx: &CallContext,
        response: RawResponse,
    ) -> Result<RawResponse, InterceptorError> {
        // pass-through for every kind, binary callers get this value as-is
        Ok(response)
    }

    fn on_response_error(&self, ctx: &CallContext, error: &RequestError) {
        if ctx.show_log {
            error!("request failed: {}", error.display_message());
        }
    }
}

/// Attaches `Authorization: Bearer <token>` once a token has been set.
#[derive(Debug, Clone, Default)]
pub struct BearerAuth {
    token: Arc<RwLock<Option<String>>>,
}

impl BearerAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_token(&self, token: &str) {
        let mut guard = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(token.to_string());
    }

    pub fn clear_token(&self) {
        let mut guard = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl RequestInterceptor for BearerAuth {
    async fn on_request(
        &self,
        _ctx: &CallContext,
        mut request: RequestDescription,
    ) -> Result<RequestDescription, InterceptorError> {
        if let Some(token) = self.token() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| InterceptorError::with_source("invalid auth token", e))?;
            request.headers.insert(AUTHORIZATION, value);
        }
        Ok(request)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::models::{RequestOptions, ResponseType};
    use bytes::Bytes;
    use reqwest::{header::HeaderMap, StatusCode};

    fn ctx(options: &RequestOptions) -> CallContext {
        CallContext::new(1, options)
    }

    #[tokio::test]
    async fn test_bearer_auth() {
        let options = RequestOptions::get("/me");
        let auth = BearerAuth::new();

        let request = auth
            .on_request(&ctx(&options), options.clone().into())
            .await
            .unwrap();
        assert!(request.headers.get(AUTHORIZATION).is_none());

        auth.set_token("abc123");
        let request = auth
            .on_request(&ctx(&options), options.clone().into())
            .await
            .unwrap();
        assert_eq!(request.headers.get(AUTHORIZATION).unwrap(), "Bearer abc123");

        auth.clear_token();
        assert_eq!(auth.token(), None);
    }

    #[tokio::test]
    async fn test_bearer_auth_rejects_bad_token() {
        let options = RequestOptions::get("/me");
        let auth = BearerAuth::new();
        auth.set_token("line\nbreak");
        let err = auth
            .on_request(&ctx(&options), options.clone().into())
            .await
            .unwrap_err();
        assert_eq!(err.message(), "invalid auth token");
    }

    #[tokio::test]
    async fn test_default_response_interceptor_passes_through() {
        let response = RawResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::from_static(b"\x89PNG"),
        };
        for response_type in [ResponseType::Json, ResponseType::Blob] {
            let options = RequestOptions::get("/file").response_type(response_type);
            let out = DefaultResponseInterceptor
                .on_response(&ctx(&options), response.clone())
                .await
                .unwrap();
            assert_eq!(out, response);
        }
    }
}
