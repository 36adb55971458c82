pub mod api_models;
pub mod interceptor;
pub mod transport;

use self::api_models::{CallContext, RawResponse, RequestDescription};
use self::interceptor::{
    DefaultRequestInterceptor, DefaultResponseInterceptor, RequestInterceptor, ResponseInterceptor,
};
use self::transport::{HttpTransport, Transport};
use crate::error::{ConfigError, RequestError, Stage};
use crate::models::*;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    request_interceptors: Arc<[Arc<dyn RequestInterceptor>]>,
    response_interceptors: Arc<[Arc<dyn ResponseInterceptor>]>,
    process_config: Arc<RwLock<ProcessConfig>>,
    next_request_id: Arc<AtomicU64>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("request_interceptors", &self.request_interceptors.len())
            .field("response_interceptors", &self.response_interceptors.len())
            .field("process_config", &self.last_config())
            .finish()
    }
}

/// Wires the interceptor pipeline once. The default request/response pair always
/// runs first, extra interceptors follow in registration order.
pub struct ApiClientBuilder {
    transport: Arc<dyn Transport>,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
}

impl ApiClientBuilder {
    pub fn request_interceptor<I>(mut self, interceptor: I) -> Self
    where
        I: RequestInterceptor + 'static,
    {
        self.request_interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn response_interceptor<I>(mut self, interceptor: I) -> Self
    where
        I: ResponseInterceptor + 'static,
    {
        self.response_interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn build(self) -> ApiClient {
        ApiClient {
            transport: self.transport,
            request_interceptors: self.request_interceptors.into(),
            response_interceptors: self.response_interceptors.into(),
            process_config: Arc::new(RwLock::new(ProcessConfig::default())),
            next_request_id: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl ApiClient {
    pub fn builder<T>(transport: T) -> ApiClientBuilder
    where
        T: Transport + 'static,
    {
        ApiClientBuilder {
            transport: Arc::new(transport),
            request_interceptors: vec![Arc::new(DefaultRequestInterceptor)],
            response_interceptors: vec![Arc::new(DefaultResponseInterceptor)],
        }
    }

    pub fn new<T>(transport: T) -> ApiClient
    where
        T: Transport + 'static,
    {
        ApiClient::builder(transport).build()
    }

    /// Client over the http transport configured from `REQUEST_BASE_URL`.
    pub fn from_env() -> Result<ApiClient, ConfigError> {
        Ok(ApiClient::new(HttpTransport::from_env()?))
    }

    /// Preferences of the most recently started call.
    pub fn last_config(&self) -> ProcessConfig {
        *self
            .process_config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn dispatch<T>(&self, options: RequestOptions) -> Result<Dispatched<T>, RequestError>
    where
        T: DeserializeOwned,
    {
        if options.url.trim().is_empty() {
            return Err(RequestError::InvalidRequest("url is required".to_string()));
        }
        let ctx = self.begin(&options);

        let request = self.intercept_request(&ctx, options.into()).await?;
        if ctx.show_log {
            info!(
                "[Request] {} {} params={} data={}",
                request.method,
                request.url,
                serde_json::to_string(&request.params).unwrap_or_default(),
                request.data
            );
        }

        let response = match self.send(&ctx, request).await {
            Ok(response) => response,
            Err(e) => return Err(self.response_failed(&ctx, e)),
        };

        if ctx.response_type.is_binary() {
            if ctx.show_log {
                info!(
                    "[Response] {} {} ({} bytes)",
                    ctx.url,
                    response.status.as_u16(),
                    response.body.len()
                );
            }
            return Ok(Dispatched::Raw(response));
        }

        match response.json::<ApiResponse<T>>() {
            Ok(envelope) => {
                if ctx.show_log {
                    info!("[Response] {} {}", ctx.url, response.text());
                }
                Ok(Dispatched::Envelope(envelope))
            }
            Err(source) => Err(self.response_failed(&ctx, RequestError::Decode { source, response })),
        }
    }

    /// Envelope-only dispatch. Binary response types are rejected up front.
    pub async fn request<T>(&self, options: RequestOptions) -> Result<ApiResponse<T>, RequestError>
    where
        T: DeserializeOwned,
    {
        if options.response_type.is_binary() {
            return Err(RequestError::InvalidRequest(format!(
                "response type {} has no envelope, use download",
                options.response_type
            )));
        }
        self.dispatch::<T>(options).await?.envelope().ok_or_else(|| {
            RequestError::InvalidRequest("expected an envelope response".to_string())
        })
    }

    /// Raw response dispatch, `blob` unless another binary type was asked for.
    pub async fn download(&self, options: RequestOptions) -> Result<RawResponse, RequestError> {
        let options = if options.response_type.is_binary() {
            options
        } else {
            options.response_type(ResponseType::Blob)
        };
        self.dispatch::<serde_json::Value>(options)
            .await?
            .raw()
            .ok_or_else(|| RequestError::InvalidRequest("expected a raw response".to_string()))
    }

    pub async fn get<T>(&self, url: &str) -> Result<ApiResponse<T>, RequestError>
    where
        T: DeserializeOwned,
    {
        self.request(RequestOptions::get(url)).await
    }

    pub async fn post<T, U>(&self, url: &str, body: &U) -> Result<ApiResponse<T>, RequestError>
    where
        T: DeserializeOwned,
        U: Serialize,
    {
        let data = serde_json::to_value(body)
            .map_err(|e| RequestError::InvalidRequest(format!("unserialisable body: {}", e)))?;
        self.request(RequestOptions::post(url).data(data)).await
    }
}

/// Pipeline stages
impl ApiClient {
    // Records the caller's preferences and snapshots them for this call only
    fn begin(&self, options: &RequestOptions) -> CallContext {
        {
            let mut config = self
                .process_config
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            config.show_message = options.show_message;
            config.response_type = options.response_type;
        }
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        CallContext::new(request_id, options)
    }

    async fn intercept_request(
        &self,
        ctx: &CallContext,
        mut request: RequestDescription,
    ) -> Result<RequestDescription, RequestError> {
        for interceptor in self.request_interceptors.iter() {
            request = match interceptor.on_request(ctx, request).await {
                Ok(request) => request,
                Err(source) => {
                    let error = RequestError::Interceptor {
                        stage: Stage::Request,
                        source,
                    };
                    for interceptor in self.request_interceptors.iter() {
                        interceptor.on_request_error(ctx, &error);
                    }
                    return Err(error);
                }
            };
        }
        Ok(request)
    }

    async fn send(
        &self,
        ctx: &CallContext,
        request: RequestDescription,
    ) -> Result<RawResponse, RequestError> {
        let mut response = self.transport.send(request).await?;
        for interceptor in self.response_interceptors.iter() {
            response = interceptor
                .on_response(ctx, response)
                .await
                .map_err(|source| RequestError::Interceptor {
                    stage: Stage::Response,
                    source,
                })?;
        }
        Ok(response)
    }

    fn response_failed(&self, ctx: &CallContext, error: RequestError) -> RequestError {
        for interceptor in self.response_interceptors.iter() {
            interceptor.on_response_error(ctx, &error);
        }
        error
    }
}
