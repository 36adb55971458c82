use super::api_models::{RawResponse, RequestDescription};
use crate::config::Config;
use crate::error::{ConfigError, TransportError};
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// The network boundary of the client: one request in, one response out.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: RequestDescription) -> Result<RawResponse, TransportError>;
}

/// reqwest-backed transport bound to a base url, a fixed timeout and default headers.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<HttpTransport, ConfigError> {
        let client = reqwest::ClientBuilder::new()
            .default_headers(config.default_headers.clone())
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(ConfigError::Client)?;
        Ok(HttpTransport {
            client,
            base_url: config.base_url.clone(),
            timeout: config.timeout,
        })
    }

    pub fn from_env() -> Result<HttpTransport, ConfigError> {
        HttpTransport::new(&Config::from_env()?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn resolve(&self, path: &str) -> Result<Url, TransportError> {
        // relative paths always extend the base path, absolute urls replace it
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| TransportError::InvalidUrl(path.to_string(), e))
    }

    fn map_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else {
            TransportError::Network(e)
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: RequestDescription) -> Result<RawResponse, TransportError> {
        let mut url = self.resolve(&request.url)?;
        let query = request.query_pairs();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .headers(request.headers.clone());
        if request.sends_body() {
            builder = builder.json(&request.data);
        }

        let response = builder.send().await.map_err(|e| self.map_error(e))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| self.map_error(e))?;
        let response = RawResponse {
            status,
            headers,
            body,
        };
        if !status.is_success() {
            return Err(TransportError::Status { response });
        }
        Ok(response)
    }
}
