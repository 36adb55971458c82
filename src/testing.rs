use crate::api_client::api_models::{RawResponse, RequestDescription};
use crate::api_client::transport::Transport;
use crate::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt};
use reqwest::{header::HeaderMap, StatusCode};
use std::future::Future;
use std::sync::{Arc, Mutex};

type Handler =
    dyn Fn(RequestDescription) -> BoxFuture<'static, Result<RawResponse, TransportError>> + Send + Sync;

/// Transport double: records every request and answers with a user supplied handler.
#[derive(Clone)]
pub struct MockTransport {
    requests: Arc<Mutex<Vec<RequestDescription>>>,
    handler: Arc<Handler>,
}

impl MockTransport {
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(RequestDescription) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<RawResponse, TransportError>> + Send + 'static,
    {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            handler: Arc::new(move |request| handler(request).boxed()),
        }
    }

    pub fn replying(status: StatusCode, body: &'static str) -> Self {
        Self::new(move |_| async move {
            let response = raw_response(status, body);
            if status.is_success() {
                Ok(response)
            } else {
                Err(TransportError::Status { response })
            }
        })
    }

    pub fn requests(&self) -> Vec<RequestDescription> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: RequestDescription) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        (self.handler)(request).await
    }
}

pub fn raw_response(status: StatusCode, body: &'static str) -> RawResponse {
    RawResponse {
        status,
        headers: HeaderMap::new(),
        body: Bytes::from_static(body.as_bytes()),
    }
}

/// Collects everything the fmt subscriber writes on the current thread.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
