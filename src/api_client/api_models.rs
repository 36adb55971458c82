use crate::models::{RequestOptions, ResponseType};
use bytes::Bytes;
use reqwest::{header::HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

//
// Transport-level request, as seen by request interceptors and the transport.
// Headers here are per-call extras, merged over the transport's defaults.
//
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescription {
    pub method: Method,
    pub url: String,
    pub params: Map<String, Value>,
    pub data: Value,
    pub response_type: ResponseType,
    pub headers: HeaderMap,
}

impl From<RequestOptions> for RequestDescription {
    fn from(options: RequestOptions) -> Self {
        RequestDescription {
            method: options.method,
            url: options.url,
            params: options.params,
            data: options.data,
            response_type: options.response_type,
            headers: HeaderMap::new(),
        }
    }
}

impl RequestDescription {
    pub fn sends_body(&self) -> bool {
        !matches!(self.method, Method::GET | Method::HEAD)
    }

    // Flattened query pairs: null is skipped, arrays repeat as `key[]`,
    // objects are sent as json text
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (key, value) in &self.params {
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    let key = format!("{}[]", key);
                    pairs.extend(
                        items
                            .iter()
                            .filter(|item| !item.is_null())
                            .map(|item| (key.clone(), query_value(item))),
                    );
                }
                _ => pairs.push((key.clone(), query_value(value))),
            }
        }
        pairs
    }
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

//
// Full response as received from the transport.
//
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T>(&self) -> serde_json::Result<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_slice(&self.body)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Per-call snapshot handed to every interceptor hook.
#[derive(Debug, Clone, PartialEq)]
pub struct CallContext {
    pub request_id: u64,
    pub method: Method,
    pub url: String,
    pub response_type: ResponseType,
    pub show_message: bool,
    pub show_log: bool,
}

impl CallContext {
    pub fn new(request_id: u64, options: &RequestOptions) -> CallContext {
        CallContext {
            request_id,
            method: options.method.clone(),
            url: options.url.clone(),
            response_type: options.response_type,
            show_message: options.show_message,
            show_log: options.show_log,
        }
    }
}
