use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString};

/// How the caller wants the response body handed back.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ResponseType {
    #[default]
    Json,
    Text,
    Blob,
    ArrayBuffer,
}

impl ResponseType {
    // binary kinds skip envelope decoding and return the raw response
    pub fn is_binary(&self) -> bool {
        matches!(self, ResponseType::Blob | ResponseType::ArrayBuffer)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub url: String,
    pub method: Method,
    pub params: Map<String, Value>,
    pub data: Value,
    pub response_type: ResponseType,
    pub show_message: bool,
    pub show_log: bool,
}

impl RequestOptions {
    pub fn new(url: impl Into<String>) -> RequestOptions {
        RequestOptions {
            url: url.into(),
            method: Method::POST,
            params: Map::new(),
            data: Value::Object(Map::new()),
            response_type: ResponseType::Json,
            show_message: false,
            show_log: false,
        }
    }

    pub fn get(url: impl Into<String>) -> RequestOptions {
        RequestOptions::new(url).method(Method::GET)
    }

    pub fn post(url: impl Into<String>) -> RequestOptions {
        RequestOptions::new(url)
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn params(mut self, params: Map<String, Value>) -> Self {
        self.params = params;
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    pub fn show_message(mut self, show_message: bool) -> Self {
        self.show_message = show_message;
        self
    }

    pub fn show_log(mut self, show_log: bool) -> Self {
        self.show_log = show_log;
        self
    }
}
