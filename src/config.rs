use crate::error::ConfigError;
use lazy_static::lazy_static;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;
use url::Url;

pub const BASE_URL_VAR: &str = "REQUEST_BASE_URL";
pub const TIMEOUT_VAR: &str = "REQUEST_TIMEOUT_MS";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

lazy_static! {
    // Sent with every request; per-call headers are merged over these
    pub static ref DEFAULT_HEADERS: HeaderMap = {
        let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        let mut headers = HeaderMap::new();
        headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&user_agent).expect("Invalid user agent header"),
        );
        headers
    };
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub timeout: Duration,
    pub default_headers: HeaderMap,
}

impl Config {
    pub fn new(base_url: &str) -> Result<Config, ConfigError> {
        Ok(Config {
            base_url: parse_base_url(base_url)?,
            timeout: DEFAULT_TIMEOUT,
            default_headers: DEFAULT_HEADERS.clone(),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = match lookup(BASE_URL_VAR) {
            Some(val) if !val.trim().is_empty() => val,
            _ => return Err(ConfigError::MissingBaseUrl(BASE_URL_VAR)),
        };
        let timeout = match lookup(TIMEOUT_VAR) {
            Some(val) if val.trim().is_empty() => DEFAULT_TIMEOUT,
            Some(val) => val
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidTimeout(val))?,
            None => DEFAULT_TIMEOUT,
        };
        Ok(Config::new(&base_url)?.with_timeout(timeout))
    }
}

fn parse_base_url(s: &str) -> Result<Url, ConfigError> {
    let s = s.trim();
    // without a trailing slash, Url::join would replace the last path segment
    let s = if s.ends_with('/') {
        s.to_string()
    } else {
        format!("{}/", s)
    };
    let url = Url::parse(&s).map_err(|e| ConfigError::InvalidBaseUrl(s.clone(), e))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidBaseUrl(
            s,
            url::ParseError::RelativeUrlWithCannotBeABaseBase,
        ));
    }
    Ok(url)
}
