use request_client::api_client::ApiClient;
use request_client::error::RequestError;
use request_client::models::{Dispatched, RequestOptions, ResponseType};
use reqwest::Method;
use std::env;
use std::str::FromStr;
use tracing::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (method, url) = match (args.first(), args.get(1)) {
        (Some(method), Some(url)) => (method, url),
        _ => {
            eprintln!("usage: main <METHOD> <URL> [JSON_DATA]");
            std::process::exit(2);
        }
    };
    let method = Method::from_str(&method.to_ascii_uppercase()).unwrap_or_else(|e| {
        eprintln!("invalid method {}: {}", method, e);
        std::process::exit(2);
    });
    let data = match args.get(2) {
        Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
            eprintln!("invalid json data: {}", e);
            std::process::exit(2);
        }),
        None => serde_json::json!({}),
    };
    let response_type = match env::var("RESPONSE_TYPE") {
        Ok(val) => ResponseType::from_str(&val).unwrap_or_else(|_| {
            eprintln!("invalid RESPONSE_TYPE {}", val);
            std::process::exit(2);
        }),
        Err(_) => ResponseType::Json,
    };

    let api_client = ApiClient::from_env().unwrap_or_else(|e| {
        error!("Failed to configure client: {}", e);
        std::process::exit(1);
    });
    let options = RequestOptions::new(url.as_str())
        .method(method)
        .data(data)
        .response_type(response_type)
        .show_log(true);

    match api_client.dispatch::<serde_json::Value>(options).await {
        Ok(Dispatched::Envelope(envelope)) => {
            let out = serde_json::to_string_pretty(&envelope).unwrap_or_default();
            println!("{}", out);
        }
        Ok(Dispatched::Raw(response)) => {
            println!("{} ({} bytes)", response.status, response.body.len());
        }
        Err(e) => {
            // pipeline failures are already logged by the error interceptors
            if let RequestError::InvalidRequest(_) = e {
                error!("{}", e);
            }
            debug!("{:?}", e);
            std::process::exit(1);
        }
    }
}
