use std::time::Duration;

use reqwest::{
    header::{
        HeaderMap,
        HeaderValue,
        USER_AGENT,
    },
    Client,
    Response,
};

use crate::core::EnrichError;

const AGENT: &str = concat!("anki-enrich/", env!("CARGO_PKG_VERSION"), " (+reqwest)");

pub fn http_client(timeout: Duration) -> Result<Client, EnrichError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(AGENT));

    Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .map_err(|e| EnrichError::Config(format!("HTTP client build failed: {e}")))
}

/// Reads the body of a non-success response for error reporting.
pub async fn error_body(resp: Response) -> String {
    let status = resp.status();
    match resp.text().await {
        Ok(body) if !body.trim().is_empty() => format!("HTTP {}: {}", status, body.trim()),
        _ => format!("HTTP {}", status),
    }
}
