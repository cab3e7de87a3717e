//! REST client for the registry API.

use crate::config::TuiConfig;
use kitaro_core::{RegistrationPayload, RegistryEntry, SubmitFailure};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Non-2xx answer carrying the server's `{ "error": ... }` message.
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

impl ApiClientError {
    /// Text shown to the operator.
    pub fn user_message(&self) -> String {
        match self {
            ApiClientError::Server { message, .. } => message.clone(),
            ApiClientError::Http(_) => "Uplink failed.".to_string(),
            other => other.to_string(),
        }
    }

    /// Classify a failed registration for the wizard.
    pub fn submit_failure(&self) -> SubmitFailure {
        match self {
            ApiClientError::Http(_) => SubmitFailure::Unreachable,
            other => SubmitFailure::Rejected(other.user_message()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &TuiConfig) -> Result<Self, ApiClientError> {
        Self::with_base_url(
            &config.api_base_url,
            Duration::from_millis(config.request_timeout_ms),
        )
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, ApiClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /api/v1/operatives`. Returns the server's confirmation message.
    pub async fn submit_operative(
        &self,
        payload: &RegistrationPayload,
    ) -> Result<String, ApiClientError> {
        let url = format!("{}/api/v1/operatives", self.base_url);
        let response = self.client.post(url).json(payload).send().await?;
        let body: MessageBody = read_json(response).await?;
        Ok(body.message)
    }

    /// `GET /api/v1/registry`, already ordered by the server.
    pub async fn fetch_registry(&self) -> Result<Vec<RegistryEntry>, ApiClientError> {
        let url = format!("{}/api/v1/registry", self.base_url);
        let response = self.client.get(url).send().await?;
        read_json(response).await
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiClientError> {
    let status = response.status();
    let bytes = response.bytes().await?;
    if !status.is_success() {
        return Err(server_error(status, &bytes));
    }
    Ok(serde_json::from_slice(&bytes)?)
}

fn server_error(status: StatusCode, body: &[u8]) -> ApiClientError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => ApiClientError::Server {
            status: status.as_u16(),
            message: parsed.error,
        },
        Err(_) => ApiClientError::InvalidResponse(format!(
            "{} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_uses_error_field() {
        let err = server_error(
            StatusCode::BAD_REQUEST,
            br#"{"error":"Handle or Wallet already exists in the registry.","code":"ALREADY_REGISTERED"}"#,
        );
        assert_eq!(
            err.user_message(),
            "Handle or Wallet already exists in the registry."
        );
        assert!(matches!(err, ApiClientError::Server { status: 400, .. }));
        assert_eq!(
            err.submit_failure(),
            SubmitFailure::Rejected("Handle or Wallet already exists in the registry.".to_string())
        );
    }

    #[test]
    fn test_server_error_without_json_body() {
        let err = server_error(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>");
        assert_eq!(err.user_message(), "Unexpected response: 502 Bad Gateway");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() -> Result<(), ApiClientError> {
        let client = ApiClient::with_base_url("http://localhost:3000/", Duration::from_secs(1))?;
        assert_eq!(client.base_url(), "http://localhost:3000");
        Ok(())
    }
}
