use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::{header::HeaderMap, header::HeaderValue, Client};
use time::OffsetDateTime;
use url::Url;

use super::error::ApiError;
use super::ApiRequest;
use crate::http::api::error::{ErrorKind, ErrorResponse};
use crate::http::api::health::{HealthRequest, HealthResponse};
use crate::http::api::receive::ReceiveRequest;
use crate::http::api::send::SendRequest;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ApiClient {
    pub remote: Url,
    client: Client,
}

impl ApiClient {
    pub fn new(remote: &Url) -> Result<Self, ApiError> {
        Self::with_timeout(remote, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(remote: &Url, timeout: Duration) -> Result<Self, ApiError> {
        if remote.cannot_be_a_base() {
            return Err(ApiError::InvalidBase(remote.clone()));
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert("Accept", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()?;

        // relative joins must land under the relay's path, not replace its last segment
        let mut remote = remote.clone();
        if !remote.path().ends_with('/') {
            let path = format!("{}/", remote.path());
            remote.set_path(&path);
        }

        Ok(Self { remote, client })
    }

    pub async fn call<T: ApiRequest>(&self, request: T) -> Result<T::Response, ApiError> {
        let request_builder = request.build_request(&self.remote, &self.client)?;
        let response = request_builder.send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T::Response>().await?);
        }

        let kind = ErrorKind::from_status(status);
        let body = response.text().await?;
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        Err(ApiError::Relay { kind, message })
    }

    /// Upload a ciphertext under `code_id`, returning the expiry the relay applied
    pub async fn send(
        &self,
        code_id: &str,
        ciphertext: &[u8],
        ttl: Duration,
    ) -> Result<OffsetDateTime, ApiError> {
        let response = self
            .call(SendRequest::new(code_id, ciphertext, ttl.as_secs()))
            .await?;
        response
            .expiry
            .ok_or_else(|| ApiError::InvalidPayload("missing expiry".into()))
    }

    /// Fetch and destroy the ciphertext stored under `code_id`
    pub async fn receive(&self, code_id: &str) -> Result<Vec<u8>, ApiError> {
        let response = self
            .call(ReceiveRequest {
                code_id: code_id.to_string(),
            })
            .await?;
        let data = response
            .data
            .ok_or_else(|| ApiError::InvalidPayload("missing data".into()))?;
        BASE64
            .decode(data.as_bytes())
            .map_err(|e| ApiError::InvalidPayload(e.to_string()))
    }

    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        self.call(HealthRequest).await
    }

    /// Get the base URL for API requests
    pub fn base_url(&self) -> &Url {
        &self.remote
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = ApiClient::new(&Url::parse("http://localhost:3141").unwrap()).unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:3141/");

        let client = ApiClient::new(&Url::parse("https://example.com/relay").unwrap()).unwrap();
        assert_eq!(client.base_url().as_str(), "https://example.com/relay/");
        assert_eq!(
            client.base_url().join("api/send").unwrap().as_str(),
            "https://example.com/relay/api/send"
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        let url = Url::parse("mailto:someone@example.com").unwrap();
        assert!(matches!(
            ApiClient::new(&url),
            Err(ApiError::InvalidBase(_))
        ));
    }

    #[test]
    fn test_receive_url_is_escaped() {
        let client = ApiClient::new(&Url::parse("https://example.com/relay").unwrap()).unwrap();
        let request = ReceiveRequest {
            code_id: "a/b".to_string(),
        }
        .build_request(client.base_url(), &client.client)
        .unwrap()
        .build()
        .unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://example.com/relay/api/receive/a%2Fb"
        );
    }
}
