use axum::extract::{Json, Path, State};
use axum::response::{IntoResponse, Response};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use super::client::{ApiError, ApiRequest};
use super::error::{error_response, ErrorKind};
use super::{validate_code_id, API_PREFIX};
use crate::ServiceState;

/// Fetch, and thereby destroy, the blob stored under `code_id`
#[derive(Debug, Clone)]
pub struct ReceiveRequest {
    pub code_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiveResponse {
    pub ok: bool,
    /// base64 ciphertext
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Path(code_id): Path<String>,
) -> Result<impl IntoResponse, ReceiveError> {
    if !validate_code_id(&code_id) {
        return Err(ReceiveError::InvalidCodeId);
    }

    let data = state
        .store()
        .get_and_delete(&code_id)
        .ok_or(ReceiveError::NotFoundOrExpired)?;

    tracing::info!(code_id = %code_id, size = data.len(), "delivered blob");

    Ok(Json(ReceiveResponse {
        ok: true,
        data: Some(BASE64.encode(&data)),
        error: None,
    }))
}

#[derive(Debug, thiserror::Error)]
pub enum ReceiveError {
    #[error("code_id must be 1-64 ASCII letters or digits")]
    InvalidCodeId,
    #[error("not found or expired")]
    NotFoundOrExpired,
}

impl ReceiveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReceiveError::InvalidCodeId => ErrorKind::BadRequest,
            ReceiveError::NotFoundOrExpired => ErrorKind::NotFoundOrExpired,
        }
    }
}

impl IntoResponse for ReceiveError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        tracing::debug!(%kind, "receive failed");
        error_response(kind, self.to_string())
    }
}

impl ApiRequest for ReceiveRequest {
    type Response = ReceiveResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let mut full_url = base_url.clone();
        full_url
            .path_segments_mut()
            .map_err(|_| ApiError::InvalidBase(base_url.clone()))?
            .pop_if_empty()
            .extend([API_PREFIX, "receive", self.code_id.as_str()]);
        Ok(client.get(full_url))
    }
}
