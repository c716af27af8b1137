use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::client::{ApiError, ApiRequest};
use super::error::{error_response, ErrorKind};
use super::{validate_code_id, API_PREFIX};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendRequest {
    pub code_id: String,
    /// base64 (standard alphabet, padded) ciphertext
    pub data: String,
    /// requested lifetime in seconds, 0 for the relay maximum
    #[serde(default)]
    pub ttl: u64,
}

impl SendRequest {
    pub fn new(code_id: impl Into<String>, ciphertext: &[u8], ttl: u64) -> Self {
        Self {
            code_id: code_id.into(),
            data: BASE64.encode(ciphertext),
            ttl,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendResponse {
    pub ok: bool,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiry: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    payload: Result<Json<SendRequest>, JsonRejection>,
) -> Result<impl IntoResponse, SendError> {
    let Json(req) = payload?;

    if !validate_code_id(&req.code_id) {
        return Err(SendError::InvalidCodeId);
    }
    if req.data.is_empty() {
        return Err(SendError::MissingData);
    }

    let data = BASE64.decode(req.data.as_bytes())?;
    if data.len() > state.max_payload_size() {
        return Err(SendError::TooLarge {
            size: data.len(),
            limit: state.max_payload_size(),
        });
    }

    let ttl = state.effective_ttl(req.ttl);
    let expiry = time::Duration::try_from(ttl)
        .ok()
        .and_then(|ttl| OffsetDateTime::now_utc().checked_add(ttl))
        .ok_or(SendError::ExpiryOutOfRange(ttl))?;

    let size = data.len();
    if !state.store().put(&req.code_id, data, ttl) {
        return Err(SendError::Conflict);
    }

    tracing::info!(
        code_id = %req.code_id,
        size,
        ttl_secs = ttl.as_secs(),
        "stored blob"
    );

    Ok((
        http::StatusCode::CREATED,
        Json(SendResponse {
            ok: true,
            expiry: Some(expiry),
            error: None,
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("invalid request body: {0}")]
    Body(#[from] JsonRejection),
    #[error("code_id must be 1-64 ASCII letters or digits")]
    InvalidCodeId,
    #[error("missing data")]
    MissingData,
    #[error("data is not valid base64: {0}")]
    InvalidData(#[from] base64::DecodeError),
    #[error("payload of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },
    #[error("code already in use")]
    Conflict,
    #[error("expiry for a ttl of {0:?} is not representable")]
    ExpiryOutOfRange(std::time::Duration),
}

impl SendError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SendError::Body(rejection)
                if rejection.status() == http::StatusCode::PAYLOAD_TOO_LARGE =>
            {
                ErrorKind::PayloadTooLarge
            }
            SendError::Body(_)
            | SendError::InvalidCodeId
            | SendError::MissingData
            | SendError::InvalidData(_) => ErrorKind::BadRequest,
            SendError::TooLarge { .. } => ErrorKind::PayloadTooLarge,
            SendError::Conflict => ErrorKind::Conflict,
            SendError::ExpiryOutOfRange(_) => ErrorKind::Internal,
        }
    }
}

impl IntoResponse for SendError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        tracing::warn!(%kind, "send rejected: {}", self);
        error_response(kind, self.to_string())
    }
}

impl ApiRequest for SendRequest {
    type Response = SendResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(&format!("{API_PREFIX}/send"))?;
        Ok(client.post(full_url).json(&self))
    }
}
