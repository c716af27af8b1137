use axum::extract::{Json, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use super::client::{ApiError, ApiRequest};
use super::API_PREFIX;
use crate::ServiceState;

#[derive(Debug, Clone, Default)]
pub struct HealthRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    /// live blobs currently held
    pub blobs: usize,
}

#[tracing::instrument(skip_all)]
pub async fn handler(State(state): State<ServiceState>) -> impl IntoResponse {
    Json(HealthResponse {
        ok: true,
        blobs: state.store().count(),
    })
}

impl ApiRequest for HealthRequest {
    type Response = HealthResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(&format!("{API_PREFIX}/health"))?;
        Ok(client.get(full_url))
    }
}
