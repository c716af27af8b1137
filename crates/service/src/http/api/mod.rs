use axum::routing::{get, post};
use axum::Router;
use http::header::{ACCEPT, CONTENT_TYPE, ORIGIN};
use http::Method;
use tower_http::cors::{Any, CorsLayer};

pub mod client;
pub mod error;
pub mod health;
pub mod receive;
pub mod send;

pub use error::{ErrorKind, ErrorResponse};
pub use health::{HealthRequest, HealthResponse};
pub use receive::{ReceiveRequest, ReceiveResponse};
pub use send::{SendRequest, SendResponse};

use crate::ServiceState;

const MAX_CODE_ID_LEN: usize = 64;

/// Mount point the relay also serves the API under, and the one clients call
pub const API_PREFIX: &str = "api";

pub fn router(state: ServiceState) -> Router<ServiceState> {
    let cors_layer = CorsLayer::new()
        .allow_methods(vec![Method::GET, Method::POST])
        .allow_headers(vec![ACCEPT, CONTENT_TYPE, ORIGIN])
        .allow_origin(Any)
        .allow_credentials(false);

    Router::new()
        .route("/send", post(send::handler))
        .route("/receive/:id", get(receive::handler))
        .route("/health", get(health::handler))
        .with_state(state)
        .layer(cors_layer)
}

/// Code ids are opaque lookup keys, but they end up in URLs and logs
pub(crate) fn validate_code_id(code_id: &str) -> bool {
    !code_id.is_empty()
        && code_id.len() <= MAX_CODE_ID_LEN
        && code_id.bytes().all(|b| b.is_ascii_alphanumeric())
}
