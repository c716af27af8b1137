//! The git-share relay and its client.
//!
//! This crate provides:
//! - the one-time blob store and its expiry sweeper
//! - the JSON wire API (`/send`, `/receive/:id`, `/health`) served with axum
//! - a typed `ApiClient` for the same API
//! - process wiring: logging, signals, graceful shutdown

pub mod config;
pub mod http;
pub mod process;
pub mod state;
pub mod store;
pub mod units;

pub use config::{Config, ConfigError, FileConfig};
pub use crate::http::api::client::{ApiClient, ApiError};
pub use crate::http::api::ErrorKind;
pub use process::{spawn_service, start_service, ServeError, ShutdownHandle};
pub use state::State as ServiceState;
pub use store::BlobStore;
