use std::net::SocketAddr;

/// Room for the JSON envelope around the base64 payload
const ENVELOPE_ALLOWANCE: usize = 4 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    // Listen address
    pub listen_addr: SocketAddr,
    // log level for http tracing
    pub log_level: tracing::Level,
    // largest request body accepted before the JSON is even parsed
    pub body_limit: usize,
}

impl Config {
    pub fn new(listen_addr: SocketAddr, log_level: tracing::Level, max_payload_size: usize) -> Self {
        Self {
            listen_addr,
            log_level,
            body_limit: body_limit_for(max_payload_size),
        }
    }
}

impl From<&crate::Config> for Config {
    fn from(config: &crate::Config) -> Self {
        Self::new(
            config.listen_addr,
            config.http_log_level,
            config.max_payload_size,
        )
    }
}

/// Request body size that admits a `max_payload_size` payload once base64-encoded
pub fn body_limit_for(max_payload_size: usize) -> usize {
    max_payload_size
        .div_ceil(3)
        .saturating_mul(4)
        .saturating_add(ENVELOPE_ALLOWANCE)
}
