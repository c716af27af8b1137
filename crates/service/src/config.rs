use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::units::{parse_byte_size, parse_duration, UnitError};

pub const DEFAULT_PORT: u16 = 3141;
pub const DEFAULT_MAX_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 10 * 1024 * 1024;
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30);
/// Longest `max_ttl` a relay accepts
pub const MAX_TTL_LIMIT: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct Config {
    /// address for the relay to listen on
    pub listen_addr: SocketAddr,
    /// upper bound on how long a blob may live; also the TTL
    ///  applied when a sender asks for 0
    pub max_ttl: Duration,
    /// largest decoded payload the relay will accept, in bytes
    pub max_payload_size: usize,
    /// how often expired blobs are reclaimed
    pub sweep_interval: Duration,

    // misc
    pub log_level: tracing::Level,
    /// level for per-request trace lines
    pub http_log_level: tracing::Level,
    /// directory for a daily rolling log file, stdout only if not set
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), DEFAULT_PORT),
            max_ttl: DEFAULT_MAX_TTL,
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            log_level: tracing::Level::INFO,
            http_log_level: tracing::Level::INFO,
            log_dir: None,
        }
    }
}

/// On-disk relay configuration
///
/// Every field is optional; anything left out keeps its current value.
///
/// ```toml
/// port = 3141
/// max_ttl = "1h"
/// max_size = "10MB"
/// sweep_interval = "30s"
/// log_level = "info"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub listen_addr: Option<SocketAddr>,
    pub port: Option<u16>,
    pub max_ttl: Option<String>,
    pub max_size: Option<String>,
    pub sweep_interval: Option<String>,
    pub log_level: Option<String>,
    pub http_log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }
}

impl Config {
    /// Layer a config file over the current values
    pub fn apply_file(&mut self, file: FileConfig) -> Result<(), ConfigError> {
        if let Some(addr) = file.listen_addr {
            self.listen_addr = addr;
        }
        if let Some(port) = file.port {
            self.listen_addr.set_port(port);
        }
        if let Some(ttl) = file.max_ttl {
            self.max_ttl = parse_duration(&ttl).map_err(|e| ConfigError::field("max_ttl", e))?;
        }
        if let Some(size) = file.max_size {
            self.max_payload_size =
                parse_byte_size(&size).map_err(|e| ConfigError::field("max_size", e))?;
        }
        if let Some(interval) = file.sweep_interval {
            self.sweep_interval =
                parse_duration(&interval).map_err(|e| ConfigError::field("sweep_interval", e))?;
        }
        if let Some(level) = file.log_level {
            self.log_level = parse_level("log_level", &level)?;
        }
        if let Some(level) = file.http_log_level {
            self.http_log_level = parse_level("http_log_level", &level)?;
        }
        if let Some(dir) = file.log_dir {
            self.log_dir = Some(dir);
        }
        Ok(())
    }

    /// Reject values the relay cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_ttl.is_zero() {
            return Err(ConfigError::Invalid("max_ttl must be greater than zero"));
        }
        if self.max_ttl > MAX_TTL_LIMIT {
            return Err(ConfigError::Invalid("max_ttl must be at most 365d"));
        }
        if self.max_payload_size == 0 {
            return Err(ConfigError::Invalid(
                "max_payload_size must be greater than zero",
            ));
        }
        if self.sweep_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "sweep_interval must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn parse_level(field: &'static str, value: &str) -> Result<tracing::Level, ConfigError> {
    value.parse().map_err(|_| ConfigError::Level {
        field,
        value: value.to_string(),
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid value for {field}: {source}")]
    Field {
        field: &'static str,
        source: UnitError,
    },
    #[error("invalid log level for {field}: {value:?}")]
    Level { field: &'static str, value: String },
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

impl ConfigError {
    fn field(field: &'static str, source: UnitError) -> Self {
        Self::Field { field, source }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.listen_addr.port(), 3141);
        assert_eq!(config.max_ttl, Duration::from_secs(3600));
        assert_eq!(config.max_payload_size, 10 * 1024 * 1024);
        assert_eq!(config.sweep_interval, Duration::from_secs(30));
        assert!(config.log_dir.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_apply_file() {
        let file = FileConfig::parse(
            r#"
            port = 8080
            max_ttl = "15m"
            max_size = "512KB"
            sweep_interval = "5s"
            log_level = "debug"
            log_dir = "/var/log/git-share"
            "#,
        )
        .unwrap();

        let mut config = Config::default();
        config.apply_file(file).unwrap();

        assert_eq!(config.listen_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.max_ttl, Duration::from_secs(15 * 60));
        assert_eq!(config.max_payload_size, 512 * 1024);
        assert_eq!(config.sweep_interval, Duration::from_secs(5));
        assert_eq!(config.log_level, tracing::Level::DEBUG);
        assert_eq!(config.http_log_level, tracing::Level::INFO);
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/git-share")));
    }

    #[test]
    fn test_port_overrides_listen_addr_port() {
        let file = FileConfig::parse(
            r#"
            listen_addr = "127.0.0.1:9000"
            port = 9001
            "#,
        )
        .unwrap();

        let mut config = Config::default();
        config.apply_file(file).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:9001".parse().unwrap());
    }

    #[test]
    fn test_empty_file_keeps_defaults() {
        let mut config = Config::default();
        config.apply_file(FileConfig::parse("").unwrap()).unwrap();
        assert_eq!(config.max_ttl, DEFAULT_MAX_TTL);
        assert_eq!(config.max_payload_size, DEFAULT_MAX_PAYLOAD_SIZE);
    }

    #[test]
    fn test_bad_units_are_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_file(FileConfig::parse(r#"max_ttl = "forever""#).unwrap())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Field { field: "max_ttl", .. }));

        let err = config
            .apply_file(FileConfig::parse(r#"max_size = "0MB""#).unwrap())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Field { field: "max_size", .. }));

        let err = config
            .apply_file(FileConfig::parse(r#"log_level = "loud""#).unwrap())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Level { .. }));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(matches!(
            FileConfig::parse("max_tll = \"1h\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_ttl = \"2h\"").unwrap();

        let mut config = Config::default();
        config.apply_file(FileConfig::load(file.path()).unwrap()).unwrap();
        assert_eq!(config.max_ttl, Duration::from_secs(7200));

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            FileConfig::load(&missing),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let config = Config {
            max_payload_size: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            max_ttl: Duration::ZERO,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bounds_max_ttl() {
        let mut config = Config::default();
        config
            .apply_file(FileConfig::parse(r#"max_ttl = "100000000d""#).unwrap())
            .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = Config {
            max_ttl: MAX_TTL_LIMIT,
            ..Config::default()
        };
        config.validate().unwrap();
    }
}
