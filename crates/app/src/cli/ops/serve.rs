use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use service::units::{parse_byte_size, parse_duration};
use service::{spawn_service, Config, ConfigError, FileConfig, ServeError};

/// Run the relay
#[derive(Args, Debug, Clone, Default)]
pub struct Serve {
    /// TOML file to read settings from; flags take precedence over it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Address to listen on (default 0.0.0.0:3141)
    #[arg(long)]
    pub listen_addr: Option<SocketAddr>,

    /// Port to listen on, keeping the listen address's host
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Longest time a payload may wait for its receiver, e.g. 30m or 1h
    #[arg(long, value_parser = parse_duration)]
    pub max_ttl: Option<Duration>,

    /// Largest payload accepted, e.g. 512KB or 10MB
    #[arg(long, value_parser = parse_byte_size)]
    pub max_size: Option<usize>,

    /// How often expired payloads are reclaimed, e.g. 30s
    #[arg(long, value_parser = parse_duration)]
    pub sweep_interval: Option<Duration>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long)]
    pub log_level: Option<tracing::Level>,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServeOpError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Serve(#[from] ServeError),
}

impl Serve {
    /// Defaults, then the config file, then flags
    pub fn config(&self) -> Result<Config, ConfigError> {
        let mut config = Config::default();

        if let Some(path) = &self.config {
            config.apply_file(FileConfig::load(path)?)?;
        }

        if let Some(addr) = self.listen_addr {
            config.listen_addr = addr;
        }
        if let Some(port) = self.port {
            config.listen_addr.set_port(port);
        }
        if let Some(ttl) = self.max_ttl {
            config.max_ttl = ttl;
        }
        if let Some(size) = self.max_size {
            config.max_payload_size = size;
        }
        if let Some(interval) = self.sweep_interval {
            config.sweep_interval = interval;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = Some(dir.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Serve {
    type Error = ServeOpError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = self.config()?;
        spawn_service(&config).await?;
        Ok("relay stopped".to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Serve::default().config().unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:3141".parse().unwrap());
        assert_eq!(config.max_ttl, Duration::from_secs(3600));
        assert_eq!(config.max_payload_size, 10 * 1024 * 1024);
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 8080\nmax_ttl = \"2h\"\nmax_size = \"1MB\"").unwrap();

        let serve = Serve {
            config: Some(file.path().to_path_buf()),
            max_ttl: Some(Duration::from_secs(600)),
            ..Serve::default()
        };
        let config = serve.config().unwrap();

        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.max_ttl, Duration::from_secs(600));
        assert_eq!(config.max_payload_size, 1024 * 1024);
    }

    #[test]
    fn test_missing_config_file() {
        let serve = Serve {
            config: Some(PathBuf::from("/nonexistent/git-share.toml")),
            ..Serve::default()
        };
        assert!(matches!(serve.config(), Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_parse_human_units_from_flags() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            serve: Serve,
        }

        let wrapper = Wrapper::try_parse_from([
            "serve",
            "--max-ttl",
            "15m",
            "--max-size",
            "512KB",
            "--port",
            "9000",
            "--log-level",
            "debug",
        ])
        .unwrap();
        let config = wrapper.serve.config().unwrap();

        assert_eq!(config.max_ttl, Duration::from_secs(900));
        assert_eq!(config.max_payload_size, 512 * 1024);
        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(config.log_level, tracing::Level::DEBUG);

        assert!(Wrapper::try_parse_from(["serve", "--max-size", "0"]).is_err());
    }
}
