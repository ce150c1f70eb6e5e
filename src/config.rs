//! Command line and environment configuration

use crate::error::{DashboardError, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_DATA_PATH: &str = "data/avanco_ia_empresas.csv";
pub const DEFAULT_PORT: u16 = 8501;

/// Avanço da IA nas Empresas - interactive dashboard
#[derive(Debug, Clone, Parser)]
#[command(name = "ai-adoption-dashboard", version, about)]
pub struct Config {
    /// CSV file with the AI adoption dataset
    #[arg(long, env = "DASHBOARD_DATA", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Address to listen on
    #[arg(long, env = "DASHBOARD_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "DASHBOARD_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Do not open the dashboard in a browser
    #[arg(long, env = "DASHBOARD_HEADLESS")]
    pub headless: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: PathBuf::from(DEFAULT_DATA_PATH),
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            headless: false,
        }
    }
}

impl Config {
    pub fn address(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| DashboardError::Config(format!("Invalid address: {}", e)))
    }

    /// Address as typed into a browser.
    pub fn url(&self) -> String {
        let host = match self.host.as_str() {
            "0.0.0.0" | "::" => "localhost",
            host => host,
        };
        format!("http://{}:{}", host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_framework_conventions() {
        let config = Config::try_parse_from(["ai-adoption-dashboard"]).unwrap();

        assert_eq!(config.port, 8501);
        assert_eq!(config.data, PathBuf::from("data/avanco_ia_empresas.csv"));
        assert!(!config.headless);
        assert_eq!(config.address().unwrap().port(), 8501);
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "ai-adoption-dashboard",
            "--port",
            "9000",
            "--host",
            "0.0.0.0",
            "--headless",
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert!(config.headless);
        assert_eq!(config.url(), "http://localhost:9000");
    }

    #[test]
    fn invalid_host_is_a_config_error() {
        let config = Config {
            host: "not a host".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.address(), Err(DashboardError::Config(_))));
    }
}
