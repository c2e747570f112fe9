use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use uqload_dl::{ClientConfig, HostConfig, ResolverConfig};

const CONFIG_DIR: &str = "uqload";
const CONFIG_FILE: &str = "config.toml";

/// Settings read from `config.toml`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub user_agent: Option<String>,
    /// Metadata probe and read timeout, in seconds
    pub timeout_secs: u64,
    /// Page fetch timeout, in seconds
    pub page_timeout_secs: u64,
    /// Accepted top-level domains for the video host
    pub tlds: Vec<String>,
    /// Default output directory when `--outdir` is not given
    pub output_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let client = ClientConfig::default();
        Self {
            user_agent: None,
            timeout_secs: client.timeout.as_secs(),
            page_timeout_secs: client.page_timeout.as_secs(),
            tlds: HostConfig::default().tlds,
            output_dir: None,
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// An explicit path must exist. The default location may be absent.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.is_file() => path,
                _ => return Ok(Self::default()),
            },
        };

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        let mut client = ClientConfig::default();
        if let Some(user_agent) = &self.user_agent {
            client.user_agent = user_agent.clone();
        }
        client.timeout = Duration::from_secs(self.timeout_secs);
        client.page_timeout = Duration::from_secs(self.page_timeout_secs);

        let hosts = HostConfig {
            tlds: self.tlds.clone(),
            ..Default::default()
        };

        ResolverConfig {
            client,
            hosts,
            ..Default::default()
        }
    }
}
