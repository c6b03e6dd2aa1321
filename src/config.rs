use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::gopher::item::DEFAULT_PORT;

/// Server and file-serving settings.
///
/// Every field is optional; `Config::default()` listens on the Gopher port
/// on all interfaces and serves the current directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub files: FilesConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind, e.g. `127.0.0.1:7070` or `:70`
    pub listen_addr: Option<String>,
    /// Hostname advertised in generated items instead of the bound IP
    pub hostname: Option<String>,
    /// Cap on concurrently served connections; unbounded when unset
    pub max_connections: Option<usize>,
    /// Seconds to wait for the request line
    pub read_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    pub root: Option<PathBuf>,
}

impl Config {
    /// Loads from the YAML file named by `GOPHER_CONFIG`, falling back to
    /// `LISTEN`, `GOPHER_HOSTNAME` and `GOPHER_ROOT`.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var("GOPHER_CONFIG") {
            Ok(path) => Self::from_file(path),
            Err(_) => Ok(Self::from_env()),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                listen_addr: std::env::var("LISTEN").ok(),
                hostname: std::env::var("GOPHER_HOSTNAME").ok(),
                ..ServerConfig::default()
            },
            files: FilesConfig {
                root: std::env::var_os("GOPHER_ROOT").map(PathBuf::from),
            },
        }
    }
}

impl ServerConfig {
    /// Address to bind, defaulting to all interfaces on port 70.
    ///
    /// A bare `:port` binds all interfaces.
    pub fn bind_addr(&self) -> String {
        match self.listen_addr.as_deref() {
            None | Some("") => format!("0.0.0.0:{DEFAULT_PORT}"),
            Some(addr) if addr.starts_with(':') => format!("0.0.0.0{addr}"),
            Some(addr) => addr.to_string(),
        }
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_secs.map(Duration::from_secs)
    }
}
