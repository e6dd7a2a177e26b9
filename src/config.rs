use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Port the log service listens on unless configured otherwise
pub const DEFAULT_PORT: u16 = 8087;

/// Host used when none is given on the command line
pub const DEFAULT_HOST: &str = "localhost";

/// Path of the endless log stream on the service
pub const STREAM_PATH: &str = "/logs/stream";

/// Path requested when the path input is left empty
pub const DEFAULT_REQUEST_PATH: &str = "/version";

/// Environment variable overriding the saved port for one run
pub const PORT_ENV: &str = "LOGTAP_PORT";

/// Bound of the channel between a stream task and the UI loop
pub const DEFAULT_CHANNEL_BUFFER: usize = 1024;

/// Persisted configuration for logtap
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Port of the log service
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("logtap").join("config.toml"))
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    /// Write to `path`, creating parent directories as needed
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let contents = toml::to_string(self).context("serializing config")?;
        std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Apply `LOGTAP_PORT` if it is set to a valid port
    pub fn with_env_overrides(self) -> Self {
        let value = std::env::var(PORT_ENV).ok();
        self.with_port_override(value.as_deref())
    }

    /// Replace the port with `value` when it parses the same way as the
    /// settings input; anything else keeps the current port
    fn with_port_override(mut self, value: Option<&str>) -> Self {
        let Some(value) = value else {
            return self;
        };

        match parse_port(value) {
            Some(port) => self.port = port,
            None => tracing::warn!("Ignoring invalid {}={:?}", PORT_ENV, value),
        }
        self
    }
}

/// Parse user input for the port setting
pub fn parse_port(input: &str) -> Option<u16> {
    input.trim().parse().ok().filter(|port| *port != 0)
}

/// Address of the log service
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    fn base(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// URL of the log stream
    pub fn stream_url(&self) -> String {
        format!("{}{}", self.base(), STREAM_PATH)
    }

    /// URL of an administrative request; the query is appended verbatim
    pub fn request_url(&self, path: &str, query: &str) -> String {
        let path = path.trim();
        let path = if path.is_empty() { DEFAULT_REQUEST_PATH } else { path };
        let slash = if path.starts_with('/') { "" } else { "/" };
        let query = if query.is_empty() {
            String::new()
        } else {
            format!("?{}", query)
        };
        format!("{}{}{}{}", self.base(), slash, path, query)
    }
}
