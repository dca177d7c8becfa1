use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Environment variable naming an optional YAML config file.
pub const CONFIG_FILE_ENV: &str = "QUAY_CONFIG";

/// Server configuration.
///
/// Built once at startup and shared read-only with every connection task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Host or IP address to bind
    pub host: String,
    /// Port to bind, `0` lets the OS pick one
    pub port: u16,
    /// Directory all served files live under. A relative path is taken
    /// from the working directory at bind time, not the binary's location.
    pub document_root: PathBuf,
    /// Value of the `Server` response header
    pub server_name: String,
    /// Upper bound on the request header section, terminator included
    pub max_header_bytes: usize,
    /// Idle timeout for a single read or write, `0` disables it
    pub idle_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            document_root: PathBuf::from("./www"),
            server_name: "quay".to_string(),
            max_header_bytes: 8 * 1024,
            idle_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Loads defaults, then the YAML file named by `QUAY_CONFIG` (if set),
    /// then `QUAY_HOST` / `QUAY_PORT` / `QUAY_DOCUMENT_ROOT` overrides.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_FILE_ENV) {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config file {}", path))?;
                Self::from_yaml(&raw).with_context(|| format!("invalid config file {}", path))?
            }
            Err(_) => Self::default(),
        };

        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Parses a YAML document; missing fields keep their defaults.
    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        let cfg = serde_yaml::from_str(raw)?;
        Ok(cfg)
    }

    /// Applies `QUAY_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("QUAY_HOST") {
            self.host = host;
        }

        if let Some(port) = lookup("QUAY_PORT") {
            self.port = port
                .parse()
                .with_context(|| format!("QUAY_PORT is not a valid port: {:?}", port))?;
        }

        if let Some(root) = lookup("QUAY_DOCUMENT_ROOT") {
            self.document_root = PathBuf::from(root);
        }

        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        match self.idle_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
