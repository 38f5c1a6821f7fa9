//! Suite configuration, loaded from `mercado.toml`.
//!
//! The configuration is deliberately small: the base URL of the remote
//! service and a single global timeout in milliseconds that applies
//! uniformly to every outbound request of the run.
//!
//! Loading order:
//!
//! 1. If the `MERCADO_CONFIG` environment variable is set, load from that
//!    path
//! 2. Otherwise, load from `mercado.toml` in the current directory
//! 3. Otherwise, fall back to built-in defaults
//!
//! `MERCADO_BASE_URL` and `MERCADO_TIMEOUT` override the file values.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::{io::Read, path::Path, time::Duration};
use tracing::*;

use crate::{Error, Result};

/// Environment variable name for specifying the config file path.
const MERCADO_CONFIG_ENV: &str = "MERCADO_CONFIG";

const DEFAULT_BASE_URL: &str = "https://api-desafio-qa.onrender.com";
const DEFAULT_TIMEOUT_MS: u64 = 90_000;

static CONFIG: Lazy<Config> = Lazy::new(|| {
    let _ = dotenv::dotenv();
    Config::load().unwrap_or_default()
});

/// Get the global suite configuration.
pub fn get_config() -> &'static Config {
    &CONFIG
}

/// The suite's configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the remote Mercado service.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Maximum wait for any single request, in milliseconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: default_base_url(),
            timeout: default_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from a path. A missing file yields the defaults.
    fn load_from(path: &Path) -> Result<Config> {
        let Ok(mut file) = std::fs::File::open(path) else {
            return Ok(Config::default());
        };

        let mut buf = String::new();
        file.read_to_string(&mut buf)
            .map_err(|e| Error::Config(e.to_string()))?;

        let mut cfg: Config = toml::from_str(&buf).map_err(|e| {
            Error::Config(format!(
                "failed to deserialize mercado.toml into Config: {e}"
            ))
        })?;

        debug!("mercado.toml was successfully loaded: {cfg:#?}");

        cfg.load_env();

        Ok(cfg)
    }

    fn load() -> Result<Config> {
        match std::env::var(MERCADO_CONFIG_ENV) {
            Ok(path) => {
                let path = Path::new(&path);
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "config file specified by {MERCADO_CONFIG_ENV} not found: {path:?}"
                    )));
                }
                debug!("loading config from {MERCADO_CONFIG_ENV}={path:?}");
                Config::load_from(path)
            }
            Err(_) => Config::load_from(Path::new("mercado.toml")),
        }
    }

    /// Apply `MERCADO_BASE_URL` / `MERCADO_TIMEOUT` overrides.
    fn load_env(&mut self) {
        if let Ok(base_url) = std::env::var("MERCADO_BASE_URL") {
            self.base_url = base_url;
        }
        if let Ok(timeout) = std::env::var("MERCADO_TIMEOUT") {
            match timeout.parse() {
                Ok(ms) => self.timeout = ms,
                Err(e) => warn!("ignoring MERCADO_TIMEOUT={timeout}: {e}"),
            }
        }
    }

    /// The global per-request wait window.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }
}
