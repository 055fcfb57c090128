// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and the typed configuration structs
//! for both servers. Configuration is read once at startup and handed to the
//! routers through application state; nothing is reloaded at runtime.
//!
//! ## Sponsorship Gateway
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `ENOKI_PRIVATE_KEY` | Enoki private API key (`VITE_ENOKI_PRIVATE_KEY` also accepted) | Required |
//! | `ENOKI_API_URL` | Enoki API base URL | `https://api.enoki.mystenlabs.com` |
//! | `SUI_NETWORK` | Network used when a request omits one | `testnet` |
//! | `PROVIDER_TIMEOUT_SECS` | Timeout for each Enoki call | `15` |
//! | `HOST` / `PORT` | Bind address | `0.0.0.0:3004` |
//!
//! ## Storage Upload Proxy
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `WALRUS_BIN` | Walrus CLI binary | `walrus` |
//! | `WALRUS_CONFIG` | Passed to the CLI as `--config <path>` | Unset |
//! | `WALRUS_UPLOAD_DIR` | Scratch directory for uploads and reads | `/tmp/walrus-uploads` |
//! | `WALRUS_URL_TEMPLATE` | Retrieval URL, `{blob_id}` is substituted | Aggregator for `SUI_NETWORK` |
//! | `WALRUS_DEFAULT_EPOCHS` | Storage epochs when the upload omits them | `5` |
//! | `WALRUS_MAX_UPLOAD_BYTES` | Request body cap for `/upload` | `10485760` |
//! | `HOST` / `PORT` | Bind address (`WALRUS_PROXY_PORT` also accepted) | `0.0.0.0:3003` |
//!
//! ## Logging
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{fmt, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DEFAULT_HOST: &str = "0.0.0.0";

pub const ENOKI_PRIVATE_KEY_ENV: &str = "ENOKI_PRIVATE_KEY";
/// Frontend-style name still found in shared `.env` files.
pub const ENOKI_PRIVATE_KEY_FALLBACK_ENV: &str = "VITE_ENOKI_PRIVATE_KEY";
pub const ENOKI_API_URL_ENV: &str = "ENOKI_API_URL";
pub const SUI_NETWORK_ENV: &str = "SUI_NETWORK";
pub const PROVIDER_TIMEOUT_ENV: &str = "PROVIDER_TIMEOUT_SECS";

pub const DEFAULT_ENOKI_API_URL: &str = "https://api.enoki.mystenlabs.com";
pub const DEFAULT_GATEWAY_PORT: u16 = 3004;
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 15;

pub const WALRUS_BIN_ENV: &str = "WALRUS_BIN";
pub const WALRUS_CONFIG_ENV: &str = "WALRUS_CONFIG";
pub const WALRUS_UPLOAD_DIR_ENV: &str = "WALRUS_UPLOAD_DIR";
pub const WALRUS_URL_TEMPLATE_ENV: &str = "WALRUS_URL_TEMPLATE";
pub const WALRUS_DEFAULT_EPOCHS_ENV: &str = "WALRUS_DEFAULT_EPOCHS";
pub const WALRUS_MAX_UPLOAD_BYTES_ENV: &str = "WALRUS_MAX_UPLOAD_BYTES";
pub const WALRUS_PROXY_PORT_ENV: &str = "WALRUS_PROXY_PORT";

pub const DEFAULT_WALRUS_BIN: &str = "walrus";
pub const DEFAULT_UPLOAD_DIR: &str = "/tmp/walrus-uploads";
pub const DEFAULT_EPOCHS: u32 = 5;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_PROXY_PORT: u16 = 3003;

/// Placeholder replaced by the blob id in [`ProxyConfig::url_template`].
pub const BLOB_ID_PLACEHOLDER: &str = "{blob_id}";

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

const TESTNET_AGGREGATOR: &str = "https://aggregator.walrus-testnet.walrus.space/v1";
const MAINNET_AGGREGATOR: &str = "https://aggregator.walrus.walrus.space/v1";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(String),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: String, value: String },
}

/// Sui network a transaction is sponsored on.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Testnet,
    Mainnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
        }
    }

    /// Public Walrus aggregator serving blobs stored on this network.
    pub fn aggregator_base_url(&self) -> &'static str {
        match self {
            Network::Testnet => TESTNET_AGGREGATOR,
            Network::Mainnet => MAINNET_AGGREGATOR,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            other => Err(ConfigError::Invalid {
                name: SUI_NETWORK_ENV.to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Configuration for the `sponsor-gateway` binary.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    pub enoki_api_url: String,
    pub enoki_api_key: String,
    /// Network substituted when a sponsor request omits one.
    pub default_network: Network,
    pub provider_timeout: Duration,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let enoki_api_key = env
            .optional(ENOKI_PRIVATE_KEY_ENV)
            .or_else(|| env.optional(ENOKI_PRIVATE_KEY_FALLBACK_ENV))
            .ok_or_else(|| ConfigError::Missing(ENOKI_PRIVATE_KEY_ENV.to_string()))?;

        let default_network = match env.optional(SUI_NETWORK_ENV) {
            Some(raw) => raw.parse()?,
            None => Network::default(),
        };

        let timeout_secs = env.parsed(PROVIDER_TIMEOUT_ENV, DEFAULT_PROVIDER_TIMEOUT_SECS)?;

        Ok(Self {
            bind_addr: env.bind_addr(&[PORT_ENV], DEFAULT_GATEWAY_PORT)?,
            enoki_api_url: env.or_default(ENOKI_API_URL_ENV, DEFAULT_ENOKI_API_URL),
            enoki_api_key,
            default_network,
            provider_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Configuration for the `storage-proxy` binary.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub bind_addr: SocketAddr,
    pub walrus_bin: PathBuf,
    pub walrus_config: Option<PathBuf>,
    pub upload_dir: PathBuf,
    pub url_template: String,
    pub default_epochs: u32,
    pub max_upload_bytes: usize,
}

impl ProxyConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let network = match env.optional(SUI_NETWORK_ENV) {
            Some(raw) => raw.parse()?,
            None => Network::default(),
        };
        let url_template = env.optional(WALRUS_URL_TEMPLATE_ENV).unwrap_or_else(|| {
            format!("{}/{BLOB_ID_PLACEHOLDER}", network.aggregator_base_url())
        });

        let default_epochs = env.parsed(WALRUS_DEFAULT_EPOCHS_ENV, DEFAULT_EPOCHS)?;
        if default_epochs == 0 {
            return Err(ConfigError::Invalid {
                name: WALRUS_DEFAULT_EPOCHS_ENV.to_string(),
                value: "0".to_string(),
            });
        }

        Ok(Self {
            bind_addr: env.bind_addr(&[PORT_ENV, WALRUS_PROXY_PORT_ENV], DEFAULT_PROXY_PORT)?,
            walrus_bin: PathBuf::from(env.or_default(WALRUS_BIN_ENV, DEFAULT_WALRUS_BIN)),
            walrus_config: env.optional(WALRUS_CONFIG_ENV).map(PathBuf::from),
            upload_dir: PathBuf::from(env.or_default(WALRUS_UPLOAD_DIR_ENV, DEFAULT_UPLOAD_DIR)),
            url_template,
            default_epochs,
            max_upload_bytes: env.parsed(WALRUS_MAX_UPLOAD_BYTES_ENV, DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }

    /// Retrieval URL for a stored blob.
    ///
    /// Templates without a `{blob_id}` placeholder are treated as a base URL.
    pub fn retrieval_url(&self, blob_id: &str) -> String {
        if self.url_template.contains(BLOB_ID_PLACEHOLDER) {
            self.url_template.replace(BLOB_ID_PLACEHOLDER, blob_id)
        } else {
            format!("{}/{blob_id}", self.url_template.trim_end_matches('/'))
        }
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn or_default(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T: FromStr>(&self, name: &str, default: T) -> Result<T, ConfigError> {
        match self.optional(name) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: name.to_string(),
                value: raw,
            }),
            None => Ok(default),
        }
    }

    /// First set variable in `port_vars` wins.
    fn bind_addr(&self, port_vars: &[&str], default_port: u16) -> Result<SocketAddr, ConfigError> {
        let host = self.or_default(HOST_ENV, DEFAULT_HOST);
        let port = match port_vars.iter().find_map(|name| {
            self.optional(name).map(|value| (*name, value))
        }) {
            Some((name, raw)) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: name.to_string(),
                value: raw,
            })?,
            None => default_port,
        };

        format!("{host}:{port}")
            .parse()
            .map_err(|_| ConfigError::Invalid {
                name: HOST_ENV.to_string(),
                value: host,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn gateway_requires_api_key() {
        let err = GatewayConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(name) if name == ENOKI_PRIVATE_KEY_ENV));
    }

    #[test]
    fn gateway_defaults() {
        let config =
            GatewayConfig::from_lookup(lookup(&[(ENOKI_PRIVATE_KEY_ENV, "enoki_private_x")]))
                .unwrap();
        assert_eq!(config.enoki_api_key, "enoki_private_x");
        assert_eq!(config.enoki_api_url, DEFAULT_ENOKI_API_URL);
        assert_eq!(config.default_network, Network::Testnet);
        assert_eq!(config.bind_addr.port(), DEFAULT_GATEWAY_PORT);
        assert_eq!(config.provider_timeout, Duration::from_secs(15));
    }

    #[test]
    fn gateway_accepts_vite_key_and_mainnet() {
        let config = GatewayConfig::from_lookup(lookup(&[
            (ENOKI_PRIVATE_KEY_FALLBACK_ENV, "vite_key"),
            (SUI_NETWORK_ENV, "Mainnet"),
            (PORT_ENV, "9000"),
        ]))
        .unwrap();
        assert_eq!(config.enoki_api_key, "vite_key");
        assert_eq!(config.default_network, Network::Mainnet);
        assert_eq!(config.bind_addr.port(), 9000);
    }

    #[test]
    fn gateway_rejects_unknown_network() {
        let err = GatewayConfig::from_lookup(lookup(&[
            (ENOKI_PRIVATE_KEY_ENV, "k"),
            (SUI_NETWORK_ENV, "devnet"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { value, .. } if value == "devnet"));
    }

    #[test]
    fn proxy_defaults_follow_network() {
        let config = ProxyConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.walrus_bin, PathBuf::from("walrus"));
        assert_eq!(config.upload_dir, PathBuf::from(DEFAULT_UPLOAD_DIR));
        assert_eq!(config.default_epochs, 5);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.bind_addr.port(), DEFAULT_PROXY_PORT);
        assert_eq!(
            config.retrieval_url("abc123"),
            "https://aggregator.walrus-testnet.walrus.space/v1/abc123"
        );

        let mainnet = ProxyConfig::from_lookup(lookup(&[(SUI_NETWORK_ENV, "mainnet")])).unwrap();
        assert_eq!(
            mainnet.retrieval_url("abc123"),
            "https://aggregator.walrus.walrus.space/v1/abc123"
        );
    }

    #[test]
    fn proxy_port_prefers_port_over_legacy_name() {
        let legacy = ProxyConfig::from_lookup(lookup(&[(WALRUS_PROXY_PORT_ENV, "4000")])).unwrap();
        assert_eq!(legacy.bind_addr.port(), 4000);

        let both = ProxyConfig::from_lookup(lookup(&[
            (PORT_ENV, "5000"),
            (WALRUS_PROXY_PORT_ENV, "4000"),
        ]))
        .unwrap();
        assert_eq!(both.bind_addr.port(), 5000);
    }

    #[test]
    fn proxy_rejects_zero_epochs_and_bad_numbers() {
        assert!(ProxyConfig::from_lookup(lookup(&[(WALRUS_DEFAULT_EPOCHS_ENV, "0")])).is_err());
        assert!(
            ProxyConfig::from_lookup(lookup(&[(WALRUS_MAX_UPLOAD_BYTES_ENV, "lots")])).is_err()
        );
    }

    #[test]
    fn retrieval_url_without_placeholder_appends_id() {
        let config = ProxyConfig::from_lookup(lookup(&[(
            WALRUS_URL_TEMPLATE_ENV,
            "https://blobs.example.com/v1/",
        )]))
        .unwrap();
        assert_eq!(
            config.retrieval_url("xyz"),
            "https://blobs.example.com/v1/xyz"
        );
    }
}
