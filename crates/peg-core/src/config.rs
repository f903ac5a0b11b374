//! Configuration types for the peg swap service

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Address, Asset, Error, Network};

/// Environment variable overriding the node URL
pub const ENV_RPC_URL: &str = "PEGSWAP_RPC_URL";
/// Environment variable overriding the API port
pub const ENV_API_PORT: &str = "PEGSWAP_API_PORT";
/// Environment variable overriding the network
pub const ENV_NETWORK: &str = "PEGSWAP_NETWORK";

/// Node connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// JSON-RPC URL (e.g., "http://127.0.0.1:8545")
    pub url: String,

    /// Per-request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Delay between receipt polls
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// How long to wait for a transaction to be mined
    #[serde(default = "default_receipt_timeout_secs")]
    pub receipt_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_receipt_timeout_secs() -> u64 {
    300
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8545".to_string(),
            request_timeout_secs: default_request_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            receipt_timeout_secs: default_receipt_timeout_secs(),
        }
    }
}

/// Contract addresses of a peg swap deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Stable asset users deposit on mint
    pub entry_asset: Asset,
    /// Protocol peg asset users receive on mint and return on redeem
    pub peg_asset: Asset,
    /// Controller exposing the swap entry points
    pub controller: Address,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Node connection settings
    #[serde(default)]
    pub node: NodeConfig,

    /// Network the deployment lives on
    #[serde(default = "default_network")]
    pub network: Network,

    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Explicit deployment; falls back to the network's built-in addresses
    #[serde(default)]
    pub deployment: Option<DeploymentConfig>,
}

fn default_network() -> Network {
    Network::Devnet
}

fn default_api_port() -> u16 {
    19545
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node: NodeConfig::default(),
            network: default_network(),
            api_port: default_api_port(),
            deployment: None,
        }
    }
}

impl AppConfig {
    /// Read a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, Error> {
        serde_json::from_str(raw).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Apply `PEGSWAP_*` overrides, resolving each variable through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), Error> {
        if let Some(url) = lookup(ENV_RPC_URL) {
            self.node.url = url;
        }
        if let Some(port) = lookup(ENV_API_PORT) {
            self.api_port = port
                .parse()
                .map_err(|_| Error::Config(format!("{} is not a port: {}", ENV_API_PORT, port)))?;
        }
        if let Some(network) = lookup(ENV_NETWORK) {
            self.network = network.parse().map_err(Error::Config)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.node.url, "http://127.0.0.1:8545");
        assert_eq!(config.node.request_timeout_secs, 30);
        assert_eq!(config.network, Network::Devnet);
        assert_eq!(config.api_port, 19545);
        assert!(config.deployment.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = AppConfig::from_json(&json).unwrap();
        assert_eq!(parsed.node.url, config.node.url);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed = AppConfig::from_json(r#"{"network":"testnet"}"#).unwrap();
        assert_eq!(parsed.network, Network::Testnet);
        assert_eq!(parsed.node.poll_interval_ms, 2_000);
        assert_eq!(parsed.api_port, 19545);
    }

    #[test]
    fn test_deployment_config() {
        let raw = r#"{
            "deployment": {
                "entry_asset": {
                    "address": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
                    "symbol": "USDC",
                    "decimals": 18
                },
                "peg_asset": {
                    "address": "0xe7f1725e7734ce288f8367e1bb143e90bb3f0512",
                    "symbol": "USDK",
                    "decimals": 6
                },
                "controller": "0x9fe46736679d2d9a65f0992f2272de9f3c7fa6e0"
            }
        }"#;
        let parsed = AppConfig::from_json(raw).unwrap();
        let deployment = parsed.deployment.unwrap();
        assert_eq!(deployment.entry_asset.decimals, 18);
        assert_eq!(deployment.peg_asset.symbol, "USDK");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| match key {
                ENV_RPC_URL => Some("http://node:8545".to_string()),
                ENV_API_PORT => Some("8080".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.node.url, "http://node:8545");
        assert_eq!(config.api_port, 8080);
        assert_eq!(config.network, Network::Devnet);
    }

    #[test]
    fn test_env_override_rejects_bad_port() {
        let mut config = AppConfig::default();
        let result = config.apply_overrides(|key| {
            (key == ENV_API_PORT).then(|| "not-a-port".to_string())
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
