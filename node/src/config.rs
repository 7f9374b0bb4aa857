//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use counterstake_engine::{AssetPair, FixedPrice, Price};
use counterstake_types::CounterstakeParams;

use crate::NodeError;

/// Configuration for a counterstake node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Data directory for the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in bytes.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Capacity of the sequencer's command channel.
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,

    /// Counterstake parameters in force at startup.
    #[serde(default)]
    pub params: CounterstakeParams,

    /// Quote used by the built-in fixed price provider.
    #[serde(default)]
    pub price: PriceConfig,
}

/// A fixed `num / den` quote of bonding units per claimed unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceConfig {
    #[serde(default = "default_claimed_asset")]
    pub claimed_asset: String,
    #[serde(default = "default_bonding_asset")]
    pub bonding_asset: String,
    #[serde(default = "default_one")]
    pub num: u64,
    #[serde(default = "default_one")]
    pub den: u64,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./counterstake_data")
}

fn default_map_size() -> usize {
    1 << 30
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_command_buffer() -> usize {
    1024
}

fn default_claimed_asset() -> String {
    AssetPair::default().claimed
}

fn default_bonding_asset() -> String {
    AssetPair::default().bonding
}

fn default_one() -> u64 {
    1
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Reject configurations the engine could not start with.
    pub fn validate(&self) -> Result<(), NodeError> {
        self.params
            .validate()
            .map_err(|e| NodeError::Config(format!("params: {e}")))?;
        if self.price.den == 0 {
            return Err(NodeError::Config("price.den must be non-zero".to_string()));
        }
        if self.command_buffer == 0 {
            return Err(NodeError::Config(
                "command_buffer must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl PriceConfig {
    pub fn asset_pair(&self) -> AssetPair {
        AssetPair {
            claimed: self.claimed_asset.clone(),
            bonding: self.bonding_asset.clone(),
        }
    }

    pub fn provider(&self) -> FixedPrice {
        FixedPrice(Price::new(self.num as u128, self.den as u128))
    }
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            claimed_asset: default_claimed_asset(),
            bonding_asset: default_bonding_asset(),
            num: default_one(),
            den: default_one(),
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size: default_map_size(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            command_buffer: default_command_buffer(),
            params: CounterstakeParams::default(),
            price: PriceConfig::default(),
        }
    }
}
