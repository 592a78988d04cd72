//! # Configuration
//!
//! Settings shared by the messenger service and the CLI, stored as JSON.
//!
//! ```json
//! {
//!   "contract_address": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
//!   "chain_id": 11155111,
//!   "preview_limit": 64
//! }
//! ```
//!
//! Missing fields take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::codec::{ELLIPSIS, PREVIEW_LIMIT};
use crate::error::{Error, Result};

/// Sepolia, where the messenger contract is deployed
pub const DEFAULT_CHAIN_ID: u64 = 11_155_111;

/// Messenger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessengerConfig {
    /// Address of the messenger contract
    pub contract_address: Address,
    /// Chain the contract lives on
    pub chain_id: u64,
    /// Width of inbox previews
    pub preview_limit: usize,
}

impl Default for MessengerConfig {
    fn default() -> Self {
        Self {
            contract_address: Address::ZERO,
            chain_id: DEFAULT_CHAIN_ID,
            preview_limit: PREVIEW_LIMIT,
        }
    }
}

impl MessengerConfig {
    /// Check invariants
    pub fn validate(&self) -> Result<()> {
        if self.preview_limit <= ELLIPSIS.len() {
            return Err(Error::InvalidConfig(format!(
                "preview_limit must be greater than {}, got {}",
                ELLIPSIS.len(),
                self.preview_limit
            )));
        }
        if self.chain_id == 0 {
            return Err(Error::InvalidConfig("chain_id must be non-zero".into()));
        }
        Ok(())
    }

    /// Parse and validate JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), contract = %config.contract_address, "Loaded config");
        Ok(config)
    }

    /// Load from a JSON file, or use defaults when it does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Write as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.validate()?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
