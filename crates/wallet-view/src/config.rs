//! Coordinator configuration.
//!
//! Loaded from TOML or JSON, overlaid with `WALLET_VIEW_*` environment
//! variables, then validated before the coordinator is built.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::encryption::PassphrasePolicy;
use crate::errors::ConfigError;
use crate::notifications::{DisplayUnit, DEFAULT_DEDUP_CAPACITY};
use crate::router::AddressFormat;

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "WALLET_VIEW_";

/// Coin base units per whole coin.
pub const COIN: i64 = 100_000_000;

/// How amounts are shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Unit used for notifications
    pub unit: DisplayUnit,
    /// Currency ticker
    pub ticker: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            unit: DisplayUnit::Coin,
            ticker: "FTC".to_string(),
        }
    }
}

/// Rules of the active network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Base58check version bytes accepted for addresses
    pub address_versions: Vec<u8>,
    /// Largest valid amount, in base units
    pub max_money: i64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            address_versions: vec![14, 5],
            max_money: 336_000_000 * COIN,
        }
    }
}

impl NetworkConfig {
    /// Address format for this network.
    #[must_use]
    pub fn address_format(&self) -> AddressFormat {
        AddressFormat::new(self.address_versions.clone())
    }
}

/// Notification behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Stay quiet while the client is in initial block download
    pub suppress_during_initial_sync: bool,
    /// Record ids remembered for deduplication
    pub dedup_capacity: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            suppress_during_initial_sync: true,
            dedup_capacity: DEFAULT_DEDUP_CAPACITY,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Per-subscriber signal buffer
    pub signal_capacity: usize,
    /// Passphrase strength policy
    pub passphrase: PassphrasePolicy,
    /// Amount display
    pub display: DisplayConfig,
    /// Network rules
    pub network: NetworkConfig,
    /// Notifications
    pub notifications: NotificationConfig,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            signal_capacity: 256,
            passphrase: PassphrasePolicy::default(),
            display: DisplayConfig::default(),
            network: NetworkConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

impl CoordinatorConfig {
    /// Load from a `.toml` or `.json` file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string())),
            Some("json") => {
                serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    /// Overlay `WALLET_VIEW_*` variables from the process environment.
    pub fn merge_with_env(&mut self) -> Result<(), ConfigError> {
        self.merge_with_vars(std::env::vars())
    }

    /// Overlay `WALLET_VIEW_*` entries from an arbitrary variable source.
    pub fn merge_with_vars<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let key = match name {
                "DISPLAY_UNIT" => "display.unit",
                "TICKER" => "display.ticker",
                "MIN_PASSPHRASE_LENGTH" => "passphrase.min_length",
                "SIGNAL_CAPACITY" => "signal_capacity",
                "ADDRESS_VERSIONS" => "network.address_versions",
                _ => continue,
            };
            self.set_from_string(key, &value)?;
        }
        Ok(())
    }

    /// Set one value by dotted key (for CLI overrides).
    ///
    /// `network.address_versions` takes a comma-separated list of bytes.
    pub fn set_from_string(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "display.unit" => {
                self.display.unit = DisplayUnit::parse(value).ok_or(ConfigError::Invalid {
                    field: "display.unit",
                    reason: format!("unknown unit {value:?}"),
                })?;
            }
            "display.ticker" => self.display.ticker = value.trim().to_string(),
            "passphrase.min_length" => {
                self.passphrase.min_length = parse_number("passphrase.min_length", value)?;
            }
            "passphrase.reject_whitespace_only" => {
                self.passphrase.reject_whitespace_only =
                    value.trim().parse().map_err(|_| ConfigError::Invalid {
                        field: "passphrase.reject_whitespace_only",
                        reason: format!("expected true or false, got {value:?}"),
                    })?;
            }
            "network.address_versions" => {
                self.network.address_versions = value
                    .split(',')
                    .map(|v| parse_number("network.address_versions", v))
                    .collect::<Result<Vec<u8>, _>>()?;
            }
            "network.max_money" => {
                self.network.max_money = parse_number("network.max_money", value)?;
            }
            "notifications.suppress_during_initial_sync" => {
                self.notifications.suppress_during_initial_sync =
                    value.trim().parse().map_err(|_| ConfigError::Invalid {
                        field: "notifications.suppress_during_initial_sync",
                        reason: format!("expected true or false, got {value:?}"),
                    })?;
            }
            "notifications.dedup_capacity" => {
                self.notifications.dedup_capacity =
                    parse_number("notifications.dedup_capacity", value)?;
            }
            "signal_capacity" => self.signal_capacity = parse_number("signal_capacity", value)?,
            _ => {
                return Err(ConfigError::Invalid {
                    field: "key",
                    reason: format!("unknown configuration key {key:?}"),
                })
            }
        }
        Ok(())
    }

    /// Reject values the coordinator cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signal_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "signal_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.notifications.dedup_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "notifications.dedup_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.network.address_versions.is_empty() {
            return Err(ConfigError::Invalid {
                field: "network.address_versions",
                reason: "at least one version byte is required".to_string(),
            });
        }
        if self.network.max_money <= 0 {
            return Err(ConfigError::Invalid {
                field: "network.max_money",
                reason: format!("must be positive, got {}", self.network.max_money),
            });
        }
        if self.display.ticker.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "display.ticker",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        field,
        reason: format!("expected a number, got {value:?}"),
    })
}
