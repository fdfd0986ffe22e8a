// ── Server-side configuration types ──
//
// Provider, player and core settings are exchanged as a map of config
// entries. Values are loosely typed on the wire (bool, number, string or
// lists of those), so they stay `serde_json::Value`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Definition (and current value) of one configurable setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub key: String,
    #[serde(default, rename = "type")]
    pub entry_type: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub default_value: Value,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub hidden: Option<bool>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stored configuration of a provider instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub instance_id: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub last_error: Option<String>,
    #[serde(default)]
    pub values: BTreeMap<String, ConfigEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stored configuration of a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub player_id: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub default_name: Option<String>,
    #[serde(default)]
    pub values: BTreeMap<String, ConfigEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stored configuration of a core controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreConfig {
    pub domain: String,
    #[serde(default)]
    pub last_error: Option<String>,
    #[serde(default)]
    pub values: BTreeMap<String, ConfigEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Values to save, keyed by config entry key.
pub type ConfigValues = BTreeMap<String, Value>;
