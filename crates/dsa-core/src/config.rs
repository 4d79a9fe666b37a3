//! Switch and fabric configuration.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use dsa_api::LagId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of slave ports per switch.
pub const DSA_MAX_PORTS: usize = 8;

/// Default number of LAG groups a switch can hold at once.
pub const DSA_MAX_LAGS: usize = 4;

/// Error loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

fn default_max_ports() -> usize {
    DSA_MAX_PORTS
}

fn default_lag_capacity() -> usize {
    DSA_MAX_LAGS
}

/// Sizing of one switch instance, fixed at attach time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchConfig {
    pub name: String,
    #[serde(default = "default_max_ports")]
    pub max_ports: usize,
    #[serde(default = "default_lag_capacity")]
    pub lag_capacity: usize,
}

impl SwitchConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_ports: DSA_MAX_PORTS,
            lag_capacity: DSA_MAX_LAGS,
        }
    }

    pub fn with_max_ports(mut self, max_ports: usize) -> Self {
        self.max_ports = max_ports;
        self
    }

    pub fn with_lag_capacity(mut self, lag_capacity: usize) -> Self {
        self.lag_capacity = lag_capacity;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::invalid("name", "must not be empty"));
        }
        if self.max_ports == 0 {
            return Err(ConfigError::invalid("max_ports", "must be at least 1"));
        }
        if self.lag_capacity == 0 {
            return Err(ConfigError::invalid("lag_capacity", "must be at least 1"));
        }
        Ok(())
    }
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self::new("switch0")
    }
}

/// One administrative LAG operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum LagOp {
    Join { port: usize, group: u32 },
    Leave { port: usize, group: u32 },
    Change { port: usize, group: u32 },
}

impl LagOp {
    pub fn port(&self) -> usize {
        match self {
            LagOp::Join { port, .. } | LagOp::Leave { port, .. } | LagOp::Change { port, .. } => {
                *port
            }
        }
    }

    pub fn group(&self) -> LagId {
        match self {
            LagOp::Join { group, .. }
            | LagOp::Leave { group, .. }
            | LagOp::Change { group, .. } => LagId::new(*group),
        }
    }
}

/// A whole fabric: one switch, its master and slaves, and LAG operations
/// to apply once it is up.
///
/// ```yaml
/// switch:
///   name: ksz8794
///   max_ports: 4
/// master: eth0
/// slaves: [lan1, lan2, lan3]
/// lag:
///   - { op: join, port: 0, group: 10 }
///   - { op: join, port: 1, group: 10 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyConfig {
    pub switch: SwitchConfig,
    pub master: String,
    #[serde(default)]
    pub slaves: Vec<String>,
    #[serde(default)]
    pub lag: Vec<LagOp>,
}

impl TopologyConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a file; `.json` is parsed as JSON, anything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&text),
            _ => Self::from_yaml(&text),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.switch.validate()?;
        if self.master.is_empty() {
            return Err(ConfigError::invalid("master", "must not be empty"));
        }
        if self.slaves.len() > self.switch.max_ports {
            return Err(ConfigError::invalid(
                "slaves",
                format!(
                    "{} slaves exceed max_ports {}",
                    self.slaves.len(),
                    self.switch.max_ports
                ),
            ));
        }
        let mut seen = HashSet::new();
        seen.insert(self.master.as_str());
        for slave in &self.slaves {
            if !seen.insert(slave.as_str()) {
                return Err(ConfigError::invalid(
                    "slaves",
                    format!("duplicate interface name {}", slave),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_switch_defaults() {
        let config: SwitchConfig = serde_yaml::from_str("name: sw0").unwrap();
        assert_eq!(config.max_ports, DSA_MAX_PORTS);
        assert_eq!(config.lag_capacity, DSA_MAX_LAGS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_switch_rejects_zero_sizes() {
        let config = SwitchConfig::new("sw0").with_lag_capacity(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref field, .. }) if field == "lag_capacity"
        ));
        assert!(SwitchConfig::new("sw0").with_max_ports(0).validate().is_err());
        assert!(SwitchConfig::new("").validate().is_err());
    }

    #[test]
    fn test_topology_from_yaml() {
        let yaml = r#"
switch:
  name: ksz8794
  max_ports: 4
master: eth0
slaves: [lan1, lan2]
lag:
  - { op: join, port: 0, group: 10 }
  - { op: change, port: 0, group: 11 }
"#;
        let config = TopologyConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.switch.max_ports, 4);
        assert_eq!(config.switch.lag_capacity, DSA_MAX_LAGS);
        assert_eq!(config.slaves, vec!["lan1", "lan2"]);
        assert_eq!(config.lag[0], LagOp::Join { port: 0, group: 10 });
        assert_eq!(config.lag[1].group(), LagId::new(11));
    }

    #[test]
    fn test_topology_from_json() {
        let json = r#"{
            "switch": {"name": "sw0"},
            "master": "eth0",
            "slaves": ["lan1"],
            "lag": [{"op": "leave", "port": 0, "group": 3}]
        }"#;
        let config = TopologyConfig::from_json(json).unwrap();
        assert_eq!(config.lag[0], LagOp::Leave { port: 0, group: 3 });
        assert_eq!(config.lag[0].port(), 0);
    }

    #[test]
    fn test_topology_rejects_too_many_slaves() {
        let yaml = "switch: {name: sw0, max_ports: 1}\nmaster: eth0\nslaves: [lan1, lan2]\n";
        assert!(TopologyConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_topology_rejects_duplicate_names() {
        let yaml = "switch: {name: sw0}\nmaster: eth0\nslaves: [lan1, eth0]\n";
        assert!(matches!(
            TopologyConfig::from_yaml(yaml),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = TopologyConfig::load("/nonexistent/dsa.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"switch": {{"name": "sw0"}}, "master": "eth0", "slaves": ["lan1"]}}"#
        )
        .unwrap();
        let config = TopologyConfig::load(file.path()).unwrap();
        assert_eq!(config.master, "eth0");
        assert!(config.lag.is_empty());
    }
}
