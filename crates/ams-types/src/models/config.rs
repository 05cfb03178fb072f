//! Service configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use validator::Validate;

use crate::error::ConfigError;

/// MEP name meaning "not scoped to a single MEC platform".
pub const DEFAULT_MEP_NAME: &str = "global";

/// Outbound notification delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct NotificationConfig {
    /// Per-request delivery timeout in seconds
    #[validate(range(min = 1_u64, max = 300_u64))]
    #[serde(default = "default_notification_timeout")]
    pub timeout_secs: u64,
    /// Pending notifications kept before new ones are dropped
    #[validate(range(min = 1_usize))]
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Concurrent deliveries
    #[validate(range(min = 1_usize, max = 1024_usize))]
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_notification_timeout(),
            queue_capacity: default_queue_capacity(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

/// Full service configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct AmsConfig {
    /// Sandbox this instance serves
    #[validate(length(min = 1_u64))]
    #[serde(default)]
    pub sandbox_name: String,
    /// MEC platform scope, `global` when unscoped
    #[validate(length(min = 1_u64))]
    #[serde(default = "default_mep_name")]
    pub mep_name: String,
    /// Public URL prefix used in resource links
    #[serde(default)]
    pub host_url: String,
    /// Zones where mobility tracking is active; empty means everywhere
    #[serde(default)]
    pub locality: Vec<String>,
    /// Static zone to node mapping; empty selects hop-count ranking
    #[serde(default)]
    pub zone_node_map: HashMap<String, String>,
    #[validate(range(min = 1_u16))]
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bind to 0.0.0.0 instead of loopback
    #[serde(default)]
    pub allow_lan_access: bool,
    /// Pending connection queue length of the listening socket
    #[validate(range(min = 1_i32, max = 65535_i32))]
    #[serde(default = "default_listen_backlog")]
    pub listen_backlog: i32,
    /// SQLite file holding persisted state; state is memory-only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
    #[serde(default)]
    #[validate(nested)]
    pub notification: NotificationConfig,
    #[validate(range(min = 1_u64))]
    #[serde(default = "default_expiry_check_interval")]
    pub expiry_check_interval_secs: u64,
}

impl Default for AmsConfig {
    fn default() -> Self {
        Self {
            sandbox_name: String::new(),
            mep_name: default_mep_name(),
            host_url: String::new(),
            locality: Vec::new(),
            zone_node_map: HashMap::new(),
            port: default_port(),
            allow_lan_access: false,
            listen_backlog: default_listen_backlog(),
            store_path: None,
            notification: NotificationConfig::default(),
            expiry_check_interval_secs: default_expiry_check_interval(),
        }
    }
}

impl AmsConfig {
    /// Parses a JSON config document.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|e| ConfigError::from_json_error(&e))
    }

    /// Runs field validation, reporting the first failing field.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.sandbox_name.is_empty() {
            return Err(ConfigError::Missing { field: "sandbox_name".to_string() });
        }
        self.validate().map_err(|errors| {
            let field = errors
                .field_errors()
                .keys()
                .next()
                .map_or_else(|| "notification".to_string(), ToString::to_string);
            ConfigError::Invalid { field, message: errors.to_string() }
        })
    }

    /// Parses a `:`-separated locality list, ignoring empty entries.
    pub fn parse_locality(raw: &str) -> Vec<String> {
        raw.split(':').filter(|z| !z.is_empty()).map(str::to_string).collect()
    }

    pub fn is_global_mep(&self) -> bool {
        self.mep_name == DEFAULT_MEP_NAME
    }

    /// Static mode is selected when a zone to node mapping is configured.
    pub fn is_static_mode(&self) -> bool {
        !self.zone_node_map.is_empty()
    }

    /// Returns true when `zone` is inside the tracked locality.
    pub fn in_locality(&self, zone: &str) -> bool {
        self.locality.is_empty() || self.locality.iter().any(|z| z == zone)
    }

    /// REST API root, without a trailing slash.
    pub fn base_path(&self) -> String {
        if self.is_global_mep() {
            format!("/{}/amsi/v1", self.sandbox_name)
        } else {
            format!("/{}/{}/amsi/v1", self.sandbox_name, self.mep_name)
        }
    }

    /// Prefix under which every persisted key of this instance lives.
    pub fn key_root(&self) -> String {
        format!("data:sbox:{}:ams:mep:{}:", self.sandbox_name, self.mep_name)
    }

    /// Absolute href of a resource below the API root.
    pub fn resource_url(&self, path: &str) -> String {
        format!("{}{}/{}", self.host_url.trim_end_matches('/'), self.base_path(), path)
    }

    pub fn get_bind_address(&self) -> String {
        if self.allow_lan_access {
            "0.0.0.0".to_string()
        } else {
            "127.0.0.1".to_string()
        }
    }

    pub fn get_socket_addr(&self) -> String {
        format!("{}:{}", self.get_bind_address(), self.port)
    }
}

fn default_mep_name() -> String {
    DEFAULT_MEP_NAME.to_string()
}

pub const fn default_port() -> u16 {
    8080
}

pub const fn default_listen_backlog() -> i32 {
    4096
}

pub const fn default_notification_timeout() -> u64 {
    10
}

pub const fn default_queue_capacity() -> usize {
    1024
}

pub const fn default_max_in_flight() -> usize {
    16
}

pub const fn default_expiry_check_interval() -> u64 {
    1
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;

    fn config(mep: &str) -> AmsConfig {
        AmsConfig {
            sandbox_name: "sbx".to_string(),
            mep_name: mep.to_string(),
            host_url: "http://host/".to_string(),
            ..AmsConfig::default()
        }
    }

    #[test]
    fn test_paths_global_mep() {
        let cfg = config("global");
        assert_eq!(cfg.base_path(), "/sbx/amsi/v1");
        assert_eq!(cfg.key_root(), "data:sbox:sbx:ams:mep:global:");
        assert_eq!(cfg.resource_url("subscriptions/3"), "http://host/sbx/amsi/v1/subscriptions/3");
    }

    #[test]
    fn test_paths_scoped_mep() {
        let cfg = config("mep1");
        assert_eq!(cfg.base_path(), "/sbx/mep1/amsi/v1");
        assert_eq!(cfg.key_root(), "data:sbox:sbx:ams:mep:mep1:");
    }

    #[test]
    fn test_locality() {
        let mut cfg = config("global");
        assert!(cfg.in_locality("anything"));
        cfg.locality = AmsConfig::parse_locality("z1::z2");
        assert_eq!(cfg.locality, vec!["z1".to_string(), "z2".to_string()]);
        assert!(cfg.in_locality("z2"));
        assert!(!cfg.in_locality("z3"));
    }

    #[test]
    fn test_check_rejects_missing_sandbox_and_bad_ranges() {
        assert_eq!(
            AmsConfig::default().check(),
            Err(ConfigError::Missing { field: "sandbox_name".to_string() })
        );

        let mut cfg = config("global");
        assert!(cfg.check().is_ok());
        cfg.notification.timeout_secs = 0;
        assert!(matches!(cfg.check(), Err(ConfigError::Invalid { .. })));

        let mut cfg = config("global");
        cfg.listen_backlog = 0;
        assert!(matches!(cfg.check(), Err(ConfigError::Invalid { field, .. }) if field == "listen_backlog"));
    }

    #[test]
    fn test_from_json_defaults() {
        let cfg = AmsConfig::from_json(r#"{"sandbox_name": "sbx", "zone_node_map": {"z1": "n1"}}"#)
            .unwrap();
        assert_eq!(cfg.mep_name, "global");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.notification.queue_capacity, 1024);
        assert_eq!(cfg.listen_backlog, 4096);
        assert_eq!(cfg.store_path, None);
        assert!(cfg.is_static_mode());

        let cfg = AmsConfig::from_json(r#"{"sandbox_name": "sbx", "store_path": "/var/lib/ams/state.db"}"#)
            .unwrap();
        assert_eq!(cfg.store_path, Some(PathBuf::from("/var/lib/ams/state.db")));
    }
}
