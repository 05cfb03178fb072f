use clap::Parser;
use std::path::{Path, PathBuf};

use ams_types::{AmsConfig, ConfigError};

#[derive(Parser, Debug)]
#[command(
    name = "ams-server",
    about = "Application Mobility Service - device context ownership for edge applications",
    version = env!("CARGO_PKG_VERSION"),
    author
)]
pub struct Cli {
    #[arg(short, long, env = "AMS_CONFIG", help = "Path to a JSON config file")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "MEEP_SANDBOX_NAME", help = "Sandbox served by this instance")]
    pub sandbox: Option<String>,

    #[arg(long, env = "MEEP_MEP_NAME", help = "MEC platform scope (default: global)")]
    pub mep: Option<String>,

    #[arg(long, env = "MEEP_HOST_URL", help = "Public URL prefix for resource links")]
    pub host_url: Option<String>,

    #[arg(long, env = "MEEP_LOCALITY", help = "Tracked zones, ':'-separated")]
    pub locality: Option<String>,

    #[arg(short, long, env = "AMS_PORT")]
    pub port: Option<u16>,

    #[arg(long, help = "Listen on all interfaces instead of loopback")]
    pub lan: bool,

    #[arg(long, env = "AMS_STORE_PATH", help = "SQLite file for persisted state (memory-only if unset)")]
    pub store: Option<PathBuf>,

    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Loads the optional config file, then applies flag and environment overrides.
    pub fn resolve_config(&self) -> Result<AmsConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config_file(path)?,
            None => AmsConfig::default(),
        };
        self.apply_overrides(&mut config);
        config.check()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut AmsConfig) {
        if let Some(sandbox) = &self.sandbox {
            config.sandbox_name.clone_from(sandbox);
        }
        if let Some(mep) = self.mep.as_ref().filter(|m| !m.is_empty()) {
            config.mep_name.clone_from(mep);
        }
        if let Some(host_url) = &self.host_url {
            config.host_url.clone_from(host_url);
        }
        if let Some(locality) = &self.locality {
            config.locality = AmsConfig::parse_locality(locality);
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.lan {
            config.allow_lan_access = true;
        }
        if let Some(store) = &self.store {
            config.store_path = Some(store.clone());
        }
    }
}

fn read_config_file(path: &Path) -> Result<AmsConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::from_io_error(path, &e))?;
    AmsConfig::from_json(&raw)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("ams-server").chain(args.iter().copied()))
    }

    #[test]
    fn test_flags_build_config() {
        let cli = parse(&["--sandbox", "sbx", "--mep", "mep1", "--locality", "z1:z2", "--port", "9000"]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.sandbox_name, "sbx");
        assert_eq!(config.base_path(), "/sbx/mep1/amsi/v1");
        assert_eq!(config.locality, vec!["z1".to_string(), "z2".to_string()]);
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_store_flag_selects_durable_store() {
        let cli = parse(&["--sandbox", "sbx"]);
        assert_eq!(cli.resolve_config().unwrap().store_path, None);

        let cli = parse(&["--sandbox", "sbx", "--store", "/var/lib/ams/state.db"]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.store_path, Some(PathBuf::from("/var/lib/ams/state.db")));
    }

    #[test]
    fn test_empty_mep_keeps_global() {
        let cli = parse(&["--sandbox", "sbx", "--mep", ""]);
        assert!(cli.resolve_config().unwrap().is_global_mep());
    }

    #[test]
    fn test_missing_config_file_is_io_error() {
        let cli = parse(&["--sandbox", "sbx", "--config", "/nonexistent/ams.json"]);
        assert!(matches!(cli.resolve_config(), Err(ConfigError::Io { .. })));
    }
}
