//! Connection configuration
//!
//! Options can be built in code or loaded from a TOML file; the file path
//! comes from `EVOKE_CONFIG`, then the XDG config directory.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

/// Transport-specific tuning; required when the transport is IPC.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderOptions {
    /// Filesystem path of the node's IPC socket. Falls back to the host
    /// string when unset.
    pub ipc_path: Option<PathBuf>,
}

/// Options for one connection: endpoint, signing identity, and behavior
/// flags.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionOptions {
    /// Endpoint URL or IPC socket path.
    pub host: Option<String>,

    #[serde(default)]
    pub provider_options: Option<ProviderOptions>,

    /// Hex-encoded signing key; presence selects local signing.
    #[serde(default)]
    pub private_key: Option<String>,

    /// Start the connection as part of model startup.
    #[serde(default = "default_true")]
    pub auto_start: bool,

    /// Suppress publishing the active provider into the ambient registry.
    #[serde(default)]
    pub skip_global_assign: bool,

    /// After a deployment, adopt the new address and rebuild the handle.
    #[serde(default = "default_true")]
    pub restart_model_on_deploy: bool,

    /// Log dispatch payloads and lifecycle steps.
    #[serde(default)]
    pub debug: bool,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            host: None,
            provider_options: None,
            private_key: None,
            auto_start: true,
            skip_global_assign: false,
            restart_model_on_deploy: true,
            debug: false,
        }
    }
}

impl ConnectionOptions {
    /// Options for a plain HTTP endpoint.
    pub fn http(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            ..Default::default()
        }
    }

    pub fn with_private_key(mut self, key: impl Into<String>) -> Self {
        self.private_key = Some(key.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

fn default_true() -> bool {
    true
}

/// Load options from the configured TOML file, falling back to defaults.
pub fn load() -> ConnectionOptions {
    let Some(path) = config_path() else {
        return ConnectionOptions::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return ConnectionOptions::default(),
    };
    toml::from_str::<ConnectionOptions>(&content).unwrap_or_default()
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("EVOKE_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("evoke").join("config.toml"));
    }
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .map(|home| home.join(".config").join("evoke").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let options = ConnectionOptions::default();
        assert!(options.auto_start);
        assert!(options.restart_model_on_deploy);
        assert!(!options.debug);
        assert!(!options.skip_global_assign);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
host = "http://localhost:8545"
debug = true

[provider_options]
ipc_path = "/tmp/geth.ipc"
"#
        )
        .unwrap();

        let content = fs::read_to_string(file.path()).unwrap();
        let options: ConnectionOptions = toml::from_str(&content).unwrap();
        assert_eq!(options.host.as_deref(), Some("http://localhost:8545"));
        assert!(options.debug);
        assert!(options.auto_start);
        assert_eq!(
            options.provider_options.unwrap().ipc_path.unwrap(),
            PathBuf::from("/tmp/geth.ipc")
        );
    }
}
