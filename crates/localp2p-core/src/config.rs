use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Error, Result};

const APP_DIR: &str = "localp2p";
const CONFIG_FILE: &str = "cli-config.json";

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "LOCALP2P_CONFIG";

/// Client configuration document, persisted as pretty-printed JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Port of the daemon's RPC endpoint
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,
    /// Port the daemon listens on for peers
    #[serde(default = "default_core_port")]
    pub core_port: u16,
    /// Daemon binary, relative to the working directory or absolute
    #[serde(default = "default_core_binary_path", alias = "coreBinary")]
    pub core_binary_path: String,
    #[serde(default = "default_true")]
    pub auto_start: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rpc_port: default_rpc_port(),
            core_port: default_core_port(),
            core_binary_path: default_core_binary_path(),
            auto_start: default_true(),
        }
    }
}

fn default_rpc_port() -> u16 {
    9090
}

fn default_core_port() -> u16 {
    8080
}

fn default_core_binary_path() -> String {
    "./core/localp2p".to_string()
}

fn default_true() -> bool {
    true
}

/// Keys addressable through `ConfigStore::get` / `ConfigStore::set`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    RpcPort,
    CorePort,
    CoreBinaryPath,
    AutoStart,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 4] = [
        ConfigKey::RpcPort,
        ConfigKey::CorePort,
        ConfigKey::CoreBinaryPath,
        ConfigKey::AutoStart,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::RpcPort => "rpcPort",
            ConfigKey::CorePort => "corePort",
            ConfigKey::CoreBinaryPath => "coreBinaryPath",
            ConfigKey::AutoStart => "autoStart",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s))
            .or_else(|| s.eq_ignore_ascii_case("coreBinary").then_some(ConfigKey::CoreBinaryPath))
            .ok_or_else(|| Error::UnknownConfigKey(s.to_string()))
    }
}

/// Owns the on-disk configuration and its single in-memory copy.
///
/// Every `set` persists the whole document immediately. There is no locking
/// between processes: two invocations racing a `set` resolve last-write-wins.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    data: AppConfig,
}

impl ConfigStore {
    /// Open the per-user config file (or `$LOCALP2P_CONFIG` when set)
    pub fn load_default() -> Self {
        Self::open(Self::default_path())
    }

    /// Open the config file at `path`, healing it with defaults when it is
    /// absent or unreadable. Never fails.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (data, heal) = match Self::read(&path) {
            Ok(Some((data, complete))) => (data, !complete),
            Ok(None) => {
                debug!("No config at {}, writing defaults", path.display());
                (AppConfig::default(), true)
            }
            Err(e) => {
                debug!("Replacing unreadable config at {}: {}", path.display(), e);
                (AppConfig::default(), true)
            }
        };

        let store = Self { path, data };
        if heal {
            store.persist();
        }
        store
    }

    /// Per-user config file location
    ///
    /// `%AppData%\Roaming\localp2p` on Windows, `~/Library/Application Support/localp2p`
    /// on macOS and `~/.config/localp2p` elsewhere.
    pub fn default_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(CONFIG_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &AppConfig {
        &self.data
    }

    pub fn get(&self, key: ConfigKey) -> serde_json::Value {
        match key {
            ConfigKey::RpcPort => self.data.rpc_port.into(),
            ConfigKey::CorePort => self.data.core_port.into(),
            ConfigKey::CoreBinaryPath => self.data.core_binary_path.clone().into(),
            ConfigKey::AutoStart => self.data.auto_start.into(),
        }
    }

    /// Parse `raw` for `key`, update the document and persist it.
    ///
    /// Invalid values are rejected before anything changes. A failed write
    /// is logged; the in-memory value is kept.
    pub fn set(&mut self, key: ConfigKey, raw: &str) -> Result<()> {
        let raw = raw.trim();
        match key {
            ConfigKey::RpcPort => self.data.rpc_port = parse_port(key, raw)?,
            ConfigKey::CorePort => self.data.core_port = parse_port(key, raw)?,
            ConfigKey::CoreBinaryPath => {
                if raw.is_empty() {
                    return Err(Error::InvalidConfigValue {
                        key: key.as_str(),
                        reason: "path must not be empty".to_string(),
                    });
                }
                self.data.core_binary_path = raw.to_string();
            }
            ConfigKey::AutoStart => {
                self.data.auto_start = raw.parse().map_err(|_| Error::InvalidConfigValue {
                    key: key.as_str(),
                    reason: format!("expected true or false, got {:?}", raw),
                })?;
            }
        }

        self.persist();
        Ok(())
    }

    /// Write the whole document to disk.
    ///
    /// The document goes to a sibling temp file first and is renamed into
    /// place, so the file is never observed half-written.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(&self.data)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;

        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            warn!("Failed to save config to {}: {}", self.path.display(), e);
        }
    }

    /// Returns the parsed document and whether it carried every key
    fn read(path: &Path) -> Result<Option<(AppConfig, bool)>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        let value: serde_json::Value = serde_json::from_str(&content)?;
        let complete = ConfigKey::ALL
            .iter()
            .all(|key| value.get(key.as_str()).is_some());
        Ok(Some((serde_json::from_value(value)?, complete)))
    }
}

fn parse_port(key: ConfigKey, raw: &str) -> Result<u16> {
    match raw.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(Error::InvalidConfigValue {
            key: key.as_str(),
            reason: format!("expected a port between 1 and 65535, got {:?}", raw),
        }),
    }
}
