//! Shared configuration for the pingwatch CLI and TUI.
//!
//! TOML profiles, one per monitoring server, merged over built-in defaults
//! and `PINGWATCH_`-prefixed environment variables, and translated into a
//! [`ServerConfig`] the transport layer understands. The CLI layers its
//! flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use pingwatch_api::{TlsMode, TransportConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const DEFAULT_SERVER: &str = "http://localhost:5000";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile, falling back to a local server for the implicit
    /// `default` profile.
    pub fn profile(&self, name: &str) -> Result<Profile, ConfigError> {
        match self.profiles.get(name) {
            Some(profile) => Ok(profile.clone()),
            None if name == "default" => Ok(Profile::local()),
            None => Err(ConfigError::UnknownProfile { name: name.into() }),
        }
    }

    pub fn active_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named monitoring server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Server base URL, e.g. `http://localhost:5000`.
    pub server: String,

    /// Path to a custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Override the global insecure setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Override the global timeout (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Profile {
    pub fn local() -> Self {
        Self {
            server: DEFAULT_SERVER.into(),
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }

    /// Resolve into connection settings, using `defaults` for anything the
    /// profile leaves unset.
    pub fn to_connection(&self, defaults: &Defaults) -> Result<ServerConfig, ConfigError> {
        let base_url: Url = self.server.parse().map_err(|e| ConfigError::Validation {
            field: "server".into(),
            reason: format!("invalid URL '{}': {e}", self.server),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation {
                field: "server".into(),
                reason: format!("expected an http or https URL, got '{}'", self.server),
            });
        }

        let tls = if self.insecure.unwrap_or(defaults.insecure) {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.ca_cert {
            TlsMode::CustomCa(ca_path.clone())
        } else {
            TlsMode::System
        };

        Ok(ServerConfig {
            base_url,
            tls,
            timeout: Duration::from_secs(self.timeout.unwrap_or(defaults.timeout)),
        })
    }
}

/// Fully resolved connection settings for one server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub base_url: Url,
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl ServerConfig {
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            timeout: self.timeout,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "pingwatch", "pingwatch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("pingwatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file path. A missing file yields the defaults.
///
/// Environment keys nest with a double underscore, e.g.
/// `PINGWATCH_DEFAULTS__TIMEOUT=5`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("PINGWATCH_").split("__"));

    Ok(figment.extract()?)
}

/// Load config, returning a default if it can't be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.active_profile_name(), "default");
        assert_eq!(cfg.defaults.timeout, 30);
        assert_eq!(cfg.profile("default").unwrap().server, DEFAULT_SERVER);
    }

    #[test]
    fn saved_profiles_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.default_profile = Some("plant".into());
        cfg.profiles.insert(
            "plant".into(),
            Profile {
                server: "https://monitor.plant.example:8443".into(),
                ca_cert: None,
                insecure: Some(true),
                timeout: Some(5),
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.active_profile_name(), "plant");
        assert_eq!(loaded.profiles["plant"], cfg.profiles["plant"]);
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let cfg = Config::default();
        assert!(matches!(
            cfg.profile("nowhere"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn profile_resolves_tls_and_timeout() {
        let defaults = Defaults::default();
        let mut profile = Profile::local();
        let conn = profile.to_connection(&defaults).unwrap();
        assert!(matches!(conn.tls, TlsMode::System));
        assert_eq!(conn.timeout, Duration::from_secs(30));
        assert_eq!(conn.base_url.as_str(), "http://localhost:5000/");

        profile.ca_cert = Some(PathBuf::from("/etc/ssl/plant-ca.pem"));
        profile.timeout = Some(3);
        let conn = profile.to_connection(&defaults).unwrap();
        assert!(matches!(conn.tls, TlsMode::CustomCa(_)));
        assert_eq!(conn.transport().timeout, Duration::from_secs(3));

        profile.insecure = Some(true);
        assert!(matches!(
            profile.to_connection(&defaults).unwrap().tls,
            TlsMode::DangerAcceptInvalid
        ));
    }

    #[test]
    fn non_http_server_is_rejected() {
        let profile = Profile {
            server: "mqtt://broker:1883".into(),
            ..Profile::local()
        };
        assert!(matches!(
            profile.to_connection(&Defaults::default()),
            Err(ConfigError::Validation { .. })
        ));
    }
}
