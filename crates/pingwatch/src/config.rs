//! CLI configuration: a thin wrapper around `pingwatch_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--server, --insecure, --timeout).

use pingwatch_config::ConfigError;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use pingwatch_config::{
    Config, Profile, ServerConfig, config_path, load_config, save_config,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name().to_owned())
}

/// Translate the active profile plus global flags into connection settings.
///
/// CLI flag overrides take priority over profile values. With `--server`
/// an unknown profile name is not an error; the flags stand alone.
pub fn resolve_server(global: &GlobalOpts, config: &Config) -> Result<ServerConfig, CliError> {
    let name = active_profile_name(global, config);

    let mut profile = match config.profile(&name) {
        Ok(profile) => profile,
        Err(ConfigError::UnknownProfile { .. }) if global.server.is_some() => Profile::local(),
        Err(ConfigError::UnknownProfile { name }) => {
            let available: Vec<&str> = config.profiles.keys().map(String::as_str).collect();
            return Err(CliError::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        Err(other) => return Err(other.into()),
    };

    if let Some(ref server) = global.server {
        profile.server.clone_from(server);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if global.timeout.is_some() {
        profile.timeout = global.timeout;
    }

    tracing::debug!(profile = %name, server = %profile.server, "resolved server profile");
    Ok(profile.to_connection(&config.defaults)?)
}
