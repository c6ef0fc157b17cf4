//! Resolution of a backend's configuration map into immutable settings.

use camino::Utf8PathBuf;

use crate::config::ProvisionerConfig;
use crate::verbosity::Verbosity;

/// Key naming the backend client executable.
pub const CLIENT_KEY: &str = "client";
/// Key naming the backend's own configuration file.
pub const CONFIG_FILE_KEY: &str = "config-file-location";
/// Key naming the verbosity level.
pub const VERBOSITY_KEY: &str = "verbosity";

/// Per-backend fallbacks for keys absent from the configuration map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendDefaults {
    pub client: String,
    pub config_file: String,
}

/// Effective settings of a provisioner, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionerSettings {
    /// Path to the backend client executable
    pub client: String,
    /// Path to the backend client's configuration file
    pub config_file: String,
    /// How much subprocess output is surfaced
    pub verbosity: Verbosity,
}

impl ProvisionerSettings {
    /// Resolves settings from `config`, substituting `defaults` for absent keys.
    pub fn resolve(config: &ProvisionerConfig, defaults: BackendDefaults) -> Self {
        let client = config.get(CLIENT_KEY).cloned().unwrap_or(defaults.client);
        let config_file = config
            .get(CONFIG_FILE_KEY)
            .cloned()
            .unwrap_or(defaults.config_file);
        let verbosity = config
            .get(VERBOSITY_KEY)
            .map(|v| Verbosity::parse_or_default(v))
            .unwrap_or_default();

        tracing::debug!(
            client = %client,
            config_file = %config_file,
            verbosity = %verbosity,
            "resolved provisioner settings"
        );

        Self {
            client,
            config_file,
            verbosity,
        }
    }
}

/// Returns `name` under the invoking user's home directory.
///
/// The home directory comes from `HOME` or, when unset, the user's account
/// entry. Only if neither is available is `name` resolved against `.`.
pub(crate) fn home_path(name: &str) -> String {
    match dirs::home_dir().and_then(|home| Utf8PathBuf::from_path_buf(home).ok()) {
        Some(home) => home.join(name).into_string(),
        None => {
            tracing::warn!("home directory unknown, resolving {} against the working directory", name);
            Utf8PathBuf::from(".").join(name).into_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> BackendDefaults {
        BackendDefaults {
            client: "/usr/bin/s3cmd".to_string(),
            config_file: "/root/.s3cfg".to_string(),
        }
    }

    #[test]
    fn test_empty_map_uses_defaults() {
        let settings = ProvisionerSettings::resolve(&ProvisionerConfig::new(), defaults());
        assert_eq!(settings.client, "/usr/bin/s3cmd");
        assert_eq!(settings.config_file, "/root/.s3cfg");
        assert_eq!(settings.verbosity, Verbosity::Normal);
    }

    #[test]
    fn test_configured_values_win() {
        let config = ProvisionerConfig::from([
            (CLIENT_KEY.to_string(), "/usr/local/bin/s3cmd".to_string()),
            (CONFIG_FILE_KEY.to_string(), "/etc/s3cfg".to_string()),
            (VERBOSITY_KEY.to_string(), "Minimal".to_string()),
        ]);
        let settings = ProvisionerSettings::resolve(&config, defaults());
        assert_eq!(settings.client, "/usr/local/bin/s3cmd");
        assert_eq!(settings.config_file, "/etc/s3cfg");
        assert_eq!(settings.verbosity, Verbosity::Minimal);
    }

    #[test]
    fn test_unknown_verbosity_is_normal() {
        let config =
            ProvisionerConfig::from([(VERBOSITY_KEY.to_string(), "chatty".to_string())]);
        let settings = ProvisionerSettings::resolve(&config, defaults());
        assert_eq!(settings.verbosity, Verbosity::Normal);
    }

    #[test]
    fn test_home_path_is_under_home_directory() {
        let home = dirs::home_dir().expect("home directory");
        let path = home_path(".s3cfg");
        assert_eq!(path, home.join(".s3cfg").to_str().unwrap());
        assert!(camino::Utf8Path::new(&path).is_absolute());
    }
}
