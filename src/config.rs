//! Skygate configuration, plus the host settings file.

use std::path::{Path, PathBuf};

use config::{Config, File};

use crate::errors::SkygateError;

/// Configuration for an authentication controller.
///
/// Contains the product-specific settings needed to authenticate against
/// the entitlement service and to place the offline lease.
#[derive(Debug, Clone)]
pub struct SkygateConfig {
    /// Host application name (e.g., "towersim"), used in the User-Agent.
    pub app_name: &'static str,

    /// Namespace under the platform data directory for the lease file.
    /// Each product should use a unique namespace to avoid collisions.
    pub data_namespace: &'static str,

    /// Path of the host's key-value settings file. The only contract this
    /// crate relies on is a `Networking.APIKey` entry.
    pub settings_path: PathBuf,

    /// Base URL of the remote entitlement service.
    pub service_url: String,
}

impl SkygateConfig {
    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), SkygateError> {
        if self.app_name.is_empty() {
            return Err(SkygateError::ConfigError(
                "app_name cannot be empty".to_string(),
            ));
        }
        if self.data_namespace.is_empty() {
            return Err(SkygateError::ConfigError(
                "data_namespace cannot be empty".to_string(),
            ));
        }
        if !self.service_url.starts_with("http") {
            return Err(SkygateError::ConfigError(format!(
                "service_url must be an http(s) URL, got {:?}",
                self.service_url
            )));
        }
        Ok(())
    }
}

/// Read-only view of the host's settings file.
///
/// The settings reader itself is an external collaborator; this wrapper
/// only enforces the key-value contract the authentication core needs.
pub struct Settings {
    values: Config,
}

impl Settings {
    /// Load the settings file (TOML or INI, by extension).
    ///
    /// A missing or unreadable file is [`SkygateError::ConfigMissing`]: the
    /// caller falls back to the offline outcome, it does not crash.
    pub fn load(path: &Path) -> Result<Self, SkygateError> {
        let values = Config::builder()
            .add_source(File::from(path))
            .build()
            .map_err(|e| {
                SkygateError::ConfigMissing(format!("settings file {}: {e}", path.display()))
            })?;
        Ok(Self { values })
    }

    /// The remote service API key (`Networking.APIKey`).
    ///
    /// An absent entry is [`SkygateError::ConfigMissing`].
    pub fn api_key(&self) -> Result<String, SkygateError> {
        self.values
            .get_string("Networking.APIKey")
            .map_err(|e| SkygateError::ConfigMissing(format!("Networking.APIKey: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn test_config() -> SkygateConfig {
        SkygateConfig {
            app_name: "test-app",
            data_namespace: "skygate-test",
            settings_path: PathBuf::from("settings.toml"),
            service_url: "https://entitlements.example".to_string(),
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_namespace() {
        let mut config = test_config();
        config.data_namespace = "";
        assert!(matches!(
            config.validate(),
            Err(SkygateError::ConfigError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = test_config();
        config.service_url = "entitlements.example".to_string();
        assert!(matches!(
            config.validate(),
            Err(SkygateError::ConfigError(_))
        ));
    }

    #[test]
    fn test_settings_api_key_present() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[Networking]\nAPIKey = \"key-123\"\n").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.api_key().unwrap(), "key-123");
    }

    #[test]
    fn test_settings_api_key_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[Networking]\nOther = 1\n").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert!(matches!(
            settings.api_key(),
            Err(SkygateError::ConfigMissing(_))
        ));
    }

    #[test]
    fn test_settings_file_missing() {
        let dir = TempDir::new().unwrap();
        let result = Settings::load(&dir.path().join("nope.toml"));
        assert!(matches!(result, Err(SkygateError::ConfigMissing(_))));
    }
}
