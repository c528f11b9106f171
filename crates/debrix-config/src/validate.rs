//! Validation helpers for configuration documents.

use crate::error::{ConfigError, ConfigResult};
use crate::model::{MountSettings, ProviderSettings};

/// Validate provider settings before constructing a client.
///
/// A missing or blank API key is a fatal configuration error: the provider
/// rejects every call without one, so retrying is pointless.
///
/// # Errors
///
/// Returns [`ConfigError`] describing the first offending field.
pub fn validate_provider_settings(settings: &ProviderSettings) -> ConfigResult<()> {
    if settings.api_key.trim().is_empty() {
        return Err(ConfigError::MissingField {
            section: "provider",
            field: "api_key",
        });
    }

    if settings.base_url.trim().is_empty() {
        return Err(ConfigError::MissingField {
            section: "provider",
            field: "base_url",
        });
    }

    if !settings.base_url.starts_with("http://") && !settings.base_url.starts_with("https://") {
        return Err(ConfigError::InvalidField {
            section: "provider",
            field: "base_url",
            reason: "must_be_http_url",
            value: Some(settings.base_url.clone()),
        });
    }

    if settings.timeout_secs == 0 {
        return Err(ConfigError::InvalidField {
            section: "provider",
            field: "timeout_secs",
            reason: "must_be_positive",
            value: Some(settings.timeout_secs.to_string()),
        });
    }

    Ok(())
}

/// Validate mount settings before handing them to the symlink worker.
///
/// # Errors
///
/// Returns [`ConfigError`] when the root is empty or reduces to nothing once
/// the wildcard marker is stripped.
pub fn validate_mount_settings(settings: &MountSettings) -> ConfigResult<()> {
    if settings.root.trim().is_empty() {
        return Err(ConfigError::MissingField {
            section: "mount",
            field: "root",
        });
    }

    if settings.root_path().as_os_str().is_empty() {
        return Err(ConfigError::InvalidField {
            section: "mount",
            field: "root",
            reason: "wildcard_without_root",
            value: Some(settings.root.clone()),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(api_key: &str) -> ProviderSettings {
        ProviderSettings {
            api_key: api_key.to_string(),
            base_url: "https://api.real-debrid.com/rest/1.0".to_string(),
            timeout_secs: 100,
        }
    }

    #[test]
    fn blank_api_key_is_rejected() {
        let err = validate_provider_settings(&provider("   ")).expect_err("expected rejection");
        assert!(matches!(
            err,
            ConfigError::MissingField {
                section: "provider",
                field: "api_key",
            }
        ));
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let mut settings = provider("key");
        settings.base_url = "ftp://api.real-debrid.com".to_string();
        let err = validate_provider_settings(&settings).expect_err("expected rejection");
        assert!(matches!(
            err,
            ConfigError::InvalidField {
                field: "base_url",
                reason: "must_be_http_url",
                ..
            }
        ));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut settings = provider("key");
        settings.timeout_secs = 0;
        let err = validate_provider_settings(&settings).expect_err("expected rejection");
        assert!(matches!(
            err,
            ConfigError::InvalidField {
                field: "timeout_secs",
                ..
            }
        ));
    }

    #[test]
    fn valid_provider_settings_pass() {
        validate_provider_settings(&provider("key")).expect("expected valid settings");
    }

    #[test]
    fn bare_wildcard_root_is_rejected() {
        let settings = MountSettings {
            root: "/*".to_string(),
        };
        let err = validate_mount_settings(&settings).expect_err("expected rejection");
        assert!(matches!(
            err,
            ConfigError::InvalidField {
                field: "root",
                reason: "wildcard_without_root",
                ..
            }
        ));
    }

    #[test]
    fn wildcard_root_passes() {
        let settings = MountSettings {
            root: "/mnt/debrid/*".to_string(),
        };
        validate_mount_settings(&settings).expect("expected valid settings");
    }
}
