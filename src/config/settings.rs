//! `[settings]` section configuration.
//!
//! Where reader preferences are persisted.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[settings]` section in lectern.toml.
///
/// # Example
/// ```toml
/// [settings]
/// path = ".lectern/settings.json"
/// key = "easyflutter-settings"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SettingsConfig {
    /// Storage file, relative to the project root.
    #[serde(default = "defaults::settings::path")]
    #[educe(Default = defaults::settings::path())]
    pub path: PathBuf,

    /// Storage key the settings blob lives under.
    #[serde(default = "defaults::settings::key")]
    #[educe(Default = defaults::settings::key())]
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use std::path::PathBuf;

    #[test]
    fn test_settings_config_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();

        assert_eq!(config.settings.path, PathBuf::from(".lectern/settings.json"));
        assert_eq!(config.settings.key, "easyflutter-settings");
    }

    #[test]
    fn test_settings_config_override() {
        let config = r#"
            [settings]
            key = "my-course"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.settings.key, "my-course");
    }
}
