//! `[serve]` section configuration.
//!
//! Where `lectern serve` listens. Pages are rendered from memory, so there is
//! nothing else to configure.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[serve]` section in lectern.toml.
///
/// ```toml
/// [serve]
/// interface = "0.0.0.0"
/// port = 8080
/// ```
///
/// When `port` is taken the server tries the next few ports.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ServeConfig {
    /// Address to bind; `0.0.0.0` exposes the course to the LAN.
    #[serde(default = "defaults::serve::interface")]
    #[educe(Default = defaults::serve::interface())]
    pub interface: String,

    /// First port tried.
    #[serde(default = "defaults::serve::port")]
    #[educe(Default = defaults::serve::port())]
    pub port: u16,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;

    #[test]
    fn test_serve_defaults_to_localhost() {
        let config: SiteConfig = toml::from_str("").unwrap();

        assert_eq!(config.serve.interface, "127.0.0.1");
        assert_eq!(config.serve.port, 5277);
    }

    #[test]
    fn test_serve_lan_override() {
        let config: SiteConfig = toml::from_str("[serve]\ninterface = \"0.0.0.0\"").unwrap();

        assert_eq!(config.serve.interface, "0.0.0.0");
        assert_eq!(config.serve.port, 5277);
    }

    #[test]
    fn test_serve_rejects_watch_and_unknown_keys() {
        for key in ["watch = true", "livereload = true", "root = \"public\""] {
            let result: Result<SiteConfig, _> = toml::from_str(&format!("[serve]\n{key}"));
            assert!(result.is_err(), "`{key}` should be rejected");
        }
    }
}
