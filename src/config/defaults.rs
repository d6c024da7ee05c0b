//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [base] Section Defaults
// ============================================================================

pub mod base {
    pub fn url() -> Option<String> {
        None
    }

    pub fn language() -> String {
        "ru".into()
    }
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn content() -> PathBuf {
        "content".into()
    }

    pub fn output() -> PathBuf {
        "public".into()
    }

    pub fn assets() -> PathBuf {
        "static".into()
    }

    pub fn featured() -> usize {
        3
    }

    pub mod sitemap {
        use std::path::PathBuf;

        pub fn path() -> PathBuf {
            "sitemap.xml".into()
        }
    }

    pub mod search {
        use std::path::PathBuf;

        pub fn path() -> PathBuf {
            "search-index.json".into()
        }
    }

    pub mod highlight {
        pub fn languages() -> Vec<String> {
            ["dart", "yaml", "bash", "json", "xml"]
                .into_iter()
                .map(String::from)
                .collect()
        }

        pub fn theme() -> String {
            "css-variables".into()
        }
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        5277
    }
}

// ============================================================================
// [settings] Section Defaults
// ============================================================================

pub mod settings {
    use std::path::PathBuf;

    pub fn path() -> PathBuf {
        ".lectern/settings.json".into()
    }

    pub fn key() -> String {
        "easyflutter-settings".into()
    }
}
