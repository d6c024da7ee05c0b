//! `[build]` section configuration.
//!
//! Contains build settings including paths, minification, sitemap, search
//! index and code highlighting.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Main BuildConfig
// ============================================================================

/// `[build]` section in lectern.toml - build pipeline configuration.
///
/// # Example
/// ```toml
/// [build]
/// content = "content"      # Lessons, one folder per chapter
/// output = "public"        # Output directory
/// minify = true            # Minify HTML
///
/// [build.highlight]
/// languages = ["dart", "yaml"]
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Lesson source directory (`<chapter>/<lesson>.md`).
    #[serde(default = "defaults::build::content")]
    #[educe(Default = defaults::build::content())]
    pub content: PathBuf,

    /// Build output directory.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Static assets directory (styles, scripts, icons), copied verbatim.
    #[serde(default = "defaults::build::assets")]
    #[educe(Default = defaults::build::assets())]
    pub assets: PathBuf,

    /// Minify HTML output (removes whitespace).
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub minify: bool,

    /// Clear output directory before each build.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub clean: bool,

    /// Number of lessons sampled for the home page.
    #[serde(default = "defaults::build::featured")]
    #[educe(Default = defaults::build::featured())]
    pub featured: usize,

    /// Sitemap generation settings.
    #[serde(default)]
    pub sitemap: SitemapConfig,

    /// Search index generation settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Code block highlighting settings.
    #[serde(default)]
    pub highlight: HighlightConfig,
}

// ============================================================================
// Sub-configurations
// ============================================================================

/// `[build.sitemap]` section
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SitemapConfig {
    /// Enable sitemap generation.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Output path for the sitemap, relative to the output directory.
    #[serde(default = "defaults::build::sitemap::path")]
    #[educe(Default = defaults::build::sitemap::path())]
    pub path: PathBuf,
}

/// `[build.search]` section
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Enable search index generation.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Output path for the index, relative to the output directory.
    #[serde(default = "defaults::build::search::path")]
    #[educe(Default = defaults::build::search::path())]
    pub path: PathBuf,
}

/// `[build.highlight]` section
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct HighlightConfig {
    /// Language tags that get a grammar. Everything else renders plain.
    #[serde(default = "defaults::build::highlight::languages")]
    #[educe(Default = defaults::build::highlight::languages())]
    pub languages: Vec<String>,

    /// Name of the code theme used for rendered blocks.
    #[serde(default = "defaults::build::highlight::theme")]
    #[educe(Default = defaults::build::highlight::theme())]
    pub theme: String,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use std::path::PathBuf;

    #[test]
    fn test_build_config_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();

        assert_eq!(config.build.content, PathBuf::from("content"));
        assert_eq!(config.build.output, PathBuf::from("public"));
        assert_eq!(config.build.assets, PathBuf::from("static"));
        assert!(config.build.minify);
        assert!(!config.build.clean);
        assert_eq!(config.build.featured, 3);
        assert!(config.build.sitemap.enable);
        assert_eq!(config.build.sitemap.path, PathBuf::from("sitemap.xml"));
        assert!(config.build.search.enable);
        assert_eq!(config.build.search.path, PathBuf::from("search-index.json"));
        assert_eq!(
            config.build.highlight.languages,
            vec!["dart", "yaml", "bash", "json", "xml"]
        );
        assert_eq!(config.build.highlight.theme, "css-variables");
    }

    #[test]
    fn test_build_sitemap_config() {
        let config = r#"
            [build.sitemap]
            enable = false
            path = "map.xml"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert!(!config.build.sitemap.enable);
        assert_eq!(config.build.sitemap.path, PathBuf::from("map.xml"));
    }

    #[test]
    fn test_build_highlight_config() {
        let config = r#"
            [build.highlight]
            languages = ["dart", "rust"]
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.build.highlight.languages, vec!["dart", "rust"]);
        assert_eq!(config.build.highlight.theme, "css-variables");
    }

    #[test]
    fn test_build_unknown_field_rejection() {
        let config = r#"
            [build]
            typst = true
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);
        assert!(result.is_err());
    }
}
