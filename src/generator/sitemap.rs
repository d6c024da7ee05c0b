//! Sitemap generation.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/lessons/why-flutter</loc>
//!     <lastmod>2024-01-15T00:00:00.000Z</lastmod>
//!     <changefreq>monthly</changefreq>
//!     <priority>0.7</priority>
//!   </url>
//! </urlset>
//! ```

use crate::{
    config::SiteConfig,
    content::Post,
    log,
    utils::minify::{Output, minify},
};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use std::fs;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Write the sitemap if enabled in config.
pub fn build_sitemap(config: &SiteConfig, posts: &[Post]) -> Result<()> {
    if !config.build.sitemap.enable {
        return Ok(());
    }
    let base_url = config.base.url.as_deref().unwrap_or_default();
    let xml = Sitemap::from_posts(base_url, posts).into_xml();
    let xml = minify(Output::Xml(&xml), config);

    let path = config.sitemap_path();
    fs::write(&path, &*xml)
        .with_context(|| format!("Failed to write sitemap to {}", path.display()))?;

    log!("sitemap"; "{} urls", posts.len() + 2);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeFreq {
    Daily,
    Weekly,
    Monthly,
}

impl ChangeFreq {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

struct UrlEntry {
    loc: String,
    lastmod: Option<String>,
    changefreq: ChangeFreq,
    priority: &'static str,
}

pub struct Sitemap {
    urls: Vec<UrlEntry>,
}

impl Sitemap {
    /// Home, the rubricator, then one entry per lesson.
    pub fn from_posts(base_url: &str, posts: &[Post]) -> Self {
        let base = base_url.trim_end_matches('/');

        let mut urls = Vec::with_capacity(posts.len() + 2);
        urls.push(UrlEntry {
            loc: format!("{base}/"),
            lastmod: None,
            changefreq: ChangeFreq::Daily,
            priority: "1.0",
        });
        urls.push(UrlEntry {
            loc: format!("{base}/rubricator"),
            lastmod: None,
            changefreq: ChangeFreq::Weekly,
            priority: "0.8",
        });
        urls.extend(posts.iter().map(|post| UrlEntry {
            loc: format!("{base}/lessons/{}", urlencoding::encode(&post.slug)),
            lastmod: lastmod(&post.date).or_else(|| {
                log!("sitemap"; "`{}`: unparseable date `{}`, no lastmod", post.slug, post.date);
                None
            }),
            changefreq: ChangeFreq::Monthly,
            priority: "0.7",
        }));

        Self { urls }
    }

    pub fn into_xml(self) -> String {
        let mut xml = String::with_capacity(256 + self.urls.len() * 192);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#));
        xml.push('\n');

        for entry in self.urls {
            xml.push_str("  <url>\n");
            xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
            if let Some(lastmod) = entry.lastmod {
                xml.push_str(&format!("    <lastmod>{lastmod}</lastmod>\n"));
            }
            xml.push_str(&format!(
                "    <changefreq>{}</changefreq>\n",
                entry.changefreq.as_str()
            ));
            xml.push_str(&format!("    <priority>{}</priority>\n", entry.priority));
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }
}

/// Lesson date as a UTC timestamp with milliseconds.
///
/// Accepts `YYYY-MM-DD` (midnight UTC) and RFC 3339.
pub fn lastmod(date: &str) -> Option<String> {
    let date = date.trim();
    let utc: DateTime<Utc> = if let Ok(day) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        day.and_hms_opt(0, 0, 0)?.and_utc()
    } else {
        DateTime::parse_from_rfc3339(date).ok()?.with_timezone(&Utc)
    };
    Some(utc.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(slug: &str, date: &str) -> Post {
        Post {
            slug: slug.into(),
            title: String::new(),
            date: date.into(),
            description: String::new(),
            tags: Vec::new(),
            order: 1,
            chapter: "01-introduction".into(),
            content: String::new(),
        }
    }

    #[test]
    fn test_lastmod_formats() {
        assert_eq!(lastmod("2024-01-15").as_deref(), Some("2024-01-15T00:00:00.000Z"));
        assert_eq!(
            lastmod("2024-01-15T10:30:00+03:00").as_deref(),
            Some("2024-01-15T07:30:00.000Z")
        );
        assert_eq!(
            lastmod("2024-03-01T12:00:00.250Z").as_deref(),
            Some("2024-03-01T12:00:00.250Z")
        );
    }

    #[test]
    fn test_lastmod_invalid() {
        assert_eq!(lastmod(""), None);
        assert_eq!(lastmod("yesterday"), None);
        assert_eq!(lastmod("2024-13-01"), None);
    }

    #[test]
    fn test_empty_repository_has_fixed_routes() {
        let xml = Sitemap::from_posts("https://example.com", &[]).into_xml();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#)));
        assert_eq!(xml.matches("<url>").count(), 2);
        assert!(xml.contains("<loc>https://example.com/</loc>\n    <changefreq>daily</changefreq>\n    <priority>1.0</priority>"));
        assert!(xml.contains("<loc>https://example.com/rubricator</loc>\n    <changefreq>weekly</changefreq>\n    <priority>0.8</priority>"));
        assert!(xml.trim_end().ends_with("</urlset>"));
    }

    #[test]
    fn test_one_entry_per_post() {
        let posts = vec![post("why-flutter", "2024-01-15"), post("variables", "2024-02-01")];
        let xml = Sitemap::from_posts("https://example.com/", &posts).into_xml();

        assert_eq!(xml.matches("<url>").count(), 4);
        assert!(xml.contains(
            "<loc>https://example.com/lessons/why-flutter</loc>\n    <lastmod>2024-01-15T00:00:00.000Z</lastmod>\n    <changefreq>monthly</changefreq>\n    <priority>0.7</priority>"
        ));
        assert!(xml.contains("<lastmod>2024-02-01T00:00:00.000Z</lastmod>"));
        assert!(!xml.contains("example.com//"));
    }

    #[test]
    fn test_bad_date_omits_lastmod() {
        let xml = Sitemap::from_posts("https://example.com", &[post("a", "soon")]).into_xml();

        assert!(xml.contains("<loc>https://example.com/lessons/a</loc>"));
        assert!(!xml.contains("<lastmod>"));
    }

    #[test]
    fn test_escaping() {
        let xml = Sitemap::from_posts("https://example.com/?a=1&b=2", &[post("x&y", "")]).into_xml();

        assert!(xml.contains("<loc>https://example.com/?a=1&amp;b=2/</loc>"));
        assert!(xml.contains("/lessons/x%26y</loc>"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("<a href=\"x\">'&'</a>"), "&lt;a href=&quot;x&quot;&gt;&apos;&amp;&apos;&lt;/a&gt;");
    }
}
