//! Output minification for generated pages and the sitemap.

use crate::config::SiteConfig;
use std::borrow::Cow;

/// Generated document, by kind.
pub enum Output<'a> {
    Html(&'a str),
    Xml(&'a str),
}

/// Minify `output` when `[build] minify` is on, otherwise pass it through.
pub fn minify<'a>(output: Output<'a>, config: &SiteConfig) -> Cow<'a, [u8]> {
    match (config.build.minify, output) {
        (false, Output::Html(text) | Output::Xml(text)) => Cow::Borrowed(text.as_bytes()),
        (true, Output::Html(html)) => Cow::Owned(minify_html(html)),
        (true, Output::Xml(xml)) => Cow::Owned(minify_xml(xml)),
    }
}

fn minify_html(html: &str) -> Vec<u8> {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.minify_css = true;
    cfg.minify_js = true;
    minify_html::minify(html.as_bytes(), &cfg)
}

/// Line-based: drops indentation and blank lines, keeps text nodes intact.
fn minify_xml(xml: &str) -> Vec<u8> {
    xml.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<String>()
        .into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(minify: bool) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.build.minify = minify;
        config
    }

    #[test]
    fn test_disabled_passes_through() {
        let html = "<html>\n  <body>\n  </body>\n</html>";
        assert_eq!(&*minify(Output::Html(html), &config(false)), html.as_bytes());
        assert_eq!(&*minify(Output::Xml(html), &config(false)), html.as_bytes());
    }

    #[test]
    fn test_html_keeps_code_blocks() {
        let html = "<html>\n  <body>\n    <pre><code>a\n  b</code></pre>\n  </body>\n</html>";
        let out = minify(Output::Html(html), &config(true));
        let out = String::from_utf8_lossy(&out);

        assert!(out.len() < html.len());
        assert!(out.contains("a\n  b"));
    }

    #[test]
    fn test_xml_sitemap() {
        let xml = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset>\n  <url>\n\n    <loc>https://example.com/</loc>\n  </url>\n</urlset>\n";
        let out = minify(Output::Xml(xml), &config(true));

        assert_eq!(
            &*out,
            b"<?xml version=\"1.0\" encoding=\"UTF-8\"?><urlset><url><loc>https://example.com/</loc></url></urlset>"
        );
    }
}
