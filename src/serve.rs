//! Development server.
//!
//! Serves the course straight from memory: lessons, the highlighter and the
//! reader settings are loaded once at startup, then every request renders its
//! page on the fly.
//!
//! ```text
//! /                   home
//! /rubricator         chapter listing
//! /lessons/<slug>     lesson (404 page when missing)
//! /sitemap.xml        sitemap
//! /search-index.json  search index
//! /<path>             file from the assets directory
//! ```
//!
//! `?panel=search` or `?panel=settings` renders the page with that panel open.

use crate::{
    config::SiteConfig,
    generator::{search::search_index_json, sitemap::Sitemap},
    log,
    site::Site,
    ui::UiState,
};
use anyhow::{Context, Result, anyhow};
use std::{
    fs,
    net::{IpAddr, SocketAddr},
    path::{Component, Path},
    sync::Arc,
};
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

const HTML: &str = "text/html; charset=utf-8";

/// Start the server and block until Ctrl+C.
pub fn serve_site(config: &SiteConfig) -> Result<()> {
    let site = Site::load(config)?;
    site.log_summary();

    let interface: IpAddr = config
        .serve
        .interface
        .parse()
        .with_context(|| format!("Invalid interface `{}`", config.serve.interface))?;
    let (server, addr) = try_bind_port(interface, config.serve.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    let base_url = format!("http://{addr}");
    log!("serve"; "{}", base_url);

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &site, &base_url) {
            log!("serve"; "request error: {e}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

// ============================================================================
// Routing
// ============================================================================

#[derive(Debug, PartialEq, Eq)]
enum Route<'a> {
    Home,
    Rubricator,
    Lesson(&'a str),
    Sitemap,
    SearchIndex,
    Asset(&'a str),
}

impl<'a> Route<'a> {
    /// Resolve a decoded request path (query already stripped).
    fn resolve(path: &'a str) -> Self {
        match path.trim_matches('/') {
            "" | "index.html" => Self::Home,
            "rubricator" => Self::Rubricator,
            "sitemap.xml" => Self::Sitemap,
            "search-index.json" => Self::SearchIndex,
            other => match other.strip_prefix("lessons/") {
                Some(slug) => Self::Lesson(slug),
                None => Self::Asset(other),
            },
        }
    }
}

/// Split a raw request URL into its decoded path and the raw query string.
fn split_url(url: &str) -> (String, Option<&str>) {
    let (path, query) = match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    };
    let path = urlencoding::decode(path)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();
    (path, query)
}

/// Value of the `panel` query parameter, if any.
fn panel_param(query: Option<&str>) -> Option<&str> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| *name == "panel")
        .map(|(_, value)| value)
}

/// A fully rendered response, independent of the HTTP library.
#[derive(Debug)]
struct Reply {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
}

impl Reply {
    fn ok(content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self { status: 200, content_type, body: body.into() }
    }

    fn not_found(site: &Site) -> Self {
        Self {
            status: 404,
            content_type: HTML,
            body: site.not_found_page(UiState::new()).into_bytes(),
        }
    }
}

fn handle_request(request: Request, site: &Site, base_url: &str) -> Result<()> {
    let (path, query) = split_url(request.url());
    let ui = UiState::from_panel_query(panel_param(query));
    let reply = reply_for(site, base_url, Route::resolve(&path), ui)?;

    let header = Header::from_bytes("Content-Type", reply.content_type)
        .map_err(|()| anyhow!("Invalid content type `{}`", reply.content_type))?;
    let response = Response::from_data(reply.body)
        .with_status_code(StatusCode(reply.status))
        .with_header(header);

    request.respond(response)?;
    Ok(())
}

fn reply_for(site: &Site, base_url: &str, route: Route, ui: UiState) -> Result<Reply> {
    let config = site.config();

    let reply = match route {
        Route::Home => Reply::ok(HTML, site.home_page(ui, &mut rand::thread_rng())),
        Route::Rubricator => Reply::ok(HTML, site.rubricator_page(ui)),
        Route::Lesson(slug) => match site.lesson_page(slug, ui)? {
            Some(html) => Reply::ok(HTML, html),
            None => Reply::not_found(site),
        },
        Route::Sitemap if config.build.sitemap.enable => {
            let xml = Sitemap::from_posts(base_url, site.repo().all_posts()).into_xml();
            Reply::ok(guess_content_type(Path::new("sitemap.xml")), xml)
        }
        Route::SearchIndex if config.build.search.enable => Reply::ok(
            guess_content_type(Path::new("search-index.json")),
            search_index_json(site.repo())?,
        ),
        Route::Sitemap | Route::SearchIndex => Reply::not_found(site),
        Route::Asset(relative) => serve_asset(site, relative)?,
    };
    Ok(reply)
}

/// Only plain path segments may reach the assets directory.
fn is_safe_relative(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_)))
}

fn serve_asset(site: &Site, relative: &str) -> Result<Reply> {
    let relative = Path::new(relative);
    if !is_safe_relative(relative) {
        return Ok(Reply::not_found(site));
    }

    let local_path = site.config().build.assets.join(relative);
    if !local_path.is_file() {
        return Ok(Reply::not_found(site));
    }

    let content = fs::read(&local_path)
        .with_context(|| format!("Failed to read {}", local_path.display()))?;
    Ok(Reply::ok(guess_content_type(&local_path), content))
}

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        // Web content
        Some("html" | "htm") => HTML,
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",

        // Images
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",

        Some("txt") => "text/plain; charset=utf-8",

        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        content::{ChapterTitles, PostRepository, loader::parse_source},
        render::{Highlighter, Renderer},
        settings::{RootElement, Settings},
    };
    use std::{path::PathBuf, sync::LazyLock};

    static RENDERER: LazyLock<Renderer> = LazyLock::new(|| {
        Renderer::new(Arc::new(
            Highlighter::new(&crate::config::HighlightConfig::default()).unwrap(),
        ))
    });

    fn repo() -> PostRepository {
        let source = parse_source(
            PathBuf::from("/content/01-introduction/01-welcome.md"),
            "---\nslug: welcome\ntitle: Welcome\ndate: 2024-01-15\n---\nHello",
        )
        .unwrap();
        PostRepository::from_sources(vec![source], ChapterTitles::default())
    }

    fn with_site(config: &SiteConfig, f: impl FnOnce(&Site)) {
        let site = Site::new(config, repo(), RENDERER.clone(), Settings::default(), &RootElement::new())
            .unwrap();
        f(&site);
    }

    fn body(reply: &Reply) -> &str {
        std::str::from_utf8(&reply.body).unwrap()
    }

    #[test]
    fn test_route_resolve() {
        assert_eq!(Route::resolve("/"), Route::Home);
        assert_eq!(Route::resolve(""), Route::Home);
        assert_eq!(Route::resolve("/rubricator/"), Route::Rubricator);
        assert_eq!(Route::resolve("/lessons/why-flutter"), Route::Lesson("why-flutter"));
        assert_eq!(Route::resolve("/sitemap.xml"), Route::Sitemap);
        assert_eq!(Route::resolve("/search-index.json"), Route::SearchIndex);
        assert_eq!(Route::resolve("/img/logo.svg"), Route::Asset("img/logo.svg"));
    }

    #[test]
    fn test_split_url() {
        let (path, query) = split_url("/lessons/%D1%83%D1%80%D0%BE%D0%BA?panel=search");
        assert_eq!(path, "/lessons/урок");
        assert_eq!(query, Some("panel=search"));

        let (path, query) = split_url("/rubricator");
        assert_eq!(path, "/rubricator");
        assert_eq!(query, None);
    }

    #[test]
    fn test_panel_param() {
        assert_eq!(panel_param(Some("panel=settings")), Some("settings"));
        assert_eq!(panel_param(Some("t=1&panel=search")), Some("search"));
        assert_eq!(panel_param(Some("t=1")), None);
        assert_eq!(panel_param(None), None);
    }

    #[test]
    fn test_lesson_routes() {
        let config = SiteConfig::default();
        with_site(&config, |site| {
            let found = reply_for(site, "http://x", Route::Lesson("welcome"), UiState::new()).unwrap();
            assert_eq!(found.status, 200);
            assert!(body(&found).contains("<h1>Welcome</h1>"));

            let missing = reply_for(site, "http://x", Route::Lesson("nope"), UiState::new()).unwrap();
            assert_eq!(missing.status, 404);
            assert!(body(&missing).contains("Урок не найден"));
        });
    }

    #[test]
    fn test_nested_slug_is_not_served() {
        let nested = parse_source(
            PathBuf::from("/content/01-introduction/02-nested.md"),
            "---\nslug: a/b\ntitle: Nested\n---\nText",
        )
        .unwrap();
        let repo = PostRepository::from_sources(vec![nested], ChapterTitles::default());
        let config = SiteConfig::default();
        let site = Site::new(&config, repo, RENDERER.clone(), Settings::default(), &RootElement::new())
            .unwrap();

        let (path, _) = split_url("/lessons/a%2Fb");
        let reply = reply_for(&site, "http://x", Route::resolve(&path), UiState::new()).unwrap();
        assert_eq!(reply.status, 404);
    }

    #[test]
    fn test_panel_query_opens_panel() {
        let config = SiteConfig::default();
        with_site(&config, |site| {
            let ui = UiState::from_panel_query(Some("settings"));
            let reply = reply_for(site, "http://x", Route::Rubricator, ui).unwrap();
            assert!(body(&reply).contains(r#"id="search-panel""#));
            assert!(!body(&reply).contains(r#"id="settings-panel" hidden>"#));
        });
    }

    #[test]
    fn test_generated_routes() {
        let mut config = SiteConfig::default();
        with_site(&config, |site| {
            let sitemap = reply_for(site, "http://127.0.0.1:5277", Route::Sitemap, UiState::new()).unwrap();
            assert_eq!(sitemap.content_type, "application/xml; charset=utf-8");
            assert!(body(&sitemap).contains("<loc>http://127.0.0.1:5277/lessons/welcome</loc>"));

            let index = reply_for(site, "", Route::SearchIndex, UiState::new()).unwrap();
            assert!(body(&index).contains(r#""slug":"welcome""#));
        });

        config.build.sitemap.enable = false;
        with_site(&config, |site| {
            let sitemap = reply_for(site, "http://x", Route::Sitemap, UiState::new()).unwrap();
            assert_eq!(sitemap.status, 404);
        });
    }

    #[test]
    fn test_assets() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("img")).unwrap();
        fs::write(dir.path().join("img/logo.svg"), "<svg/>").unwrap();

        let mut config = SiteConfig::default();
        config.build.assets = dir.path().to_path_buf();
        with_site(&config, |site| {
            let logo = reply_for(site, "", Route::Asset("img/logo.svg"), UiState::new()).unwrap();
            assert_eq!(logo.status, 200);
            assert_eq!(logo.content_type, "image/svg+xml");
            assert_eq!(logo.body, b"<svg/>");

            let missing = reply_for(site, "", Route::Asset("img/none.png"), UiState::new()).unwrap();
            assert_eq!(missing.status, 404);

            let escape = reply_for(site, "", Route::Asset("../secret"), UiState::new()).unwrap();
            assert_eq!(escape.status, 404);
        });
    }

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type(Path::new("a.css")), "text/css; charset=utf-8");
        assert_eq!(guess_content_type(Path::new("a.woff2")), "font/woff2");
        assert_eq!(guess_content_type(Path::new("a")), "application/octet-stream");
    }
}
