//! Site building orchestration.
//!
//! ```text
//! build_site()
//!     │
//!     ├── prepare_output()      clean / create output dir
//!     ├── Site::load()          lessons + highlighter + settings, once
//!     │
//!     ├── rayon::join
//!     │     ├── write_pages()   index, rubricator, 404, lessons/<slug>
//!     │     └── copy_assets()   static files
//!     │
//!     ├── build_sitemap()
//!     └── build_search_index()
//! ```

use crate::{
    config::SiteConfig,
    content::Post,
    generator::{search::build_search_index, sitemap::build_sitemap},
    log,
    site::Site,
    ui::UiState,
    utils::minify::{Output, minify},
};
use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};
use walkdir::WalkDir;

/// Build the whole site into `config.build.output`.
pub fn build_site(config: &SiteConfig) -> Result<()> {
    let output = &config.build.output;
    prepare_output(output, config.build.clean)?;

    let site = Site::load(config)?;
    site.log_summary();

    let asset_files = collect_files(&config.build.assets);
    let has_error = AtomicBool::new(false);

    let (pages_result, assets_result) = rayon::join(
        || write_pages(&site, &has_error),
        || copy_assets(&asset_files, config, &has_error),
    );
    pages_result?;
    assets_result?;

    build_sitemap(config, site.repo().all_posts())?;
    build_search_index(config, site.repo())?;

    log_build_result(output)
}

/// Create the output directory, emptying it first when `clean` is set.
fn prepare_output(output: &Path, clean: bool) -> Result<()> {
    if clean && output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("Failed to clear output directory: {}", output.display()))?;
    }
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))
}

fn write_pages(site: &Site, has_error: &AtomicBool) -> Result<()> {
    let config = site.config();
    let output = &config.build.output;
    let ui = UiState::new();

    let home = site.home_page(ui, &mut rand::thread_rng());
    write_page(&output.join("index.html"), &home, config)?;
    write_page(
        &output.join("rubricator").join("index.html"),
        &site.rubricator_page(ui),
        config,
    )?;
    write_page(&output.join("404.html"), &site.not_found_page(ui), config)?;

    site.repo().all_posts().par_iter().try_for_each(|post| {
        if has_error.load(Ordering::Relaxed) {
            return Err(anyhow!("Aborted"));
        }
        if let Err(e) = write_lesson(site, post, ui) {
            if !has_error.swap(true, Ordering::Relaxed) {
                log!("error"; "lesson `{}`: {:#}", post.slug, e);
            }
            return Err(anyhow!("Build failed"));
        }
        Ok(())
    })
}

fn write_lesson(site: &Site, post: &Post, ui: UiState) -> Result<()> {
    let html = site.render_lesson(post, ui)?;
    let path = site
        .config()
        .build
        .output
        .join("lessons")
        .join(&post.slug)
        .join("index.html");
    write_page(&path, &html, site.config())
}

fn write_page(path: &Path, html: &str, config: &SiteConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let html = minify(Output::Html(html), config);
    fs::write(path, &*html).with_context(|| format!("Failed to write {}", path.display()))
}

fn copy_assets(files: &[PathBuf], config: &SiteConfig, has_error: &AtomicBool) -> Result<()> {
    let assets = &config.build.assets;
    let output = &config.build.output;

    files.par_iter().try_for_each(|path| {
        if has_error.load(Ordering::Relaxed) {
            return Err(anyhow!("Aborted"));
        }
        if let Err(e) = copy_asset(path, assets, output) {
            if !has_error.swap(true, Ordering::Relaxed) {
                log!("error"; "{}: {:#}", path.display(), e);
            }
            return Err(anyhow!("Build failed"));
        }
        Ok(())
    })
}

fn copy_asset(path: &Path, assets: &Path, output: &Path) -> Result<()> {
    let relative = path.strip_prefix(assets)?;
    let dest = output.join(relative);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(path, &dest)?;
    Ok(())
}

/// Every regular file under `dir`. A missing directory has no files.
fn collect_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .collect()
}

fn log_build_result(output: &Path) -> Result<()> {
    let file_count = fs::read_dir(output)?.filter_map(Result::ok).count();

    if file_count == 0 {
        log!("warn"; "output is empty");
    } else {
        log!("build"; "done");
    }
    Ok(())
}
