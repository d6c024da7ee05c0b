//! Lesson discovery.
//!
//! Walks the content root, reads every `*.md` file and splits it into front
//! matter and body. Runs once per process; there is no incremental reload.

use super::ContentError;
use super::frontmatter::{self, FrontMatter};
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// A markdown file as found on disk, before validation.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Absolute or root-relative path of the file.
    pub path: PathBuf,
    /// File name, e.g. `02-why-flutter.md`.
    pub file_name: String,
    /// Name of the parent folder, e.g. `01-introduction`.
    pub chapter: String,
    pub front_matter: FrontMatter,
    pub body: String,
}

/// Load every markdown file under `root`, in lexicographic path order.
pub fn load_sources(root: &Path) -> Result<Vec<SourceFile>, ContentError> {
    let mut sources = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_markdown(entry.path()) {
            continue;
        }
        let path = entry.into_path();
        let text = fs::read_to_string(&path).map_err(|err| ContentError::Io(path.clone(), err))?;
        sources.push(parse_source(path, &text)?);
    }

    Ok(sources)
}

/// Split one file's text into a [`SourceFile`].
pub fn parse_source(path: PathBuf, text: &str) -> Result<SourceFile, ContentError> {
    let (front_matter, body) =
        frontmatter::split(text).map_err(|err| ContentError::FrontMatter(path.clone(), err))?;

    let file_name = file_name_of(&path);
    let chapter = path.parent().map(file_name_of).unwrap_or_default();

    Ok(SourceFile {
        file_name,
        chapter,
        front_matter,
        body: body.to_owned(),
        path,
    })
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
