use std::path::Path;

use walkdir::WalkDir;

use crate::error::Error;
use crate::types::{Document, RootKind};

/// Read every markdown file under `dir` as a document of the given root.
///
/// Files are picked up when their extension is `md` (any case) and their name
/// does not start with `_`. Content is decoded lossily so stray bytes never
/// abort a load. Documents come back sorted by relative path.
///
/// # Errors
///
/// Returns `Error::RootNotFound` if `dir` does not exist, or
/// `Error::RootNotDirectory` if it is not a directory.
pub fn load_root(dir: &Path, kind: RootKind) -> Result<Vec<Document>, Error> {
    let metadata = match std::fs::metadata(dir) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::RootNotFound { kind, path: dir.to_path_buf() });
        },
        Err(e) => return Err(Error::Io(e)),
    };
    if !metadata.is_dir() {
        return Err(Error::RootNotDirectory { kind, path: dir.to_path_buf() });
    }

    let mut documents = Vec::new();
    for entry in WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| {
            return entry
                .inspect_err(|e| tracing::warn!(root = %kind, error = %e, "skipping unreadable path"))
                .ok();
        })
        .filter(|e| return e.file_type().is_file() && is_wiki_page(e.path()))
    {
        let path = entry.path();
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
                continue;
            },
        };
        let relative = path.strip_prefix(dir).unwrap_or(path).to_path_buf();
        documents.push(Document::new(kind, relative, String::from_utf8_lossy(&bytes).into_owned()));
    }

    documents.sort_by(|a, b| return a.path.cmp(&b.path));
    tracing::info!(root = %kind, dir = %dir.display(), documents = documents.len(), "loaded root");
    return Ok(documents);
}

/// `*.md` files not hidden behind a leading underscore.
fn is_wiki_page(path: &Path) -> bool {
    let is_markdown = path
        .extension()
        .and_then(|ext| return ext.to_str())
        .is_some_and(|ext| return ext.eq_ignore_ascii_case("md"));
    let is_private = path
        .file_name()
        .and_then(|name| return name.to_str())
        .is_some_and(|name| return name.starts_with('_'));
    return is_markdown && !is_private;
}
