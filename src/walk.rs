//! Markdown file discovery.
//!
//! Walks the source tree and returns every `.md` file (extension matched
//! case-insensitively), skipping anything under a path component that starts
//! with `.` (`.git/`, `.obsidian/`, `.draft.md`). Output is sorted so batch
//! runs are deterministic.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("source root {0} is not a directory")]
    NotADirectory(PathBuf),
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// True for a path ending in `.md`, any case.
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

/// Every Markdown file under `root`, sorted.
///
/// Unreadable subdirectories are logged and skipped; only a missing or
/// unreadable root is an error.
pub fn find_markdown_files(root: &Path) -> Result<Vec<PathBuf>, WalkError> {
    if !root.is_dir() {
        return Err(WalkError::NotADirectory(root.to_path_buf()));
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(err.into()),
            Err(err) => {
                warn!("skipping unreadable entry: {err}");
                continue;
            }
        };
        if entry.file_type().is_file() && is_markdown(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    debug!(root = %root.display(), count = files.len(), "found markdown files");
    Ok(files)
}
