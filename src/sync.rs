//! File-tree synchronizer: mirrors an article's folder into the output tree.
//!
//! For `blog/kbd-style/kbd-style.md` rendered into `out/blog/kbd-style/`:
//!
//! ```text
//! blog/kbd-style/                  out/blog/kbd-style/
//! ├── kbd-style.md        ──────→  ├── index.html        (written last)
//! ├── featured-image.png  ──────→  ├── featured-image.png
//! ├── attribution.json    ──────→  ├── attribution.json
//! ├── img/                ──────→  ├── img/
//! └── demo/               ──────→  └── demo/
//! ```
//!
//! The destination is wiped first, so a rebuild never leaves stale files.
//! Directories starting with `.` are not mirrored.

use crate::article::Article;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("cannot clear {path}: {source}")]
    Clear { path: PathBuf, source: io::Error },
    #[error("cannot copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// What to copy next to each page.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub featured_prefix: String,
    pub extra_files: Vec<String>,
    pub index_filename: String,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::from(&crate::config::SiteConfig::default())
    }
}

impl From<&crate::config::SiteConfig> for SyncOptions {
    fn from(config: &crate::config::SiteConfig) -> Self {
        Self {
            featured_prefix: config.sync.featured_prefix.clone(),
            extra_files: config.sync.extra_files.clone(),
            index_filename: config.output.index_filename.clone(),
        }
    }
}

/// Remove `path` and everything under it, then recreate it empty.
pub fn clear_dir(path: &Path) -> Result<(), SyncError> {
    let clear = || -> io::Result<()> {
        if path.exists() {
            fs::remove_dir_all(path)?;
        }
        fs::create_dir_all(path)
    };
    clear().map_err(|source| SyncError::Clear {
        path: path.to_path_buf(),
        source,
    })
}

/// Copy the contents of `src` into `dst`, creating `dst` if needed.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

fn copy_tree(from: &Path, to: &Path) -> Result<(), SyncError> {
    copy_dir_recursive(from, to).map_err(|source| SyncError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}

fn copy_file(from: &Path, to: &Path) -> Result<(), SyncError> {
    fs::copy(from, to)
        .map(|_| ())
        .map_err(|source| SyncError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })
}

/// Mirror every subdirectory of `folder` into `dest`. Returns the names copied.
pub fn copy_sibling_dirs(folder: &Path, dest: &Path) -> Result<Vec<String>, SyncError> {
    let entries = fs::read_dir(folder).map_err(|source| SyncError::Copy {
        from: folder.to_path_buf(),
        to: dest.to_path_buf(),
        source,
    })?;
    let mut copied = Vec::new();
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if !path.is_dir() || name.starts_with('.') {
            continue;
        }
        copy_tree(&path, &dest.join(&name))?;
        copied.push(name);
    }
    copied.sort();
    Ok(copied)
}

/// Copy the article's `featured-image*` files into `dest`.
pub fn copy_featured_images(
    article: &Article,
    prefix: &str,
    dest: &Path,
) -> Result<Vec<String>, SyncError> {
    let names = article.files_with_prefix(prefix);
    for name in &names {
        copy_file(&article.folder().join(name), &dest.join(name))?;
    }
    Ok(names)
}

/// Copy each of `names` from `folder` to `dest` when it exists.
pub fn copy_extra_files(
    folder: &Path,
    names: &[String],
    dest: &Path,
) -> Result<Vec<String>, SyncError> {
    let mut copied = Vec::new();
    for name in names {
        let from = folder.join(name);
        if from.is_file() {
            copy_file(&from, &dest.join(name))?;
            copied.push(name.clone());
        }
    }
    Ok(copied)
}

/// Clear `dest`, mirror the article's assets into it, then write `html`.
///
/// Returns the path of the written index file.
pub fn sync_article(
    article: &Article,
    dest: &Path,
    html: &str,
    options: &SyncOptions,
) -> Result<PathBuf, SyncError> {
    clear_dir(dest)?;
    let dirs = copy_sibling_dirs(article.folder(), dest)?;
    let featured = copy_featured_images(article, &options.featured_prefix, dest)?;
    let extras = copy_extra_files(article.folder(), &options.extra_files, dest)?;
    debug!(
        dest = %dest.display(),
        ?dirs,
        ?featured,
        ?extras,
        "mirrored article assets"
    );

    let index = dest.join(&options.index_filename);
    fs::write(&index, html).map_err(|source| SyncError::Write {
        path: index.clone(),
        source,
    })?;
    info!(path = %index.display(), "wrote page");
    Ok(index)
}
