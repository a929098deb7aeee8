//! Batch operations over a whole tree of articles.
//!
//! A [`Site`] is every Markdown file under a source root, loaded once. The
//! batch operations on it never stop at the first bad file: each returns a
//! [`BatchReport`] with what was written and which files failed and why.
//!
//! ## Output layout
//!
//! An article's output directory mirrors its folder's position under the
//! source root:
//!
//! ```text
//! articles/blog/2013/kbd-style/kbd-style.md  →  out/blog/2013/kbd-style/index.html
//! ```
//!
//! Articles are rendered in parallel. Each owns its output directory, with
//! two exceptions handled by ordering: an article nested below another is
//! written after its parent (the parent's clear would wipe it otherwise),
//! and two articles in the same folder are written one after the other.
//!
//! ## Digests
//!
//! [`Site::generate_generalized_md`] writes `{name}.g.md` into every folder
//! `name/` that has article folders below it, concatenating their promoted
//! bodies. One task writes each digest file.

use crate::article::Article;
use crate::captions;
use crate::config::SiteConfig;
use crate::metadata::Value;
use crate::promote;
use crate::render;
use crate::sync::{self, SyncError, SyncOptions};
use crate::walk::{self, WalkError};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Suffix of generated digest files.
pub const DIGEST_SUFFIX: &str = ".g.md";

#[derive(Error, Debug)]
pub enum SiteError {
    #[error(transparent)]
    Walk(#[from] WalkError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error("output directory {output} overlaps source root {source_root}")]
    OutputOverlapsSource {
        output: PathBuf,
        source_root: PathBuf,
    },
}

/// One file written by a batch operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Article file (or digest folder) the output came from.
    pub source: PathBuf,
    /// File that was written.
    pub target: PathBuf,
}

/// One file a batch operation could not handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a batch operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub entries: Vec<Entry>,
    pub failures: Vec<Failure>,
}

impl BatchReport {
    /// True when something was attempted and nothing succeeded.
    pub fn all_failed(&self) -> bool {
        self.entries.is_empty() && !self.failures.is_empty()
    }

    fn record(&mut self, source: &Path, outcome: Result<PathBuf, String>) {
        match outcome {
            Ok(target) => self.entries.push(Entry {
                source: source.to_path_buf(),
                target,
            }),
            Err(reason) => self.fail(source, reason),
        }
    }

    fn fail(&mut self, path: &Path, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(path = %path.display(), "{reason}");
        self.failures.push(Failure {
            path: path.to_path_buf(),
            reason,
        });
    }
}

/// All articles under a source root.
#[derive(Debug)]
pub struct Site {
    root: PathBuf,
    config: SiteConfig,
    articles: Vec<Article>,
    /// Articles whose front matter failed to parse. Rendered best-effort,
    /// never rewritten.
    damaged: HashSet<PathBuf>,
}

impl Site {
    /// Walk `root` and load every article.
    ///
    /// Unreadable files are left out of the site; files with broken front
    /// matter are kept with empty metadata. Both are listed in the report.
    pub fn open(
        root: impl AsRef<Path>,
        config: SiteConfig,
    ) -> Result<(Self, BatchReport), SiteError> {
        let root = std::path::absolute(root.as_ref()).unwrap_or_else(|_| root.as_ref().into());
        let files = walk::find_markdown_files(&root)?;

        let loaded: Vec<_> = files.par_iter().map(Article::open).collect();

        let mut report = BatchReport::default();
        let mut articles = Vec::with_capacity(loaded.len());
        let mut damaged = HashSet::new();
        for (article, result) in loaded {
            let path = article.source_path().to_path_buf();
            match result {
                Ok(()) => {
                    report.entries.push(Entry {
                        source: path.clone(),
                        target: path,
                    });
                    articles.push(article);
                }
                Err(err) => {
                    let keep = matches!(err, crate::article::ArticleError::FrontMatter { .. });
                    report.fail(&path, err.to_string());
                    if keep {
                        damaged.insert(path);
                        articles.push(article);
                    }
                }
            }
        }
        info!(
            root = %root.display(),
            articles = articles.len(),
            failed = report.failures.len(),
            "loaded site"
        );
        Ok((
            Self {
                root,
                config,
                articles,
                damaged,
            },
            report,
        ))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    /// True if the article's front matter could not be parsed on load.
    pub fn is_damaged(&self, article: &Article) -> bool {
        self.damaged.contains(article.source_path())
    }

    /// Where `article` is rendered to under `output`.
    pub fn output_dir_for(&self, article: &Article, output: &Path) -> Option<PathBuf> {
        article
            .folder()
            .strip_prefix(&self.root)
            .ok()
            .map(|rel| output.join(rel))
    }

    // =========================================================================
    // Site generation
    // =========================================================================

    /// Render every article into `output`, mirroring its assets.
    ///
    /// `output` is cleared first. It may not be the source root, contain it,
    /// or sit inside it.
    pub fn generate_site(&self, output: impl AsRef<Path>) -> Result<BatchReport, SiteError> {
        let output =
            std::path::absolute(output.as_ref()).unwrap_or_else(|_| output.as_ref().into());
        if self.root.starts_with(&output) || output.starts_with(&self.root) {
            return Err(SiteError::OutputOverlapsSource {
                output,
                source_root: self.root.clone(),
            });
        }
        sync::clear_dir(&output)?;

        let mut report = BatchReport::default();
        // depth -> destination -> articles rendered there
        let mut levels: BTreeMap<usize, BTreeMap<PathBuf, Vec<&Article>>> = BTreeMap::new();
        for article in &self.articles {
            match self.output_dir_for(article, &output) {
                Some(dest) => levels
                    .entry(dest.components().count())
                    .or_default()
                    .entry(dest)
                    .or_default()
                    .push(article),
                None => report.fail(article.source_path(), "article is outside the source root"),
            }
        }

        let options = SyncOptions::from(&self.config);
        let options = &options;
        for groups in levels.values() {
            let outcomes: Vec<(PathBuf, Result<PathBuf, String>)> = groups
                .par_iter()
                .flat_map_iter(|(dest, articles)| {
                    articles.iter().map(move |article| {
                        let html = render::render_article(article, &self.config);
                        let outcome = sync::sync_article(article, dest, &html, options)
                            .map_err(|e| e.to_string());
                        (article.source_path().to_path_buf(), outcome)
                    })
                })
                .collect();
            for (source, outcome) in outcomes {
                report.record(&source, outcome);
            }
        }
        info!(
            output = %output.display(),
            pages = report.entries.len(),
            failed = report.failures.len(),
            "generated site"
        );
        Ok(report)
    }

    // =========================================================================
    // In-place edits
    // =========================================================================

    /// Apply `edit` to every intact article and save it.
    fn edit_all<F>(&mut self, edit: F) -> BatchReport
    where
        F: Fn(&mut Article) + Sync,
    {
        let damaged = &self.damaged;
        let outcomes: Vec<(PathBuf, Result<PathBuf, String>)> = self
            .articles
            .par_iter_mut()
            .map(|article| {
                let path = article.source_path().to_path_buf();
                if damaged.contains(&path) {
                    let reason = "front matter could not be parsed; file left untouched";
                    return (path, Err(reason.to_string()));
                }
                edit(article);
                let outcome = article
                    .save()
                    .map(|()| path.clone())
                    .map_err(|e| e.to_string());
                (path, outcome)
            })
            .collect();

        let mut report = BatchReport::default();
        for (source, outcome) in outcomes {
            report.record(&source, outcome);
        }
        report
    }

    /// Number every article's images and save the articles.
    pub fn add_image_captions(&mut self) -> BatchReport {
        let default_lang = self.config.captions.default_lang.clone();
        let report = self.edit_all(|article| {
            captions::annotate_with_default_lang(article, &default_lang);
        });
        info!(saved = report.entries.len(), "added image captions");
        report
    }

    /// Set `key` to `value` in every article and save the articles.
    pub fn add_metadata_to_all(&mut self, key: &str, value: Value) -> BatchReport {
        let report = self.edit_all(|article| {
            article.metadata.insert(key, value.clone());
        });
        info!(key, saved = report.entries.len(), "set metadata key");
        report
    }

    /// Every metadata key used by any article, sorted.
    pub fn metadata_keys(&self) -> Vec<String> {
        self.articles
            .iter()
            .flat_map(|a| a.metadata.keys())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    // =========================================================================
    // Digests
    // =========================================================================

    /// Write a `{name}.g.md` digest into every folder holding article folders.
    ///
    /// Only folders inside the source root get a digest, so articles sitting
    /// directly in the root are left out.
    pub fn generate_generalized_md(&self) -> BatchReport {
        let mut groups: BTreeMap<PathBuf, Vec<&Article>> = BTreeMap::new();
        for article in &self.articles {
            if is_digest(article.source_path()) || self.is_damaged(article) {
                continue;
            }
            match article.folder().parent() {
                Some(parent) if parent.starts_with(&self.root) => {
                    groups.entry(parent.to_path_buf()).or_default().push(article);
                }
                _ => {}
            }
        }

        let outcomes: Vec<(PathBuf, Result<PathBuf, String>)> = groups
            .par_iter()
            .map(|(dir, articles)| (dir.clone(), write_digest(dir, articles)))
            .collect();

        let mut report = BatchReport::default();
        for (source, outcome) in outcomes {
            report.record(&source, outcome);
        }
        info!(digests = report.entries.len(), "generated digests");
        report
    }
}

/// True for generated `*.g.md` files, any case.
pub fn is_digest(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().to_lowercase().contains(DIGEST_SUFFIX))
}

/// Digest text for the folder `name` from its articles' bodies.
pub fn digest_content(name: &str, articles: &[&Article]) -> String {
    let parts: Vec<String> = articles
        .iter()
        .map(|a| promote::promote(a).trim().to_string())
        .collect();
    format!("# {name} (auto-generated)\n\n{}\n", parts.join("\n\n"))
}

fn write_digest(dir: &Path, articles: &[&Article]) -> Result<PathBuf, String> {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| "digest folder has no name".to_string())?;
    let target = dir.join(format!("{name}{DIGEST_SUFFIX}"));
    fs::write(&target, digest_content(&name, articles))
        .map_err(|e| format!("cannot write {}: {e}", target.display()))?;
    info!(path = %target.display(), articles = articles.len(), "wrote digest");
    Ok(target)
}
