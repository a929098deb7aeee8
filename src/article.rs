//! One Markdown article: its front matter, its body, and where it lives.
//!
//! An [`Article`] stores exactly two mutable things, the [`Metadata`] map and
//! the body text. Everything else (the full file content, the serialized
//! front matter, the featured images next to the file) is computed on
//! demand, so an edit to either half is visible on the next read.
//!
//! ```text
//! test_01/
//! ├── test_01.md           ← Article::source_path()
//! ├── featured-image.png   ← Article::featured_image_filenames()
//! └── img/
//!     └── test-image.png
//! ```
//!
//! ## Failure policy
//!
//! Loading never leaves the article half-initialised. An unreadable file
//! gives an empty article; malformed YAML gives empty metadata and the whole
//! file as body. In both cases the error is returned alongside the article
//! so a batch caller can report it and move on. Saving is always explicit.

use crate::frontmatter::{self, FrontMatterError};
use crate::metadata::Metadata;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, warn};

/// Filename prefix marking an article's cover image.
pub const FEATURED_PREFIX: &str = "featured-image";

#[derive(Error, Debug)]
pub enum ArticleError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid front matter in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        source: FrontMatterError,
    },
    #[error("cannot save {path}: {source}")]
    Save {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ArticleError {
    pub fn path(&self) -> &Path {
        match self {
            ArticleError::Read { path, .. }
            | ArticleError::FrontMatter { path, .. }
            | ArticleError::Save { path, .. } => path,
        }
    }

    /// True for the load-side errors (unreadable file, bad YAML).
    pub fn is_load_error(&self) -> bool {
        !matches!(self, ArticleError::Save { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Article {
    source_path: PathBuf,
    pub metadata: Metadata,
    body: String,
}

impl Article {
    /// An empty, unsaved article for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: absolute(path.into()),
            metadata: Metadata::new(),
            body: String::new(),
        }
    }

    /// Build an article from text already in memory.
    pub fn from_text(path: impl Into<PathBuf>, text: &str) -> Result<Self, ArticleError> {
        let mut article = Self::new(path);
        article.set_text(text)?;
        Ok(article)
    }

    /// Load `path`, returning the article and any load error.
    ///
    /// The article is always usable: see the module docs for what it holds
    /// after a failure.
    pub fn open(path: impl Into<PathBuf>) -> (Self, Result<(), ArticleError>) {
        let mut article = Self::new(PathBuf::new());
        let result = article.load(path);
        (article, result)
    }

    /// Replace this article with the contents of `path`.
    pub fn load(&mut self, path: impl Into<PathBuf>) -> Result<(), ArticleError> {
        self.source_path = absolute(path.into());
        self.metadata = Metadata::new();
        self.body.clear();

        let text = match fs::read_to_string(&self.source_path) {
            Ok(text) => text,
            Err(source) => {
                warn!(path = %self.source_path.display(), "cannot read article: {source}");
                return Err(ArticleError::Read {
                    path: self.source_path.clone(),
                    source,
                });
            }
        };
        debug!(path = %self.source_path.display(), bytes = text.len(), "loaded article");
        self.set_text(&text)
    }

    fn set_text(&mut self, text: &str) -> Result<(), ArticleError> {
        match frontmatter::parse(text) {
            Ok((metadata, body)) => {
                self.metadata = metadata;
                self.body = body.to_string();
                Ok(())
            }
            Err(source) => {
                warn!(
                    path = %self.source_path.display(),
                    "front matter ignored: {source}"
                );
                self.metadata = Metadata::new();
                self.body = text.trim_start().to_string();
                Err(ArticleError::FrontMatter {
                    path: self.source_path.clone(),
                    source,
                })
            }
        }
    }

    /// Write [`full_content`](Self::full_content) back to the source file.
    pub fn save(&self) -> Result<(), ArticleError> {
        fs::write(&self.source_path, self.full_content()).map_err(|source| {
            error!(path = %self.source_path.display(), "cannot save article: {source}");
            ArticleError::Save {
                path: self.source_path.clone(),
                source,
            }
        })
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Directory holding the Markdown file.
    pub fn folder(&self) -> &Path {
        self.source_path.parent().unwrap_or(Path::new(""))
    }

    /// Name of the directory holding the Markdown file.
    pub fn folder_name(&self) -> String {
        self.folder()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File stem of the Markdown file (`test_01` for `test_01.md`).
    pub fn stem(&self) -> String {
        self.source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Body text without front matter.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Replace the body verbatim.
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    /// Append `text` after the body, separated by one blank line.
    pub fn append_body(&mut self, text: &str) {
        let trimmed = self.body.trim_end().len();
        self.body.truncate(trimmed);
        if !self.body.is_empty() {
            self.body.push_str("\n\n");
        }
        self.body.push_str(text);
    }

    /// Front matter as it would be written to disk (empty if no metadata).
    pub fn front_matter(&self) -> String {
        frontmatter::serialize(&self.metadata)
    }

    /// The complete Markdown file: front matter, blank line, body.
    pub fn full_content(&self) -> String {
        frontmatter::compose(&self.metadata, &self.body)
    }

    /// First `# ` heading in the body, if any.
    pub fn title(&self) -> Option<String> {
        crate::segment::segments(&self.body)
            .into_iter()
            .filter(|s| !s.is_code)
            .flat_map(|s| {
                s.text
                    .lines()
                    .filter_map(|l| l.strip_prefix("# "))
                    .map(|t| t.trim().to_string())
                    .collect::<Vec<_>>()
            })
            .next()
    }

    /// Files next to the article whose name starts with `featured-image`.
    pub fn featured_image_filenames(&self) -> Vec<String> {
        self.files_with_prefix(FEATURED_PREFIX)
    }

    /// Files next to the article whose name starts with `prefix`, sorted.
    pub fn files_with_prefix(&self, prefix: &str) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.folder()) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(prefix))
            .collect();
        names.sort();
        names
    }
}

fn absolute(path: PathBuf) -> PathBuf {
    if path.as_os_str().is_empty() {
        return path;
    }
    std::path::absolute(&path).unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Value;
    use crate::test_helpers::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const TEST_MD_CONTENT: &str = "---
date: 2022-09-18
categories: [it, web]
tags: [CSS]
---

# Title

![Featured image](featured-image.png)

Hello, world!

![Alt text](img/test-image.png)
";

    const TEST_MD_BODY: &str = "# Title

![Featured image](featured-image.png)

Hello, world!

![Alt text](img/test-image.png)
";

    fn write_article(dir: &TempDir, content: &str) -> PathBuf {
        let folder = dir.path().join("article");
        fs::create_dir_all(&folder).unwrap();
        let path = folder.join("article.md");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn open_fixture_article() {
        let tmp = setup_fixtures();
        let (article, result) = Article::open(tmp.path().join("test_01/test_01.md"));
        result.unwrap();
        assert_eq!(
            article.source_path().file_name().unwrap().to_string_lossy(),
            "test_01.md"
        );
        assert!(article.source_path().is_absolute());
        assert_eq!(article.full_content(), TEST_MD_CONTENT);
        assert_eq!(article.body(), TEST_MD_BODY);
        assert_eq!(article.featured_image_filenames(), vec!["featured-image.png"]);
    }

    #[test]
    fn metadata_is_typed() {
        let article = Article::from_text("a.md", TEST_MD_CONTENT).unwrap();
        assert_eq!(article.metadata.date(), NaiveDate::from_ymd_opt(2022, 9, 18));
        assert_eq!(article.metadata.categories(), vec!["it", "web"]);
        assert_eq!(article.metadata.tags(), vec!["CSS"]);
    }

    #[test]
    fn set_body_updates_full_content() {
        let mut article = Article::from_text("a.md", TEST_MD_CONTENT).unwrap();
        article.set_body("# New Title");
        assert_eq!(article.body(), "# New Title");
        let yaml_lines = article.front_matter().lines().count();
        assert_eq!(article.full_content().lines().count(), yaml_lines + 2);
    }

    #[test]
    fn metadata_edit_updates_full_content() {
        let mut article = Article::from_text("a.md", TEST_MD_CONTENT).unwrap();
        article
            .metadata
            .insert("date", NaiveDate::from_ymd_opt(2022, 11, 4).unwrap());
        assert_eq!(article.full_content().lines().nth(1), Some("date: 2022-11-04"));
    }

    #[test]
    fn metadata_list_append_updates_full_content() {
        let mut article = Article::from_text("a.md", TEST_MD_CONTENT).unwrap();
        article
            .metadata
            .get_mut("categories")
            .and_then(Value::as_list_mut)
            .unwrap()
            .push("test".into());
        assert_eq!(
            article.full_content().lines().nth(2),
            Some("categories: [it, web, test]")
        );
    }

    #[test]
    fn no_front_matter_means_no_block() {
        let article = Article::from_text("a.md", "# Title\n\nContent").unwrap();
        assert!(article.metadata.is_empty());
        assert_eq!(article.front_matter(), "");
        assert_eq!(article.full_content(), "# Title\n\nContent\n");
    }

    #[test]
    fn removing_all_metadata_drops_block() {
        let mut article = Article::from_text("a.md", "---\na: 1\n---\n\nBody\n").unwrap();
        article.metadata.remove("a");
        assert_eq!(article.full_content(), "Body\n");
    }

    #[test]
    fn missing_file_gives_empty_article_and_read_error() {
        let tmp = TempDir::new().unwrap();
        let (article, result) = Article::open(tmp.path().join("missing.md"));
        let err = result.unwrap_err();
        assert!(matches!(err, ArticleError::Read { .. }));
        assert!(err.is_load_error());
        assert!(err.path().ends_with("missing.md"));
        assert!(article.metadata.is_empty());
        assert_eq!(article.body(), "");
    }

    #[test]
    fn malformed_yaml_keeps_text_as_body() {
        let tmp = TempDir::new().unwrap();
        let raw = "---\ntags: [broken\n---\n\n# Title\n";
        let path = write_article(&tmp, raw);
        let (article, result) = Article::open(&path);
        assert!(matches!(result, Err(ArticleError::FrontMatter { .. })));
        assert!(article.metadata.is_empty());
        assert_eq!(article.body(), raw);
    }

    #[test]
    fn load_replaces_previous_state() {
        let tmp = setup_fixtures();
        let (mut article, _) = Article::open(tmp.path().join("test_01/test_01.md"));
        article
            .load(tmp.path().join("test_02/test_02.md"))
            .unwrap();
        assert!(article.source_path().ends_with("test_02/test_02.md"));
        assert!(article.body().contains("Second article"));
    }

    #[test]
    fn save_writes_full_content() {
        let tmp = TempDir::new().unwrap();
        let path = write_article(&tmp, TEST_MD_CONTENT);
        let (mut article, result) = Article::open(&path);
        result.unwrap();

        article
            .metadata
            .insert("date", NaiveDate::from_ymd_opt(2022, 11, 4).unwrap());
        article.set_body("# New title\n\nNew content");
        article.save().unwrap();

        let saved = fs::read_to_string(&path).unwrap();
        assert_eq!(
            saved,
            "---\ndate: 2022-11-04\ncategories: [it, web]\ntags: [CSS]\n---\n\n# New title\n\nNew content\n"
        );
        assert_eq!(saved.lines().count(), 9);
    }

    #[test]
    fn save_to_missing_directory_is_save_error() {
        let tmp = TempDir::new().unwrap();
        let mut article = Article::new(tmp.path().join("nope/article.md"));
        article.set_body("text");
        let err = article.save().unwrap_err();
        assert!(matches!(err, ArticleError::Save { .. }));
        assert!(!err.is_load_error());
    }

    #[test]
    fn folder_name_is_parent_directory() {
        let article = Article::new("/site/blog/2013/kbd-style/kbd-style.md");
        assert_eq!(article.folder_name(), "kbd-style");
        assert_eq!(article.stem(), "kbd-style");
    }

    #[test]
    fn title_skips_code_blocks() {
        let article = Article::from_text("a.md", "```\n# not a title\n```\n\n# Real\n").unwrap();
        assert_eq!(article.title().as_deref(), Some("Real"));
    }

    #[test]
    fn featured_images_listed_by_prefix() {
        let tmp = TempDir::new().unwrap();
        let path = write_article(&tmp, "# A\n");
        let folder = path.parent().unwrap();
        fs::write(folder.join("featured-image.png"), "fake image").unwrap();
        fs::write(folder.join("featured-image.svg"), "fake image").unwrap();
        fs::write(folder.join("other.png"), "fake image").unwrap();
        fs::create_dir_all(folder.join("featured-image-dir")).unwrap();

        let (article, _) = Article::open(&path);
        assert_eq!(
            article.featured_image_filenames(),
            vec!["featured-image.png", "featured-image.svg"]
        );
    }

    #[test]
    fn append_body_separates_with_blank_line() {
        let mut article = Article::from_text("/a/a.md", "# A\n\ntext\n\n").unwrap();
        article.append_body("## More\n");
        assert_eq!(article.body(), "# A\n\ntext\n\n## More\n");

        let mut empty = Article::new("/b/b.md");
        empty.append_body("# B\n");
        assert_eq!(empty.full_content(), "# B\n");
    }
}
