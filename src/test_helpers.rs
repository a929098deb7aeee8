//! Shared test utilities for the mdmirror test suite.
//!
//! Provides fixture setup and lookup helpers that work with loaded
//! [`Site`](crate::site::Site) data.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let site = open_fixture_site(&tmp);
//!
//! let article = find_article(&site, "test_01");
//! assert_eq!(article.title().as_deref(), Some("Title"));
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::article::Article;
use crate::config::SiteConfig;
use crate::site::Site;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    crate::sync::copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

/// Load the fixture tree with stock config. Panics if any article fails.
pub fn open_fixture_site(tmp: &TempDir) -> Site {
    let (site, report) = Site::open(tmp.path(), SiteConfig::default()).unwrap();
    assert!(
        report.failures.is_empty(),
        "fixture articles failed to load: {:?}",
        report.failures
    );
    site
}

// =========================================================================
// Site lookups (panic with the available stems on miss)
// =========================================================================

/// Find an article by file stem. Panics if not found.
pub fn find_article<'a>(site: &'a Site, stem: &str) -> &'a Article {
    site.articles()
        .iter()
        .find(|a| a.stem() == stem)
        .unwrap_or_else(|| {
            let stems = article_stems(site);
            panic!("article '{stem}' not found. Available: {stems:?}")
        })
}

/// All article stems in site order.
pub fn article_stems(site: &Site) -> Vec<String> {
    site.articles().iter().map(Article::stem).collect()
}

/// Every file under `root`, as sorted `/`-separated relative paths.
pub fn relative_files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}
