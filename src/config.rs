//! Site configuration module.
//!
//! Handles loading, validating, and merging `mdmirror.toml`. The file is
//! optional and lives in the source root; stock defaults are overridden by
//! whatever keys it sets.
//!
//! ```text
//! articles/
//! ├── mdmirror.toml        # Optional, overrides stock defaults
//! ├── blog/
//! │   └── kbd-style/
//! │       ├── kbd-style.md
//! │       └── img/
//! └── ...
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [markdown]
//! tasklists = true          # - [ ] / - [x] checkboxes
//! footnotes = true          # [^1] references
//! math = true               # $inline$ and $$display$$ passthrough
//! typographer = true        # Smart quotes, dashes, ellipses
//! heading_anchors = true    # id="slug" on every heading
//! tables = true
//! strikethrough = true
//!
//! [captions]
//! default_lang = "en"       # Caption language when an article has no `lang`
//!
//! [output]
//! index_filename = "index.html"
//! full_page = false         # Wrap the rendered fragment in an HTML document
//!
//! [sync]
//! featured_prefix = "featured-image"
//! extra_files = ["attribution.json"]
//!
//! [processing]
//! # max_processes = 4       # Omit for auto (= CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [captions]
//! default_lang = "ru"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the source root.
pub const CONFIG_FILENAME: &str = "mdmirror.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `mdmirror.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Markdown renderer feature switches.
    pub markdown: MarkdownConfig,
    /// Figure caption settings.
    pub captions: CaptionsConfig,
    /// Rendered page settings.
    pub output: OutputConfig,
    /// What gets copied next to each rendered page.
    pub sync: SyncConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.captions.default_lang.trim().is_empty() {
            return Err(ConfigError::Validation(
                "captions.default_lang must not be empty".into(),
            ));
        }
        let index = &self.output.index_filename;
        if index.is_empty() || index.contains('/') || index.contains('\\') {
            return Err(ConfigError::Validation(
                "output.index_filename must be a plain file name".into(),
            ));
        }
        if self.sync.featured_prefix.is_empty() {
            return Err(ConfigError::Validation(
                "sync.featured_prefix must not be empty".into(),
            ));
        }
        if let Some(bad) = self
            .sync
            .extra_files
            .iter()
            .find(|f| f.is_empty() || f.contains('/') || f.contains('\\'))
        {
            return Err(ConfigError::Validation(format!(
                "sync.extra_files entry {bad:?} must be a plain file name"
            )));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Markdown renderer feature switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownConfig {
    pub tasklists: bool,
    pub footnotes: bool,
    /// Pass `$…$` and `$$…$$` through for a client-side math renderer.
    pub math: bool,
    /// Smart quotes, en/em dashes and ellipses.
    pub typographer: bool,
    pub heading_anchors: bool,
    pub tables: bool,
    pub strikethrough: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            tasklists: true,
            footnotes: true,
            math: true,
            typographer: true,
            heading_anchors: true,
            tables: true,
            strikethrough: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptionsConfig {
    /// Caption language for articles without a `lang` key.
    pub default_lang: String,
}

impl Default for CaptionsConfig {
    fn default() -> Self {
        Self {
            default_lang: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// File written into each article's output directory.
    pub index_filename: String,
    /// Emit a complete HTML document rather than a bare fragment.
    pub full_page: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            index_filename: "index.html".to_string(),
            full_page: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Files next to an article starting with this prefix are copied.
    pub featured_prefix: String,
    /// Individual files copied next to the page when present.
    pub extra_files: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            featured_prefix: crate::article::FEATURED_PREFIX.to_string(),
            extra_files: vec!["attribution.json".to_string()],
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `mdmirror.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no config file.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `mdmirror.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `mdmirror.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# mdmirror Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as `mdmirror.toml` in the root of the articles tree.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Markdown rendering
# ---------------------------------------------------------------------------
[markdown]
# GitHub-style task lists: - [ ] todo / - [x] done
tasklists = true

# Footnote references [^1] and definitions [^1]: text
footnotes = true

# Pass $inline$ and $$display$$ math through for a client-side renderer.
math = true

# Smart quotes, en/em dashes (-- / ---) and ellipses (...).
typographer = true

# Give every heading an id="slug" anchor.
heading_anchors = true

tables = true
strikethrough = true

# ---------------------------------------------------------------------------
# Figure captions
# ---------------------------------------------------------------------------
[captions]
# Caption language for articles without a `lang` key.
# "ru" gives "_Рисунок 1 — Alt_", anything else "_Figure 1: Alt_".
default_lang = "en"

# ---------------------------------------------------------------------------
# Rendered output
# ---------------------------------------------------------------------------
[output]
# File written into each article's output directory.
index_filename = "index.html"

# Wrap the rendered HTML in a complete document (<!DOCTYPE html>, <head>,
# <title>). By default the bare fragment is written.
full_page = false

# ---------------------------------------------------------------------------
# Files copied next to each page
# ---------------------------------------------------------------------------
[sync]
# Files beside the article whose name starts with this prefix are copied.
featured_prefix = "featured-image"

# Individual files copied when present beside the article.
extra_files = ["attribution.json"]

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers. Omit for auto-detection (= number of CPU cores).
# Values larger than the core count are clamped down.
# max_processes = 4
"##
}
