//! # mdmirror
//!
//! A static site generator for a tree of Markdown articles. Each article is
//! a folder holding one `.md` file with YAML front matter plus its images
//! and attachments; the output tree mirrors the source tree with an
//! `index.html` in place of each Markdown file.
//!
//! ```text
//! articles/blog/kbd-style/          build_site/blog/kbd-style/
//! ├── kbd-style.md          ──→     ├── index.html
//! ├── featured-image.png    ──→     ├── featured-image.png
//! └── img/                  ──→     └── img/
//! ```
//!
//! Besides rendering, the tool edits articles in place: numbering image
//! captions, setting a front matter key across every file, and writing
//! digest files that merge sibling articles into one document.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`metadata`] | Ordered, typed front matter map (`date`, `tags`, `lang`, …) |
//! | [`frontmatter`] | Split a file into YAML block and body; serialize it back |
//! | [`segment`] | Split a body into code and prose so transforms skip code |
//! | [`article`] | One article: metadata + body, load, save, derived views |
//! | [`captions`] | Numbered `_Figure N: alt_` captions under images |
//! | [`promote`] | Heading demotion and link rewriting for digests |
//! | [`render`] | Markdown to HTML with anchors, math, footnotes, page wrapper |
//! | [`sync`] | Mirror an article's folder into the output tree |
//! | [`walk`] | Find Markdown files, skipping dot-directories |
//! | [`site`] | Batch operations over every article with per-file reports |
//! | [`config`] | `mdmirror.toml` loading, merging over defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Round-Trip Stable Front Matter
//!
//! Articles are edited by tools and by hand, often in the same commit. A
//! rewrite must not reorder keys, re-quote values or turn `[it, web]` into
//! a block list, or every batch edit becomes a noisy diff. [`frontmatter`]
//! keeps insertion order and writes a fixed, readable shape.
//!
//! ## Never Touch Code
//!
//! Caption numbering and heading promotion are line-based text rewrites.
//! Both run only on the prose segments found by [`segment`], so an image
//! or a `#` line inside a fenced or indented code block is never changed.
//!
//! ## One Bad File Never Stops a Batch
//!
//! Every batch operation in [`site`] returns a [`site::BatchReport`] of what
//! was written and what failed. An article with broken front matter is
//! still rendered best-effort but is never rewritten.

pub mod article;
pub mod captions;
pub mod config;
pub mod frontmatter;
pub mod metadata;
pub mod output;
pub mod promote;
pub mod render;
pub mod segment;
pub mod site;
pub mod sync;
pub mod walk;

#[cfg(test)]
pub(crate) mod test_helpers;
