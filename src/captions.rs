//! Automatic figure captions under images.
//!
//! Every image in an article's prose, except the featured image, gets a
//! numbered caption two lines below it:
//!
//! ```text
//! ![Alt text](img/test-image.png)
//!
//! _Figure 1: Alt text_
//! ```
//!
//! Russian articles (`lang: ru`) get `_Рисунок 1 — Alt text_` instead.
//!
//! Numbering runs across the whole article in document order. If a caption
//! line (`_Fig…` or `_Рис…`) is already in place it is replaced rather than
//! duplicated, so annotating twice is the same as annotating once, and
//! adding or removing an image renumbers everything after it.
//!
//! Only whole-line images are recognised: Markdown `![alt](src)` or an
//! HTML `<img … alt="…">` tag at the start of a line. Images inside code
//! blocks are never touched.

use crate::article::Article;
use crate::segment;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Alt text that marks the article's cover image.
pub const FEATURED_ALT: &str = "Featured image";

static MARKDOWN_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^!\[(.*?)\]\(.*?\)").expect("valid regex"));

static HTML_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^<img\b[^>]*?\balt="([^"]*)"[^>]*>"#).expect("valid regex")
});

const CAPTION_MARKERS: [&str; 2] = ["_Рис", "_Fig"];

/// Caption wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionStyle {
    English,
    Russian,
}

impl CaptionStyle {
    /// `ru` selects Russian, anything else English.
    pub fn for_lang(lang: &str) -> Self {
        if lang == "ru" {
            CaptionStyle::Russian
        } else {
            CaptionStyle::English
        }
    }

    pub fn caption(self, number: usize, alt: &str) -> String {
        match self {
            CaptionStyle::English => format!("_Figure {number}: {alt}_"),
            CaptionStyle::Russian => format!("_Рисунок {number} — {alt}_"),
        }
    }
}

/// Alt text of a whole-line image, if `line` is one.
fn image_alt(line: &str) -> Option<&str> {
    MARKDOWN_IMAGE
        .captures(line)
        .or_else(|| HTML_IMAGE.captures(line))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn is_caption(line: &str) -> bool {
    CAPTION_MARKERS.iter().any(|m| line.starts_with(m))
}

/// Caption every image in `article`, English unless `lang: ru`.
pub fn annotate(article: &mut Article) -> &mut Article {
    annotate_with_default_lang(article, "en")
}

/// Like [`annotate`], using `default_lang` when the article has no `lang`.
pub fn annotate_with_default_lang<'a>(
    article: &'a mut Article,
    default_lang: &str,
) -> &'a mut Article {
    let style = CaptionStyle::for_lang(article.metadata.lang().unwrap_or(default_lang));
    let mut counter = 0;
    let body = segment::map_prose(article.body(), |prose| {
        annotate_prose(prose, style, &mut counter)
    });
    debug!(
        path = %article.source_path().display(),
        captions = counter,
        "annotated images"
    );
    article.set_body(body);
    article
}

/// Caption the images of one prose segment, continuing from `counter`.
fn annotate_prose(prose: &str, style: CaptionStyle, counter: &mut usize) -> String {
    let mut lines: Vec<String> = prose.split('\n').map(str::to_string).collect();
    let mut i = 0;
    while i < lines.len() {
        let Some(alt) = image_alt(&lines[i]).map(str::to_string) else {
            i += 1;
            continue;
        };
        if alt == FEATURED_ALT {
            i += 1;
            continue;
        }
        *counter += 1;
        let caption = style.caption(*counter, &alt);
        if lines.get(i + 2).is_some_and(|l| is_caption(l)) {
            lines[i + 2] = caption;
        } else {
            lines.insert(i + 1, String::new());
            lines.insert(i + 2, caption);
        }
        i += 3;
    }
    lines.join("\n")
}
