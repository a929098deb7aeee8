//! Rewriting an article body for inclusion in a digest one level up.
//!
//! A digest lives in the parent of the article folders it collects, so two
//! things change when a body is copied into it:
//!
//! - every heading drops one level (`## Usage` becomes `### Usage`) so the
//!   article's own `#` title sits under the digest title;
//! - relative link and image targets gain the article folder as a prefix
//!   (`img/x.png` becomes `kbd-style/img/x.png`) so they still resolve.
//!
//! Headings are not capped: `###### Deep` becomes `####### Deep`.

use crate::article::Article;
use crate::segment;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6} ").expect("valid regex"));

static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]\n]*)\]\(([^)\n]*)\)").expect("valid regex"));

/// Promoted copy of `article`'s body. The article itself is not changed.
pub fn promote(article: &Article) -> String {
    promote_body(article.body(), &article.folder_name())
}

/// Promote `body` as if it lived in a folder called `folder_name`.
pub fn promote_body(body: &str, folder_name: &str) -> String {
    segment::map_prose(body, |prose| {
        prose
            .split('\n')
            .map(|line| promote_line(line, folder_name))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

fn promote_line(line: &str, folder_name: &str) -> String {
    if HEADING.is_match(line) {
        return format!("#{line}");
    }
    let mut out = String::with_capacity(line.len() + folder_name.len());
    let mut last = 0;
    for caps in LINK.captures_iter(line) {
        let (Some(whole), Some(text), Some(target)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        out.push_str(&line[last..whole.start()]);
        if keeps_target(line, whole.start(), &caps) {
            out.push_str(whole.as_str());
        } else {
            out.push_str(&format!(
                "[{}]({folder_name}/{})",
                text.as_str(),
                target.as_str()
            ));
        }
        last = whole.end();
    }
    out.push_str(&line[last..]);
    out
}

/// Absolute targets and code-styled links (`` `[x](y)` ``) are left alone.
fn keeps_target(line: &str, start: usize, caps: &Captures) -> bool {
    let after_backtick = line[..start].ends_with('`');
    let absolute = caps
        .get(2)
        .is_some_and(|t| t.as_str().starts_with("http"));
    after_backtick || absolute
}
