//! Markdown to HTML rendering.
//!
//! Built on [pulldown-cmark](https://docs.rs/pulldown-cmark) with the feature
//! set selected in `[markdown]` config, plus two event passes:
//!
//! - **Heading anchors**: `#` and `##` headings get an `id` slug made from
//!   their text (lowercased, spaces to `-`, punctuation dropped). Repeats get
//!   `-1`, `-2`, … suffixes. Deeper headings are left without an id.
//! - **Math passthrough**: `$…$` and `$$…$$` are emitted untouched inside
//!   `<span class="math inline">` / `<div class="math block">` for a
//!   client-side renderer, so `_` and `*` inside formulas never turn into
//!   emphasis.
//!
//! A YAML front-matter block at the top of the input is recognised and
//! dropped, so rendering an article's full content and its body gives the
//! same HTML.
//!
//! Math is only recognised in articles marked `latex: true`, so prices like
//! `$5 and $6` in other articles stay plain text.
//!
//! With `output.full_page` the fragment is wrapped in a [maud] document
//! carrying the article's `lang`, title and `permalink`.

use crate::article::Article;
use crate::config::{MarkdownConfig, SiteConfig};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html as md_html};
use std::collections::HashSet;

fn parser_options(config: &MarkdownConfig) -> Options {
    let mut options = Options::ENABLE_YAML_STYLE_METADATA_BLOCKS;
    let switches = [
        (config.tables, Options::ENABLE_TABLES),
        (config.strikethrough, Options::ENABLE_STRIKETHROUGH),
        (config.tasklists, Options::ENABLE_TASKLISTS),
        (config.footnotes, Options::ENABLE_FOOTNOTES),
        (config.typographer, Options::ENABLE_SMART_PUNCTUATION),
        (config.math, Options::ENABLE_MATH),
    ];
    for (enabled, flag) in switches {
        if enabled {
            options.insert(flag);
        }
    }
    options
}

/// Render Markdown text to an HTML fragment.
pub fn render_markdown(markdown: &str, config: &MarkdownConfig) -> String {
    let mut events: Vec<Event> = Parser::new_ext(markdown, parser_options(config))
        .map(math_passthrough)
        .collect();
    if config.heading_anchors {
        add_heading_anchors(&mut events);
    }
    let mut out = String::new();
    md_html::push_html(&mut out, events.into_iter());
    out
}

fn escape(text: &str) -> String {
    html! { (text) }.into_string()
}

fn math_passthrough(event: Event<'_>) -> Event<'_> {
    match event {
        Event::InlineMath(tex) => Event::InlineHtml(CowStr::from(format!(
            r#"<span class="math inline">{}</span>"#,
            escape(&tex)
        ))),
        Event::DisplayMath(tex) => Event::InlineHtml(CowStr::from(format!(
            "<div class=\"math block\">\n{}\n</div>",
            escape(tex.trim())
        ))),
        other => other,
    }
}

/// Anchor slug for a heading: `Hello, World!` → `hello-world`.
pub fn slugify(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

fn unique_slug(slug: String, used: &mut HashSet<String>) -> String {
    let mut candidate = slug.clone();
    let mut n = 1;
    while used.contains(&candidate) {
        candidate = format!("{slug}-{n}");
        n += 1;
    }
    used.insert(candidate.clone());
    candidate
}

fn heading_text(events: &[Event]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) | Event::InlineMath(t) => text.push_str(t),
            _ => {}
        }
    }
    text
}

fn add_heading_anchors(events: &mut [Event]) {
    let mut used = HashSet::new();
    for i in 0..events.len() {
        let anchored = matches!(
            events[i],
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1 | HeadingLevel::H2,
                id: None,
                ..
            })
        );
        if !anchored {
            continue;
        }
        let slug = unique_slug(slugify(&heading_text(&events[i + 1..])), &mut used);
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(slug));
        }
    }
}

fn page_document(article: &Article, lang: &str, content: Markup) -> Markup {
    let title = article.title().unwrap_or_else(|| article.stem());
    html! {
        (DOCTYPE)
        html lang=(lang) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                @if let Some(author) = article.metadata.author() {
                    meta name="author" content=(author);
                }
                @if let Some(permalink) = article.metadata.permalink() {
                    link rel="canonical" href=(permalink);
                }
                title { (title) }
            }
            body {
                article {
                    (content)
                }
            }
        }
    }
}

/// Render an article to the HTML written to its index file.
///
/// Returns a complete document when `output.full_page` is set, otherwise
/// the bare fragment. Math needs both `markdown.math` and `latex: true`.
pub fn render_article(article: &Article, config: &SiteConfig) -> String {
    let markdown = MarkdownConfig {
        math: config.markdown.math && article.metadata.latex(),
        ..config.markdown.clone()
    };
    let fragment = render_markdown(article.body(), &markdown);
    if !config.output.full_page {
        return fragment;
    }
    let lang = article
        .metadata
        .lang()
        .unwrap_or(&config.captions.default_lang);
    page_document(article, lang, PreEscaped(fragment)).into_string()
}
