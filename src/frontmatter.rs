//! YAML front matter: splitting it off a Markdown file and writing it back.
//!
//! A front-matter block is recognised only at the very top of the file
//! (after leading whitespace is stripped):
//!
//! ```text
//! ---
//! date: 2022-09-18
//! tags: [CSS]
//! ---
//!
//! # Title
//! ```
//!
//! The closing `---` is the *first* line consisting of exactly `---` that is
//! followed by a newline, so a later horizontal rule in the body is never
//! swallowed.
//!
//! ## Serialization
//!
//! [`serialize`] emits the block in a fixed, stable shape:
//!
//! - keys in insertion order, never sorted
//! - Unicode written literally
//! - sequences and mappings whose items are all scalars written inline
//!   (`tags: [CSS, CSS-Grids]`), anything deeper written as a block
//! - the top-level mapping is always a block, so the output never collapses
//!   to a one-line `--- {date: …}`
//!
//! An empty map serializes to the empty string: no `---\n---` stub.
//!
//! ## Dates
//!
//! Only a plain `2022-09-18` loads as a date. A quoted `"2022-09-18"` stays
//! a string and is written back quoted.

use crate::metadata::{Metadata, Value};
use chrono::NaiveDate;
use std::collections::VecDeque;
use thiserror::Error;
use yaml_rust2::parser::{Event, EventReceiver, Parser};
use yaml_rust2::scanner::TScalarStyle;

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("front matter must be a mapping, found {0}")]
    NotAMapping(&'static str),
}

/// A front-matter block located at the top of a Markdown file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontMatter<'a> {
    /// The block including both `---` delimiter lines (no trailing newline).
    pub block: &'a str,
    /// The YAML between the delimiters.
    pub payload: &'a str,
}

const DELIMITER: &str = "---";

/// Split raw Markdown into an optional front-matter block and the body.
///
/// Leading whitespace of `raw` is ignored. When a block is found the body
/// starts after the closing delimiter with leading blank lines removed;
/// otherwise the whole (leading-stripped) text is the body.
pub fn split(raw: &str) -> (Option<FrontMatter<'_>>, &str) {
    let text = raw.trim_start_matches('\u{feff}').trim_start();

    let Some(rest) = text
        .strip_prefix(DELIMITER)
        .and_then(|r| r.strip_prefix("\r\n").or_else(|| r.strip_prefix('\n')))
    else {
        return (None, text);
    };
    let rest_start = text.len() - rest.len();

    let mut offset = 0;
    while let Some(nl) = rest[offset..].find('\n') {
        let end = offset + nl;
        if rest[offset..end].trim_end_matches('\r') == DELIMITER {
            let block = &text[..rest_start + end];
            let body = strip_leading_blank_lines(&rest[end + 1..]);
            return (
                Some(FrontMatter {
                    block: block.trim_end_matches('\r'),
                    payload: &rest[..offset],
                }),
                body,
            );
        }
        offset = end + 1;
    }

    (None, text)
}

/// Split and parse in one step.
pub fn parse(raw: &str) -> Result<(Metadata, &str), FrontMatterError> {
    match split(raw) {
        (Some(fm), body) => Ok((parse_payload(fm.payload)?, body)),
        (None, body) => Ok((Metadata::new(), body)),
    }
}

/// Parse the YAML between the delimiters. Blank payload is an empty map.
pub fn parse_payload(payload: &str) -> Result<Metadata, FrontMatterError> {
    if payload.trim().is_empty() {
        return Ok(Metadata::new());
    }
    let mut styles = DateStyles::scan(payload);
    match serde_yaml::from_str(payload)? {
        serde_yaml::Value::Mapping(mapping) => Ok(metadata_from_yaml(mapping, &mut styles)),
        serde_yaml::Value::Null => Ok(Metadata::new()),
        serde_yaml::Value::Sequence(_) => Err(FrontMatterError::NotAMapping("a sequence")),
        serde_yaml::Value::Tagged(_) => Err(FrontMatterError::NotAMapping("a tagged value")),
        _ => Err(FrontMatterError::NotAMapping("a scalar")),
    }
}

/// Parse a single YAML value, as typed on a command line.
///
/// `true` is a bool, `2022-09-18` a date, `[a, b]` a list, anything else
/// (including `"2022-09-18"`) a string.
pub fn parse_value(text: &str) -> Result<Value, FrontMatterError> {
    let mut styles = DateStyles::scan(text);
    Ok(value_from_yaml(serde_yaml::from_str(text)?, &mut styles))
}

/// Render `metadata` + `body` as a complete Markdown file.
///
/// With metadata: block, one blank line, body with trailing whitespace
/// trimmed, one final newline. Without metadata the block is omitted.
pub fn compose(metadata: &Metadata, body: &str) -> String {
    let body = strip_leading_blank_lines(body).trim_end();
    if metadata.is_empty() {
        format!("{body}\n")
    } else {
        format!("{}\n\n{body}\n", serialize(metadata))
    }
}

fn strip_leading_blank_lines(text: &str) -> &str {
    let mut rest = text;
    while let Some(nl) = rest.find('\n') {
        if rest[..nl].trim().is_empty() {
            rest = &rest[nl + 1..];
        } else {
            return rest;
        }
    }
    if rest.trim().is_empty() { "" } else { rest }
}

// =============================================================================
// YAML → Metadata
// =============================================================================

/// Quoting of the date-shaped scalars in a YAML text, in document order.
///
/// serde_yaml resolves plain and quoted scalars to the same string, so the
/// event stream is read once more to tell `2022-09-18` from `"2022-09-18"`.
/// Mappings keep document order, so popping one entry per date-shaped
/// string while converting keeps the two walks aligned.
struct DateStyles {
    plain: VecDeque<bool>,
}

impl DateStyles {
    fn scan(text: &str) -> Self {
        let mut styles = DateStyles {
            plain: VecDeque::new(),
        };
        // serde_yaml reports malformed input; an empty queue reads as plain.
        if Parser::new_from_str(text).load(&mut styles, false).is_err() {
            styles.plain.clear();
        }
        styles
    }

    /// Whether the next date-shaped scalar was written plain.
    fn next_is_plain(&mut self) -> bool {
        self.plain.pop_front().unwrap_or(true)
    }
}

impl EventReceiver for DateStyles {
    fn on_event(&mut self, event: Event) {
        if let Event::Scalar(value, style, ..) = event {
            if parse_date(&value).is_some() {
                self.plain.push_back(matches!(style, TScalarStyle::Plain));
            }
        }
    }
}

fn metadata_from_yaml(mapping: serde_yaml::Mapping, styles: &mut DateStyles) -> Metadata {
    let mut metadata = Metadata::new();
    for (k, v) in mapping {
        let key = key_to_string(k, styles);
        metadata.insert(key, value_from_yaml(v, styles));
    }
    metadata
}

fn key_to_string(key: serde_yaml::Value, styles: &mut DateStyles) -> String {
    match key {
        serde_yaml::Value::String(s) => {
            if parse_date(&s).is_some() {
                styles.next_is_plain();
            }
            s
        }
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => value_from_yaml(other, styles).to_string(),
    }
}

fn value_from_yaml(value: serde_yaml::Value, styles: &mut DateStyles) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_yaml::Value::String(s) => match parse_date(&s) {
            Some(d) if styles.next_is_plain() => Value::Date(d),
            _ => Value::String(s),
        },
        serde_yaml::Value::Sequence(items) => Value::List(
            items
                .into_iter()
                .map(|item| value_from_yaml(item, styles))
                .collect(),
        ),
        serde_yaml::Value::Mapping(m) => Value::Map(metadata_from_yaml(m, styles)),
        serde_yaml::Value::Tagged(tagged) => value_from_yaml(tagged.value, styles),
    }
}

/// Strict `YYYY-MM-DD`.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let b = s.as_bytes();
    let shaped = b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b.iter()
            .enumerate()
            .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit());
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

// =============================================================================
// Metadata → YAML
// =============================================================================

/// Serialize metadata as a `---`-delimited block (no trailing newline).
pub fn serialize(metadata: &Metadata) -> String {
    if metadata.is_empty() {
        return String::new();
    }
    let mut out = String::from("---\n");
    emit_block_map(metadata, 0, &mut out);
    out.push_str(DELIMITER);
    out
}

fn is_inline(value: &Value) -> bool {
    match value {
        Value::List(items) => items.iter().all(Value::is_scalar),
        Value::Map(map) => map.iter().all(|(_, v)| v.is_scalar()),
        _ => true,
    }
}

fn emit_block_map(map: &Metadata, indent: usize, out: &mut String) {
    for (key, value) in map.iter() {
        out.push_str(&" ".repeat(indent));
        out.push_str(&scalar_string(key, false));
        out.push(':');
        match value {
            Value::List(items) if !is_inline(value) => {
                out.push('\n');
                emit_block_seq(items, indent, out);
            }
            Value::Map(inner) if !is_inline(value) => {
                out.push('\n');
                emit_block_map(inner, indent + 2, out);
            }
            _ => {
                out.push(' ');
                out.push_str(&inline(value));
                out.push('\n');
            }
        }
    }
}

fn emit_block_seq(items: &[Value], indent: usize, out: &mut String) {
    let pad = " ".repeat(indent);
    for item in items {
        out.push_str(&pad);
        out.push_str("- ");
        // Nested blocks start on the dash line: `- - a` / `- k: v`.
        let mut nested = String::new();
        match item {
            Value::List(inner) if !is_inline(item) => {
                emit_block_seq(inner, indent + 2, &mut nested)
            }
            Value::Map(inner) if !is_inline(item) => {
                emit_block_map(inner, indent + 2, &mut nested)
            }
            _ => {
                out.push_str(&inline(item));
                out.push('\n');
                continue;
            }
        }
        out.push_str(&nested[indent + 2..]);
    }
}

fn inline(value: &Value) -> String {
    match value {
        Value::List(items) => {
            let parts: Vec<String> = items.iter().map(inline).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Map(map) => {
            let parts: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", scalar_string(k, true), inline(v)))
                .collect();
            format!("{{{}}}", parts.join(", "))
        }
        Value::String(s) => scalar_string(s, true),
        other => plain_scalar(other),
    }
}

fn plain_scalar(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(x) if x.is_nan() => ".nan".to_string(),
        Value::Float(x) if x.is_infinite() => {
            (if *x > 0.0 { ".inf" } else { "-.inf" }).to_string()
        }
        Value::Float(x) => format!("{x:?}"),
        Value::Date(d) => d.format("%Y-%m-%d").to_string(),
        other => other.to_string(),
    }
}

/// Write a string scalar, quoting only when a plain scalar would not load
/// back as the same string.
fn scalar_string(s: &str, in_flow: bool) -> String {
    if s.chars().any(|c| c.is_control() && c != '\t') {
        return double_quoted(s);
    }
    if needs_quotes(s, in_flow) {
        return format!("'{}'", s.replace('\'', "''"));
    }
    s.to_string()
}

fn needs_quotes(s: &str, in_flow: bool) -> bool {
    const INDICATORS: &[char] = &[
        '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%',
        '@', '`',
    ];
    let Some(first) = s.chars().next() else {
        return true;
    };
    INDICATORS.contains(&first)
        || s.starts_with(char::is_whitespace)
        || s.ends_with(char::is_whitespace)
        || s.ends_with(':')
        || s.contains(": ")
        || s.contains(" #")
        || (in_flow && s.contains([',', '[', ']', '{', '}']))
        || resolves_to_non_string(s)
}

fn resolves_to_non_string(s: &str) -> bool {
    const WORDS: &[&str] = &[
        "~", "null", "Null", "NULL", "true", "True", "TRUE", "false", "False", "FALSE", "y", "Y",
        "yes", "Yes", "YES", "n", "N", "no", "No", "NO", "on", "On", "ON", "off", "Off", "OFF",
        ".inf", ".Inf", ".INF", "+.inf", "-.inf", ".nan", ".NaN", ".NAN",
    ];
    WORDS.contains(&s)
        || s.parse::<i64>().is_ok()
        || s.parse::<f64>().is_ok()
        || s.starts_with("0x")
        || s.starts_with("0o")
        || parse_date(s).is_some()
}

fn double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ARTICLE: &str = "---\ndate: 2022-09-18\ntags: [CSS]\n---\n\n# Title\n\nHello\n";

    fn date(y: i32, m: u32, d: u32) -> Value {
        Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    // =========================================================================
    // split() tests
    // =========================================================================

    #[test]
    fn split_basic_article() {
        let (fm, body) = split(ARTICLE);
        let fm = fm.unwrap();
        assert_eq!(fm.block, "---\ndate: 2022-09-18\ntags: [CSS]\n---");
        assert_eq!(fm.payload, "date: 2022-09-18\ntags: [CSS]\n");
        assert_eq!(body, "# Title\n\nHello\n");
    }

    #[test]
    fn split_strips_leading_whitespace() {
        let (fm, body) = split("\n\n  ---\na: 1\n---\nText\n");
        assert!(fm.is_some());
        assert_eq!(body, "Text\n");
    }

    #[test]
    fn split_without_front_matter_returns_whole_text() {
        let (fm, body) = split("\n# Title\n\nContent");
        assert!(fm.is_none());
        assert_eq!(body, "# Title\n\nContent");
    }

    #[test]
    fn split_is_non_greedy() {
        let raw = "---\na: 1\n---\n\nIntro\n\n---\n\nAfter the rule\n";
        let (fm, body) = split(raw);
        assert_eq!(fm.unwrap().payload, "a: 1\n");
        assert_eq!(body, "Intro\n\n---\n\nAfter the rule\n");
    }

    #[test]
    fn split_requires_newline_after_closing_delimiter() {
        let (fm, body) = split("---\na: 1\n---");
        assert!(fm.is_none());
        assert_eq!(body, "---\na: 1\n---");
    }

    #[test]
    fn split_empty_block() {
        let (fm, body) = split("---\n---\nBody\n");
        assert_eq!(fm.unwrap().payload, "");
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn split_ignores_indented_delimiter() {
        let (fm, _) = split("---\na: |\n  ---\nb: 2\n---\nBody\n");
        assert_eq!(fm.unwrap().payload, "a: |\n  ---\nb: 2\n");
    }

    #[test]
    fn split_handles_crlf() {
        let (fm, body) = split("---\r\na: 1\r\n---\r\n\r\nBody\r\n");
        assert_eq!(fm.unwrap().payload, "a: 1\r\n");
        assert_eq!(body, "Body\r\n");
    }

    #[test]
    fn split_requires_delimiter_on_first_line() {
        let (fm, _) = split("# Title\n---\na: 1\n---\n");
        assert!(fm.is_none());
    }

    // =========================================================================
    // parse() tests
    // =========================================================================

    #[test]
    fn parse_basic_article() {
        let (meta, body) = parse(ARTICLE).unwrap();
        assert_eq!(meta.get("date"), Some(&date(2022, 9, 18)));
        assert_eq!(meta.get("tags"), Some(&Value::from(vec!["CSS"])));
        assert_eq!(body, "# Title\n\nHello\n");
    }

    #[test]
    fn parse_empty_payload_is_empty_map() {
        let (meta, body) = parse("---\n\n---\nBody").unwrap();
        assert!(meta.is_empty());
        assert_eq!(body, "Body");
    }

    #[test]
    fn parse_keeps_key_order() {
        let (meta, _) = parse("---\nzeta: 1\nalpha: 2\nmid: 3\n---\n").unwrap();
        let keys: Vec<&str> = meta.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn parse_scalar_types() {
        let raw = "---\npublished: false\ncount: 3\nratio: 0.5\nlang: ru\nnothing:\n---\n";
        let (meta, _) = parse(raw).unwrap();
        assert_eq!(meta.get("published"), Some(&Value::Bool(false)));
        assert_eq!(meta.get("count"), Some(&Value::Int(3)));
        assert_eq!(meta.get("ratio"), Some(&Value::Float(0.5)));
        assert_eq!(meta.get("lang"), Some(&Value::from("ru")));
        assert_eq!(meta.get("nothing"), Some(&Value::Null));
    }

    #[test]
    fn parse_malformed_yaml_is_error() {
        let result = parse("---\ntags: [unclosed\n---\nBody\n");
        assert!(matches!(result, Err(FrontMatterError::Yaml(_))));
    }

    #[test]
    fn parse_sequence_is_not_a_mapping() {
        let result = parse("---\n- a\n- b\n---\nBody\n");
        assert!(matches!(result, Err(FrontMatterError::NotAMapping(_))));
    }

    #[test]
    fn parse_rejects_invalid_calendar_date() {
        let (meta, _) = parse("---\ndate: 2022-13-45\n---\n").unwrap();
        assert_eq!(meta.get("date"), Some(&Value::from("2022-13-45")));
    }

    // =========================================================================
    // serialize() tests
    // =========================================================================

    #[test]
    fn serialize_empty_is_empty_string() {
        assert_eq!(serialize(&Metadata::new()), "");
    }

    #[test]
    fn serialize_basic_block() {
        let mut m = Metadata::new();
        m.insert("date", date(2022, 9, 18));
        m.insert("categories", vec!["it", "web"]);
        m.insert("tags", vec!["CSS"]);
        assert_eq!(
            serialize(&m),
            "---\ndate: 2022-09-18\ncategories: [it, web]\ntags: [CSS]\n---"
        );
    }

    #[test]
    fn serialize_scalar_only_map_stays_block() {
        let mut m = Metadata::new();
        m.insert("author", "Anton Sergienko");
        let out = serialize(&m);
        assert!(!out.starts_with("--- {"));
        assert_eq!(out, "---\nauthor: Anton Sergienko\n---");
    }

    #[test]
    fn serialize_keeps_insertion_order() {
        let m: Metadata = [("zeta", 1i64), ("alpha", 2), ("mid", 3)].into_iter().collect();
        assert_eq!(serialize(&m), "---\nzeta: 1\nalpha: 2\nmid: 3\n---");
    }

    #[test]
    fn serialize_unicode_literally() {
        let mut m = Metadata::new();
        m.insert("title", "Установка LaTeX");
        assert_eq!(serialize(&m), "---\ntitle: Установка LaTeX\n---");
    }

    #[test]
    fn serialize_nested_lists_as_block() {
        let mut m = Metadata::new();
        m.insert(
            "tags",
            Value::List(vec![Value::from(vec!["CSS", "Grid"]), Value::from("HTML")]),
        );
        assert_eq!(serialize(&m), "---\ntags:\n- [CSS, Grid]\n- HTML\n---");
    }

    #[test]
    fn serialize_nested_map_of_lists() {
        let mut inner = Metadata::new();
        inner.insert("links", vec!["a", "b"]);
        inner.insert("note", "x");
        let mut m = Metadata::new();
        m.insert("extra", Value::Map(inner));
        assert_eq!(
            serialize(&m),
            "---\nextra:\n  links: [a, b]\n  note: x\n---"
        );
    }

    #[test]
    fn serialize_list_of_maps() {
        let mut item = Metadata::new();
        item.insert("name", "a");
        item.insert("tags", Value::List(vec![Value::from(vec!["x"])]));
        let mut m = Metadata::new();
        m.insert("items", Value::List(vec![Value::Map(item)]));
        assert_eq!(
            serialize(&m),
            "---\nitems:\n- name: a\n  tags:\n  - [x]\n---"
        );
    }

    #[test]
    fn serialize_quotes_ambiguous_strings() {
        let mut m = Metadata::new();
        m.insert("a", "true");
        m.insert("b", "42");
        m.insert("c", "key: value");
        m.insert("d", "");
        m.insert("e", "it's");
        m.insert("f", "#hash");
        assert_eq!(
            serialize(&m),
            "---\na: 'true'\nb: '42'\nc: 'key: value'\nd: ''\ne: it's\nf: '#hash'\n---"
        );
    }

    #[test]
    fn serialize_quotes_flow_indicators_inside_lists() {
        let mut m = Metadata::new();
        m.insert("tags", vec!["a,b", "C++"]);
        assert_eq!(serialize(&m), "---\ntags: ['a,b', C++]\n---");
    }

    #[test]
    fn serialize_urls_stay_plain() {
        let mut m = Metadata::new();
        m.insert("demo", "https://codepen.io/Harrix/pen/pZZZxg");
        assert_eq!(
            serialize(&m),
            "---\ndemo: https://codepen.io/Harrix/pen/pZZZxg\n---"
        );
    }

    #[test]
    fn serialize_multiline_string_double_quoted() {
        let mut m = Metadata::new();
        m.insert("note", "line one\nline \"two\"");
        assert_eq!(serialize(&m), "---\nnote: \"line one\\nline \\\"two\\\"\"\n---");
    }

    #[test]
    fn serialize_floats_keep_a_decimal_point() {
        let mut m = Metadata::new();
        m.insert("ratio", Value::Float(1.0));
        assert_eq!(serialize(&m), "---\nratio: 1.0\n---");
    }

    #[test]
    fn serialize_empty_collections_inline() {
        let mut m = Metadata::new();
        m.insert("tags", Value::List(vec![]));
        m.insert("extra", Value::Map(Metadata::new()));
        assert_eq!(serialize(&m), "---\ntags: []\nextra: {}\n---");
    }

    // =========================================================================
    // Round trip
    // =========================================================================

    #[test]
    fn round_trip_through_compose_and_parse() {
        let mut m = Metadata::new();
        m.insert("date", date(2018, 8, 3));
        m.insert("update", date(2022, 9, 19));
        m.insert("categories", vec!["it", "web"]);
        m.insert("tags", vec!["CSS", "CSS-Grids"]);
        m.insert("published", false);
        m.insert("latex", true);
        m.insert("related-id", "html-lesson");
        m.insert("author", "Anton Sergienko");
        m.insert("license", "CC BY 4.0");
        m.insert("quoted", "yes");
        m.insert("lang", "ru");
        let body = "# Title\n\nHello\n";

        let text = compose(&m, body);
        let (loaded, loaded_body) = parse(&text).unwrap();
        assert_eq!(loaded, m);
        assert_eq!(loaded_body, body);
    }

    #[test]
    fn date_shaped_string_round_trips_as_string() {
        let mut m = Metadata::new();
        m.insert("version", Value::String("2022-09-18".into()));
        m.insert("date", date(2022, 9, 18));

        let text = compose(&m, "Body\n");
        assert_eq!(text, "---\nversion: '2022-09-18'\ndate: 2022-09-18\n---\n\nBody\n");
        let (loaded, _) = parse(&text).unwrap();
        assert_eq!(loaded, m);
    }

    #[test]
    fn quoted_dates_stay_strings() {
        let raw = "---\nversion: \"2022-09-18\"\ndate: 2022-09-18\nlist: ['2023-01-05', 2023-01-06]\n---\n\nBody\n";
        let (m, _) = parse(raw).unwrap();
        assert_eq!(m.get("version"), Some(&Value::String("2022-09-18".into())));
        assert_eq!(m.get("date"), Some(&date(2022, 9, 18)));
        assert_eq!(
            m.get("list"),
            Some(&Value::List(vec![
                Value::String("2023-01-05".into()),
                date(2023, 1, 6),
            ]))
        );
        assert_eq!(
            compose(&m, "Body\n"),
            "---\nversion: '2022-09-18'\ndate: 2022-09-18\nlist: ['2023-01-05', 2023-01-06]\n---\n\nBody\n"
        );
    }

    #[test]
    fn compose_without_metadata_has_no_block() {
        let text = compose(&Metadata::new(), "# Title\n\nContent");
        assert_eq!(text, "# Title\n\nContent\n");
    }

    #[test]
    fn compose_normalizes_trailing_whitespace() {
        let mut m = Metadata::new();
        m.insert("a", 1i64);
        assert_eq!(compose(&m, "Body\n\n\n  "), "---\na: 1\n---\n\nBody\n");
    }

    // =========================================================================
    // parse_value() tests
    // =========================================================================

    #[test]
    fn parse_value_keeps_yaml_types() {
        assert_eq!(parse_value("true").unwrap(), Value::Bool(true));
        assert_eq!(parse_value("42").unwrap(), Value::Int(42));
        assert_eq!(parse_value("2022-11-04").unwrap(), date(2022, 11, 4));
        assert_eq!(
            parse_value("'2022-11-04'").unwrap(),
            Value::String("2022-11-04".into())
        );
        assert_eq!(
            parse_value("[it, web]").unwrap(),
            Value::List(vec!["it".into(), "web".into()])
        );
        assert_eq!(
            parse_value("Anton Sergienko").unwrap(),
            Value::String("Anton Sergienko".into())
        );
    }

    #[test]
    fn parse_value_rejects_broken_yaml() {
        assert!(parse_value("[unterminated").is_err());
    }
}
