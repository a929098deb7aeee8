//! Typed article metadata.
//!
//! Front matter is loaded into a [`Metadata`] map: string keys in the order
//! they appeared in the file, values as [`Value`]. Order matters because the
//! map is written back to disk and a rewrite must not shuffle the author's
//! keys.
//!
//! ## Known keys
//!
//! Any key is accepted and passed through untouched. These have typed
//! accessors and documented defaults:
//!
//! | Key | Type | Default |
//! |-----|------|---------|
//! | `date` | date | none |
//! | `update` | date | none |
//! | `categories` | list of strings | empty |
//! | `tags` | list of strings (items may be nested lists) | empty |
//! | `published` | bool | `true` |
//! | `latex` | bool | `false` |
//! | `lang` | string | none |
//! | `related-id` | string | none |
//! | `author` | string | none |
//! | `permalink` | string | none |
//!
//! ## Dates
//!
//! A plain `YYYY-MM-DD` scalar is loaded as [`Value::Date`] rather than a
//! string, so `date: 2022-09-18` survives a load/save cycle unquoted and
//! compares as a calendar date.

use chrono::NaiveDate;
use std::fmt;

/// A single front-matter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    String(String),
    List(Vec<Value>),
    Map(Metadata),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// True for anything that is not a list or a map.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::List(_) | Value::Map(_))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Insertion-ordered map of front-matter keys to values.
///
/// Keys are unique. Re-inserting an existing key replaces its value in place
/// without moving it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    entries: Vec<(String, Value)>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace a value. Returns the previous value if the key existed.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    // =========================================================================
    // Known keys
    // =========================================================================

    /// Creation date of the article.
    pub fn date(&self) -> Option<NaiveDate> {
        self.get("date").and_then(Value::as_date)
    }

    /// Date of the last update.
    pub fn update(&self) -> Option<NaiveDate> {
        self.get("update").and_then(Value::as_date)
    }

    pub fn categories(&self) -> Vec<String> {
        self.string_list("categories")
    }

    /// Tags, with nested multi-value entries flattened.
    pub fn tags(&self) -> Vec<String> {
        self.string_list("tags")
    }

    /// `false` marks a draft. Absent means published.
    pub fn published(&self) -> bool {
        self.get("published")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// Whether the article uses `$…$` math.
    pub fn latex(&self) -> bool {
        self.get("latex").and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn lang(&self) -> Option<&str> {
        self.get("lang").and_then(Value::as_str)
    }

    /// Series key linking several articles together.
    pub fn related_id(&self) -> Option<&str> {
        self.get("related-id").and_then(Value::as_str)
    }

    pub fn author(&self) -> Option<&str> {
        self.get("author").and_then(Value::as_str)
    }

    pub fn permalink(&self) -> Option<&str> {
        self.get("permalink").and_then(Value::as_str)
    }

    fn string_list(&self, key: &str) -> Vec<String> {
        fn flatten(value: &Value, out: &mut Vec<String>) {
            match value {
                Value::List(items) => items.iter().for_each(|v| flatten(v, out)),
                Value::Null => {}
                other => out.push(other.to_string()),
            }
        }
        let mut out = Vec::new();
        if let Some(value) = self.get(key) {
            flatten(value, &mut out);
        }
        out
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Metadata::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}
