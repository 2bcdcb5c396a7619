//! Conversions from posts into template [`Value`]s.
//!
//! Every string that reaches a template is HTML-escaped here, so templates
//! can interpolate fields directly without a title like `Fish & <Chips>`
//! breaking the page. The only exceptions are the rendered post body
//! (`content`) and its excerpt (`summary`), which are already HTML.
//!
//! Metadata is exposed twice: as `meta`, an object for direct lookups like
//! `{{.meta.author}}`, and as `meta_entries`, the same keys in sorted order.
//! Ranging over an object visits its keys in no particular order, so
//! templates that list metadata should range over `meta_entries`.

use crate::frontmatter::Metadata;
use crate::post::{Post, PostSummary, DATETIME_FORMAT, DATE_FORMAT};
use crate::tag::Tag;
use chrono::NaiveDateTime;
use gtmpl_value::Value;
use pulldown_cmark::escape::{escape_href, escape_html};
use std::collections::HashMap;

/// Returns `s` HTML-escaped.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let _ = escape_html(&mut out, s);
    out
}

/// Returns `s` as an HTML-escaped string value.
pub fn escaped(s: &str) -> Value {
    Value::String(escape(s))
}

fn escaped_href(s: &str) -> Value {
    let mut out = String::with_capacity(s.len());
    let _ = escape_href(&mut out, s);
    Value::String(out)
}

fn insert_date(m: &mut HashMap<String, Value>, date: &NaiveDateTime) {
    m.insert(
        "date".to_owned(),
        Value::String(date.format(DATE_FORMAT).to_string()),
    );
    m.insert(
        "datetime".to_owned(),
        Value::String(date.format(DATETIME_FORMAT).to_string()),
    );
}

impl From<&Tag> for Value {
    /// Converts [`Tag`]s into [`Value`]s for templating.
    fn from(t: &Tag) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("name".to_owned(), escaped(&t.name));
        m.insert("slug".to_owned(), escaped(&t.slug));
        Value::Object(m)
    }
}

fn tags_to_value(tags: &[Tag]) -> Value {
    Value::Array(tags.iter().map(Value::from).collect())
}

/// Converts a YAML value into a template value, escaping every string
/// (including mapping keys) along the way.
fn yaml_to_value(value: &serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;
    match value {
        Yaml::Null => Value::Nil,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64().map(Value::from).unwrap_or(Value::Nil)
            }
        }
        Yaml::String(s) => escaped(s),
        Yaml::Sequence(seq) => Value::Array(seq.iter().map(yaml_to_value).collect()),
        Yaml::Mapping(mapping) => Value::Object(
            mapping
                .iter()
                .filter_map(|(k, v)| yaml_key(k).map(|k| (escape(&k), yaml_to_value(v))))
                .collect(),
        ),
    }
}

fn yaml_key(key: &serde_yaml::Value) -> Option<String> {
    use serde_yaml::Value as Yaml;
    match key {
        Yaml::String(s) => Some(s.clone()),
        Yaml::Number(n) => Some(n.to_string()),
        Yaml::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Builds an array of `{key, value, entries}` objects sorted by key.
/// `entries` is the same view of `value` when it is a mapping, and empty
/// otherwise.
fn entries_value<'v>(pairs: impl Iterator<Item = (String, &'v serde_yaml::Value)>) -> Value {
    let mut pairs: Vec<(String, &serde_yaml::Value)> = pairs.collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    Value::Array(
        pairs
            .into_iter()
            .map(|(key, value)| {
                let mut m: HashMap<String, Value> = HashMap::new();
                m.insert("key".to_owned(), escaped(&key));
                m.insert("value".to_owned(), yaml_to_value(value));
                m.insert(
                    "entries".to_owned(),
                    match value {
                        serde_yaml::Value::Mapping(mapping) => entries_value(
                            mapping
                                .iter()
                                .filter_map(|(k, v)| yaml_key(k).map(|k| (k, v)))
                                .collect::<Vec<_>>()
                                .into_iter(),
                        ),
                        _ => Value::Array(Vec::new()),
                    },
                );
                Value::Object(m)
            })
            .collect(),
    )
}

fn metadata_entries(metadata: &Metadata) -> Value {
    entries_value(metadata.iter().map(|(k, v)| (k.clone(), v)))
}

impl From<&Metadata> for Value {
    /// Converts the whole metadata block into an object so templates can
    /// reach arbitrary keys, e.g. `{{.meta.author}}`.
    fn from(metadata: &Metadata) -> Value {
        Value::Object(
            metadata
                .iter()
                .map(|(k, v)| (escape(k), yaml_to_value(v)))
                .collect(),
        )
    }
}

impl From<&PostSummary> for Value {
    /// Converts a [`PostSummary`] into an object with the fields `title`,
    /// `date`, `datetime`, `slug`, `url`, `summary`, `summarized`, `tags`,
    /// `meta` and `meta_entries`.
    fn from(summary: &PostSummary) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), escaped(&summary.title));
        m.insert("slug".to_owned(), escaped(&summary.slug));
        m.insert("url".to_owned(), escaped_href(&summary.url()));
        insert_date(&mut m, &summary.date);
        m.insert("summary".to_owned(), Value::String(summary.summary.clone()));
        m.insert("summarized".to_owned(), Value::Bool(summary.summarized));
        m.insert("tags".to_owned(), tags_to_value(&summary.tags));
        m.insert("meta".to_owned(), Value::from(&summary.metadata));
        m.insert("meta_entries".to_owned(), metadata_entries(&summary.metadata));
        Value::Object(m)
    }
}

impl Post {
    /// Converts a [`Post`] into the context of the post template: `title`,
    /// `date`, `datetime`, `content`, `slug`, `url`, `tags`, `meta` and
    /// `meta_entries`, plus
    /// `prev` and `next` (the newer and older neighbouring posts, or nil).
    pub fn to_value(
        &self,
        prev: Option<&PostSummary>,
        next: Option<&PostSummary>,
    ) -> Value {
        let option_to_value = |opt: Option<&PostSummary>| match opt {
            Some(summary) => Value::from(summary),
            None => Value::Nil,
        };

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), escaped(&self.title));
        m.insert("slug".to_owned(), escaped(&self.slug));
        m.insert("url".to_owned(), escaped_href(&self.url()));
        insert_date(&mut m, &self.date);
        m.insert("content".to_owned(), Value::String(self.body.clone()));
        m.insert("tags".to_owned(), tags_to_value(&self.tags));
        m.insert("meta".to_owned(), Value::from(&self.metadata));
        m.insert("meta_entries".to_owned(), metadata_entries(&self.metadata));
        m.insert("prev".to_owned(), option_to_value(prev));
        m.insert("next".to_owned(), option_to_value(next));
        Value::Object(m)
    }
}

/// Builds the context of the index template: `posts`, the summaries in
/// display order.
pub fn index_value(summaries: &[PostSummary]) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert(
        "posts".to_owned(),
        Value::Array(summaries.iter().map(Value::from).collect()),
    );
    Value::Object(m)
}
