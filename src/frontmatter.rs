//! Splits a source document into its leading metadata block and its
//! Markdown body, and decodes the block into [`Metadata`].
//!
//! A metadata block is delimited by two marker lines (`---`). The first line
//! of the document must be a marker for a block to exist at all; the block
//! runs until the next marker line. Markers are matched on whole lines, so a
//! `---` appearing inside a line of YAML or body text never ends the block.

use serde::Serialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt;

const FENCE: &str = "---";

/// Splits `input` into an optional metadata block and a body. When there is
/// no block (no leading marker line, or no closing marker line), the whole
/// input is returned as the body.
pub fn split(input: &str) -> (Option<&str>, &str) {
    let mut lines = Lines::new(input);
    match lines.next() {
        Some((_, line)) if is_fence(line) => {}
        _ => return (None, input),
    }

    let block_start = lines.offset;
    while let Some((line_start, line)) = lines.next() {
        if is_fence(line) {
            let body = input[lines.offset..]
                .trim_start_matches(|c: char| c == '\n' || c == '\r');
            return (Some(&input[block_start..line_start]), body);
        }
    }

    (None, input)
}

/// Splits and decodes `input` in one step. A block that fails to decode is
/// logged and yields an empty [`Metadata`]; this function never fails.
pub fn parse(input: &str) -> (Metadata, &str) {
    let (block, body) = split(input);
    let metadata = match block.map(Metadata::decode) {
        None => Metadata::default(),
        Some(Ok(metadata)) => metadata,
        Some(Err(e)) => {
            log::warn!("Ignoring malformed metadata block: {}", e);
            Metadata::default()
        }
    };
    (metadata, body)
}

fn is_fence(line: &str) -> bool {
    line.trim_end() == FENCE
}

/// Iterates over the lines of a string, yielding each line's starting byte
/// offset alongside its text (without the line terminator). After each call
/// to `next`, `offset` points at the start of the following line.
struct Lines<'a> {
    input: &'a str,
    offset: usize,
}

impl<'a> Lines<'a> {
    fn new(input: &'a str) -> Self {
        Lines { input, offset: 0 }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.input.len() {
            return None;
        }
        let start = self.offset;
        let rest = &self.input[start..];
        let (line, consumed) = match rest.find('\n') {
            Some(i) => (&rest[..i], i + 1),
            None => (rest, rest.len()),
        };
        self.offset += consumed;
        Some((start, line.trim_end_matches('\r')))
    }
}

/// The decoded metadata block of a post. Keys are kept sorted so iteration
/// (and therefore template output) is deterministic.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, Value>);

impl Metadata {
    /// Decodes a YAML metadata block. An empty (or all-comment) block decodes
    /// to an empty [`Metadata`].
    pub fn decode(block: &str) -> Result<Metadata, DecodeError> {
        let blank = block.lines().all(|line| {
            let line = line.trim();
            line.is_empty() || line.starts_with('#')
        });
        if blank {
            return Ok(Metadata::default());
        }
        match serde_yaml::from_str::<Value>(block)? {
            Value::Null => Ok(Metadata::default()),
            Value::Mapping(mapping) => Ok(Metadata(
                mapping
                    .into_iter()
                    .filter_map(|(k, v)| scalar_to_string(&k).map(|k| (k, v)))
                    .collect(),
            )),
            _ => Err(DecodeError::NotAMapping),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the value for `key` as a string if it is a scalar. Numbers and
    /// booleans are formatted; lists, mappings and nulls yield `None`.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key).and_then(scalar_to_string)
    }

    /// Returns the `tags` entry as a list of strings. A single scalar is
    /// treated as a one-element list.
    pub fn tags(&self) -> Vec<String> {
        match self.get("tags") {
            Some(Value::Sequence(seq)) => {
                seq.iter().filter_map(scalar_to_string).collect()
            }
            Some(v) => scalar_to_string(v).into_iter().collect(),
            None => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Represents a metadata block that could not be decoded.
#[derive(Debug)]
pub enum DecodeError {
    /// Returned when the block isn't valid YAML.
    Yaml(serde_yaml::Error),

    /// Returned when the block is valid YAML but not a key-value mapping
    /// (e.g., a bare list or scalar).
    NotAMapping,
}

impl fmt::Display for DecodeError {
    /// Displays a [`DecodeError`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DecodeError::Yaml(err) => err.fmt(f),
            DecodeError::NotAMapping => {
                write!(f, "metadata block must be a key-value mapping")
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Yaml(err) => Some(err),
            DecodeError::NotAMapping => None,
        }
    }
}

impl From<serde_yaml::Error> for DecodeError {
    /// Converts a [`serde_yaml::Error`] into a [`DecodeError`]. It allows us
    /// to use the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> DecodeError {
        DecodeError::Yaml(err)
    }
}
