//! Header map: lower-cased field name to one or many values.

use serde::{Deserialize, Serialize};

/// The value(s) observed for one header field.
///
/// A field seen once is `Single`; the second occurrence converts it to
/// `Multiple` and further occurrences append, preserving order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderValue {
    Single(String),
    Multiple(Vec<String>),
}

impl HeaderValue {
    /// First value in order of appearance.
    pub fn first(&self) -> &str {
        match self {
            Self::Single(v) => v,
            Self::Multiple(vs) => vs.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// All values in order of appearance.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Single(v) => vec![v.as_str()],
            Self::Multiple(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    /// Record a further occurrence of the same field.
    fn push(&mut self, value: String) {
        match self {
            Self::Single(existing) => {
                let first = std::mem::take(existing);
                *self = Self::Multiple(vec![first, value]);
            }
            Self::Multiple(vs) => vs.push(value),
        }
    }

    /// Append folded text to the most recent value, space-joined.
    fn continue_last(&mut self, text: &str) {
        let last = match self {
            Self::Single(v) => v,
            Self::Multiple(vs) => match vs.last_mut() {
                Some(v) => v,
                None => return,
            },
        };
        last.push(' ');
        last.push_str(text);
    }
}

/// Ordered mapping of lower-cased header names to their values.
///
/// Keys appear in order of first occurrence. The key set is exactly the set of
/// names observed in the message; nothing is synthesized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMap {
    fields: Vec<(String, HeaderValue)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, accumulating into a sequence if the name repeats.
    pub fn insert(&mut self, name: &str, value: String) {
        match self.fields.iter_mut().find(|(k, _)| k == name) {
            Some((_, existing)) => existing.push(value),
            None => self
                .fields
                .push((name.to_string(), HeaderValue::Single(value))),
        }
    }

    /// Append a continuation line to the current value of `name`.
    ///
    /// Returns `false` if `name` has not been started.
    pub fn continue_field(&mut self, name: &str, text: &str) -> bool {
        match self.fields.iter_mut().find(|(k, _)| k == name) {
            Some((_, value)) => {
                value.continue_last(text);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// First value of a field, if present.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).map(HeaderValue::first)
    }

    /// Every value of a field, empty if absent.
    pub fn all(&self, name: &str) -> Vec<&str> {
        self.get(name).map(HeaderValue::values).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}
