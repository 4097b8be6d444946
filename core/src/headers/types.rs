// ## 📂 File: `src/headers/types.rs`

//! headers/types.rs
//! Caller-supplied document header metadata.
//!
//! Notes:
//! - Order is significant: fields are emitted in the order supplied.
//! - Names are raw here; sanitization happens when the XML tree is built.

use serde::{Deserialize, Serialize};

/// One `(name, value)` pair destined for the `<Header>` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderField {
    #[serde(alias = "tagName")]
    pub name: String,
    #[serde(alias = "tagValue", default, deserialize_with = "crate::headers::decode::value_as_text")]
    pub value: String,
}

impl HeaderField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// Ordered header field list. Duplicate names are allowed here and resolved
/// when building (last value wins, first position kept).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderFieldSet(pub Vec<HeaderField>);

impl HeaderFieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push(HeaderField::new(name, value));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HeaderField> {
        self.0.iter()
    }
}

impl From<Vec<HeaderField>> for HeaderFieldSet {
    fn from(v: Vec<HeaderField>) -> Self {
        Self(v)
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for HeaderFieldSet {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(n, v)| HeaderField::new(n, v)).collect())
    }
}

impl<'a> IntoIterator for &'a HeaderFieldSet {
    type Item = &'a HeaderField;
    type IntoIter = std::slice::Iter<'a, HeaderField>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
