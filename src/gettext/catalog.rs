//! In-memory message catalog shared by the MO and PO codecs.

use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Control byte separating an embedded context from the message key.
pub const CONTEXT_SEPARATOR: char = '\x04';

/// Source -> translation pairs for one language.
///
/// Keys are stored raw: a context-qualified key is `context + "\x04" + key`.
/// Iteration follows the sorted order of raw keys so that serialized
/// catalogs are byte-for-byte reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageCatalog {
    entries: BTreeMap<String, String>,
}

impl MessageCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pair under a raw key. Returns the previous translation, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Insert a pair under `key`, qualified with `context` when it is not empty.
    pub fn insert_with_context(
        &mut self,
        context: &str,
        key: &str,
        value: impl Into<String>,
    ) -> Option<String> {
        self.insert(join_key(context, key), value)
    }

    /// Look up a translation by raw key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(raw key, translation)` pairs.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// Bare-key translations whose embedded context equals `context`.
    ///
    /// Entries without a separator belong to the empty context.
    pub fn messages_for_context(&self, context: &str) -> HashMap<String, String> {
        self.entries
            .iter()
            .filter_map(|(raw, value)| {
                let (ctx, key) = split_key(raw);
                (ctx.unwrap_or("") == context).then(|| (key.to_string(), value.clone()))
            })
            .collect()
    }

    /// Distinct contexts present in the catalog (`""` for unqualified keys).
    pub fn contexts(&self) -> BTreeSet<&str> {
        self.entries
            .keys()
            .map(|raw| split_key(raw).0.unwrap_or(""))
            .collect()
    }
}

impl FromIterator<(String, String)> for MessageCatalog {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a MessageCatalog {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over catalog entries in raw key order.
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, String, String>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

/// Split a raw key into its embedded context (if any) and the bare key.
pub fn split_key(raw: &str) -> (Option<&str>, &str) {
    match raw.split_once(CONTEXT_SEPARATOR) {
        Some((context, key)) => (Some(context), key),
        None => (None, raw),
    }
}

/// Build a raw key, omitting the separator for the empty context.
pub fn join_key(context: &str, key: &str) -> String {
    if context.is_empty() {
        key.to_string()
    } else {
        format!("{context}{CONTEXT_SEPARATOR}{key}")
    }
}
