//! Ordered media type parameters.
//!
//! Parameters are stored as `(key, value)` pairs in insertion order so that
//! rendering is deterministic. Key lookup is ASCII case-insensitive. Almost
//! every content type on the wire carries fewer than four parameters
//! (`charset`, `odata.metadata`, ...), so they are stored inline.

use smallvec::SmallVec;
use std::fmt;

/// Number of parameters stored inline before spilling to the heap.
pub const INLINE_PARAMETERS: usize = 4;

/// An ordered, case-insensitive-key parameter list.
#[derive(Clone, Default)]
pub struct Parameters {
    inner: SmallVec<[(String, String); INLINE_PARAMETERS]>,
}

impl Parameters {
    /// Create an empty parameter list.
    #[inline]
    pub fn new() -> Self {
        Self {
            inner: SmallVec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get a parameter value by key (case-insensitive).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Check whether a key is present (case-insensitive).
    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert a parameter.
    ///
    /// An existing entry with the same key (ignoring case) is replaced in
    /// place, keeping its position; otherwise the entry is appended.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self
            .inner
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&key))
        {
            Some(slot) => *slot = (key, value),
            None => self.inner.push((key, value)),
        }
    }

    /// Remove a parameter by key (case-insensitive), returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self
            .inner
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(key))?;
        Some(self.inner.remove(pos).1)
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// True if every parameter in `self` is present in `other` with an equal
    /// value, see [`values_equal`].
    pub fn is_subset_of(&self, other: &Parameters) -> bool {
        self.iter()
            .all(|(key, value)| other.get(key).is_some_and(|v| values_equal(v, value)))
    }
}

impl PartialEq for Parameters {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.is_subset_of(other)
    }
}

impl Eq for Parameters {}

impl fmt::Debug for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Renders as `;key=value` for each entry, no whitespace.
impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.iter() {
            write!(f, ";{}={}", key, value)?;
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Parameters::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// Compare two parameter values ignoring ASCII case.
///
/// A quoted-string and the bare token it quotes are the same value, so
/// `"minimal"` equals `minimal`. Values keep their quotes for rendering.
pub fn values_equal(a: &str, b: &str) -> bool {
    unquote(a).eq_ignore_ascii_case(&unquote(b))
}

/// Strip surrounding double quotes and resolve backslash escapes.
fn unquote(value: &str) -> std::borrow::Cow<'_, str> {
    let Some(inner) = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) else {
        return value.into();
    };
    if !inner.contains('\\') {
        return inner.into();
    }

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out.into()
}

/// A concrete type or subtype token: non-empty, no whitespace, `/` or `*`.
pub(crate) fn is_token(s: &str) -> bool {
    !s.is_empty() && !s.contains(|c: char| c.is_whitespace() || c == '/' || c == '*')
}

/// Split `s` on `sep`, ignoring separators inside double-quoted strings.
///
/// Backslash escapes inside quotes are honoured. Segments are returned
/// untrimmed; empty segments are kept.
pub(crate) fn split_unquoted(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            c if c == sep && !in_quotes => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}
