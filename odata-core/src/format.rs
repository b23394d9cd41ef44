//! `$format` alias resolution.
//!
//! A `$format` token is either a short alias (`json`, `xml`, or anything a
//! handler registers) or a literal content type (`application/json;odata.metadata=full`).
//! Aliases are looked up in declaration order, built-ins first; the first
//! match wins and later duplicates are ignored.

use crate::content_type::ContentType;
use crate::error::{Error, Result};
use crate::resource_kind::ResourceKind;

/// Binds a `$format` alias to a content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatContentTypeMapping {
    alias: String,
    content_type: ContentType,
}

impl FormatContentTypeMapping {
    /// Create a mapping. The alias is trimmed.
    pub fn new(alias: impl AsRef<str>, content_type: ContentType) -> Self {
        Self {
            alias: alias.as_ref().trim().to_string(),
            content_type,
        }
    }

    /// Create a mapping from a content type string.
    ///
    /// ```
    /// use odata_core::format::FormatContentTypeMapping;
    ///
    /// let mapping = FormatContentTypeMapping::parse(" csv ", " text/csv ").unwrap();
    /// assert_eq!(mapping.alias(), "csv");
    /// assert_eq!(mapping.content_type().render(), "text/csv");
    /// ```
    pub fn parse(alias: impl AsRef<str>, content_type: &str) -> Result<Self> {
        Ok(Self::new(alias, ContentType::parse(content_type)?))
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    /// Compare against a token, trimmed and ignoring ASCII case.
    pub fn matches_alias(&self, token: &str) -> bool {
        self.alias.eq_ignore_ascii_case(token.trim())
    }
}

/// Resolves `$format` tokens against an ordered mapping list.
#[derive(Debug, Clone, Copy)]
pub struct FormatAliasResolver<'a> {
    kind: ResourceKind,
    mappings: &'a [FormatContentTypeMapping],
}

impl<'a> FormatAliasResolver<'a> {
    /// `mappings` must already hold built-ins followed by custom entries.
    pub fn new(kind: ResourceKind, mappings: &'a [FormatContentTypeMapping]) -> Self {
        Self { kind, mappings }
    }

    /// Resolve a token to a content type.
    ///
    /// A token containing `/` is parsed as a literal content type and is not
    /// looked up. Otherwise the first mapping whose alias matches is
    /// returned exactly as registered.
    pub fn resolve(&self, token: &str) -> Result<ContentType> {
        let token = token.trim();

        if token.contains('/') {
            return ContentType::parse(token);
        }

        self.lookup(token)
            .cloned()
            .ok_or_else(|| Error::UnsupportedFormatOption {
                format: token.to_string(),
                kind: self.kind,
            })
    }

    /// Find the content type registered under an alias.
    pub fn lookup(&self, alias: &str) -> Option<&'a ContentType> {
        self.mappings
            .iter()
            .find(|mapping| mapping.matches_alias(alias))
            .map(FormatContentTypeMapping::content_type)
    }
}
