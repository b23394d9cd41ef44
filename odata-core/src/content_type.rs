//! Concrete content types.
//!
//! A [`ContentType`] is the representation the server commits to: a concrete
//! `type/subtype` (no wildcards) plus an ordered parameter list. It is what
//! negotiation produces and what the writer layer consumes.
//!
//! # Examples
//!
//! ```
//! use odata_core::content_type::ContentType;
//!
//! let ct = ContentType::parse("application/json;odata.metadata=minimal").unwrap();
//! assert_eq!(ct.subtype(), "json");
//! assert_eq!(ct.parameter("ODATA.METADATA"), Some("minimal"));
//! assert_eq!(ct, ContentType::json_minimal());
//!
//! assert!(ContentType::parse("application/*").is_err());
//! ```

use crate::error::{Error, Result};
use crate::media_range::MediaRange;
use crate::parameters::{is_token, split_unquoted, values_equal, Parameters};
use http::HeaderValue;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Parameter carrying the JSON metadata level.
pub const ODATA_METADATA: &str = "odata.metadata";

/// Parameter carrying the character set.
pub const CHARSET: &str = "charset";

/// A concrete media type with ordered parameters.
///
/// Equality ignores ASCII case on type and subtype, and compares parameters
/// by key and value regardless of their order.
#[derive(Debug, Clone)]
pub struct ContentType {
    type_: String,
    subtype: String,
    parameters: Parameters,
}

impl ContentType {
    /// Create a content type without parameters.
    pub fn new(type_: impl Into<String>, subtype: impl Into<String>) -> Result<Self> {
        Self::create(type_, subtype, Parameters::new())
    }

    /// Create a content type from its parts.
    ///
    /// Fails with [`Error::MalformedContentType`] if the type or subtype is
    /// empty or contains a wildcard, a `/` or inner whitespace.
    pub fn create(
        type_: impl Into<String>,
        subtype: impl Into<String>,
        parameters: Parameters,
    ) -> Result<Self> {
        let type_ = type_.into().trim().to_string();
        let subtype = subtype.into().trim().to_string();

        if type_.is_empty() || subtype.is_empty() {
            return Err(Error::malformed(
                &format!("{}/{}", type_, subtype),
                "type and subtype must not be empty",
            ));
        }
        if type_.contains('*') || subtype.contains('*') {
            return Err(Error::malformed(
                &format!("{}/{}", type_, subtype),
                "wildcards are not allowed in a content type",
            ));
        }
        if type_.contains('/') || subtype.contains('/') {
            return Err(Error::malformed(
                &format!("{}/{}", type_, subtype),
                "more than one '/' in a content type",
            ));
        }
        if !is_token(&type_) || !is_token(&subtype) {
            return Err(Error::malformed(
                &format!("{}/{}", type_, subtype),
                "whitespace inside type or subtype",
            ));
        }

        Ok(Self {
            type_,
            subtype,
            parameters,
        })
    }

    /// Parse a content type string such as `application/json;charset=utf-8`.
    ///
    /// Uses the same tokenizing as Accept media ranges but rejects
    /// wildcards and the `q` parameter.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let mut parts = split_unquoted(s, ';').into_iter();

        let type_subtype = parts.next().unwrap_or_default().trim();
        let (type_, subtype) = type_subtype
            .split_once('/')
            .ok_or_else(|| Error::malformed(s, "missing '/' between type and subtype"))?;
        if type_subtype.contains(char::is_whitespace) {
            return Err(Error::malformed(s, "whitespace inside type or subtype"));
        }

        let mut parameters = Parameters::new();
        for param in parts {
            let param = param.trim();
            if param.is_empty() {
                continue;
            }
            let (key, value) = param
                .split_once('=')
                .ok_or_else(|| Error::malformed(s, "parameter without '='"))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(Error::malformed(s, "parameter with empty name"));
            }
            if key.eq_ignore_ascii_case("q") {
                return Err(Error::malformed(s, "quality parameter is not allowed"));
            }
            parameters.insert(key, value.trim());
        }

        Self::create(type_, subtype, parameters).map_err(|e| match e {
            Error::MalformedContentType { reason, .. } => Error::malformed(s, reason),
            other => other,
        })
    }

    fn well_known(type_: &str, subtype: &str) -> Self {
        Self {
            type_: type_.to_string(),
            subtype: subtype.to_string(),
            parameters: Parameters::new(),
        }
    }

    /// `application/json`
    pub fn application_json() -> Self {
        Self::well_known("application", "json")
    }

    /// `application/xml`
    pub fn application_xml() -> Self {
        Self::well_known("application", "xml")
    }

    /// `application/atom+xml`
    pub fn application_atom_xml() -> Self {
        Self::well_known("application", "atom+xml")
    }

    /// `text/plain`
    pub fn text_plain() -> Self {
        Self::well_known("text", "plain")
    }

    /// `application/octet-stream`
    pub fn octet_stream() -> Self {
        Self::well_known("application", "octet-stream")
    }

    /// `multipart/mixed`
    pub fn multipart_mixed() -> Self {
        Self::well_known("multipart", "mixed")
    }

    /// `application/json;odata.metadata=minimal`
    pub fn json_minimal() -> Self {
        Self::application_json().with_parameter(ODATA_METADATA, "minimal")
    }

    /// `application/json;odata.metadata=full`
    pub fn json_full() -> Self {
        Self::application_json().with_parameter(ODATA_METADATA, "full")
    }

    /// `application/json;odata.metadata=none`
    pub fn json_no_metadata() -> Self {
        Self::application_json().with_parameter(ODATA_METADATA, "none")
    }

    /// Return a copy with `key` set to `value`.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key, value);
        self
    }

    /// Same type and subtype with a different parameter list.
    pub(crate) fn with_parameters(&self, parameters: Parameters) -> Self {
        Self {
            type_: self.type_.clone(),
            subtype: self.subtype.clone(),
            parameters,
        }
    }

    pub fn type_(&self) -> &str {
        &self.type_
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Get a parameter value (key compared ignoring case).
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key)
    }

    /// `type/subtype` without parameters.
    pub fn mime_type(&self) -> String {
        format!("{}/{}", self.type_, self.subtype)
    }

    /// True if type and subtype are equal, ignoring parameters.
    pub fn is_compatible(&self, other: &ContentType) -> bool {
        self.type_.eq_ignore_ascii_case(&other.type_)
            && self.subtype.eq_ignore_ascii_case(&other.subtype)
    }

    /// Check whether this content type satisfies an Accept media range.
    ///
    /// Type and subtype are compared ignoring case, with `*` in the range
    /// matching anything. Every parameter on the range except `charset` must
    /// be present here with an equal value; parameters only present here do
    /// not matter. Any representation can be sent in the client's charset.
    pub fn matches(&self, range: &MediaRange) -> bool {
        let type_matches = range.is_any() || range.type_().eq_ignore_ascii_case(&self.type_);
        let subtype_matches =
            range.is_subtype_wildcard() || range.subtype().eq_ignore_ascii_case(&self.subtype);

        type_matches
            && subtype_matches
            && range
                .parameters()
                .iter()
                .filter(|(key, _)| !key.eq_ignore_ascii_case(CHARSET))
                .all(|(key, value)| {
                    self.parameters
                        .get(key)
                        .is_some_and(|v| values_equal(v, value))
                })
    }

    /// Canonical `type/subtype;k=v;...` rendering in insertion order.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Render as a response `Content-Type` header value.
    pub fn to_header_value(&self) -> Result<HeaderValue> {
        let rendered = self.render();
        HeaderValue::from_str(&rendered)
            .map_err(|_| Error::malformed(&rendered, "not a valid header value"))
    }
}

impl PartialEq for ContentType {
    fn eq(&self, other: &Self) -> bool {
        self.is_compatible(other) && self.parameters == other.parameters
    }
}

impl Eq for ContentType {}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}{}", self.type_, self.subtype, self.parameters)
    }
}

impl FromStr for ContentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ContentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContentType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ContentType::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let ct = ContentType::parse("application/xml").unwrap();
        assert_eq!(ct.type_(), "application");
        assert_eq!(ct.subtype(), "xml");
        assert!(ct.parameters().is_empty());
    }

    #[test]
    fn test_parse_with_parameters() {
        let ct = ContentType::parse(" application/json ; charset=UTF-8 ;odata.metadata=minimal ")
            .unwrap();
        assert_eq!(ct.parameter("charset"), Some("UTF-8"));
        assert_eq!(ct.render(), "application/json;charset=UTF-8;odata.metadata=minimal");
    }

    #[test]
    fn test_parse_quoted_parameter() {
        let ct = ContentType::parse(r#"multipart/mixed;boundary="a;b""#).unwrap();
        assert_eq!(ct.parameter("boundary"), Some(r#""a;b""#));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in [
            "",
            "application",
            "/json",
            "application/",
            "*/*",
            "application/*",
            "application/json;q=0.5",
            "application/json;charset",
            "application/json;=x",
            "application/json/x",
            "app lication/json",
            "text/ html",
            "text /html",
            "application/js on;charset=utf-8",
        ] {
            assert!(
                matches!(
                    ContentType::parse(input),
                    Err(Error::MalformedContentType { .. })
                ),
                "expected failure for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_create_rejects_wildcard() {
        assert!(ContentType::new("*", "json").is_err());
        assert!(ContentType::new("application", "").is_err());
        assert!(ContentType::new("a", "b").is_ok());
    }

    #[test]
    fn test_equality() {
        let a = ContentType::parse("Application/JSON;x=1;y=2").unwrap();
        let b = ContentType::parse("application/json;y=2;X=1").unwrap();
        let c = ContentType::parse("application/json;x=1").unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.is_compatible(&c));
    }

    #[test]
    fn test_render_keeps_insertion_order() {
        let ct = ContentType::text_plain()
            .with_parameter("b", "2")
            .with_parameter("a", "1");
        assert_eq!(ct.render(), "text/plain;b=2;a=1");
        assert_eq!(ct.mime_type(), "text/plain");
    }

    #[test]
    fn test_matches_wildcards() {
        let ct = ContentType::json_minimal();

        assert!(ct.matches(&MediaRange::parse("*/*").unwrap()));
        assert!(ct.matches(&MediaRange::parse("application/*").unwrap()));
        assert!(ct.matches(&MediaRange::parse("APPLICATION/Json").unwrap()));
        assert!(!ct.matches(&MediaRange::parse("text/*").unwrap()));
        assert!(!ct.matches(&MediaRange::parse("application/xml").unwrap()));
    }

    #[test]
    fn test_matches_parameters() {
        let ct = ContentType::json_minimal();

        assert!(ct.matches(&MediaRange::parse("application/json;q=0.2").unwrap()));
        assert!(ct.matches(&MediaRange::parse("application/json;odata.metadata=minimal").unwrap()));
        assert!(!ct.matches(&MediaRange::parse("application/json;odata.metadata=full").unwrap()));
        assert!(ct.matches(&MediaRange::parse("application/json;charset=utf-8").unwrap()));
        assert!(ct.matches(&MediaRange::parse("*/*;CHARSET=iso-8859-1").unwrap()));
    }

    #[test]
    fn test_create_rejects_inner_whitespace() {
        assert!(ContentType::new(" text ", " csv ").is_ok());
        assert!(matches!(
            ContentType::new("te xt", "csv"),
            Err(Error::MalformedContentType { .. })
        ));
    }

    #[test]
    fn test_matches_quoted_parameter_values() {
        let ct = ContentType::json_minimal();
        assert!(ct.matches(&MediaRange::parse(r#"application/json;odata.metadata="minimal""#).unwrap()));
        assert!(!ct.matches(&MediaRange::parse(r#"application/json;odata.metadata="full""#).unwrap()));
    }

    #[test]
    fn test_header_value() {
        let value = ContentType::json_minimal().to_header_value().unwrap();
        assert_eq!(value, "application/json;odata.metadata=minimal");
    }

    #[test]
    fn test_serde_as_string() {
        let ct = ContentType::json_full();
        let json = serde_json::to_string(&ct).unwrap();
        assert_eq!(json, r#""application/json;odata.metadata=full""#);

        let back: ContentType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ct);

        let bad: std::result::Result<ContentType, _> = serde_json::from_str(r#""*/*""#);
        assert!(bad.is_err());
    }
}
