//! Accept header parsing.
//!
//! Turns raw `Accept` header values into weighted [`MediaRange`]s ordered by
//! preference:
//!
//! 1. quality (`q`) descending,
//! 2. specificity descending (`a/b` before `a/*` before `*/*`),
//! 3. original left-to-right position across all header values.
//!
//! Malformed ranges are dropped rather than failing the request.
//!
//! # Examples
//!
//! ```
//! use odata_core::media_range::Accept;
//!
//! let accept = Accept::parse("*/*;q=0.1, application/xml;q=0.9, application/json");
//! let order: Vec<String> = accept.iter().map(|r| r.to_string()).collect();
//! assert_eq!(order, vec!["application/json", "application/xml;q=0.9", "*/*;q=0.1"]);
//! ```

use crate::parameters::{is_token, split_unquoted, Parameters};
use http::header::{HeaderMap, ACCEPT};
use std::cmp::Ordering;
use std::fmt;

/// Smallest weight a range can carry; `q=0` and below clamp to this.
pub const MIN_QUALITY: f32 = 0.001;

/// A single weighted media range from an Accept header.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    type_: String,
    subtype: String,
    parameters: Parameters,
    quality: f32,
    source_order: usize,
}

impl MediaRange {
    /// Parse one media range, e.g. `application/json;odata.metadata=full;q=0.8`.
    ///
    /// Returns `None` for ranges without a `/`, with an empty type or
    /// subtype, or with a wildcard type but concrete subtype (`*/json`).
    pub fn parse(s: &str) -> Option<Self> {
        Self::parse_at(s, 0)
    }

    fn parse_at(s: &str, source_order: usize) -> Option<Self> {
        let mut parts = split_unquoted(s.trim(), ';').into_iter();

        let (type_, subtype) = parts.next()?.trim().split_once('/')?;

        if !is_token_or_wildcard(type_) || !is_token_or_wildcard(subtype) {
            return None;
        }
        if type_ == "*" && subtype != "*" {
            return None;
        }

        let mut parameters = Parameters::new();
        let mut quality = 1.0;
        for param in parts {
            let Some((key, value)) = param.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            if key.is_empty() {
                continue;
            }
            if key.eq_ignore_ascii_case("q") {
                quality = parse_quality(value);
            } else {
                parameters.insert(key, value);
            }
        }

        Some(Self {
            type_: type_.to_string(),
            subtype: subtype.to_string(),
            parameters,
            quality,
            source_order,
        })
    }

    pub fn type_(&self) -> &str {
        &self.type_
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// Parameters other than `q`, in header order.
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Weight in `(0, 1]`.
    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// Position among all ranges of the request, left to right.
    pub fn source_order(&self) -> usize {
        self.source_order
    }

    /// `*/*`
    pub fn is_any(&self) -> bool {
        self.type_ == "*"
    }

    /// `type/*` (also true for `*/*`)
    pub fn is_subtype_wildcard(&self) -> bool {
        self.subtype == "*"
    }

    /// 3 for `type/subtype`, 2 for `type/*`, 0 for `*/*`.
    pub fn specificity(&self) -> u8 {
        let mut score = 0u8;
        if self.type_ != "*" {
            score += 2;
        }
        if self.subtype != "*" {
            score += 1;
        }
        score
    }

    fn preference_cmp(&self, other: &Self) -> Ordering {
        other
            .quality
            .total_cmp(&self.quality)
            .then_with(|| other.specificity().cmp(&self.specificity()))
            .then_with(|| self.source_order.cmp(&other.source_order))
    }
}

impl fmt::Display for MediaRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}{}", self.type_, self.subtype, self.parameters)?;
        if self.quality < 1.0 {
            write!(f, ";q={}", self.quality)?;
        }
        Ok(())
    }
}

fn is_token_or_wildcard(s: &str) -> bool {
    s == "*" || is_token(s)
}

fn parse_quality(value: &str) -> f32 {
    match value.parse::<f32>() {
        Ok(q) if q.is_nan() => 1.0,
        Ok(q) if q > 1.0 => 1.0,
        Ok(q) if q <= 0.0 => MIN_QUALITY,
        Ok(q) => q,
        Err(_) => 1.0,
    }
}

/// A parsed set of Accept header values, in preference order.
#[derive(Debug, Clone, Default)]
pub struct Accept {
    ranges: Vec<MediaRange>,
}

impl Accept {
    /// Parse a single Accept header value.
    pub fn parse(header: &str) -> Self {
        Self::parse_all([header])
    }

    /// Parse every Accept header instance of a request.
    ///
    /// Source order runs left to right across all values, so a range in the
    /// first header instance wins a full tie against one in the second.
    pub fn parse_all<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ranges = Vec::new();
        for value in values {
            for item in split_unquoted(value.as_ref(), ',') {
                if item.trim().is_empty() {
                    continue;
                }
                if let Some(range) = MediaRange::parse_at(item, ranges.len()) {
                    ranges.push(range);
                }
            }
        }

        ranges.sort_by(MediaRange::preference_cmp);

        Self { ranges }
    }

    /// Parse the Accept headers of a request.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::parse_all(accept_values(headers))
    }

    pub fn ranges(&self) -> &[MediaRange] {
        &self.ranges
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MediaRange> {
        self.ranges.iter()
    }

    /// No usable range: the client accepts anything.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// The most preferred range.
    pub fn preferred(&self) -> Option<&MediaRange> {
        self.ranges.first()
    }
}

impl<'a> IntoIterator for &'a Accept {
    type Item = &'a MediaRange;
    type IntoIter = std::slice::Iter<'a, MediaRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Collect the raw values of every `Accept` header, in order.
///
/// Values that are not visible ASCII are skipped.
pub fn accept_values(headers: &HeaderMap) -> Vec<&str> {
    headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect()
}
