//! Content negotiation for OData requests.
//!
//! Picks exactly one [`ContentType`] for a response from:
//!
//! - the built-in representations of the request's [`ResourceKind`],
//! - aliases contributed by the handler through [`CustomContentTypeSupport`],
//! - the client's `$format` query option or, failing that, its `Accept`
//!   header(s).
//!
//! `$format` is authoritative: when present the Accept header is not looked
//! at. Without `$format`, Accept ranges are tried in preference order and
//! each is checked against the supported list in declaration order.
//!
//! # Examples
//!
//! ```
//! use odata_core::content_negotiation::{negotiate, NoCustomContentTypes};
//! use odata_core::{ContentType, ResourceKind};
//!
//! // No preference: primary default
//! let ct = negotiate(ResourceKind::Metadata, None, &[], &NoCustomContentTypes).unwrap();
//! assert_eq!(ct, ContentType::application_xml());
//!
//! // Client parameters survive in the answer
//! let ct = negotiate(
//!     ResourceKind::ServiceDocument,
//!     None,
//!     &["application/json;charset=UTF-8;odata.metadata=minimal"],
//!     &NoCustomContentTypes,
//! )
//! .unwrap();
//! assert_eq!(ct.render(), "application/json;charset=UTF-8;odata.metadata=minimal");
//! ```

use crate::content_type::ContentType;
use crate::error::{Error, Result};
use crate::format::{FormatAliasResolver, FormatContentTypeMapping};
use crate::media_range::{Accept, MediaRange};
use crate::parameters::Parameters;
use crate::resource_kind::ResourceKind;
use http::HeaderMap;
use odata_log::{debug, warn};

const LOG_TARGET: &str = "odata::negotiation";

// ============================================================================
// Capability Hook
// ============================================================================

/// Lets a handler extend the representations it can produce.
///
/// Called once per negotiation with the built-in mappings of the resource
/// kind. Implementations append their own entries and return the list;
/// they must not remove the built-ins.
pub trait CustomContentTypeSupport {
    fn modify_supported_content_types(
        &self,
        supported: Vec<FormatContentTypeMapping>,
        kind: ResourceKind,
    ) -> Vec<FormatContentTypeMapping>;
}

/// A handler with no custom representations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCustomContentTypes;

impl CustomContentTypeSupport for NoCustomContentTypes {
    fn modify_supported_content_types(
        &self,
        supported: Vec<FormatContentTypeMapping>,
        _kind: ResourceKind,
    ) -> Vec<FormatContentTypeMapping> {
        supported
    }
}

/// A fixed list of mappings appended for every resource kind.
impl CustomContentTypeSupport for [FormatContentTypeMapping] {
    fn modify_supported_content_types(
        &self,
        mut supported: Vec<FormatContentTypeMapping>,
        _kind: ResourceKind,
    ) -> Vec<FormatContentTypeMapping> {
        supported.extend_from_slice(self);
        supported
    }
}

impl CustomContentTypeSupport for Vec<FormatContentTypeMapping> {
    fn modify_supported_content_types(
        &self,
        supported: Vec<FormatContentTypeMapping>,
        kind: ResourceKind,
    ) -> Vec<FormatContentTypeMapping> {
        self.as_slice().modify_supported_content_types(supported, kind)
    }
}

/// Hook backed by a closure, see [`content_types_fn`].
#[derive(Clone, Copy)]
pub struct FnContentTypeSupport<F>(F);

/// Build a [`CustomContentTypeSupport`] from a closure.
///
/// ```
/// use odata_core::content_negotiation::{content_types_fn, negotiate};
/// use odata_core::{FormatContentTypeMapping, ResourceKind};
///
/// let hook = content_types_fn(|mut supported: Vec<FormatContentTypeMapping>, kind| {
///     if kind == ResourceKind::EntityCollection {
///         supported.push(FormatContentTypeMapping::parse("csv", "text/csv").unwrap());
///     }
///     supported
/// });
///
/// let ct = negotiate(ResourceKind::EntityCollection, Some("csv"), &[], &hook).unwrap();
/// assert_eq!(ct.render(), "text/csv");
/// assert!(negotiate(ResourceKind::Entity, Some("csv"), &[], &hook).is_err());
/// ```
pub fn content_types_fn<F>(f: F) -> FnContentTypeSupport<F>
where
    F: Fn(Vec<FormatContentTypeMapping>, ResourceKind) -> Vec<FormatContentTypeMapping>,
{
    FnContentTypeSupport(f)
}

impl<F> CustomContentTypeSupport for FnContentTypeSupport<F>
where
    F: Fn(Vec<FormatContentTypeMapping>, ResourceKind) -> Vec<FormatContentTypeMapping>,
{
    fn modify_supported_content_types(
        &self,
        supported: Vec<FormatContentTypeMapping>,
        kind: ResourceKind,
    ) -> Vec<FormatContentTypeMapping> {
        (self.0)(supported, kind)
    }
}

// ============================================================================
// Negotiator
// ============================================================================

/// Negotiates representations for one resource kind and handler.
///
/// Holds no state beyond its inputs; every call recomputes the supported
/// list, so a negotiator may be shared freely between threads when the
/// hook allows it.
pub struct ContentNegotiator<'a, H: ?Sized> {
    kind: ResourceKind,
    hook: &'a H,
}

impl<'a, H> ContentNegotiator<'a, H>
where
    H: CustomContentTypeSupport + ?Sized,
{
    pub fn new(kind: ResourceKind, hook: &'a H) -> Self {
        Self { kind, hook }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Built-in mappings followed by the handler's, in declaration order.
    ///
    /// If the hook drops or reorders the built-ins they are put back in
    /// front of whatever it returned.
    pub fn supported(&self) -> Vec<FormatContentTypeMapping> {
        let defaults = self.kind.default_mappings();
        let extended = self
            .hook
            .modify_supported_content_types(defaults.to_vec(), self.kind);

        if extended.starts_with(defaults) {
            return extended;
        }

        warn!(
            target: LOG_TARGET,
            "content type hook for {} removed built-in mappings; restoring them",
            self.kind
        );
        defaults.iter().cloned().chain(extended).collect()
    }

    /// Negotiate from a `$format` token and raw Accept header values.
    pub fn negotiate(&self, format: Option<&str>, accept: &[&str]) -> Result<ContentType> {
        let supported = self.supported();

        if let Some(token) = format.map(str::trim).filter(|t| !t.is_empty()) {
            return self.resolve_format(token, &supported);
        }

        self.select(&supported, &Accept::parse_all(accept.iter().copied()))
    }

    /// Negotiate from a `$format` token and an already parsed Accept header.
    pub fn negotiate_accept(&self, format: Option<&str>, accept: &Accept) -> Result<ContentType> {
        let supported = self.supported();

        if let Some(token) = format.map(str::trim).filter(|t| !t.is_empty()) {
            return self.resolve_format(token, &supported);
        }

        self.select(&supported, accept)
    }

    /// Negotiate from a `$format` token and the request's headers.
    pub fn negotiate_headers(
        &self,
        format: Option<&str>,
        headers: &HeaderMap,
    ) -> Result<ContentType> {
        self.negotiate_accept(format, &Accept::from_headers(headers))
    }

    /// Check that a request body content type is one this handler consumes.
    ///
    /// Only type and subtype are compared; parameters such as `charset` do
    /// not matter.
    pub fn check_support(&self, content_type: &ContentType) -> Result<()> {
        let supported = self.supported();

        if supported
            .iter()
            .any(|mapping| mapping.content_type().is_compatible(content_type))
        {
            return Ok(());
        }

        debug!(
            target: LOG_TARGET,
            "request content type {} not supported for {}", content_type, self.kind
        );
        Err(Error::UnsupportedContentType {
            requested: vec![content_type.render()],
            supported: content_types(&supported),
        })
    }

    fn resolve_format(
        &self,
        token: &str,
        supported: &[FormatContentTypeMapping],
    ) -> Result<ContentType> {
        let resolved = FormatAliasResolver::new(self.kind, supported).resolve(token);
        match &resolved {
            Ok(ct) => debug!(
                target: LOG_TARGET,
                "$format '{}' resolved to {} for {}", token, ct, self.kind
            ),
            Err(e) => debug!(target: LOG_TARGET, "$format rejected: {}", e),
        }
        resolved
    }

    fn select(&self, supported: &[FormatContentTypeMapping], accept: &Accept) -> Result<ContentType> {
        if accept.is_empty() {
            let primary = supported
                .first()
                .map(|mapping| mapping.content_type().clone())
                .unwrap_or_else(|| self.kind.primary_default().clone());
            debug!(
                target: LOG_TARGET,
                "no Accept preference, using {} for {}", primary, self.kind
            );
            return Ok(primary);
        }

        for range in accept {
            if let Some(mapping) = supported
                .iter()
                .find(|mapping| mapping.content_type().matches(range))
            {
                let chosen = overlay(mapping.content_type(), range);
                debug!(
                    target: LOG_TARGET,
                    "Accept range {} selected {} for {}", range, chosen, self.kind
                );
                return Ok(chosen);
            }
        }

        debug!(
            target: LOG_TARGET,
            "no Accept range matched for {}", self.kind
        );
        Err(Error::UnsupportedContentType {
            requested: accept.iter().map(ToString::to_string).collect(),
            supported: content_types(supported),
        })
    }
}

/// The answer keeps the client's parameters verbatim, in the client's order,
/// followed by any parameters only the supported type carries.
fn overlay(supported: &ContentType, range: &MediaRange) -> ContentType {
    let mut parameters: Parameters = range.parameters().iter().collect();
    for (key, value) in supported.parameters().iter() {
        if !parameters.contains_key(key) {
            parameters.insert(key, value);
        }
    }
    supported.with_parameters(parameters)
}

fn content_types(mappings: &[FormatContentTypeMapping]) -> Vec<ContentType> {
    mappings
        .iter()
        .map(|mapping| mapping.content_type().clone())
        .collect()
}

/// Negotiate the response content type for one request.
///
/// Convenience wrapper around [`ContentNegotiator::negotiate`].
pub fn negotiate<H>(
    kind: ResourceKind,
    format: Option<&str>,
    accept: &[&str],
    hook: &H,
) -> Result<ContentType>
where
    H: CustomContentTypeSupport + ?Sized,
{
    ContentNegotiator::new(kind, hook).negotiate(format, accept)
}

/// Check a request body content type, see [`ContentNegotiator::check_support`].
pub fn check_support<H>(content_type: &ContentType, kind: ResourceKind, hook: &H) -> Result<()>
where
    H: CustomContentTypeSupport + ?Sized,
{
    ContentNegotiator::new(kind, hook).check_support(content_type)
}

// ============================================================================
// Tests
// ============================================================================
