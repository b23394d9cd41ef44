//! Resource kinds and their built-in representations.
//!
//! Routing classifies every request by what it returns. Each kind has a
//! fixed list of built-in `$format` aliases; the first entry is the kind's
//! primary default. The table is built once per process and never mutated.

use crate::content_type::ContentType;
use crate::format::FormatContentTypeMapping;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a request returns, as decided by routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// The service root document
    ServiceDocument,
    /// `$metadata`
    Metadata,
    /// A collection of entities
    EntityCollection,
    /// A single entity
    Entity,
    /// `$ref` on a collection
    ReferenceCollection,
    /// `$ref` on a single entity
    Reference,
    /// A primitive property
    Property,
    /// A collection of primitive values
    PropertyCollection,
    /// A complex property
    ComplexProperty,
    /// A collection of complex values
    ComplexCollection,
    /// The raw `$value` of a primitive property
    PropertyValue,
    /// The stream of a media entity
    MediaValue,
    /// `$count`
    Count,
    /// `$batch`
    Batch,
}

impl ResourceKind {
    /// Every kind, in table order.
    pub const ALL: [ResourceKind; 14] = [
        ResourceKind::ServiceDocument,
        ResourceKind::Metadata,
        ResourceKind::EntityCollection,
        ResourceKind::Entity,
        ResourceKind::ReferenceCollection,
        ResourceKind::Reference,
        ResourceKind::Property,
        ResourceKind::PropertyCollection,
        ResourceKind::ComplexProperty,
        ResourceKind::ComplexCollection,
        ResourceKind::PropertyValue,
        ResourceKind::MediaValue,
        ResourceKind::Count,
        ResourceKind::Batch,
    ];

    /// Stable snake-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::ServiceDocument => "service_document",
            ResourceKind::Metadata => "metadata",
            ResourceKind::EntityCollection => "entity_collection",
            ResourceKind::Entity => "entity",
            ResourceKind::ReferenceCollection => "reference_collection",
            ResourceKind::Reference => "reference",
            ResourceKind::Property => "property",
            ResourceKind::PropertyCollection => "property_collection",
            ResourceKind::ComplexProperty => "complex_property",
            ResourceKind::ComplexCollection => "complex_collection",
            ResourceKind::PropertyValue => "property_value",
            ResourceKind::MediaValue => "media_value",
            ResourceKind::Count => "count",
            ResourceKind::Batch => "batch",
        }
    }

    /// Built-in `$format` mappings for this kind. Never empty.
    pub fn default_mappings(self) -> &'static [FormatContentTypeMapping] {
        &BUILT_IN_MAPPINGS[self as usize]
    }

    /// The representation served when the client expresses no preference.
    pub fn primary_default(self) -> &'static ContentType {
        self.default_mappings()[0].content_type()
    }

    fn built_in(self) -> Vec<FormatContentTypeMapping> {
        match self {
            ResourceKind::Metadata => {
                vec![FormatContentTypeMapping::new("xml", ContentType::application_xml())]
            }
            ResourceKind::PropertyValue | ResourceKind::Count => {
                vec![FormatContentTypeMapping::new("text", ContentType::text_plain())]
            }
            ResourceKind::MediaValue => {
                vec![FormatContentTypeMapping::new("binary", ContentType::octet_stream())]
            }
            ResourceKind::Batch => vec![FormatContentTypeMapping::new(
                "multipart",
                ContentType::multipart_mixed(),
            )],
            _ => vec![FormatContentTypeMapping::new("json", ContentType::json_minimal())],
        }
    }
}

static BUILT_IN_MAPPINGS: Lazy<Vec<Vec<FormatContentTypeMapping>>> =
    Lazy::new(|| ResourceKind::ALL.iter().map(|kind| kind.built_in()).collect());

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
