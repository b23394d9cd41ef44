// Core library for OData content negotiation
// Media range parsing, content types, $format aliases and representation selection

pub mod content_negotiation;
pub mod content_type;
pub mod error;
pub mod format;
pub mod media_range;
pub mod parameters;
pub mod resource_kind;

// Re-export commonly used types
pub use content_negotiation::{
    check_support, content_types_fn, negotiate, ContentNegotiator, CustomContentTypeSupport,
    NoCustomContentTypes,
};
pub use content_type::ContentType;
pub use error::{Error, Result};
pub use format::{FormatAliasResolver, FormatContentTypeMapping};
pub use media_range::{accept_values, Accept, MediaRange};
pub use parameters::Parameters;
pub use resource_kind::ResourceKind;
