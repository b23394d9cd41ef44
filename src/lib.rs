// OData content negotiation
//
// Decides which representation an OData service sends back for a request,
// from the `$format` query option, the Accept header and the formats each
// resource kind supports.

// Re-export core functionality
pub use odata_core::*;

// Logging macros and runtime controls
pub use odata_log;

// Declarative custom formats
#[cfg(feature = "config")]
pub use odata_config;

/// Prelude for handlers that negotiate a response
pub mod prelude {
    pub use odata_core::{
        check_support, negotiate, Accept, ContentNegotiator, ContentType,
        CustomContentTypeSupport, Error, FormatContentTypeMapping, NoCustomContentTypes,
        ResourceKind, Result,
    };

    #[cfg(feature = "config")]
    pub use odata_config::{FormatMappingEntry, NegotiationConfig};
}
