// Error types for content negotiation

use crate::{ContentType, ResourceKind};
use http::StatusCode;
use std::fmt::Display;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A content type string could not be parsed or constructed.
    #[error("Malformed content type '{value}': {reason}")]
    MalformedContentType { value: String, reason: &'static str },

    /// The `$format` token did not resolve to any supported content type.
    #[error("Unsupported $format option '{format}' for {kind}")]
    UnsupportedFormatOption { format: String, kind: ResourceKind },

    /// None of the requested media ranges matched a supported content type.
    #[error(
        "Unsupported content type: requested [{}], supported [{}]",
        render_list(.requested),
        render_list(.supported)
    )]
    UnsupportedContentType {
        requested: Vec<String>,
        supported: Vec<ContentType>,
    },
}

impl Error {
    pub(crate) fn malformed(value: &str, reason: &'static str) -> Self {
        Error::MalformedContentType {
            value: value.to_string(),
            reason,
        }
    }

    /// Get the HTTP status code the transport layer should answer with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MalformedContentType { .. } => StatusCode::BAD_REQUEST,
            Error::UnsupportedFormatOption { .. } => StatusCode::BAD_REQUEST,
            Error::UnsupportedContentType { .. } => StatusCode::NOT_ACCEPTABLE,
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

fn render_list<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, Error>;
