//! Error taxonomy shared by every stage of the request pipeline.
//!
//! # Propagation
//! - Pattern matching and mapping resolution fail fast with structured errors
//! - Filters and servlets return `ServletError`; the chain never swallows them
//! - The host is the single place that turns an error into a response

use thiserror::Error;

use crate::registry::RegistryError;

/// Boxed error raised from inside a filter or servlet body.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced while processing a request.
#[derive(Debug, Error)]
pub enum ServletError {
    /// No servlet mapping matched the request path.
    #[error("no servlet is mapped to {path}")]
    NoHandlerAvailable { path: String },

    /// A forwarded or included resource could not be located.
    #[error("resource {path} is currently unavailable")]
    ResourceUnavailable { path: String },

    /// Operation not permitted in the current response state.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// A filter or servlet body failed.
    #[error("{0}")]
    Failure(BoxError),

    /// A named servlet or filter constructor is not registered.
    #[error(transparent)]
    NotFound(#[from] RegistryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServletError {
    /// Wrap an arbitrary message as a filter/servlet failure.
    pub fn failure(message: impl Into<String>) -> Self {
        ServletError::Failure(message.into().into())
    }

    /// HTTP status used when the host converts this error into a response.
    pub fn status_code(&self) -> u16 {
        match self {
            ServletError::NoHandlerAvailable { .. } | ServletError::ResourceUnavailable { .. } => 503,
            _ => 500,
        }
    }

    /// Stable type name, exposed to error pages through the
    /// exception-type request attribute.
    pub fn kind(&self) -> &'static str {
        match self {
            ServletError::NoHandlerAvailable { .. } => "NoHandlerAvailable",
            ServletError::ResourceUnavailable { .. } => "ResourceUnavailable",
            ServletError::IllegalState(_) => "IllegalState",
            ServletError::Failure(_) => "FilterOrHandlerFailure",
            ServletError::NotFound(_) => "NotFound",
            ServletError::Io(_) => "Io",
        }
    }
}
