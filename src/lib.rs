//! Servlet-style request pipeline host.
//!
//! Requests are mapped to servlets by URL pattern, pass through an ordered
//! chain of filters, may forward to or include application resources, and
//! have error responses rendered through configured or built-in error pages.

// Request pipeline
pub mod application;
pub mod filter;
pub mod routing;
pub mod servlet;

// Core types
pub mod error;
pub mod http;
pub mod registry;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use application::{Context, Host};
pub use config::schema::ServerConfig;
pub use error::ServletError;
pub use http::{HttpServer, Request, Response};
pub use lifecycle::Shutdown;
pub use registry::Registry;
