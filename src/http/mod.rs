//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, body buffering)
//!     → request.rs (pipeline view of the request)
//!     → [application::Host runs filters and servlet]
//!     → response.rs (buffered output, committed/error state)
//!     → Send to client
//! ```

pub mod attributes;
pub mod request;
pub mod response;
pub mod server;

pub use request::Request;
pub use response::Response;
pub use server::HttpServer;
