//! Application subsystem: the per-request pipeline.
//!
//! # Data Flow
//! ```text
//! Request
//!     → host.rs (filter start, mapping resolution, servlet init)
//!     → filter chain → servlet
//!         ↘ dispatcher.rs (forward / include a resource)
//!             → render.rs (placeholder expansion, buffered or streamed)
//!             → error_page.rs (after forward)
//!     → error_page.rs (error-flagged or failed responses)
//!     → filter stop, flush
//!     → Response
//! ```
//!
//! # Design Decisions
//! - One `Context` per application, owned by its `Host`
//! - Request attributes are the only channel between the dispatcher, the
//!   error page resolver and the host
//! - Failures propagate as `ServletError` until the host converts them

pub mod context;
pub mod dispatcher;
pub mod error_page;
pub mod host;
pub(crate) mod render;

pub use context::Context;
pub use dispatcher::RequestDispatcher;
pub use error_page::ErrorPageResolver;
pub use host::Host;
