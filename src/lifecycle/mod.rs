//! Process lifecycle for the servlet host.
//!
//! # Data Flow
//! ```text
//! startup.rs:
//!     CLI options → load + override + validate config → logging/metrics
//!         → HttpServer (builds Host) → bind → serve
//!
//! signals.rs:
//!     ctrl-c / SIGTERM → Shutdown::trigger
//!
//! shutdown.rs:
//!     broadcast → axum graceful shutdown → in-flight requests finish → exit
//! ```
//!
//! # Design Decisions
//! - A bad config file stops startup; a bad reloaded config keeps the
//!   running pipeline
//! - The listener binds only after the pipeline has been built

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
