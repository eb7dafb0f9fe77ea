//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → router.rs (collect candidate patterns, pick the winner)
//!     → matcher.rs (classify and evaluate each pattern)
//!     → Return: ResolvedMapping (servlet, servlet path, path info)
//!               or NoHandlerAvailable
//!
//! Router compilation (at startup / reload):
//!     ServletDef[] (declaration order)
//!     → ServletMapping[]
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Mappings built once per configuration, immutable at runtime
//! - No regex in hot path (prefix and suffix comparisons only)
//! - Deterministic: same input always resolves to the same servlet
//! - The same matcher drives filter selection, with exact patterns enabled

pub mod matcher;
pub mod router;

pub use matcher::{is_valid_pattern, matches, PatternKind};
pub use router::{ResolvedMapping, Router, ServletMapping};
