//! Application descriptor: TOML schema, loading, validation and reload.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → application::Host built from its application section
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server swaps in a freshly built Host
//! ```
//!
//! # Design Decisions
//! - A loaded `ServerConfig` is never mutated; a reload builds a new Host
//! - Every section defaults, so an empty file is a valid (empty) application
//! - serde rejects malformed TOML; `validation` reports every semantic
//!   problem at once
//! - Servlets, filters and classes are referenced by name; the registry
//!   resolves class names at request time

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    ApplicationConfig, ErrorPageDef, FilterDef, FilterMappingDef, ServerConfig, ServletDef,
};
