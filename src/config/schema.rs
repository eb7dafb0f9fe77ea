//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the servlet
//! host. All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the servlet host.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// The hosted web application.
    pub application: ApplicationConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A web application: its resources, servlets, filters and error pages.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Directory resources are resolved against. Relative paths are taken
    /// relative to the config file.
    pub base_path: PathBuf,

    /// Flush every write straight to the client instead of buffering.
    pub autoflush: bool,

    /// Largest request body accepted by the HTTP front-end.
    pub max_body_bytes: usize,

    /// Application-wide init parameters.
    pub context_params: BTreeMap<String, String>,

    /// Servlets in declaration order.
    pub servlets: Vec<ServletDef>,

    /// Filter definitions.
    pub filters: Vec<FilterDef>,

    /// Filter mappings in declaration order.
    pub filter_mappings: Vec<FilterMappingDef>,

    pub error_pages: Vec<ErrorPageDef>,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            autoflush: false,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
            context_params: BTreeMap::new(),
            servlets: Vec::new(),
            filters: Vec::new(),
            filter_mappings: Vec::new(),
            error_pages: Vec::new(),
        }
    }
}

/// Servlet declaration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServletDef {
    /// Unique servlet name.
    pub name: String,

    /// Registry class name of the implementation.
    pub class: String,

    #[serde(default)]
    pub url_patterns: Vec<String>,

    #[serde(default)]
    pub init_params: BTreeMap<String, String>,
}

/// Filter declaration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterDef {
    /// Unique filter name.
    pub name: String,

    /// Registry class name of the implementation.
    pub class: String,

    #[serde(default)]
    pub init_params: BTreeMap<String, String>,
}

/// Filter mapping as written in the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterMappingDef {
    pub filter_name: String,

    #[serde(default)]
    pub url_patterns: Vec<String>,

    /// Servlet names; `*` selects every servlet.
    #[serde(default)]
    pub servlet_names: Vec<String>,

    /// Dispatch types (`REQUEST`, `FORWARD`, `INCLUDE`, `ERROR`).
    /// Empty means `REQUEST`.
    #[serde(default)]
    pub dispatchers: Vec<String>,
}

/// Error page declaration keyed by status code or exception type.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorPageDef {
    #[serde(default)]
    pub error_code: Option<u16>,

    #[serde(default)]
    pub exception_type: Option<String>,

    /// Resource location, relative to the application base path.
    pub location: String,
}
