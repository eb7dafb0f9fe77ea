//! Servlets: the terminal handlers of the request pipeline.
//!
//! # Data Flow
//! ```text
//! Router → servlet name
//!     → Registry::create_servlet(class)
//!     → Servlet::init(ServletConfig)
//!     → [filter chain] → Servlet::service(context, request, response)
//!     → Servlet::destroy
//! ```
//!
//! # Design Decisions
//! - One fresh instance per request, initialised from its declaration
//! - `service` takes `&self`; per-request state belongs in request attributes
//! - HTTP method dispatch lives in `http.rs` as an opt-in adapter

pub mod file;
pub mod http;

use std::collections::BTreeMap;

use crate::application::Context;
use crate::config::schema::ServletDef;
use crate::error::ServletError;
use crate::http::{Request, Response};

/// A request handler.
pub trait Servlet: Send + Sync {
    fn init(&mut self, _config: &ServletConfig) -> Result<(), ServletError> {
        Ok(())
    }

    fn service(
        &self,
        context: &Context,
        request: &mut Request,
        response: &mut Response,
    ) -> Result<(), ServletError>;

    fn destroy(&mut self) {}
}

/// Per-servlet configuration handed to `Servlet::init`.
#[derive(Debug, Clone)]
pub struct ServletConfig {
    name: String,
    init_params: BTreeMap<String, String>,
    mapping: Option<String>,
}

impl ServletConfig {
    pub fn new(name: impl Into<String>, init_params: BTreeMap<String, String>) -> Self {
        Self {
            name: name.into(),
            init_params,
            mapping: None,
        }
    }

    /// Configuration for a declared servlet, selected through `mapping`.
    pub fn from_def(def: &ServletDef, mapping: Option<&str>) -> Self {
        Self {
            name: def.name.clone(),
            init_params: def.init_params.clone(),
            mapping: mapping.map(str::to_string),
        }
    }

    pub fn servlet_name(&self) -> &str {
        &self.name
    }

    pub fn init_parameter(&self, name: &str) -> Option<&str> {
        self.init_params.get(name).map(String::as_str)
    }

    pub fn init_parameter_names(&self) -> impl Iterator<Item = &str> {
        self.init_params.keys().map(String::as_str)
    }

    /// The URL pattern that selected this servlet, if any.
    pub fn mapping(&self) -> Option<&str> {
        self.mapping.as_deref()
    }
}
