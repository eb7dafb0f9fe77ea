//! Component registry: class name → constructor.
//!
//! Configuration refers to servlet and filter implementations by a class
//! name string. The registry is populated before the configuration is loaded
//! and resolves those names to constructors; an unknown name is a typed
//! `NotFound` error.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::filter::headers::HeaderFilter;
use crate::filter::logging::RequestLoggingFilter;
use crate::filter::Filter;
use crate::servlet::file::FileServlet;
use crate::servlet::http::{HttpServlet, HttpServletAdapter};
use crate::servlet::Servlet;

/// Constructor for a servlet implementation.
pub type ServletFactory = Arc<dyn Fn() -> Box<dyn Servlet> + Send + Sync>;

/// Constructor for a filter implementation.
pub type FilterFactory = Arc<dyn Fn() -> Box<dyn Filter> + Send + Sync>;

/// Which kind of component a lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Servlet,
    Filter,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Servlet => write!(f, "servlet"),
            ComponentKind::Filter => write!(f, "filter"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{kind} class not registered: {name}")]
    NotFound { kind: ComponentKind, name: String },
}

/// Registry mapping class names to constructors.
#[derive(Clone, Default)]
pub struct Registry {
    servlets: BTreeMap<String, ServletFactory>,
    filters: BTreeMap<String, FilterFactory>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in components:
    /// `file` servlet, `logging` and `headers` filters.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_http_servlet("file", FileServlet::default);
        registry.register_filter("logging", RequestLoggingFilter::default);
        registry.register_filter("headers", HeaderFilter::default);
        registry
    }

    pub fn register_servlet<S, F>(&mut self, class: impl Into<String>, factory: F) -> &mut Self
    where
        S: Servlet + 'static,
        F: Fn() -> S + Send + Sync + 'static,
    {
        self.servlets
            .insert(class.into(), Arc::new(move || Box::new(factory()) as Box<dyn Servlet>));
        self
    }

    /// Register an `HttpServlet`, wrapped in its method-dispatch adapter.
    pub fn register_http_servlet<S, F>(&mut self, class: impl Into<String>, factory: F) -> &mut Self
    where
        S: HttpServlet + 'static,
        F: Fn() -> S + Send + Sync + 'static,
    {
        self.register_servlet(class, move || HttpServletAdapter(factory()))
    }

    pub fn register_filter<T, F>(&mut self, class: impl Into<String>, factory: F) -> &mut Self
    where
        T: Filter + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.filters
            .insert(class.into(), Arc::new(move || Box::new(factory()) as Box<dyn Filter>));
        self
    }

    pub fn has_servlet(&self, class: &str) -> bool {
        self.servlets.contains_key(class)
    }

    pub fn has_filter(&self, class: &str) -> bool {
        self.filters.contains_key(class)
    }

    /// Instantiate a servlet by class name.
    pub fn create_servlet(&self, class: &str) -> Result<Box<dyn Servlet>, RegistryError> {
        self.servlets
            .get(class)
            .map(|factory| factory())
            .ok_or_else(|| RegistryError::NotFound {
                kind: ComponentKind::Servlet,
                name: class.to_string(),
            })
    }

    /// Instantiate a filter by class name.
    pub fn create_filter(&self, class: &str) -> Result<Box<dyn Filter>, RegistryError> {
        self.filters
            .get(class)
            .map(|factory| factory())
            .ok_or_else(|| RegistryError::NotFound {
                kind: ComponentKind::Filter,
                name: class.to_string(),
            })
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("servlets", &self.servlets.keys().collect::<Vec<_>>())
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .finish()
    }
}
