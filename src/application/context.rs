//! The application context.
//!
//! # Responsibilities
//! - Own the compiled configuration of one web application: servlet
//!   mappings, filter definitions and mappings, error pages
//! - Own the filter configs (and their lazily created instances) between
//!   `filter_start` and `filter_stop`
//! - Resolve request URIs to files under the base path
//! - Hand out request dispatchers
//!
//! # Design Decisions
//! - Built from a validated `ApplicationConfig`; immutable apart from the
//!   filter start/stop bracket
//! - Resource paths never escape the base path: `.` and `..` segments are
//!   dropped

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::dispatcher::RequestDispatcher;
use crate::config::loader::ConfigError;
use crate::config::schema::{ApplicationConfig, ErrorPageDef, FilterDef, ServletDef};
use crate::config::validation::validate_application;
use crate::filter::config::{FilterConfig, FilterMap};
use crate::registry::Registry;
use crate::routing::router::{Router, ServletMapping};

/// A configured web application.
#[derive(Debug)]
pub struct Context {
    base_path: PathBuf,
    autoflush: bool,
    init_params: BTreeMap<String, String>,
    registry: Arc<Registry>,
    router: Router,
    servlets: Vec<ServletDef>,
    filter_defs: Vec<FilterDef>,
    filter_maps: Vec<FilterMap>,
    filter_configs: BTreeMap<String, FilterConfig>,
    error_pages: Vec<ErrorPageDef>,
}

impl Context {
    /// Validate `config` and compile it into a context.
    pub fn from_config(config: &ApplicationConfig, registry: Arc<Registry>) -> Result<Self, ConfigError> {
        validate_application(config).map_err(ConfigError::Validation)?;

        let mut filter_maps = Vec::with_capacity(config.filter_mappings.len());
        for def in &config.filter_mappings {
            // Dispatcher names were checked by validation.
            if let Ok(map) = FilterMap::from_def(def) {
                filter_maps.push(map);
            }
        }

        for servlet in &config.servlets {
            if !registry.has_servlet(&servlet.class) {
                tracing::warn!(servlet = %servlet.name, class = %servlet.class, "Servlet class is not registered");
            }
        }
        for filter in &config.filters {
            if !registry.has_filter(&filter.class) {
                tracing::warn!(filter = %filter.name, class = %filter.class, "Filter class is not registered");
            }
        }

        let router = Router::new(
            config
                .servlets
                .iter()
                .map(|servlet| ServletMapping {
                    servlet_name: servlet.name.clone(),
                    url_patterns: servlet.url_patterns.clone(),
                })
                .collect(),
        );

        Ok(Self {
            base_path: config.base_path.clone(),
            autoflush: config.autoflush,
            init_params: config.context_params.clone(),
            registry,
            router,
            servlets: config.servlets.clone(),
            filter_defs: config.filters.clone(),
            filter_maps,
            filter_configs: BTreeMap::new(),
            error_pages: config.error_pages.clone(),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn autoflush(&self) -> bool {
        self.autoflush
    }

    pub fn init_parameter(&self, name: &str) -> Option<&str> {
        self.init_params.get(name).map(String::as_str)
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn find_servlet(&self, name: &str) -> Option<&ServletDef> {
        self.servlets.iter().find(|servlet| servlet.name == name)
    }

    /// Filter mappings in declaration order.
    pub fn filter_maps(&self) -> &[FilterMap] {
        &self.filter_maps
    }

    /// Config of a started filter. `None` outside the start/stop bracket or
    /// when no filter of that name is defined.
    pub fn find_filter_config(&self, name: &str) -> Option<&FilterConfig> {
        self.filter_configs.get(name)
    }

    /// Create a config for every defined filter. Instances are created on
    /// first use by a chain.
    pub fn filter_start(&mut self) {
        for def in &self.filter_defs {
            if !self.filter_configs.contains_key(&def.name) {
                self.filter_configs.insert(
                    def.name.clone(),
                    FilterConfig::new(def.clone(), Arc::clone(&self.registry)),
                );
            }
        }
        tracing::trace!(filters = self.filter_configs.len(), "Filters started");
    }

    /// Release every filter instance and drop the configs.
    pub fn filter_stop(&mut self) {
        for config in self.filter_configs.values_mut() {
            config.release();
        }
        self.filter_configs.clear();
        tracing::trace!("Filters stopped");
    }

    /// Error page configured for an exact status code.
    pub fn find_error_page(&self, status: u16) -> Option<&ErrorPageDef> {
        self.error_pages
            .iter()
            .find(|page| page.error_code == Some(status))
    }

    /// Error page configured for an error kind (see `ServletError::kind`).
    pub fn find_exception_page(&self, kind: &str) -> Option<&ErrorPageDef> {
        self.error_pages
            .iter()
            .find(|page| page.exception_type.as_deref() == Some(kind))
    }

    /// File backing a request URI path.
    pub fn real_path(&self, uri_path: &str) -> PathBuf {
        resolve_under(&self.base_path, uri_path)
    }

    /// Dispatcher for a resource URI (path plus optional query string).
    pub fn request_dispatcher(&self, uri: &str) -> RequestDispatcher<'_> {
        RequestDispatcher::new(self, uri)
    }
}

/// Join a `/`-separated URI path onto `base`, dropping empty, `.` and `..`
/// segments.
pub(crate) fn resolve_under(base: &Path, uri_path: &str) -> PathBuf {
    uri_path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .fold(base.to_path_buf(), |path, segment| path.join(segment))
}
