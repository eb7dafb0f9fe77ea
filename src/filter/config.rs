//! Filter declarations, mappings and lazily created instances.

use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use crate::config::schema::{FilterDef, FilterMappingDef};
use crate::error::ServletError;
use crate::filter::Filter;
use crate::registry::Registry;
use crate::routing::matcher::matches;

bitflags! {
    /// Dispatch types a filter mapping applies to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DispatcherTypes: u8 {
        const ERROR = 1;
        const FORWARD = 1 << 1;
        const INCLUDE = 1 << 2;
        const REQUEST = 1 << 3;
    }
}

impl DispatcherTypes {
    /// Parse dispatcher names (case-insensitive). An empty list means `REQUEST`.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self, String> {
        if names.is_empty() {
            return Ok(DispatcherTypes::REQUEST);
        }
        names.iter().try_fold(DispatcherTypes::empty(), |acc, name| {
            let name = name.as_ref();
            let flag = match name.to_ascii_uppercase().as_str() {
                "ERROR" => DispatcherTypes::ERROR,
                "FORWARD" => DispatcherTypes::FORWARD,
                "INCLUDE" => DispatcherTypes::INCLUDE,
                "REQUEST" => DispatcherTypes::REQUEST,
                _ => return Err(name.to_string()),
            };
            Ok(acc | flag)
        })
    }
}

impl Default for DispatcherTypes {
    fn default() -> Self {
        DispatcherTypes::REQUEST
    }
}

/// A filter mapping: which requests a named filter applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterMap {
    pub filter_name: String,
    pub url_patterns: Vec<String>,
    pub servlet_names: Vec<String>,
    pub dispatchers: DispatcherTypes,
}

impl FilterMap {
    pub fn new(filter_name: impl Into<String>) -> Self {
        Self {
            filter_name: filter_name.into(),
            url_patterns: Vec::new(),
            servlet_names: Vec::new(),
            dispatchers: DispatcherTypes::REQUEST,
        }
    }

    pub fn with_url_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.url_patterns.push(pattern.into());
        self
    }

    pub fn with_servlet_name(mut self, name: impl Into<String>) -> Self {
        self.servlet_names.push(name.into());
        self
    }

    pub fn with_dispatchers(mut self, dispatchers: DispatcherTypes) -> Self {
        self.dispatchers = dispatchers;
        self
    }

    /// Build from its config form. Unknown dispatcher names are returned as `Err`.
    pub fn from_def(def: &FilterMappingDef) -> Result<Self, String> {
        Ok(Self {
            filter_name: def.filter_name.clone(),
            url_patterns: def.url_patterns.clone(),
            servlet_names: def.servlet_names.clone(),
            dispatchers: DispatcherTypes::parse(&def.dispatchers)?,
        })
    }

    /// Whether any URL pattern of this mapping matches `path`.
    pub fn matches_url(&self, path: &str, case_sensitive: bool) -> bool {
        self.url_patterns
            .iter()
            .any(|pattern| matches(pattern, path, case_sensitive))
    }

    /// Whether this mapping names `servlet_name` (or `*`).
    pub fn matches_servlet(&self, servlet_name: &str) -> bool {
        self.servlet_names
            .iter()
            .any(|name| name == "*" || name == servlet_name)
    }

    pub fn applies_to(&self, dispatch: DispatcherTypes) -> bool {
        self.dispatchers.intersects(dispatch)
    }
}

/// Runtime configuration of one declared filter.
///
/// The filter instance is created and initialised on first use and lives
/// until `release`.
pub struct FilterConfig {
    def: FilterDef,
    registry: Arc<Registry>,
    instance: OnceCell<Arc<dyn Filter>>,
}

impl FilterConfig {
    pub fn new(def: FilterDef, registry: Arc<Registry>) -> Self {
        Self {
            def,
            registry,
            instance: OnceCell::new(),
        }
    }

    pub fn filter_name(&self) -> &str {
        &self.def.name
    }

    pub fn filter_class(&self) -> &str {
        &self.def.class
    }

    pub fn init_parameter(&self, name: &str) -> Option<&str> {
        self.def.init_params.get(name).map(String::as_str)
    }

    pub fn init_parameters(&self) -> &BTreeMap<String, String> {
        &self.def.init_params
    }

    /// Whether the instance has been created.
    pub fn is_instantiated(&self) -> bool {
        self.instance.get().is_some()
    }

    /// The filter instance, creating and initialising it on first call.
    pub fn filter(&self) -> Result<Arc<dyn Filter>, ServletError> {
        if let Some(filter) = self.instance.get() {
            return Ok(Arc::clone(filter));
        }

        let mut filter = self.registry.create_filter(&self.def.class)?;
        filter.init(self)?;
        tracing::debug!(filter = %self.def.name, class = %self.def.class, "Filter initialised");

        let filter: Arc<dyn Filter> = Arc::from(filter);
        let _ = self.instance.set(Arc::clone(&filter));
        Ok(filter)
    }

    /// Destroy the instance, if one was created.
    pub fn release(&mut self) {
        if let Some(filter) = self.instance.take() {
            filter.destroy();
            tracing::debug!(filter = %self.def.name, "Filter released");
        }
    }
}

impl fmt::Debug for FilterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterConfig")
            .field("name", &self.def.name)
            .field("class", &self.def.class)
            .field("instantiated", &self.is_instantiated())
            .finish()
    }
}

impl Drop for FilterConfig {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatcher_parse() {
        let empty: [&str; 0] = [];
        assert_eq!(DispatcherTypes::parse(&empty), Ok(DispatcherTypes::REQUEST));
        assert_eq!(
            DispatcherTypes::parse(&["forward", "ERROR"]),
            Ok(DispatcherTypes::FORWARD | DispatcherTypes::ERROR)
        );
        assert_eq!(DispatcherTypes::parse(&["REQUEST", "ASYNC"]), Err("ASYNC".to_string()));
    }

    #[test]
    fn test_filter_map_selection() {
        let map = FilterMap::new("audit")
            .with_url_pattern("/admin/*")
            .with_url_pattern("*.do")
            .with_servlet_name("reports");

        assert!(map.matches_url("/admin", true));
        assert!(map.matches_url("/x/run.do", true));
        assert!(!map.matches_url("/public", true));
        assert!(map.matches_servlet("reports"));
        assert!(!map.matches_servlet("other"));
        assert!(FilterMap::new("all").with_servlet_name("*").matches_servlet("other"));

        assert!(map.applies_to(DispatcherTypes::REQUEST));
        assert!(!map.applies_to(DispatcherTypes::FORWARD));
    }

    #[test]
    fn test_filter_created_lazily_once() {
        let def = FilterDef {
            name: "log".into(),
            class: "logging".into(),
            init_params: BTreeMap::new(),
        };
        let mut config = FilterConfig::new(def, Arc::new(Registry::with_builtins()));
        assert!(!config.is_instantiated());

        let first = config.filter().unwrap();
        let second = config.filter().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        config.release();
        assert!(!config.is_instantiated());
    }

    #[test]
    fn test_unknown_filter_class() {
        let def = FilterDef {
            name: "ghost".into(),
            class: "nope".into(),
            init_params: BTreeMap::new(),
        };
        let config = FilterConfig::new(def, Arc::new(Registry::new()));
        assert!(matches!(config.filter(), Err(ServletError::NotFound(_))));
    }
}
