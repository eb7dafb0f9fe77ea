//! Per-request filter chain construction.
//!
//! # Responsibilities
//! - Select the filter mappings that apply to a resolved servlet
//! - Order them: URL-pattern matches first, servlet-name matches second,
//!   each in declaration order
//! - Skip mappings whose filter has no definition
//!
//! # Design Decisions
//! - URL patterns are tested against the servlet path with case-sensitive
//!   matching
//! - A mapping contributes at most once per pass; a mapping matching both by
//!   URL and by servlet name appears once in each pass
//! - No applicable mapping yields `None` so callers can skip the chain

use crate::application::Context;
use crate::filter::chain::FilterChain;
use crate::filter::config::{DispatcherTypes, FilterConfig, FilterMap};
use crate::http::Request;
use crate::servlet::Servlet;

/// Builds filter chains for a context.
#[derive(Debug, Clone, Copy)]
pub struct FilterChainFactory {
    case_sensitive: bool,
}

impl Default for FilterChainFactory {
    fn default() -> Self {
        Self {
            case_sensitive: true,
        }
    }
}

impl FilterChainFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the chain for `servlet`, or `None` when no mapping applies.
    pub fn create_filter_chain<'a>(
        &self,
        context: &'a Context,
        request: &Request,
        servlet_name: &str,
        servlet: &'a dyn Servlet,
        dispatch: DispatcherTypes,
    ) -> Option<FilterChain<'a>> {
        let maps = context.filter_maps();
        if maps.is_empty() {
            return None;
        }

        let mut chain: Option<FilterChain<'a>> = None;
        let servlet_path = request.servlet_path();

        for map in maps.iter().filter(|map| map.applies_to(dispatch)) {
            if !map.matches_url(servlet_path, self.case_sensitive) {
                continue;
            }
            if let Some(config) = Self::lookup(context, map) {
                chain
                    .get_or_insert_with(|| FilterChain::new(context, servlet))
                    .add_filter(config);
            }
        }

        for map in maps.iter().filter(|map| map.applies_to(dispatch)) {
            if !map.matches_servlet(servlet_name) {
                continue;
            }
            if let Some(config) = Self::lookup(context, map) {
                chain
                    .get_or_insert_with(|| FilterChain::new(context, servlet))
                    .add_filter(config);
            }
        }

        if let Some(chain) = &chain {
            tracing::debug!(
                servlet = %servlet_name,
                servlet_path = %servlet_path,
                filters = ?chain.filter_names().collect::<Vec<_>>(),
                "Built filter chain"
            );
        }
        chain
    }

    fn lookup<'a>(context: &'a Context, map: &FilterMap) -> Option<&'a FilterConfig> {
        let config = context.find_filter_config(&map.filter_name);
        if config.is_none() {
            tracing::warn!(
                filter = %map.filter_name,
                "Filter mapping refers to an undefined filter, skipping"
            );
        }
        config
    }
}
