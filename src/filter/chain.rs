//! Ordered filter invocation ending at the servlet.
//!
//! # Responsibilities
//! - Run each selected filter exactly once, in order
//! - Invoke the servlet after the last filter continues
//! - Report whether the request reached the servlet
//!
//! # Design Decisions
//! - The cursor advances before a filter body runs, so a filter calling
//!   `do_filter` re-entrantly always reaches the next element
//! - The chain only goes forward. Invoking it again once every filter has
//!   run calls the servlet again

use crate::application::Context;
use crate::error::ServletError;
use crate::filter::config::FilterConfig;
use crate::http::{Request, Response};
use crate::servlet::Servlet;

/// How a chain invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainOutcome {
    /// The servlet was invoked.
    Completed,
    /// The named filter returned without continuing the chain.
    ShortCircuited { at: String },
}

/// Per-request filter chain.
pub struct FilterChain<'a> {
    context: &'a Context,
    filters: Vec<&'a FilterConfig>,
    servlet: &'a dyn Servlet,
    position: usize,
    completed: bool,
}

impl<'a> FilterChain<'a> {
    pub fn new(context: &'a Context, servlet: &'a dyn Servlet) -> Self {
        Self {
            context,
            filters: Vec::new(),
            servlet,
            position: 0,
            completed: false,
        }
    }

    pub fn add_filter(&mut self, config: &'a FilterConfig) {
        self.filters.push(config);
    }

    pub fn context(&self) -> &'a Context {
        self.context
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Index of the next filter to run.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn filter_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.filters.iter().map(|config| config.filter_name())
    }

    /// Invoke the next filter, or the servlet when every filter has run.
    pub fn do_filter(
        &mut self,
        request: &mut Request,
        response: &mut Response,
    ) -> Result<ChainOutcome, ServletError> {
        if let Some(&config) = self.filters.get(self.position) {
            self.position += 1;
            let filter = config.filter()?;
            tracing::trace!(
                filter = %config.filter_name(),
                position = self.position,
                total = self.filters.len(),
                "Invoking filter"
            );
            filter.do_filter(request, response, self)?;
            return Ok(self.outcome());
        }

        self.servlet.service(self.context, request, response)?;
        self.completed = true;
        Ok(ChainOutcome::Completed)
    }

    fn outcome(&self) -> ChainOutcome {
        if self.completed {
            return ChainOutcome::Completed;
        }
        // The furthest filter reached is the one that stopped.
        let at = self.filters[self.position - 1].filter_name().to_string();
        ChainOutcome::ShortCircuited { at }
    }
}
