//! Filter subsystem.
//!
//! # Data Flow
//! ```text
//! Request resolved to a servlet
//!     → factory.rs (select mappings: URL pass, then servlet-name pass)
//!     → config.rs (look up FilterConfig, create instance on first use)
//!     → chain.rs (invoke filters in order, then the servlet)
//!     → Return: ChainOutcome::Completed or ShortCircuited
//! ```
//!
//! # Design Decisions
//! - Chains are built per request and borrow the context; nothing is pooled
//! - Order is deterministic: URL-matched mappings in declaration order,
//!   followed by servlet-name-matched mappings in declaration order
//! - A filter that returns without calling the chain ends processing; this
//!   is an outcome, not an error

pub mod chain;
pub mod config;
pub mod factory;
pub mod headers;
pub mod logging;

pub use chain::{ChainOutcome, FilterChain};
pub use config::{DispatcherTypes, FilterConfig, FilterMap};
pub use factory::FilterChainFactory;

use crate::error::ServletError;
use crate::http::{Request, Response};

/// A request/response interceptor.
pub trait Filter: Send + Sync {
    fn init(&mut self, _config: &FilterConfig) -> Result<(), ServletError> {
        Ok(())
    }

    /// Process the request. Call `chain.do_filter` to continue to the next
    /// filter (or the servlet); return without calling it to short-circuit.
    fn do_filter(
        &self,
        request: &mut Request,
        response: &mut Response,
        chain: &mut FilterChain<'_>,
    ) -> Result<(), ServletError>;

    fn destroy(&self) {}
}
