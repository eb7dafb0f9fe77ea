//! Response header filter.
//!
//! Every init parameter becomes a response header (name → value), set before
//! the rest of the chain runs. Typical use is security headers such as
//! `X-Content-Type-Options` or `X-Frame-Options`.

use axum::http::{HeaderName, HeaderValue};

use crate::error::ServletError;
use crate::filter::{Filter, FilterChain, FilterConfig};
use crate::http::{Request, Response};

#[derive(Debug, Default)]
pub struct HeaderFilter {
    headers: Vec<(String, String)>,
}

impl Filter for HeaderFilter {
    fn init(&mut self, config: &FilterConfig) -> Result<(), ServletError> {
        for (name, value) in config.init_parameters() {
            // Reject bad headers at init rather than on every request.
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                ServletError::failure(format!(
                    "filter {}: invalid header name {name}",
                    config.filter_name()
                ))
            })?;
            HeaderValue::from_str(value).map_err(|_| {
                ServletError::failure(format!(
                    "filter {}: invalid value for header {name}",
                    config.filter_name()
                ))
            })?;
            self.headers.push((name.clone(), value.clone()));
        }
        Ok(())
    }

    fn do_filter(
        &self,
        request: &mut Request,
        response: &mut Response,
        chain: &mut FilterChain<'_>,
    ) -> Result<(), ServletError> {
        for (name, value) in &self.headers {
            response.set_header(name, value)?;
        }
        chain.do_filter(request, response)?;
        Ok(())
    }
}
