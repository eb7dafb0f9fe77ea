//! Request logging filter.
//!
//! Logs each request on entry and its status and latency once the rest of
//! the chain returns. Init parameter `slow_ms` sets the latency above which
//! requests are logged at `warn` instead of `info`.

use std::time::{Duration, Instant};

use crate::error::ServletError;
use crate::filter::{Filter, FilterChain, FilterConfig};
use crate::http::{attributes, Request, Response};

#[derive(Debug)]
pub struct RequestLoggingFilter {
    slow_threshold: Duration,
}

impl Default for RequestLoggingFilter {
    fn default() -> Self {
        Self {
            slow_threshold: Duration::from_millis(1000),
        }
    }
}

impl Filter for RequestLoggingFilter {
    fn init(&mut self, config: &FilterConfig) -> Result<(), ServletError> {
        if let Some(value) = config.init_parameter("slow_ms") {
            let millis: u64 = value.parse().map_err(|_| {
                ServletError::failure(format!(
                    "filter {}: slow_ms must be an integer, got {value}",
                    config.filter_name()
                ))
            })?;
            self.slow_threshold = Duration::from_millis(millis);
        }
        Ok(())
    }

    fn do_filter(
        &self,
        request: &mut Request,
        response: &mut Response,
        chain: &mut FilterChain<'_>,
    ) -> Result<(), ServletError> {
        let start = Instant::now();
        let request_id = request
            .attribute_string(attributes::REQUEST_ID)
            .unwrap_or_else(|| "-".to_string());

        tracing::info!(
            request_id = %request_id,
            method = %request.method(),
            path = %request.path(),
            servlet_path = %request.servlet_path(),
            "Request started"
        );

        let outcome = chain.do_filter(request, response)?;
        let elapsed = start.elapsed();

        if elapsed > self.slow_threshold {
            tracing::warn!(
                request_id = %request_id,
                status = response.status(),
                elapsed_ms = elapsed.as_millis() as u64,
                outcome = ?outcome,
                "Slow request"
            );
        } else {
            tracing::info!(
                request_id = %request_id,
                status = response.status(),
                elapsed_ms = elapsed.as_millis() as u64,
                outcome = ?outcome,
                "Request finished"
            );
        }
        Ok(())
    }
}
