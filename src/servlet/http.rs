//! HTTP method dispatch for servlets.
//!
//! # Responsibilities
//! - Route `service` to a per-method handler
//! - Answer conditional GETs from `last_modified`
//! - Derive HEAD from GET
//!
//! # Design Decisions
//! - Unimplemented handlers answer 405 on HTTP/1.1 and 400 on older
//!   protocols; OPTIONS, TRACE and unknown methods answer 501
//! - Timestamps compare at whole-second precision, the resolution of
//!   HTTP dates

use axum::http::Method;
use chrono::{DateTime, Utc};

use crate::application::Context;
use crate::error::ServletError;
use crate::http::{Request, Response};
use crate::servlet::{Servlet, ServletConfig};

/// A servlet with one handler per HTTP method.
///
/// Register implementations with `Registry::register_http_servlet`, which
/// wraps them in `HttpServletAdapter`.
pub trait HttpServlet: Send + Sync {
    fn init(&mut self, _config: &ServletConfig) -> Result<(), ServletError> {
        Ok(())
    }

    fn destroy(&mut self) {}

    /// Modification time of the resource a GET would return, if known.
    fn last_modified(&self, _context: &Context, _request: &Request) -> Option<DateTime<Utc>> {
        None
    }

    fn do_get(&self, _context: &Context, request: &mut Request, response: &mut Response) -> Result<(), ServletError> {
        method_not_supported(request, response)
    }

    /// Runs `do_get` and drops the body.
    fn do_head(&self, context: &Context, request: &mut Request, response: &mut Response) -> Result<(), ServletError> {
        self.do_get(context, request, response)?;
        if !response.is_committed() {
            response.reset_buffer();
            response.set_content_length(0);
        }
        Ok(())
    }

    fn do_post(&self, _context: &Context, request: &mut Request, response: &mut Response) -> Result<(), ServletError> {
        method_not_supported(request, response)
    }

    fn do_put(&self, _context: &Context, request: &mut Request, response: &mut Response) -> Result<(), ServletError> {
        method_not_supported(request, response)
    }

    fn do_delete(&self, _context: &Context, request: &mut Request, response: &mut Response) -> Result<(), ServletError> {
        method_not_supported(request, response)
    }

    fn do_options(&self, _context: &Context, _request: &mut Request, response: &mut Response) -> Result<(), ServletError> {
        not_implemented(response)
    }

    fn do_trace(&self, _context: &Context, _request: &mut Request, response: &mut Response) -> Result<(), ServletError> {
        not_implemented(response)
    }
}

/// Error response for a method the servlet does not handle.
pub fn method_not_supported(request: &Request, response: &mut Response) -> Result<(), ServletError> {
    let message = format!("HTTP method {} is not supported by this URL", request.method());
    if request.protocol().ends_with("1.1") {
        response.send_error(405, message)
    } else {
        response.send_error(400, message)
    }
}

fn not_implemented(response: &mut Response) -> Result<(), ServletError> {
    response.send_error(501, "Method not implemented")
}

/// Adapts an `HttpServlet` to the `Servlet` interface.
pub struct HttpServletAdapter<S>(pub S);

impl<S: HttpServlet> HttpServletAdapter<S> {
    fn conditional_get(
        &self,
        context: &Context,
        request: &mut Request,
        response: &mut Response,
    ) -> Result<(), ServletError> {
        let Some(last_modified) = self.0.last_modified(context, request) else {
            return self.0.do_get(context, request, response);
        };

        let not_modified = request
            .header("if-modified-since")
            .and_then(|value| DateTime::parse_from_rfc2822(value).ok())
            .is_some_and(|since| since.timestamp() >= last_modified.timestamp());

        if not_modified {
            response.set_status(304);
            return Ok(());
        }

        response.set_header("Last-Modified", &http_date(last_modified))?;
        self.0.do_get(context, request, response)
    }
}

impl<S: HttpServlet> Servlet for HttpServletAdapter<S> {
    fn init(&mut self, config: &ServletConfig) -> Result<(), ServletError> {
        self.0.init(config)
    }

    fn service(&self, context: &Context, request: &mut Request, response: &mut Response) -> Result<(), ServletError> {
        let method = request.method().clone();
        match method {
            Method::GET => self.conditional_get(context, request, response),
            Method::HEAD => {
                if let Some(last_modified) = self.0.last_modified(context, request) {
                    response.set_header("Last-Modified", &http_date(last_modified))?;
                }
                self.0.do_head(context, request, response)
            }
            Method::POST => self.0.do_post(context, request, response),
            Method::PUT => self.0.do_put(context, request, response),
            Method::DELETE => self.0.do_delete(context, request, response),
            Method::OPTIONS => self.0.do_options(context, request, response),
            Method::TRACE => self.0.do_trace(context, request, response),
            _ => not_implemented(response),
        }
    }

    fn destroy(&mut self) {
        self.0.destroy()
    }
}

/// Format a timestamp as an HTTP date (RFC 7231 IMF-fixdate).
pub fn http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
