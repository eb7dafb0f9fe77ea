//! Request dispatching to application resources.
//!
//! # Responsibilities
//! - `forward`: replace the response body with a resource, then resolve
//!   any error the response carries
//! - `include`: append a resource to the response body
//!
//! # Design Decisions
//! - Both are synchronous nested invocations on the caller's stack
//! - A query string on the target URI is merged into the request parameters
//! - Headers set before a forward survive; only the buffered body is reset

use std::io::ErrorKind;

use crate::application::context::Context;
use crate::application::error_page::ErrorPageResolver;
use crate::application::render::render_resource;
use crate::error::ServletError;
use crate::http::{Request, Response};

/// Dispatcher for one resource URI.
#[derive(Debug)]
pub struct RequestDispatcher<'a> {
    context: &'a Context,
    uri: String,
}

impl<'a> RequestDispatcher<'a> {
    pub(crate) fn new(context: &'a Context, uri: &str) -> Self {
        Self {
            context,
            uri: uri.to_string(),
        }
    }

    /// Render the resource in place of anything buffered so far.
    pub fn forward(&self, request: &mut Request, response: &mut Response) -> Result<(), ServletError> {
        if response.is_committed() {
            tracing::error!(uri = %self.uri, "Cannot forward after the response has been committed");
            return Err(ServletError::IllegalState(format!(
                "cannot forward to {} after the response has been committed",
                self.uri
            )));
        }

        response.reset_buffer();
        self.invoke(request, response)?;
        ErrorPageResolver::commit(request, response, self.context);
        Ok(())
    }

    /// Render the resource after anything already written.
    pub fn include(&self, request: &mut Request, response: &mut Response) -> Result<(), ServletError> {
        self.invoke(request, response)
    }

    fn invoke(&self, request: &mut Request, response: &mut Response) -> Result<(), ServletError> {
        let path = match self.uri.split_once('?') {
            Some((path, query)) => {
                request.merge_query(query);
                path
            }
            None => self.uri.as_str(),
        };

        let real_path = self.context.real_path(path);
        let source = match std::fs::read(&real_path) {
            Ok(source) => source,
            Err(e) if e.kind() == ErrorKind::NotFound || real_path.is_dir() => {
                tracing::error!(uri = %self.uri, path = ?real_path, "Resource not found");
                return Err(ServletError::ResourceUnavailable {
                    path: path.to_string(),
                });
            }
            Err(e) => return Err(ServletError::Io(e)),
        };

        tracing::debug!(uri = %self.uri, bytes = source.len(), "Dispatching to resource");
        render_resource(&source, request, response);
        Ok(())
    }
}
