//! Error page resolution.
//!
//! # Responsibilities
//! - Turn an error-flagged response into an error document
//! - Publish the error details as request attributes for the page
//! - Fall back to a built-in document when no page is configured or the
//!   configured one cannot be read
//!
//! # Design Decisions
//! - Resolution runs at most once per response; later calls are no-ops
//! - Only statuses ≥ 400 get an error document; a flagged response below
//!   400 just loses its buffered body
//! - A page configured for the error kind takes precedence over one
//!   configured for the status code

use std::path::PathBuf;

use crate::application::context::{resolve_under, Context};
use crate::application::render::{escape_html, render_resource};
use crate::http::{attributes, Request, Response};

/// Resolves error responses into error documents.
pub struct ErrorPageResolver;

impl ErrorPageResolver {
    /// Render the error document for `response` if it carries an
    /// unresolved error and is not yet committed.
    pub fn commit(request: &mut Request, response: &mut Response, context: &Context) {
        if !response.is_error() || response.is_committed() || response.is_error_resolved() {
            return;
        }

        response.reset_buffer();
        let status = response.status();
        if status < 400 {
            // Flagged statuses below 400 carry no body.
            return;
        }
        response.mark_error_resolved();

        let request_uri = request.request_uri().to_string();
        request.set_attribute(attributes::ERROR_REQUEST_URI, request_uri);
        request.set_attribute(attributes::ERROR_STATUS_CODE, status);
        let has_message = request
            .attribute_string(attributes::ERROR_MESSAGE)
            .is_some_and(|message| !message.is_empty());
        if !has_message {
            request.set_attribute(attributes::ERROR_MESSAGE, response.status_message());
        }

        let page = request
            .attribute_string(attributes::ERROR_EXCEPTION_TYPE)
            .and_then(|kind| context.find_exception_page(&kind))
            .or_else(|| context.find_error_page(status));

        let Some(page) = page else {
            Self::render_default(request, response);
            return;
        };

        let base = request
            .attribute_string(attributes::BASE_PATH)
            .filter(|base| !base.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| context.base_path().to_path_buf());
        let real_path = resolve_under(&base, &page.location);

        match std::fs::read(&real_path) {
            Ok(source) => {
                tracing::debug!(status, location = %page.location, "Rendering configured error page");
                set_html_content_type(response);
                render_resource(&source, request, response);
            }
            Err(e) => {
                tracing::warn!(
                    status,
                    location = %page.location,
                    error = %e,
                    "Configured error page could not be loaded, using default"
                );
                let message = request
                    .attribute_string(attributes::ERROR_MESSAGE)
                    .unwrap_or_default();
                request.set_attribute(
                    attributes::ERROR_MESSAGE,
                    format!(
                        "{message}. Additionally, the configured error page resource location ({}) \
                         could not be loaded to display this status error ({status}).",
                        page.location
                    ),
                );
                Self::render_default(request, response);
            }
        }
    }

    /// Write the built-in error document for the response status and the
    /// message attribute (or the status message).
    pub fn render_default(request: &Request, response: &mut Response) {
        let status = response.status();
        let message = request
            .attribute_string(attributes::ERROR_MESSAGE)
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| response.status_message());

        response.reset_buffer();
        set_html_content_type(response);
        response.write(default_page(status, &message).as_bytes());
    }
}

fn set_html_content_type(response: &mut Response) {
    if let Err(e) = response.set_header("Content-Type", "text/html; charset=utf-8") {
        tracing::warn!(error = %e, "Could not set error page content type");
    }
}

fn default_page(status: u16, message: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html xmlns=\"http://www.w3.org/1999/xhtml\">\n\
         <head><title>{status} Error</title></head>\n\
         <body>\n\
         <h1>Error {status}</h1>\n\
         <p>{}</p>\n\
         </body>\n\
         </html>\n",
        escape_html(message)
    )
}
