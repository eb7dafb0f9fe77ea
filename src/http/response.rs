//! Buffered response representation.
//!
//! # Responsibilities
//! - Buffer body output until flushed (or stream it with autoflush)
//! - Track the committed and error states the pipeline depends on
//! - Convert into an `axum` response once the pipeline is done
//!
//! # Design Decisions
//! - Flushing commits the response: status and headers are frozen and
//!   flushed bytes can no longer be reset
//! - `send_error` only flags the response; rendering the error document is
//!   the error page resolver's job
//! - Status codes are plain `u16` so undeclared codes (e.g. 600) survive

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};

use crate::error::ServletError;

/// A response under construction.
#[derive(Debug)]
pub struct Response {
    status: u16,
    message: Option<String>,
    headers: HeaderMap,
    buffer: Vec<u8>,
    output: Vec<u8>,
    content_length: Option<usize>,
    autoflush: bool,
    committed: bool,
    error: bool,
    error_resolved: bool,
}

impl Response {
    pub fn new(autoflush: bool) -> Self {
        Self {
            status: 200,
            message: None,
            headers: HeaderMap::new(),
            buffer: Vec::new(),
            output: Vec::new(),
            content_length: None,
            autoflush,
            committed: false,
            error: false,
            error_resolved: false,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Set the status without flagging an error. Ignored once committed.
    pub fn set_status(&mut self, status: u16) {
        if !self.committed {
            self.status = status;
        }
    }

    /// Explicit message set through `send_error`, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The explicit message, or the canonical reason phrase of the status.
    pub fn status_message(&self) -> String {
        match &self.message {
            Some(message) if !message.is_empty() => message.clone(),
            _ => StatusCode::from_u16(self.status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or_default()
                .to_string(),
        }
    }

    pub fn autoflush(&self) -> bool {
        self.autoflush
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    pub fn is_error(&self) -> bool {
        self.error
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Set (replace) a header. Fails once the response is committed.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<(), ServletError> {
        if self.committed {
            return Err(ServletError::IllegalState(format!(
                "cannot set header {name} after the response has been committed"
            )));
        }
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ServletError::failure(format!("invalid header name {name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ServletError::failure(format!("invalid value for header {name}: {e}")))?;
        self.headers.insert(name, value);
        Ok(())
    }

    pub fn content_length(&self) -> Option<usize> {
        self.content_length
    }

    pub fn set_content_length(&mut self, length: usize) {
        self.content_length = Some(length);
    }

    /// Append bytes to the body. With autoflush they are committed immediately.
    pub fn write(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
        if self.autoflush {
            self.flush_buffer();
        }
    }

    /// Bytes written but not yet flushed.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    /// Bytes already flushed to the client.
    pub fn body(&self) -> &[u8] {
        &self.output
    }

    /// Discard buffered output. Headers and already flushed bytes are kept.
    pub fn reset_buffer(&mut self) {
        self.buffer.clear();
    }

    /// Flag the response as an error with the given status and message.
    pub fn send_error(&mut self, status: u16, message: impl Into<String>) -> Result<(), ServletError> {
        if self.committed {
            return Err(ServletError::IllegalState(
                "cannot send an error after the response has been committed".to_string(),
            ));
        }
        self.status = status;
        self.message = Some(message.into());
        self.error = true;
        self.reset_buffer();
        Ok(())
    }

    /// Whether the error page resolver already rendered this error.
    pub fn is_error_resolved(&self) -> bool {
        self.error_resolved
    }

    pub(crate) fn mark_error_resolved(&mut self) {
        self.error_resolved = true;
    }

    /// Move buffered bytes to the output and commit the response.
    pub fn flush_buffer(&mut self) {
        self.output.append(&mut self.buffer);
        self.committed = true;
    }

    /// Convert into an `axum` response, flushing anything still buffered.
    pub fn into_http(mut self) -> axum::response::Response {
        self.flush_buffer();
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut headers = self.headers;
        if self.content_length == Some(self.output.len()) {
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(self.output.len()));
        }

        let mut response = axum::response::Response::new(Body::from(self.output));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}
