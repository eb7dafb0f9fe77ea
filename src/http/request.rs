//! Request representation seen by filters and servlets.
//!
//! # Responsibilities
//! - Carry method, protocol, headers and body of the incoming request
//! - Hold the servlet path / path info split computed by the router
//! - Hold request-scoped attributes and query parameters
//!
//! # Design Decisions
//! - Attribute values are `serde_json::Value` so any component can stash
//!   plain data without knowing the consumer's types
//! - The full request path never changes after construction; forwards only
//!   add parameters and attributes

use std::collections::HashMap;

use axum::body::Bytes;
use axum::http::{request::Parts, HeaderMap, HeaderName, HeaderValue, Method, Version};
use serde_json::Value;

/// A request flowing through the pipeline.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    version: Version,
    request_uri: String,
    path: String,
    servlet_path: String,
    path_info: Option<String>,
    headers: HeaderMap,
    parameters: HashMap<String, Vec<String>>,
    attributes: HashMap<String, Value>,
    body: Bytes,
}

impl Request {
    /// Create a request for the given method and URI (path plus optional query).
    pub fn new(method: Method, uri: &str) -> Self {
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (uri, None),
        };

        let mut request = Self {
            method,
            version: Version::HTTP_11,
            request_uri: uri.to_string(),
            path: path.to_string(),
            servlet_path: String::new(),
            path_info: None,
            headers: HeaderMap::new(),
            parameters: HashMap::new(),
            attributes: HashMap::new(),
            body: Bytes::new(),
        };
        if let Some(query) = query {
            request.merge_query(query);
        }
        request
    }

    /// Build a request from decomposed `http` parts and a buffered body.
    pub fn from_parts(parts: Parts, body: Bytes) -> Self {
        let uri = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());

        let mut request = Self::new(parts.method, &uri)
            .with_version(parts.version)
            .with_body(body);
        request.headers = parts.headers;
        request
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Add a header, ignoring names or values that are not valid HTTP.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Protocol string in the `HTTP/x.y` form.
    pub fn protocol(&self) -> &'static str {
        match self.version {
            Version::HTTP_09 => "HTTP/0.9",
            Version::HTTP_10 => "HTTP/1.0",
            Version::HTTP_2 => "HTTP/2.0",
            Version::HTTP_3 => "HTTP/3.0",
            _ => "HTTP/1.1",
        }
    }

    /// The original request URI, including any query string.
    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    /// The full request path used for mapping.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn servlet_path(&self) -> &str {
        &self.servlet_path
    }

    pub fn set_servlet_path(&mut self, servlet_path: impl Into<String>) {
        self.servlet_path = servlet_path.into();
    }

    pub fn path_info(&self) -> Option<&str> {
        self.path_info.as_deref()
    }

    pub fn set_path_info(&mut self, path_info: Option<String>) {
        self.path_info = path_info;
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// First value of a request parameter.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn parameter_values(&self, name: &str) -> &[String] {
        self.parameters.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Merge the parameters of an `application/x-www-form-urlencoded` query.
    pub fn merge_query(&mut self, query: &str) {
        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            self.parameters
                .entry(name.into_owned())
                .or_default()
                .push(value.into_owned());
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Attribute rendered as text: strings as-is, other values as JSON.
    pub fn attribute_string(&self, name: &str) -> Option<String> {
        self.attributes.get(name).map(|value| match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<Value> {
        self.attributes.remove(name)
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }
}
