//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;

use servlet_host::application::Context;
use servlet_host::config::schema::{
    ApplicationConfig, ErrorPageDef, FilterDef, FilterMappingDef, ServerConfig, ServletDef,
};
use servlet_host::error::ServletError;
use servlet_host::filter::{Filter, FilterChain, FilterConfig};
use servlet_host::http::{HttpServer, Request, Response};
use servlet_host::lifecycle::Shutdown;
use servlet_host::servlet::{Servlet, ServletConfig};
use servlet_host::Registry;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Appends its filter name to the `trace` request attribute.
#[derive(Default)]
pub struct TraceFilter {
    name: String,
}

impl Filter for TraceFilter {
    fn init(&mut self, config: &FilterConfig) -> Result<(), ServletError> {
        self.name = config.filter_name().to_string();
        Ok(())
    }

    fn do_filter(
        &self,
        request: &mut Request,
        response: &mut Response,
        chain: &mut FilterChain<'_>,
    ) -> Result<(), ServletError> {
        append_trace(request, &self.name);
        chain.do_filter(request, response)?;
        Ok(())
    }
}

/// Rejects every request with 403 without continuing the chain.
pub struct GateFilter;

impl Filter for GateFilter {
    fn do_filter(
        &self,
        _request: &mut Request,
        response: &mut Response,
        _chain: &mut FilterChain<'_>,
    ) -> Result<(), ServletError> {
        response.send_error(403, "access denied")
    }
}

/// Forwards to the `target` init parameter instead of continuing.
#[derive(Default)]
pub struct ForwardFilter {
    target: String,
}

impl Filter for ForwardFilter {
    fn init(&mut self, config: &FilterConfig) -> Result<(), ServletError> {
        self.target = config.init_parameter("target").unwrap_or("/").to_string();
        Ok(())
    }

    fn do_filter(
        &self,
        request: &mut Request,
        response: &mut Response,
        chain: &mut FilterChain<'_>,
    ) -> Result<(), ServletError> {
        request.set_attribute("user", "grace");
        chain
            .context()
            .request_dispatcher(&self.target)
            .forward(request, response)
    }
}

/// Writes the `trace` attribute followed by `servlet`.
pub struct TraceServlet;

impl Servlet for TraceServlet {
    fn service(
        &self,
        _context: &Context,
        request: &mut Request,
        response: &mut Response,
    ) -> Result<(), ServletError> {
        append_trace(request, "servlet");
        let trace = request.attribute_string("trace").unwrap_or_default();
        response.write(trace.as_bytes());
        Ok(())
    }
}

/// Forwards to the `target` init parameter.
#[derive(Default)]
pub struct ForwardServlet {
    target: String,
}

impl Servlet for ForwardServlet {
    fn init(&mut self, config: &ServletConfig) -> Result<(), ServletError> {
        self.target = config.init_parameter("target").unwrap_or("/").to_string();
        Ok(())
    }

    fn service(
        &self,
        context: &Context,
        request: &mut Request,
        response: &mut Response,
    ) -> Result<(), ServletError> {
        request.set_attribute("user", "ada");
        context.request_dispatcher(&self.target).forward(request, response)
    }
}

/// Flushes output, then tries to forward.
pub struct LateForwardServlet;

impl Servlet for LateForwardServlet {
    fn service(
        &self,
        context: &Context,
        request: &mut Request,
        response: &mut Response,
    ) -> Result<(), ServletError> {
        response.write(b"already sent");
        response.flush_buffer();
        context.request_dispatcher("/hello.html").forward(request, response)
    }
}

/// Sends the error status named by the `status` init parameter.
#[derive(Default)]
pub struct StatusServlet {
    status: u16,
}

impl Servlet for StatusServlet {
    fn init(&mut self, config: &ServletConfig) -> Result<(), ServletError> {
        self.status = config
            .init_parameter("status")
            .and_then(|s| s.parse().ok())
            .unwrap_or(500);
        Ok(())
    }

    fn service(
        &self,
        _context: &Context,
        _request: &mut Request,
        response: &mut Response,
    ) -> Result<(), ServletError> {
        response.send_error(self.status, format!("status {} requested", self.status))
    }
}

/// Sends a 404, forwards (which renders the 404 page), then fails.
pub struct RecoveringServlet;

impl Servlet for RecoveringServlet {
    fn service(
        &self,
        context: &Context,
        request: &mut Request,
        response: &mut Response,
    ) -> Result<(), ServletError> {
        response.send_error(404, "first miss")?;
        context.request_dispatcher("/hello.html").forward(request, response)?;
        Err(ServletError::failure("cleanup failed"))
    }
}

/// Always fails.
pub struct FailingServlet;

impl Servlet for FailingServlet {
    fn service(
        &self,
        _context: &Context,
        _request: &mut Request,
        _response: &mut Response,
    ) -> Result<(), ServletError> {
        Err(ServletError::failure("database offline"))
    }
}

pub fn append_trace(request: &mut Request, entry: &str) {
    let mut trace = request.attribute_string("trace").unwrap_or_default();
    if !trace.is_empty() {
        trace.push(',');
    }
    trace.push_str(entry);
    request.set_attribute("trace", trace);
}

/// Built-in components plus the test servlets and filters above.
pub fn registry() -> Registry {
    let mut registry = Registry::with_builtins();
    registry
        .register_filter("trace", TraceFilter::default)
        .register_filter("gate", || GateFilter)
        .register_filter("forward", ForwardFilter::default)
        .register_servlet("trace", || TraceServlet)
        .register_servlet("forward", ForwardServlet::default)
        .register_servlet("late-forward", || LateForwardServlet)
        .register_servlet("status", StatusServlet::default)
        .register_servlet("recovering", || RecoveringServlet)
        .register_servlet("failing", || FailingServlet);
    registry
}

/// Temporary web application directory.
pub fn webapp() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "index.html", "<h1>home</h1>");
    write(root, "hello.html", "Hello ${user}!");
    write(root, "static/site.css", "body { margin: 0 }");
    write(
        root,
        "errors/404.html",
        "<p>Nothing at ${servlet.error.request_uri} (${servlet.error.status_code})</p>",
    );
    dir
}

pub fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

pub fn servlet(name: &str, class: &str, patterns: &[&str]) -> ServletDef {
    ServletDef {
        name: name.into(),
        class: class.into(),
        url_patterns: patterns.iter().map(|p| p.to_string()).collect(),
        init_params: Default::default(),
    }
}

pub fn servlet_with(name: &str, class: &str, patterns: &[&str], params: &[(&str, &str)]) -> ServletDef {
    let mut def = servlet(name, class, patterns);
    def.init_params = params
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    def
}

pub fn filter(name: &str, class: &str) -> FilterDef {
    FilterDef {
        name: name.into(),
        class: class.into(),
        init_params: Default::default(),
    }
}

pub fn url_mapping(filter: &str, patterns: &[&str]) -> FilterMappingDef {
    FilterMappingDef {
        filter_name: filter.into(),
        url_patterns: patterns.iter().map(|p| p.to_string()).collect(),
        servlet_names: Vec::new(),
        dispatchers: Vec::new(),
    }
}

pub fn servlet_mapping(filter: &str, servlets: &[&str]) -> FilterMappingDef {
    FilterMappingDef {
        filter_name: filter.into(),
        url_patterns: Vec::new(),
        servlet_names: servlets.iter().map(|s| s.to_string()).collect(),
        dispatchers: Vec::new(),
    }
}

pub fn error_page(code: u16, location: &str) -> ErrorPageDef {
    ErrorPageDef {
        error_code: Some(code),
        exception_type: None,
        location: location.into(),
    }
}

pub fn application(base: &Path) -> ApplicationConfig {
    ApplicationConfig {
        base_path: base.to_path_buf(),
        ..ApplicationConfig::default()
    }
}

pub fn body_text(response: &Response) -> String {
    String::from_utf8_lossy(response.body()).into_owned()
}

/// A running HTTP server bound to an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub config_tx: mpsc::UnboundedSender<ServerConfig>,
    pub handle: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub async fn start_server(application: ApplicationConfig) -> TestServer {
    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.application = application;

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config, registry()).unwrap();
    let shutdown = Shutdown::new();
    let (config_tx, config_rx) = mpsc::unbounded_channel();
    let shutdown_rx = shutdown.subscribe();
    let handle = tokio::spawn(server.run(listener, config_rx, shutdown_rx));

    TestServer {
        addr,
        shutdown,
        config_tx,
        handle,
    }
}
