//! Static resource servlet.
//!
//! Serves the file named by the request's path info from the application
//! base path, byte for byte (no placeholder expansion). Init parameters:
//! - `root`: path prefix under the base path (default: none)
//! - `index`: file served for directory paths (default `index.html`)

use chrono::{DateTime, Utc};

use crate::application::render::write_resource;
use crate::application::Context;
use crate::error::ServletError;
use crate::http::{Request, Response};
use crate::servlet::http::HttpServlet;
use crate::servlet::ServletConfig;

#[derive(Debug, Clone)]
pub struct FileServlet {
    root: String,
    index: String,
}

impl Default for FileServlet {
    fn default() -> Self {
        Self {
            root: String::new(),
            index: "index.html".to_string(),
        }
    }
}

impl FileServlet {
    /// Resource URI for the request: root + path info, with the index file
    /// appended to directory paths.
    fn resource_uri(&self, context: &Context, request: &Request) -> String {
        let path_info = request.path_info().unwrap_or("/");
        let uri = format!("{}{}", self.root.trim_end_matches('/'), path_info);
        if uri.ends_with('/') || context.real_path(&uri).is_dir() {
            format!("{}/{}", uri.trim_end_matches('/'), self.index)
        } else {
            uri
        }
    }
}

impl HttpServlet for FileServlet {
    fn init(&mut self, config: &ServletConfig) -> Result<(), ServletError> {
        if let Some(root) = config.init_parameter("root") {
            self.root = root.to_string();
        }
        if let Some(index) = config.init_parameter("index") {
            self.index = index.to_string();
        }
        Ok(())
    }

    fn last_modified(&self, context: &Context, request: &Request) -> Option<DateTime<Utc>> {
        let path = context.real_path(&self.resource_uri(context, request));
        let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok()?;
        Some(DateTime::<Utc>::from(modified))
    }

    fn do_get(&self, context: &Context, request: &mut Request, response: &mut Response) -> Result<(), ServletError> {
        let uri = self.resource_uri(context, request);
        let real_path = context.real_path(&uri);
        if !real_path.is_file() {
            return response.send_error(404, format!("{} was not found", request.path()));
        }

        if let Some(content_type) = content_type(&uri) {
            response.set_header("Content-Type", content_type)?;
        }
        let source = std::fs::read(&real_path)?;
        tracing::debug!(uri = %uri, bytes = source.len(), "Serving static file");
        write_resource(&source, response);
        Ok(())
    }
}

fn content_type(uri: &str) -> Option<&'static str> {
    let ext = uri.rsplit_once('.')?.1;
    let content_type = match ext.to_ascii_lowercase().as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "txt" => "text/plain; charset=utf-8",
        "xml" => "application/xml",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        _ => return None,
    };
    Some(content_type)
}
