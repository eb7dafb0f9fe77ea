//! Resource rendering shared by the dispatcher and the error page resolver.
//!
//! UTF-8 resources get `${name}` placeholders replaced by the HTML-escaped
//! string form of request attribute `name` (unknown names render empty).
//! Anything else is copied verbatim. Static files served by the file
//! servlet skip expansion and go through `write_resource` directly.

use std::borrow::Cow;

use crate::http::{Request, Response};

/// Write a resource into the response.
///
/// With autoflush the output is streamed line by line; otherwise it is
/// written as a single unit.
pub(crate) fn render_resource(source: &[u8], request: &Request, response: &mut Response) {
    let rendered: Cow<'_, [u8]> = match std::str::from_utf8(source) {
        Ok(text) if text.contains("${") => Cow::Owned(expand(text, request).into_bytes()),
        _ => Cow::Borrowed(source),
    };
    write_resource(&rendered, response);
}

/// Write `source` into the response unchanged.
pub(crate) fn write_resource(source: &[u8], response: &mut Response) {
    if response.autoflush() {
        for line in source.split_inclusive(|b| *b == b'\n') {
            response.write(line);
        }
    } else {
        response.write(source);
    }
}

fn expand(text: &str, request: &Request) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = after[..end].trim();
                if let Some(value) = request.attribute_string(name) {
                    out.push_str(&escape_html(&value));
                }
                rest = &after[end + 1..];
            }
            None => {
                // Unterminated placeholder: keep the remainder as is.
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
