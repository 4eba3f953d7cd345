//! HTML shell renderer.

use std::borrow::Cow;
use std::fmt::Write;

use crate::assets::StaticAssetMap;
use crate::http::context::RequestContext;
use crate::render::{RenderError, Renderer, View};

/// Bundles loaded ahead of the section chunk, in order.
const BASE_BUNDLES: &[&str] = &["_manifest", "_vendor", "_commons", "build"];

/// Renders a minimal document that boots the client application.
#[derive(Debug, Clone)]
pub struct ShellRenderer {
    title: String,
}

impl Default for ShellRenderer {
    fn default() -> Self {
        Self {
            title: "WordPress.com".to_string(),
        }
    }
}

impl ShellRenderer {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into() }
    }

    fn page(&self, template: &str, context: &RequestContext, heading: Option<&str>) -> Result<String, RenderError> {
        let urls = &context.urls;
        let stylesheet = if context.is_debug {
            urls.get("style-debug.css")
        } else if context.is_rtl {
            urls.get("style-rtl.css")
        } else {
            urls.get("style.css")
        };

        let mut html = String::with_capacity(2048);
        let _ = write!(
            html,
            "<!DOCTYPE html>\n<html lang=\"{}\" dir=\"{}\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n",
            escape(&context.lang),
            if context.is_rtl { "rtl" } else { "ltr" },
            escape(&self.title),
        );
        let _ = writeln!(html, "<link rel=\"shortcut icon\" href=\"{}\">", escape(&context.favicon_url));
        if let Some(href) = stylesheet {
            let _ = writeln!(html, "<link rel=\"stylesheet\" href=\"{}\">", escape(href));
        }
        html.push_str("</head>\n<body>\n");

        let _ = write!(html, "<div id=\"wpcom\" data-view=\"{}\"", escape(template));
        if let Some(chunk) = &context.chunk {
            let _ = write!(html, " data-chunk=\"{}\"", escape(chunk));
        }
        if let Some(badge) = &context.badge {
            let _ = write!(html, " data-badge=\"{}\"", escape(badge));
        }
        html.push('>');
        if let Some(heading) = heading {
            let _ = write!(html, "<h1>{}</h1>", escape(heading));
        }
        html.push_str("</div>\n");

        let _ = writeln!(html, "<script>window.AppBootstrap = {};</script>", script_json(context)?);

        for name in BASE_BUNDLES.iter().copied().chain(context.chunk.as_deref()) {
            if let Some(src) = bundle_url(urls, name, context.is_debug) {
                let _ = writeln!(html, "<script src=\"{}\"></script>", escape(src));
            }
        }

        html.push_str("</body>\n</html>\n");
        Ok(html)
    }

    fn not_found(&self, urls: &StaticAssetMap) -> String {
        let mut html = String::with_capacity(512);
        let _ = write!(
            html,
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n",
            escape(&self.title),
        );
        if let Some(href) = urls.get("style.css") {
            let _ = writeln!(html, "<link rel=\"stylesheet\" href=\"{}\">", escape(href));
        }
        html.push_str("</head>\n<body>\n<div id=\"wpcom\" data-view=\"404\"><h1>Page not found</h1></div>\n</body>\n</html>\n");
        html
    }
}

impl Renderer for ShellRenderer {
    fn render(&self, view: &View<'_>) -> Result<String, RenderError> {
        match view {
            View::Section { name, context } => self.page(name, context, None),
            View::ServerError { context } => self.page("500", context, Some("Something went wrong")),
            View::NotFound { urls } => Ok(self.not_found(urls)),
        }
    }
}

/// Minified bundle unless debugging, falling back to the plain one.
fn bundle_url<'a>(urls: &'a StaticAssetMap, name: &str, debug: bool) -> Option<&'a str> {
    if !debug {
        if let Some(url) = urls.get(&format!("{}-min", name)) {
            return Some(url);
        }
    }
    urls.get(name)
}

/// Context JSON safe for inclusion in a `<script>` element.
fn script_json(context: &RequestContext) -> Result<String, RenderError> {
    let json = serde_json::to_string(context)?;
    Ok(json
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026"))
}

fn escape(s: &str) -> Cow<'_, str> {
    const SPECIAL: &[char] = &['&', '<', '>', '"', '\''];
    if !s.contains(SPECIAL) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
