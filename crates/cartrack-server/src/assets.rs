//! Static files for the browser client.
//!
//! Any non-API `GET` is looked up under the public directory. Paths that do
//! not name a file fall back to `index.html` so client-side routes resolve.

use std::fs;
use std::path::{Path, PathBuf};

const INDEX: &str = "index.html";

pub struct Assets {
    root: PathBuf,
}

impl Assets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a request path to a file under the root. `None` when the path
    /// tries to climb out of the root.
    pub fn resolve(&self, url_path: &str) -> Option<PathBuf> {
        let rel = url_path.trim_start_matches('/');
        if rel.split(['/', '\\']).any(|seg| seg == "..") {
            return None;
        }
        let candidate = self.root.join(rel);
        if !rel.is_empty() && candidate.is_file() {
            Some(candidate)
        } else {
            Some(self.root.join(INDEX))
        }
    }

    /// File contents and content type, or `None` if nothing can be served.
    pub fn load(&self, url_path: &str) -> Option<(Vec<u8>, &'static str)> {
        let path = self.resolve(url_path)?;
        let data = fs::read(&path).ok()?;
        Some((data, content_type(&path)))
    }
}

pub fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json" | "map") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("ico") => "image/x-icon",
        Some("woff2") => "font/woff2",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
