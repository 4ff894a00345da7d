//! Serving files from a local directory through a catch-all route.
//!
//! [`serve_files`] registers a GET route ending in `/{filepath...}` whose
//! handler maps the captured remainder onto a base directory.
//! [`StaticFiles`] rejects paths that would escape the base directory.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::router::Router;
use crate::server::{handler, Handler, HandlerResponse};

/// Maps URL paths onto files below a base directory.
#[derive(Clone)]
pub struct StaticFiles {
    base_dir: PathBuf,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self {
            base_dir: base.into(),
        }
    }

    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let clean = url_path.trim_start_matches('/');
        if clean.contains("../")
            || clean.contains("/..")
            || clean.contains("..\\")
            || clean.contains("\\..")
        {
            return None;
        }
        let mut pb = self.base_dir.clone();
        for comp in Path::new(clean).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(pb)
    }

    fn content_type(path: &Path) -> &'static str {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase()
            .as_str()
        {
            "html" => "text/html",
            "css" => "text/css",
            "js" => "application/javascript",
            "json" => "application/json",
            "txt" => "text/plain",
            "svg" => "image/svg+xml",
            "png" => "image/png",
            _ => "application/octet-stream",
        }
    }

    /// Read the file `url_path` maps to, returning its bytes and content
    /// type.
    ///
    /// # Errors
    ///
    /// `NotFound` for traversal attempts, missing files and non-files.
    pub fn load(&self, url_path: &str) -> io::Result<(Vec<u8>, &'static str)> {
        let path = self
            .map_path(url_path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "invalid path"))?;
        if !path.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        }
        let bytes = fs::read(&path)?;
        Ok((bytes, Self::content_type(&path)))
    }
}

/// Register a GET route serving files from `root`.
///
/// `path` must end with `/{filepath...}`; the captured remainder selects
/// the file below `root`. For example with `root = "/var/www"`, the route
/// `/static/{filepath...}` serves `/static/css/site.css` from
/// `/var/www/css/site.css`.
///
/// # Panics
///
/// Panics when `path` does not end with `/{filepath...}`.
pub fn serve_files<P: Into<PathBuf>>(router: &mut Router<Handler>, path: &str, root: P) {
    if !path.ends_with("/{filepath...}") {
        panic!("path must end with /{{filepath...}} in path '{path}'");
    }

    let files = StaticFiles::new(root);
    router.get(
        path,
        handler(move |req| {
            let rel = req.path_param("filepath").unwrap_or("/");
            match files.load(rel) {
                Ok((bytes, content_type)) => HandlerResponse::raw(200, content_type, bytes),
                Err(_) => HandlerResponse::json(
                    404,
                    serde_json::json!({ "error": "Not Found", "path": rel }),
                ),
            }
        }),
    );
}
