//! Static file serving.

use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use super::{BoxFuture, Flow, Middleware};
use crate::config::ServerConfig;
use crate::context::Context;
use crate::request::{Method, Request};
use crate::response::Response;

/// Serves files below a root directory for GET and HEAD requests.
///
/// A request path naming a directory is served through the index file. Paths
/// that would leave the root (`..`) and files that do not exist are passed on
/// to the next middleware, so the default 404 still applies.
#[derive(Debug, Clone)]
pub struct Static {
    root: PathBuf,
    index: String,
}

impl Static {
    /// Serves files below `root`, using `index.html` for directories.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index: "index.html".to_string(),
        }
    }

    /// Serves files below `root` with the configured index file name.
    pub fn from_config(root: impl Into<PathBuf>, config: &ServerConfig) -> Self {
        Self::new(root).index(config.static_index.clone())
    }

    /// Sets the file served for directory requests.
    #[must_use]
    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    /// Maps a request path onto the root, refusing anything but plain names.
    fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let mut path = self.root.clone();
        for component in Path::new(request_path.trim_start_matches('/')).components() {
            match component {
                Component::Normal(name) => path.push(name),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        Some(path)
    }

    async fn load(&self, path: PathBuf) -> io::Result<(PathBuf, Vec<u8>)> {
        let path = if tokio::fs::metadata(&path).await?.is_dir() {
            path.join(&self.index)
        } else {
            path
        };
        let contents = tokio::fs::read(&path).await?;
        Ok((path, contents))
    }

    async fn serve(&self, res: &mut Response, req: &Request) -> Flow {
        if !matches!(req.method, Method::Get | Method::Head) {
            return Flow::Continue;
        }
        let Some(path) = self.resolve(&req.path) else {
            debug!(path = %req.path, "Refusing static path outside root");
            return Flow::Continue;
        };

        let (path, contents) = match self.load(path).await {
            Ok(found) => found,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Flow::Continue,
            Err(e) => {
                warn!(path = %req.path, error = %e, "Failed to read static file");
                return Flow::Continue;
            }
        };

        let mime = mime_guess::from_path(&path).first_or_octet_stream();
        res.set_status(200);
        res.set_header("Content-Type", mime.essence_str());
        res.set_header("Content-Length", contents.len().to_string());
        res.body.clear();
        if req.method != Method::Head {
            res.body = contents;
        }
        Flow::Handled
    }
}

impl Middleware for Static {
    fn call<'a>(
        &'a self,
        res: &'a mut Response,
        req: &'a Request,
        _ctx: &'a mut Context,
    ) -> BoxFuture<'a, Flow> {
        Box::pin(self.serve(res, req))
    }
}
